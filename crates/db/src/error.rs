use thiserror::Error;

/// Fatal persistence failures. "Row not found" is not represented here.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("database unreachable: {0}")]
    Unreachable(#[source] sqlx::Error),

    #[error("table schema has not been installed")]
    SchemaNotInstalled,

    #[error("schema registry already installed with tables {installed:?}, refusing {requested:?}")]
    SchemaConflict {
        installed: Vec<String>,
        requested: Vec<String>,
    },

    #[error("invalid database configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DbError {
    /// Whether the underlying store rejected a write because of a constraint.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            DbError::Sqlx(sqlx::Error::Database(db_err)) => matches!(
                db_err.kind(),
                sqlx::error::ErrorKind::UniqueViolation
                    | sqlx::error::ErrorKind::ForeignKeyViolation
                    | sqlx::error::ErrorKind::NotNullViolation
                    | sqlx::error::ErrorKind::CheckViolation
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
