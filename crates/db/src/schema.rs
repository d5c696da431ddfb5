//! Process-wide table registry.
//!
//! Tables are registered explicitly, once, during startup. Sessions cannot be
//! acquired before [`install`] has run.

use once_cell::sync::OnceCell;

use crate::error::{DbError, Result};
use crate::pool::Database;

static REGISTRY: OnceCell<SchemaRegistry> = OnceCell::new();

/// DDL contributed by a module for one table.
///
/// Statements must be idempotent (`CREATE ... IF NOT EXISTS`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table: &'static str,
    pub statements: &'static [&'static str],
}

/// The set of tables known to this process.
#[derive(Debug)]
pub struct SchemaRegistry {
    tables: Vec<TableSchema>,
}

impl SchemaRegistry {
    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.table.to_string()).collect()
    }

    /// Create every registered table in a single transaction.
    pub async fn create_all(&self, db: &Database) -> Result<()> {
        let mut tx = db.pool().begin().await.map_err(DbError::Unreachable)?;
        for table in &self.tables {
            for statement in table.statements {
                sqlx::query(*statement).execute(&mut *tx).await?;
            }
            tracing::debug!(target: "bookstore-db", table = table.table, "table ensured");
        }
        tx.commit().await?;

        tracing::info!(
            target: "bookstore-db",
            tables = ?self.table_names(),
            "schema created"
        );
        Ok(())
    }
}

/// Install the registry. Installing the same table set again is a no-op;
/// installing a different one is rejected.
pub fn install(tables: Vec<TableSchema>) -> Result<&'static SchemaRegistry> {
    let mut fresh = false;
    let registry = REGISTRY.get_or_init(|| {
        fresh = true;
        SchemaRegistry {
            tables: tables.clone(),
        }
    });

    if fresh {
        tracing::info!(
            target: "bookstore-db",
            tables = ?registry.table_names(),
            "schema registry installed"
        );
        return Ok(registry);
    }

    if registry.tables != tables {
        return Err(DbError::SchemaConflict {
            installed: registry.table_names(),
            requested: tables.iter().map(|t| t.table.to_string()).collect(),
        });
    }

    Ok(registry)
}

pub fn installed() -> Option<&'static SchemaRegistry> {
    REGISTRY.get()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const WIDGET_TABLE: TableSchema = TableSchema {
        table: "widget",
        statements: &[
            "CREATE TABLE IF NOT EXISTS widget (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL)",
            "CREATE INDEX IF NOT EXISTS ix_widget_name ON widget (name)",
        ],
    };

    /// Every test in this crate shares one process-wide registry.
    pub(crate) fn install_widgets() -> &'static SchemaRegistry {
        install(vec![WIDGET_TABLE]).unwrap()
    }

    #[test]
    fn reinstalling_same_tables_is_a_noop() {
        let first = install_widgets();
        let second = install_widgets();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.table_names(), vec!["widget".to_string()]);
    }

    #[test]
    fn installing_different_tables_conflicts() {
        install_widgets();
        let other = TableSchema {
            table: "gadget",
            statements: &["CREATE TABLE IF NOT EXISTS gadget (id INTEGER PRIMARY KEY)"],
        };
        let err = install(vec![other]).unwrap_err();
        match err {
            DbError::SchemaConflict {
                installed,
                requested,
            } => {
                assert_eq!(installed, vec!["widget".to_string()]);
                assert_eq!(requested, vec!["gadget".to_string()]);
            }
            other => panic!("expected SchemaConflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_all_is_idempotent() {
        let registry = install_widgets();
        let db = Database::in_memory().await.unwrap();
        registry.create_all(&db).await.unwrap();
        registry.create_all(&db).await.unwrap();

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'widget'",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(count, 1);
    }
}
