use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;

use crate::error::{DbError, Result};
use crate::schema;
use crate::session::{Session, SessionFuture, SessionMode};

const MEMORY_URL: &str = "sqlite::memory:";

/// Connection parameters for the shared pool.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Log every executed statement at INFO.
    pub echo: bool,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://bookstore.db".to_string(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
            echo: false,
        }
    }
}

/// Shared handle over the SQLite pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Build the pool and establish the first connection.
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let mut options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| DbError::Config(format!("{}: {e}", config.url)))?
            .create_if_missing(true);

        options = if config.echo {
            options.log_statements(log::LevelFilter::Info)
        } else {
            options.disable_statement_logging()
        };

        let mut pool_options = SqlitePoolOptions::new().acquire_timeout(config.acquire_timeout);

        // Every in-memory connection is its own database, so pin exactly one.
        pool_options = if config.is_in_memory() {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(config.max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(DbError::Unreachable)?;

        tracing::info!(
            target: "bookstore-db",
            url = %config.url,
            max_connections = config.max_connections,
            "database pool ready"
        );

        Ok(Self { pool })
    }

    /// Private in-memory database, mostly for tests and local experiments.
    pub async fn in_memory() -> Result<Self> {
        Self::connect(&DbConfig::new(MEMORY_URL)).await
    }

    /// Open a read unit of work bound to this pool.
    pub async fn acquire(&self) -> Result<Session> {
        self.acquire_with(SessionMode::Read).await
    }

    /// Open a unit of work holding the write lock from its first statement.
    /// Concurrent writers wait for each other; the last commit wins.
    pub async fn acquire_write(&self) -> Result<Session> {
        self.acquire_with(SessionMode::Write).await
    }

    async fn acquire_with(&self, mode: SessionMode) -> Result<Session> {
        if schema::installed().is_none() {
            return Err(DbError::SchemaNotInstalled);
        }
        Session::begin(self.pool.clone(), mode).await
    }

    /// Run `f` inside a fresh read session: commit on `Ok`, roll back on
    /// `Err`, release the connection in both cases.
    pub async fn scoped<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: for<'s> FnOnce(&'s mut Session) -> SessionFuture<'s, std::result::Result<T, E>>,
        E: From<DbError>,
    {
        self.scoped_with(SessionMode::Read, f).await
    }

    /// Like [`Database::scoped`], for units of work that mutate rows.
    pub async fn scoped_write<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: for<'s> FnOnce(&'s mut Session) -> SessionFuture<'s, std::result::Result<T, E>>,
        E: From<DbError>,
    {
        self.scoped_with(SessionMode::Write, f).await
    }

    async fn scoped_with<T, E, F>(&self, mode: SessionMode, f: F) -> std::result::Result<T, E>
    where
        F: for<'s> FnOnce(&'s mut Session) -> SessionFuture<'s, std::result::Result<T, E>>,
        E: From<DbError>,
    {
        let mut session = self.acquire_with(mode).await?;
        match f(&mut session).await {
            Ok(value) => {
                session.commit().await?;
                session.close().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = session.close().await {
                    tracing::warn!(
                        target: "bookstore-db",
                        error = %rollback_err,
                        "rollback after failed unit of work also failed"
                    );
                }
                Err(err)
            }
        }
    }

    /// Round-trip a trivial query to check connectivity.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(DbError::Unreachable)?;
        Ok(())
    }

    /// Close every pooled connection. Pending acquisitions fail afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!(target: "bookstore-db", "database pool closed");
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
