use std::future::Future;
use std::pin::Pin;

use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use sqlx::Transaction;
use uuid::{NoContext, Timestamp, Uuid};

use crate::error::{DbError, Result};

/// Boxed future returned by closures handed to [`crate::Database::scoped`].
pub type SessionFuture<'s, T> = Pin<Box<dyn Future<Output = T> + Send + 's>>;

/// How a session opens its transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Deferred `BEGIN`; the write lock is only requested on the first write.
    Read,
    /// `BEGIN IMMEDIATE`; the write lock is taken up front, so concurrent
    /// writers queue on the busy timeout instead of failing mid-transaction.
    Write,
}

/// One unit of work scoped to a single request.
///
/// Mutations are staged in an open transaction until [`Session::commit`]
/// flushes them. A session that is dropped or closed with work still pending
/// rolls it back and returns its connection to the pool.
pub struct Session {
    id: Uuid,
    mode: SessionMode,
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
}

async fn open(pool: &SqlitePool, mode: SessionMode) -> Result<Transaction<'static, Sqlite>> {
    let tx = match mode {
        SessionMode::Read => pool.begin().await,
        SessionMode::Write => pool.begin_with("BEGIN IMMEDIATE").await,
    };
    tx.map_err(|err| match err {
        sqlx::Error::Database(_) => DbError::Sqlx(err),
        other => DbError::Unreachable(other),
    })
}

impl Session {
    pub(crate) async fn begin(pool: SqlitePool, mode: SessionMode) -> Result<Self> {
        let tx = open(&pool, mode).await?;
        let id = Uuid::new_v7(Timestamp::now(NoContext));
        tracing::debug!(target: "bookstore-db", session = %id, ?mode, "session acquired");
        Ok(Self {
            id,
            mode,
            pool,
            tx: Some(tx),
        })
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether mutations may be staged but not yet committed.
    pub fn has_pending(&self) -> bool {
        self.tx.is_some()
    }

    /// Connection of the current transaction; starts a new one after a commit.
    pub async fn conn(&mut self) -> Result<&mut SqliteConnection> {
        if self.tx.is_none() {
            let tx = open(&self.pool, self.mode).await?;
            self.tx = Some(tx);
        }
        match self.tx.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(DbError::Unreachable(sqlx::Error::PoolClosed)),
        }
    }

    /// Flush pending mutations to the store.
    pub async fn commit(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
            tracing::debug!(target: "bookstore-db", session = %self.id, "session committed");
        }
        Ok(())
    }

    /// Discard pending mutations.
    pub async fn rollback(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
            tracing::debug!(target: "bookstore-db", session = %self.id, "session rolled back");
        }
        Ok(())
    }

    /// Roll back anything still pending and release the connection.
    pub async fn close(mut self) -> Result<()> {
        self.rollback().await
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // sqlx queues the rollback when the transaction is dropped.
        if self.tx.is_some() {
            tracing::debug!(
                target: "bookstore-db",
                session = %self.id,
                "session dropped with pending work, rolling back"
            );
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("pending", &self.has_pending())
            .finish()
    }
}
