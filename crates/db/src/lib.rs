//! SQLite persistence layer for the BookStore service.
//!
//! - [`pool`] owns the shared [`Database`] handle built from a [`DbConfig`].
//! - [`session`] provides the per-request unit of work ([`Session`]).
//! - [`schema`] holds the process-wide table registry installed at startup.
//!
//! Absence of a row is never an error at this layer: lookups return
//! `Option<T>` and [`DbError`] is reserved for fatal store failures.

pub mod error;
pub mod pool;
pub mod schema;
pub mod session;

pub use error::DbError;
pub use pool::{Database, DbConfig};
pub use schema::{SchemaRegistry, TableSchema};
pub use session::{Session, SessionFuture, SessionMode};
