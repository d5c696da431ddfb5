use bookstore_db::TableSchema;
use chrono::{DateTime, Duration, Utc};

/// Table backing [`Book`], with lookup indexes on title and author.
pub const BOOK_TABLE: TableSchema = TableSchema {
    table: "book",
    statements: &[
        r#"CREATE TABLE IF NOT EXISTS book (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            title       TEXT    NOT NULL,
            author      TEXT    NOT NULL,
            year        INTEGER NOT NULL,
            price       REAL    NOT NULL,
            in_stock    BOOLEAN NOT NULL DEFAULT 1,
            description TEXT,
            created_at  TEXT    NOT NULL,
            updated_at  TEXT    NOT NULL
        )"#,
        "CREATE INDEX IF NOT EXISTS ix_book_title ON book (title)",
        "CREATE INDEX IF NOT EXISTS ix_book_author ON book (author)",
    ],
};

/// A persisted book row.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Book {
    /// Assigned by the store on insert
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Publication year
    pub year: i32,
    pub price: f64,
    pub in_stock: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Refresh `updated_at`. It always moves strictly forward, even when the
    /// clock has not advanced since the previous mutation.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}
