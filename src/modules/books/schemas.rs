//! Request and response shapes for the books API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::models::Book;

/// Payload for creating a new book.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookCreate {
    pub title: String,
    pub author: String,
    pub year: i32,
    pub price: f64,
    #[serde(default = "in_stock_default")]
    #[schema(default = true)]
    pub in_stock: bool,
    #[serde(default)]
    pub description: Option<String>,
}

fn in_stock_default() -> bool {
    true
}

/// Response model for a stored book; the only shape returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookRead {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub price: f64,
    pub in_stock: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookRead {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            year: book.year,
            price: book.price,
            in_stock: book.in_stock,
            description: book.description,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

/// Payload for partially updating a book.
///
/// Only fields present in the request are applied. `description: null`
/// clears the description; `null` on any other field counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct BookUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from a missing key (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Overwrite the fields of `book` that are present in this payload.
    /// Timestamps are left to the caller.
    pub fn apply(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(year) = self.year {
            book.year = year;
        }
        if let Some(price) = self.price {
            book.price = price;
        }
        if let Some(in_stock) = self.in_stock {
            book.in_stock = in_stock;
        }
        if let Some(description) = self.description {
            book.description = description;
        }
    }
}

/// Largest page a list request may ask for.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Offset/limit window over the catalogue, ordered by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct Page {
    /// Rows to skip
    #[serde(default)]
    #[validate(range(min = 0))]
    #[param(default = 0, minimum = 0)]
    pub offset: i64,
    /// Maximum rows to return
    #[serde(default = "Page::default_limit")]
    #[validate(range(min = 1, max = MAX_PAGE_LIMIT))]
    // Kept equal to MAX_PAGE_LIMIT; utoipa only takes a literal here.
    #[param(default = 10, minimum = 1, maximum = 100)]
    pub limit: i64,
}

impl Page {
    pub const MAX_LIMIT: i64 = MAX_PAGE_LIMIT;

    fn default_limit() -> i64 {
        10
    }

    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: Self::default_limit(),
        }
    }
}
