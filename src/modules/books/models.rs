use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Storage-assigned identifier, never reused
    pub id: i64,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Short description of the book
    pub description: String,
    /// Rating from 0 to 5 inclusive
    pub rating: i64,
}

/// Body of a create or update request, exactly as received.
///
/// Fields are kept as loose JSON values so that every missing or wrongly
/// typed field can be reported by name, not just the first one serde trips
/// over.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPayload {
    pub title: Option<Value>,
    pub author: Option<Value>,
    pub description: Option<Value>,
    pub rating: Option<Value>,
}

/// Validated book fields, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub rating: i64,
}

impl NewBook {
    pub fn into_book(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            description: self.description,
            rating: self.rating,
        }
    }
}

/// Plain confirmation body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
