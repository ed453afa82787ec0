//! Field constraints for book write requests.

use std::ops::RangeInclusive;

use bookstore_http::extract::{FieldViolation, Validate};
use serde_json::Value;

use super::models::{BookPayload, NewBook};

pub const MAX_TEXT_LEN: usize = 255;
pub const RATING_RANGE: RangeInclusive<i64> = 0..=5;

impl Validate for BookPayload {
    type Output = NewBook;

    fn validate(self) -> Result<NewBook, Vec<FieldViolation>> {
        let mut violations = Vec::new();

        let title = check_text("title", self.title, &mut violations);
        let author = check_text("author", self.author, &mut violations);
        let description = check_text("description", self.description, &mut violations);
        let rating = check_rating(self.rating, &mut violations);

        match (title, author, description, rating) {
            (Some(title), Some(author), Some(description), Some(rating)) => Ok(NewBook {
                title,
                author,
                description,
                rating,
            }),
            _ => Err(violations),
        }
    }
}

fn check_text(
    field: &'static str,
    value: Option<Value>,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    let text = match value {
        None | Some(Value::Null) => {
            violations.push(FieldViolation::new(field, "field required"));
            return None;
        }
        Some(Value::String(text)) => text,
        Some(_) => {
            violations.push(FieldViolation::new(field, "must be a string"));
            return None;
        }
    };

    // Length is counted in characters, not bytes.
    match text.chars().count() {
        0 => {
            violations.push(FieldViolation::new(field, "must be at least 1 character"));
            None
        }
        len if len > MAX_TEXT_LEN => {
            violations.push(FieldViolation::new(
                field,
                format!("must be at most {} characters", MAX_TEXT_LEN),
            ));
            None
        }
        _ => Some(text),
    }
}

fn check_rating(value: Option<Value>, violations: &mut Vec<FieldViolation>) -> Option<i64> {
    let number = match value {
        None | Some(Value::Null) => {
            violations.push(FieldViolation::new("rating", "field required"));
            return None;
        }
        Some(Value::Number(number)) if number.is_i64() || number.is_u64() => number,
        Some(_) => {
            violations.push(FieldViolation::new("rating", "must be an integer"));
            return None;
        }
    };

    // Integers too large for i64 are simply out of range.
    match number.as_i64() {
        Some(rating) if RATING_RANGE.contains(&rating) => Some(rating),
        _ => {
            violations.push(FieldViolation::new(
                "rating",
                format!(
                    "must be between {} and {}",
                    RATING_RANGE.start(),
                    RATING_RANGE.end()
                ),
            ));
            None
        }
    }
}
