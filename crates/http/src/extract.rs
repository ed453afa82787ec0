//! Custom Axum extractors
//!
//! Every rejection is turned into an [`AppError`] so clients always get the
//! standard error envelope.

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use bookstore_db::{Database, Session};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppError;

/// A constraint violation on a single request field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub error: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            error: error.into(),
        }
    }

    pub fn into_detail(self) -> serde_json::Value {
        serde_json::json!({ "field": self.field, "error": self.error })
    }
}

/// Request payloads that must pass field-level checks before use.
///
/// Validation consumes the raw payload and yields the checked value, so
/// handlers never see unvalidated input.
pub trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, Vec<FieldViolation>>;
}

/// JSON body that has been deserialized and validated
pub struct Valid<T: Validate>(pub T::Output);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: Validate + DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;

        let valid = payload.validate().map_err(|violations| {
            AppError::validation(
                violations
                    .into_iter()
                    .map(FieldViolation::into_detail)
                    .collect(),
                "request body failed validation",
            )
        })?;

        Ok(Self(valid))
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(err) => AppError::validation(
            vec![FieldViolation::new("body", err.body_text()).into_detail()],
            "request body does not match the expected schema",
        ),
        JsonRejection::JsonSyntaxError(err) => AppError::validation(
            vec![FieldViolation::new("body", err.body_text()).into_detail()],
            "request body is not valid JSON",
        ),
        other => AppError::bad_request(other.body_text()),
    }
}

/// Integer id taken from the single path parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPath(pub i64);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        let id = raw.parse::<i64>().map_err(|_| {
            AppError::validation(
                vec![FieldViolation::new("id", "value is not a valid integer").into_detail()],
                "invalid path parameter",
            )
        })?;

        Ok(Self(id))
    }
}

/// Database session scoped to one request.
///
/// The pooled connection goes back to the pool when the extractor is
/// dropped, whichever way the handler exits.
pub struct DbSession(pub Session);

impl<S> FromRequestParts<S> for DbSession
where
    Database: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let db = Database::from_ref(state);
        let session = db
            .session()
            .await
            .context("failed to acquire database session")?;

        Ok(Self(session))
    }
}
