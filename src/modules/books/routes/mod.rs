//! HTTP handlers for the Books module.

use axum::{routing::get, Json, Router};
use bookstore_db::Database;
use bookstore_http::error::AppError;
use bookstore_http::extract::{DbSession, IdPath, Valid};

use super::models::{Book, BookPayload, MessageResponse};
use super::repo::BookRepo;

const NOT_FOUND_MESSAGE: &str = "Book not found";

/// Book routes with the database attached as state
pub fn router(db: Database) -> Router {
    Router::new()
        .route(
            "/books",
            get(list_books).post(create_book).delete(delete_all_books),
        )
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(db)
}

fn not_found() -> AppError {
    AppError::not_found(NOT_FOUND_MESSAGE)
}

async fn list_books(DbSession(mut session): DbSession) -> Result<Json<Vec<Book>>, AppError> {
    let books = BookRepo::new(&mut session).list().await?;
    Ok(Json(books))
}

async fn get_book(
    IdPath(id): IdPath,
    DbSession(mut session): DbSession,
) -> Result<Json<Book>, AppError> {
    let book = BookRepo::new(&mut session)
        .get(id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(book))
}

async fn create_book(
    DbSession(mut session): DbSession,
    Valid(book): Valid<BookPayload>,
) -> Result<Json<Book>, AppError> {
    let created = BookRepo::new(&mut session).create(&book).await?;
    tracing::info!(book_id = created.id, "book created");
    Ok(Json(created))
}

async fn update_book(
    IdPath(id): IdPath,
    DbSession(mut session): DbSession,
    Valid(book): Valid<BookPayload>,
) -> Result<Json<Book>, AppError> {
    let updated = BookRepo::new(&mut session)
        .update(id, &book)
        .await?
        .ok_or_else(not_found)?;
    tracing::info!(book_id = id, "book updated");
    Ok(Json(updated))
}

async fn delete_book(
    IdPath(id): IdPath,
    DbSession(mut session): DbSession,
) -> Result<Json<Book>, AppError> {
    let deleted = BookRepo::new(&mut session)
        .delete(id)
        .await?
        .ok_or_else(not_found)?;
    tracing::info!(book_id = id, "book deleted");
    Ok(Json(deleted))
}

async fn delete_all_books(
    DbSession(mut session): DbSession,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = BookRepo::new(&mut session).delete_all().await?;
    tracing::info!(deleted, "all books deleted");
    Ok(Json(MessageResponse {
        message: "All books deleted".to_string(),
    }))
}
