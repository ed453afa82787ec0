//! Book repository over a single SQLite connection.
//!
//! Every method issues one statement, so each write commits on its own.
//! Creates and updates re-read the row so callers see what was stored.

use bookstore_db::DbError;
use sqlx::SqliteConnection;

use super::models::{Book, NewBook};

const SELECT_BOOKS: &str = "SELECT id, title, author, description, rating FROM books";

/// Book repository
pub struct BookRepo<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> BookRepo<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// All books, oldest first.
    pub async fn list(&mut self) -> Result<Vec<Book>, DbError> {
        let books = sqlx::query_as::<_, Book>(&format!("{SELECT_BOOKS} ORDER BY id"))
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(books)
    }

    pub async fn get(&mut self, id: i64) -> Result<Option<Book>, DbError> {
        let book = sqlx::query_as::<_, Book>(&format!("{SELECT_BOOKS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(book)
    }

    /// Insert a book and return the stored row with its assigned id.
    pub async fn create(&mut self, book: &NewBook) -> Result<Book, DbError> {
        let id = sqlx::query(
            "INSERT INTO books (title, author, description, rating) VALUES (?, ?, ?, ?)",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(book.rating)
        .execute(&mut *self.conn)
        .await?
        .last_insert_rowid();

        self.get(id)
            .await?
            .ok_or(DbError::Sqlx(sqlx::Error::RowNotFound))
    }

    /// Overwrite all four fields of an existing book.
    ///
    /// Returns `None` when no book has this id.
    pub async fn update(&mut self, id: i64, book: &NewBook) -> Result<Option<Book>, DbError> {
        let updated = sqlx::query(
            "UPDATE books SET title = ?, author = ?, description = ?, rating = ? WHERE id = ?",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(book.rating)
        .bind(id)
        .execute(&mut *self.conn)
        .await?
        .rows_affected();

        if updated == 0 {
            return Ok(None);
        }

        self.get(id).await
    }

    /// Remove a book, returning the row as it was just before deletion.
    pub async fn delete(&mut self, id: i64) -> Result<Option<Book>, DbError> {
        let book = sqlx::query_as::<_, Book>(
            "DELETE FROM books WHERE id = ? RETURNING id, title, author, description, rating",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(book)
    }

    /// Remove every book, returning how many were deleted.
    pub async fn delete_all(&mut self) -> Result<u64, DbError> {
        let deleted = sqlx::query("DELETE FROM books")
            .execute(&mut *self.conn)
            .await?
            .rows_affected();
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::BooksModule;
    use bookstore_db::{migrate, Database};
    use bookstore_kernel::Module;

    async fn database() -> Database {
        let db = Database::connect("sqlite::memory:", 1).await.unwrap();
        let migrations: Vec<_> = BooksModule::new()
            .migrations()
            .into_iter()
            .map(|migration| ("books".to_string(), migration))
            .collect();
        migrate::run(&db, &migrations).await.unwrap();
        db
    }

    fn new_book(title: &str, rating: i64) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "Iain M. Banks".to_string(),
            description: "A Culture novel".to_string(),
            rating,
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_stored_row() {
        let db = database().await;
        let mut session = db.session().await.unwrap();
        let mut repo = BookRepo::new(&mut session);

        let created = repo.create(&new_book("Excession", 5)).await.unwrap();
        assert_eq!(created, new_book("Excession", 5).into_book(created.id));
        assert_eq!(repo.get(created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn update_replaces_all_fields() {
        let db = database().await;
        let mut session = db.session().await.unwrap();
        let mut repo = BookRepo::new(&mut session);

        let created = repo.create(&new_book("Look to Windward", 4)).await.unwrap();
        let replacement = NewBook {
            title: "Surface Detail".to_string(),
            author: "Banks".to_string(),
            description: "Virtual hells".to_string(),
            rating: 2,
        };

        let updated = repo.update(created.id, &replacement).await.unwrap().unwrap();
        assert_eq!(updated, replacement.into_book(created.id));
    }

    #[tokio::test]
    async fn missing_ids_yield_none() {
        let db = database().await;
        let mut session = db.session().await.unwrap();
        let mut repo = BookRepo::new(&mut session);

        assert_eq!(repo.get(999).await.unwrap(), None);
        assert_eq!(repo.update(999, &new_book("Matter", 3)).await.unwrap(), None);
        assert_eq!(repo.delete(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_returns_prior_row() {
        let db = database().await;
        let mut session = db.session().await.unwrap();
        let mut repo = BookRepo::new(&mut session);

        let created = repo.create(&new_book("Inversions", 3)).await.unwrap();
        let deleted = repo.delete(created.id).await.unwrap();

        assert_eq!(deleted, Some(created.clone()));
        assert_eq!(repo.get(created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_deletion() {
        let db = database().await;
        let mut session = db.session().await.unwrap();
        let mut repo = BookRepo::new(&mut session);

        let first = repo.create(&new_book("Use of Weapons", 5)).await.unwrap();
        repo.delete(first.id).await.unwrap();
        let second = repo.create(&new_book("Feersum Endjinn", 4)).await.unwrap();
        assert!(second.id > first.id);

        repo.delete_all().await.unwrap();
        let third = repo.create(&new_book("The Algebraist", 3)).await.unwrap();
        assert!(third.id > second.id);
    }

    #[tokio::test]
    async fn delete_all_empties_table() {
        let db = database().await;
        let mut session = db.session().await.unwrap();
        let mut repo = BookRepo::new(&mut session);

        repo.create(&new_book("Consider Phlebas", 4)).await.unwrap();
        repo.create(&new_book("The Player of Games", 5)).await.unwrap();

        assert_eq!(repo.delete_all().await.unwrap(), 2);
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn table_constraints_reject_invalid_rows() {
        let db = database().await;
        let mut session = db.session().await.unwrap();
        let mut repo = BookRepo::new(&mut session);

        assert!(repo.create(&new_book("", 3)).await.is_err());
        assert!(repo.create(&new_book("State of the Art", 6)).await.is_err());
    }
}
