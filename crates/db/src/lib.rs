//! SQLite connection pool and migration tooling for the bookstore service.
//!
//! A single [`Database`] is created at startup and cloned into every
//! component that needs storage. Request handlers never hold the pool
//! directly; they take a [`Session`] which hands its connection back to the
//! pool when dropped.

use std::str::FromStr;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{
    Sqlite, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
};

pub mod migrate;

pub use migrate::Migration;

/// One pooled connection scoped to a single unit of work.
pub type Session = PoolConnection<Sqlite>;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration '{module}/{id}' failed: {source}")]
    Migration {
        module: String,
        id: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

/// Process-wide handle to the SQLite pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database at `url`.
    ///
    /// In-memory urls are pinned to one connection that never expires,
    /// otherwise every new connection would see an empty database.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, DbError> {
        let in_memory = is_in_memory(url);

        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await?;

        tracing::info!(
            target: "bookstore-db",
            url,
            in_memory,
            "database pool ready"
        );

        Ok(Self { pool })
    }

    /// Acquire a session for one request.
    pub async fn session(&self) -> Result<Session, DbError> {
        Ok(self.pool.acquire().await?)
    }

    /// Check that the database answers queries.
    pub async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection, waiting for checked-out sessions.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!(target: "bookstore-db", "database pool closed");
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
