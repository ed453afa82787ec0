//! Idempotent migration runner.
//!
//! Applied migrations are recorded in `_migrations` keyed by module name and
//! migration id, so running the same set twice only applies what is new.

use sqlx::Connection;

use crate::{Database, DbError};

const BOOKKEEPING_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    )
"#;

/// Migration definition contributed by a module
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// Apply every migration not yet recorded, in the order given.
///
/// Each migration runs in its own transaction together with its bookkeeping
/// row. Returns how many migrations were applied.
pub async fn run(db: &Database, migrations: &[(String, Migration)]) -> Result<usize, DbError> {
    let mut conn = db.session().await?;

    sqlx::query(BOOKKEEPING_TABLE).execute(&mut *conn).await?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let recorded: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM _migrations WHERE module = ? AND id = ?")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(&mut *conn)
                .await?;

        if recorded.is_some() {
            tracing::debug!(
                target: "bookstore-db",
                module = %module,
                migration = migration.id,
                "migration already applied"
            );
            continue;
        }

        let mut tx = conn.begin().await?;

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .map_err(|source| DbError::Migration {
                module: module.clone(),
                id: migration.id,
                source,
            })?;

        sqlx::query("INSERT INTO _migrations (module, id) VALUES (?, ?)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            target: "bookstore-db",
            module = %module,
            migration = migration.id,
            "applied migration"
        );
        applied += 1;
    }

    Ok(applied)
}
