//! Schema setup and versioned migrations
//!
//! SQLite in WAL mode. Migrations are numbered SQL files applied in
//! order, with the applied version tracked in its own table.

use crate::error::Result;
use sqlx::{sqlite::SqlitePool, Row};

/// Bring the schema up to the latest version.
pub async fn initialize_database(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Preparing database schema");

    // WAL keeps readers unblocked while a section is being rewritten
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(pool)
        .await?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    // Version bookkeeping
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Highest applied version, 0 on a fresh database
    let current_version: i32 = sqlx::query("SELECT COALESCE(MAX(version), 0) FROM migrations")
        .fetch_one(pool)
        .await?
        .get(0);

    tracing::info!("Database schema at version {}", current_version);

    apply_migrations(pool, current_version).await?;

    tracing::info!("Database schema ready");
    Ok(())
}

async fn apply_migrations(pool: &SqlitePool, current_version: i32) -> Result<()> {
    let migrations = get_migrations();

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Applying schema migration {}", version);

            // One transaction per migration
            let mut tx = pool.begin().await?;

            for statement in sql.split(";").filter(|s| !s.trim().is_empty()) {
                sqlx::query(statement).execute(&mut *tx).await?;
            }

            // Mark applied
            sqlx::query("INSERT INTO migrations (version) VALUES (?)")
                .bind(version)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;

            tracing::info!("Schema migration {} applied", version);
        }
    }

    Ok(())
}

fn get_migrations() -> Vec<(i32, &'static str)> {
    vec![(1, include_str!("migrations/001_initial_schema.sql"))]
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_initialize_database() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        // All migrations applied
        let applied: i32 = sqlx::query_scalar("SELECT COUNT(*) FROM migrations")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(applied, get_migrations().len() as i32);

        // State table is usable
        sqlx::query("INSERT INTO app_state (key, value) VALUES ('medications', '[]')")
            .execute(&pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_initialize_database_is_idempotent() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();
        initialize_database(&pool).await.unwrap();

        let version: i32 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM migrations")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(version, 1);
    }
}
