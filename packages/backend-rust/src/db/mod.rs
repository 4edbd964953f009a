pub mod operations;
pub mod schema;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::schema::{split_sql_statements, ADDED_COLUMNS, SCHEMA_SQL, SCHEMA_VERSION};

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error("invalid database url: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the SQLite database at `url` and apply the schema.
    pub async fn connect(url: &str) -> Result<Self, DbInitError> {
        if url.contains(":memory:") {
            return Self::connect_in_memory().await;
        }

        ensure_parent_dir(url)?;

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DbInitError::Config(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Private in-memory database.
    ///
    /// Held on a single never-recycled connection: every new SQLite memory
    /// connection would otherwise start from an empty database.
    pub async fn connect_in_memory() -> Result<Self, DbInitError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbInitError::Config(e.to_string()))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub async fn schema_version(&self) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(r#"SELECT "value" FROM "_db_metadata" WHERE "key" = 'schema_version'"#)
            .fetch_optional(&self.pool)
            .await
    }

    async fn migrate(&self) -> Result<(), DbInitError> {
        // `_db_metadata` may not exist yet on a fresh file.
        if let Ok(Some(version)) = self.schema_version().await {
            if version == SCHEMA_VERSION {
                return Ok(());
            }
        }

        for statement in split_sql_statements(SCHEMA_SQL) {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        self.add_missing_columns().await?;

        sqlx::query(
            r#"INSERT OR REPLACE INTO "_db_metadata" ("key", "value") VALUES ('schema_version', ?)"#,
        )
        .bind(SCHEMA_VERSION)
        .execute(&self.pool)
        .await?;

        tracing::info!(version = SCHEMA_VERSION, "database schema applied");
        Ok(())
    }

    async fn add_missing_columns(&self) -> Result<(), sqlx::Error> {
        for (table, column, column_type) in ADDED_COLUMNS {
            let existing: Vec<String> =
                sqlx::query_scalar(&format!(r#"SELECT "name" FROM pragma_table_info('{table}')"#))
                    .fetch_all(&self.pool)
                    .await?;
            if existing.iter().any(|name| name == column) {
                continue;
            }
            sqlx::query(&format!(r#"ALTER TABLE "{table}" ADD COLUMN "{column}" {column_type}"#))
                .execute(&self.pool)
                .await?;
            tracing::info!(table, column, "column added to existing table");
        }
        Ok(())
    }
}

fn ensure_parent_dir(url: &str) -> Result<(), DbInitError> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Ok(());
    }

    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| DbInitError::Io(e.to_string()))?;
        }
    }
    Ok(())
}

pub(crate) fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
