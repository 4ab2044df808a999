//! Database connection and schema bootstrap.

use crate::error::{DbError, Result};
use crate::schema::CREATE_TABLES;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// SQLite connection pool.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open (creating if needed) the database at `url`.
    ///
    /// File databases run in WAL mode so readers do not block the order
    /// writer while it commits.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let db = Db::open("sqlite://pageturn.db", 5).await?;
    /// db.migrate().await?;
    /// ```
    pub async fn open(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DbError::Open(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| DbError::Open(e.to_string()))?;

        info!(url, max_connections, "database opened");
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// The pool holds a single connection that never expires, since the data
    /// lives only as long as that connection.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::Open(e.to_string()))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Open(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Create every table and index that does not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(CREATE_TABLES).execute(&self.pool).await?;
        info!("schema ready");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
