//! Lookup history persistence.
//!
//! Provides a [`LookupStore`] trait with two implementations:
//! - [`SqliteLookupStore`] - SQLite-backed append-only log
//! - [`NullLookupStore`] - used when no database is configured or reachable
//!
//! History is a best-effort side log. Nothing here is allowed to fail a lookup.

use crate::{LookupSummary, LookupType};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{SqlitePool, SqlitePoolOptions},
    Row,
};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid timestamp in history: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("Store operation timed out")]
    Timeout,
}

impl From<tokio::time::error::Elapsed> for StoreError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        StoreError::Timeout
    }
}

/// One persisted lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRecord {
    pub domain: String,
    #[serde(rename = "type")]
    pub lookup_type: LookupType,
    pub result: LookupSummary,
    pub created_at: DateTime<Utc>,
}

impl LookupRecord {
    pub fn new(domain: impl Into<String>, lookup_type: LookupType, result: LookupSummary) -> Self {
        Self {
            domain: domain.into(),
            lookup_type,
            result,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait LookupStore: Send + Sync {
    /// Fixed at construction; callers skip the store entirely when false.
    fn is_connected(&self) -> bool;

    async fn insert(&self, record: &LookupRecord) -> Result<(), StoreError>;

    /// Most recent records first.
    async fn recent(&self, limit: i64) -> Result<Vec<LookupRecord>, StoreError>;
}

/// Store that keeps nothing.
pub struct NullLookupStore;

impl NullLookupStore {
    pub fn new() -> Self {
        debug!("Using NullLookupStore (history disabled)");
        Self
    }
}

impl Default for NullLookupStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LookupStore for NullLookupStore {
    fn is_connected(&self) -> bool {
        false
    }

    async fn insert(&self, _record: &LookupRecord) -> Result<(), StoreError> {
        Ok(())
    }

    async fn recent(&self, _limit: i64) -> Result<Vec<LookupRecord>, StoreError> {
        Ok(Vec::new())
    }
}

pub struct SqliteLookupStore {
    pool: SqlitePool,
}

impl SqliteLookupStore {
    pub async fn connect(
        database_url: &str,
        connect_timeout: Duration,
    ) -> Result<Self, StoreError> {
        // Every connection to `:memory:` is a separate database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(connect_timeout)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS lookups (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                domain TEXT NOT NULL,
                lookup_type TEXT NOT NULL,
                result TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_lookups_created_at ON lookups (created_at);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl LookupStore for SqliteLookupStore {
    fn is_connected(&self) -> bool {
        true
    }

    async fn insert(&self, record: &LookupRecord) -> Result<(), StoreError> {
        let result = serde_json::to_string(&record.result)?;
        // Fixed-width UTC timestamps sort lexicographically
        let created_at = record.created_at.to_rfc3339_opts(SecondsFormat::Micros, true);

        sqlx::query(
            "INSERT INTO lookups (domain, lookup_type, result, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(record.domain.as_str())
        .bind(record.lookup_type.as_str())
        .bind(result)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<LookupRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT domain, lookup_type, result, created_at
            FROM lookups
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<LookupRecord, StoreError> {
                let lookup_type: String = row.try_get("lookup_type")?;
                let result: String = row.try_get("result")?;
                let created_at: String = row.try_get("created_at")?;

                Ok(LookupRecord {
                    domain: row.try_get("domain")?,
                    lookup_type: LookupType::from_param(&lookup_type),
                    result: serde_json::from_str(&result)?,
                    created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
                })
            })
            .collect()
    }
}

/// Open the configured store, degrading to [`NullLookupStore`] on any failure.
pub async fn connect(
    database_url: Option<&str>,
    connect_timeout: Duration,
) -> Arc<dyn LookupStore> {
    let Some(url) = database_url else {
        info!("DATABASE_URL not set, lookup history disabled");
        return Arc::new(NullLookupStore::new());
    };

    // Bound the whole handshake, not just pool acquisition
    let attempt = tokio::time::timeout(
        connect_timeout + Duration::from_secs(1),
        SqliteLookupStore::connect(url, connect_timeout),
    )
    .await
    .map_err(StoreError::from)
    .and_then(|r| r);

    match attempt {
        Ok(store) => {
            info!("Lookup history store connected");
            Arc::new(store)
        }
        Err(e) => {
            warn!("Lookup history store not available or misconfigured: {}", e);
            Arc::new(NullLookupStore::new())
        }
    }
}
