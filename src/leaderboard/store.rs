use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::{LeaderboardEntry, OrderField, ScoreRecord, TimestampValue};
use super::StoreError;

/// Remote score store
///
/// Append-only from the game's point of view: records are inserted and
/// queried, never updated or deleted.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Appends a record and returns its generated id. A
    /// `TimestampValue::ServerTimestamp` is replaced by the store's clock.
    async fn insert(&self, collection: &str, record: ScoreRecord) -> Result<String, StoreError>;

    /// Returns the `limit` records with the greatest `order_by` values, in
    /// ascending order. The limit applies after ordering the whole
    /// collection; equal values keep insertion order.
    async fn query(
        &self,
        collection: &str,
        order_by: OrderField,
        limit_to_last: usize,
    ) -> Result<Vec<LeaderboardEntry>, StoreError>;
}

/// In-memory implementation of ScoreStore for development and testing
///
/// Data is lost when the application restarts.
#[derive(Debug, Default)]
pub struct InMemoryScoreStore {
    collections: Arc<RwLock<HashMap<String, Vec<LeaderboardEntry>>>>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of records in a collection
    pub async fn record_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

fn resolve_timestamp(value: TimestampValue) -> DateTime<Utc> {
    match value {
        TimestampValue::ServerTimestamp => Utc::now(),
        TimestampValue::Fixed(at) => at,
    }
}

#[async_trait]
impl ScoreStore for InMemoryScoreStore {
    #[instrument(skip(self, record))]
    async fn insert(&self, collection: &str, record: ScoreRecord) -> Result<String, StoreError> {
        let entry = LeaderboardEntry {
            id: Uuid::new_v4().to_string(),
            name: record.name,
            score: record.score,
            submitted_at: resolve_timestamp(record.submitted_at),
        };
        let id = entry.id.clone();

        debug!(id = %id, name = %entry.name, score = entry.score, "Inserting score in memory");

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(entry);

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn query(
        &self,
        collection: &str,
        order_by: OrderField,
        limit_to_last: usize,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let collections = self.collections.read().await;
        let mut entries = collections.get(collection).cloned().unwrap_or_default();
        drop(collections);

        // Stable sort: ties stay in insertion order
        match order_by {
            OrderField::Score => entries.sort_by_key(|entry| entry.score),
            OrderField::SubmittedAt => entries.sort_by_key(|entry| entry.submitted_at),
        }

        let skip = entries.len().saturating_sub(limit_to_last);
        let entries: Vec<LeaderboardEntry> = entries.into_iter().skip(skip).collect();

        debug!(returned = entries.len(), "Queried scores from memory");
        Ok(entries)
    }
}

/// PostgreSQL implementation of ScoreStore
pub struct PostgresScoreStore {
    pool: PgPool,
}

impl PostgresScoreStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the backing table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS leaderboard_entries (
                seq BIGSERIAL PRIMARY KEY,
                id TEXT NOT NULL UNIQUE,
                collection TEXT NOT NULL,
                name TEXT NOT NULL,
                score BIGINT NOT NULL,
                submitted_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create leaderboard table");
            StoreError::Transport(e.to_string())
        })?;

        Ok(())
    }

    fn column(order_by: OrderField) -> &'static str {
        match order_by {
            OrderField::Score => "score",
            OrderField::SubmittedAt => "submitted_at",
        }
    }
}

#[async_trait]
impl ScoreStore for PostgresScoreStore {
    #[instrument(skip(self, record))]
    async fn insert(&self, collection: &str, record: ScoreRecord) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let fixed_at = match record.submitted_at {
            TimestampValue::ServerTimestamp => None,
            TimestampValue::Fixed(at) => Some(at),
        };

        debug!(id = %id, name = %record.name, score = record.score, "Inserting score in database");

        sqlx::query(
            "INSERT INTO leaderboard_entries (id, collection, name, score, submitted_at)
             VALUES ($1, $2, $3, $4, COALESCE($5::timestamptz, now()))",
        )
        .bind(&id)
        .bind(collection)
        .bind(&record.name)
        .bind(i64::from(record.score))
        .bind(fixed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert score in database");
            StoreError::Transport(e.to_string())
        })?;

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn query(
        &self,
        collection: &str,
        order_by: OrderField,
        limit_to_last: usize,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let column = Self::column(order_by);
        let sql = format!(
            "SELECT id, name, score, submitted_at FROM (
                SELECT seq, id, name, score, submitted_at FROM leaderboard_entries
                WHERE collection = $1
                ORDER BY {column} DESC, seq DESC
                LIMIT $2
             ) AS top
             ORDER BY {column} ASC, seq ASC"
        );
        let limit = i64::try_from(limit_to_last).unwrap_or(i64::MAX);

        let rows = sqlx::query(&sql)
            .bind(collection)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, collection = %collection, "Failed to query scores from database");
                StoreError::Transport(e.to_string())
            })?;

        rows.iter()
            .map(|row| {
                let score: i64 = row
                    .try_get("score")
                    .map_err(|e| StoreError::Malformed(e.to_string()))?;
                Ok(LeaderboardEntry {
                    id: row
                        .try_get("id")
                        .map_err(|e| StoreError::Malformed(e.to_string()))?,
                    name: row
                        .try_get("name")
                        .map_err(|e| StoreError::Malformed(e.to_string()))?,
                    score: u32::try_from(score)
                        .map_err(|_| StoreError::Malformed(format!("score out of range: {}", score)))?,
                    submitted_at: row
                        .try_get("submitted_at")
                        .map_err(|e| StoreError::Malformed(e.to_string()))?,
                })
            })
            .collect()
    }
}
