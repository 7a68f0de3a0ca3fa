use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::models::{
    LeaderboardView, OrderField, RankedEntry, ScoreRecord, TimestampValue, DEFAULT_PLAYER_NAME,
};
use super::store::ScoreStore;
use super::LeaderboardError;

/// Submits scores to, and reads rankings from, a remote score store
///
/// Every remote failure stops here: `submit` reports it as a value and
/// `fetch_top` turns it into a placeholder view. Nothing is retried
/// automatically.
pub struct LeaderboardClient {
    store: Arc<dyn ScoreStore>,
    collection: String,
}

impl LeaderboardClient {
    pub fn new(store: Arc<dyn ScoreStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Appends a new score record. A blank name is replaced by the default.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn submit(&self, name: &str, score: u32) -> Result<String, LeaderboardError> {
        let name = match name.trim() {
            "" => DEFAULT_PLAYER_NAME,
            trimmed => trimmed,
        };

        let record = ScoreRecord {
            name: name.to_string(),
            score,
            submitted_at: TimestampValue::ServerTimestamp,
        };

        match self.store.insert(&self.collection, record).await {
            Ok(id) => {
                info!(id = %id, name = %name, score, "Score submitted");
                Ok(id)
            }
            Err(e) => {
                warn!(error = %e, name = %name, score, "Score submission failed");
                Err(LeaderboardError::RemoteWriteFailure(e))
            }
        }
    }

    /// Loads the best `n` scores, highest first
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn fetch_top(&self, n: usize) -> LeaderboardView {
        match self.try_fetch_top(n).await {
            Ok(entries) if entries.is_empty() => LeaderboardView::NoData,
            Ok(entries) => LeaderboardView::Ranked(entries),
            Err(e) => {
                warn!(error = %e, "Ranking fetch failed");
                LeaderboardView::Unavailable
            }
        }
    }

    async fn try_fetch_top(&self, n: usize) -> Result<Vec<RankedEntry>, LeaderboardError> {
        let mut entries = self
            .store
            .query(&self.collection, OrderField::Score, n)
            .await
            .map_err(LeaderboardError::RemoteReadFailure)?;

        // The store answers in ascending order
        entries.reverse();

        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| RankedEntry {
                rank: index + 1,
                name: entry.name,
                score: entry.score,
            })
            .collect())
    }
}
