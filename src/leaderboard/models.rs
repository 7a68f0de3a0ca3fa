use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// Name recorded when the player leaves the name field blank
pub const DEFAULT_PLAYER_NAME: &str = "Anonymous";

/// Timestamp on a record being written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampValue {
    /// Replaced by the store's clock when the record is written
    ServerTimestamp,
    Fixed(DateTime<Utc>),
}

/// A score on its way into the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub score: u32,
    pub submitted_at: TimestampValue,
}

/// A score as held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub score: u32,
    pub submitted_at: DateTime<Utc>,
}

/// Field a store query orders by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum OrderField {
    Score,
    SubmittedAt,
}

/// One line of a rendered ranking, rank starting at 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub name: String,
    pub score: u32,
}

/// What a ranking list shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "entries", rename_all = "snake_case")]
pub enum LeaderboardView {
    Loading,
    Ranked(Vec<RankedEntry>),
    NoData,
    Unavailable,
}

impl LeaderboardView {
    /// Text shown in place of the list, if any
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            LeaderboardView::Loading => Some("Loading..."),
            LeaderboardView::Ranked(_) => None,
            LeaderboardView::NoData => Some("No ranking data yet"),
            LeaderboardView::Unavailable => Some("Could not load the ranking"),
        }
    }

    pub fn entries(&self) -> &[RankedEntry] {
        match self {
            LeaderboardView::Ranked(entries) => entries,
            _ => &[],
        }
    }
}

/// HTTP body for submitting a score
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitScoreRequest {
    #[serde(default)]
    pub name: String,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitScoreResponse {
    pub id: String,
}

/// HTTP response for a ranking request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub entries: Vec<RankedEntry>,
    pub placeholder: Option<String>,
}

impl From<LeaderboardView> for LeaderboardResponse {
    fn from(view: LeaderboardView) -> Self {
        Self {
            placeholder: view.placeholder().map(str::to_string),
            entries: match view {
                LeaderboardView::Ranked(entries) => entries,
                _ => Vec::new(),
            },
        }
    }
}
