// Remote leaderboard
//
// Scores are appended to a store collection and read back as a ranking.
// Store failures never reach the game controllers: writes become a visible
// message on the submit control, reads become a placeholder view.

pub use client::LeaderboardClient;
pub use errors::{LeaderboardError, StoreError};
pub use models::{
    LeaderboardEntry, LeaderboardResponse, LeaderboardView, OrderField, RankedEntry, ScoreRecord,
    SubmitScoreRequest, SubmitScoreResponse, TimestampValue, DEFAULT_PLAYER_NAME,
};
pub use reporter::{ScoreReporter, SubmitControl, SubmitOutcome, SubmitPhase, SubmitStatus};
pub use store::{InMemoryScoreStore, PostgresScoreStore, ScoreStore};

pub mod handlers;

mod client;
mod errors;
mod models;
mod reporter;
mod store;
