use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{CombatConfig, QuizConfig};
use crate::effects::{EffectDispatcher, PublishingEffects};
use crate::event::EventBus;
use crate::leaderboard::{LeaderboardClient, LeaderboardError, ScoreReporter, ScoreStore};
use crate::messages::{MessageQueue, PublishingLog};

/// Which game a socket or ranking belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    #[default]
    Combat,
    Quiz,
}

/// One high-score board per game, each on its own store collection
#[derive(Clone)]
pub struct Leaderboards {
    combat: Arc<LeaderboardClient>,
    quiz: Arc<LeaderboardClient>,
}

impl Leaderboards {
    pub fn new(
        store: Arc<dyn ScoreStore>,
        combat_collection: impl Into<String>,
        quiz_collection: impl Into<String>,
    ) -> Self {
        Self {
            combat: Arc::new(LeaderboardClient::new(Arc::clone(&store), combat_collection)),
            quiz: Arc::new(LeaderboardClient::new(store, quiz_collection)),
        }
    }

    pub fn for_game(&self, kind: GameKind) -> &Arc<LeaderboardClient> {
        match kind {
            GameKind::Combat => &self.combat,
            GameKind::Quiz => &self.quiz,
        }
    }
}

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub leaderboards: Leaderboards,
    pub event_bus: EventBus,
    pub combat_config: CombatConfig,
    pub quiz_config: QuizConfig,
    /// Number of entries a ranking shows
    pub leaderboard_size: usize,
}

impl AppState {
    pub fn new(
        leaderboards: Leaderboards,
        event_bus: EventBus,
        leaderboard_size: usize,
    ) -> Self {
        Self {
            leaderboards,
            event_bus,
            combat_config: CombatConfig::default(),
            quiz_config: QuizConfig::default(),
            leaderboard_size,
        }
    }

    /// Wires a session's effects, narration and snapshots to its event channel
    pub async fn session_output(&self, session_id: &str, cadence: Duration) -> EffectDispatcher {
        let publisher = self.event_bus.publisher(session_id).await;
        let messages = MessageQueue::new(Arc::new(PublishingLog::new(publisher.clone())), cadence);
        EffectDispatcher::new(
            Arc::new(PublishingEffects::new(publisher.clone())),
            messages,
            publisher,
        )
    }

    pub fn score_reporter(&self, kind: GameKind, output: EffectDispatcher) -> ScoreReporter {
        ScoreReporter::new(
            Arc::clone(self.leaderboards.for_game(kind)),
            output,
            self.leaderboard_size,
        )
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Leaderboard(e) => (StatusCode::BAD_GATEWAY, e.user_message().to_string()),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
