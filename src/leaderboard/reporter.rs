use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::client::LeaderboardClient;
use super::models::LeaderboardView;
use crate::effects::EffectDispatcher;
use crate::event::{GameEvent, RankingTarget};

/// Where the score submission control is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPhase {
    Ready,
    Submitting,
    Submitted,
    Failed,
}

/// What the submit button shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitStatus {
    pub phase: SubmitPhase,
    pub enabled: bool,
    pub error: Option<String>,
}

/// Single-flight guard for score submission
#[derive(Debug, Clone)]
pub struct SubmitControl {
    phase: SubmitPhase,
    error: Option<String>,
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmitControl {
    pub fn new() -> Self {
        Self {
            phase: SubmitPhase::Ready,
            error: None,
        }
    }

    /// Disables the control. Returns false when a submission is already in
    /// flight or has succeeded.
    pub fn begin(&mut self) -> bool {
        match self.phase {
            SubmitPhase::Ready | SubmitPhase::Failed => {
                self.phase = SubmitPhase::Submitting;
                self.error = None;
                true
            }
            SubmitPhase::Submitting | SubmitPhase::Submitted => false,
        }
    }

    pub fn succeed(&mut self) {
        self.phase = SubmitPhase::Submitted;
        self.error = None;
    }

    /// Re-enables the control with a visible message
    pub fn fail(&mut self, message: impl Into<String>) {
        self.phase = SubmitPhase::Failed;
        self.error = Some(message.into());
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn status(&self) -> SubmitStatus {
        SubmitStatus {
            phase: self.phase,
            enabled: matches!(self.phase, SubmitPhase::Ready | SubmitPhase::Failed),
            error: self.error.clone(),
        }
    }
}

/// Result of a save request from the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved { id: String },
    Failed { message: String },
    /// A submission is running or already succeeded
    Busy,
}

/// Connects a finished session to the leaderboard
///
/// Owns the session's submit control and publishes every change to it, plus
/// the ranking views it loads.
pub struct ScoreReporter {
    client: Arc<LeaderboardClient>,
    control: Mutex<SubmitControl>,
    output: EffectDispatcher,
    board_size: usize,
}

impl ScoreReporter {
    pub fn new(client: Arc<LeaderboardClient>, output: EffectDispatcher, board_size: usize) -> Self {
        Self {
            client,
            control: Mutex::new(SubmitControl::new()),
            output,
            board_size,
        }
    }

    pub async fn status(&self) -> SubmitStatus {
        self.control.lock().await.status()
    }

    /// Saves `score` under `name`; shows the refreshed ranking on success
    #[instrument(skip(self))]
    pub async fn submit(&self, name: &str, score: u32) -> SubmitOutcome {
        {
            let mut control = self.control.lock().await;
            if !control.begin() {
                info!(phase = ?control.phase(), "Score submission ignored");
                return SubmitOutcome::Busy;
            }
            self.output
                .publish(GameEvent::SubmitStatusChanged(control.status()));
        }

        let result = self.client.submit(name, score).await;

        let outcome = {
            let mut control = self.control.lock().await;
            let outcome = match result {
                Ok(id) => {
                    control.succeed();
                    SubmitOutcome::Saved { id }
                }
                Err(e) => {
                    warn!(error = %e, "Score could not be saved");
                    let message = e.user_message().to_string();
                    control.fail(message.clone());
                    SubmitOutcome::Failed { message }
                }
            };
            self.output
                .publish(GameEvent::SubmitStatusChanged(control.status()));
            outcome
        };

        if matches!(outcome, SubmitOutcome::Saved { .. }) {
            self.show_ranking(RankingTarget::AfterSubmit).await;
        }
        outcome
    }

    /// Publishes a loading placeholder, then the loaded ranking
    pub async fn show_ranking(&self, target: RankingTarget) -> LeaderboardView {
        self.output.publish(GameEvent::Leaderboard {
            target,
            view: LeaderboardView::Loading,
        });

        let view = self.client.fetch_top(self.board_size).await;
        self.output.publish(GameEvent::Leaderboard {
            target,
            view: view.clone(),
        });
        view
    }
}
