use rand::rngs::StdRng;
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, instrument};

use super::controller::{QuizController, QuizError, QuizOutcome, QuizSnapshot, QuizState};
use crate::config::QuizConfig;
use crate::effects::{EffectDispatcher, SoundCue};
use crate::event::{EndReason, GameEvent, RankingTarget};
use crate::leaderboard::{LeaderboardView, ScoreReporter, SubmitOutcome};

/// One player's speed quiz
///
/// The countdown runs in its own task, independent of answers, and is
/// aborted when the session is dropped.
pub struct QuizSession {
    session_id: String,
    controller: Arc<Mutex<QuizController>>,
    output: EffectDispatcher,
    reporter: ScoreReporter,
    tick: Duration,
    countdown: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl QuizSession {
    pub fn new(
        session_id: impl Into<String>,
        config: QuizConfig,
        rng: StdRng,
        output: EffectDispatcher,
        reporter: ScoreReporter,
    ) -> Self {
        let tick = config.tick;
        Self {
            session_id: session_id.into(),
            controller: Arc::new(Mutex::new(QuizController::new(config, rng))),
            output,
            reporter,
            tick,
            countdown: std::sync::Mutex::new(None),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Publishes the initial snapshot
    pub async fn begin(&self) {
        let controller = self.controller.lock().await;
        self.output.publish(GameEvent::QuizUpdated(controller.snapshot()));
    }

    /// Starts a fresh quiz and its countdown. Ignored while one is running.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn start(&self) -> bool {
        let mut controller = self.controller.lock().await;
        if !controller.start() {
            return false;
        }
        flush(&mut controller, &self.output);
        drop(controller);

        let handle = tokio::spawn(countdown(
            Arc::clone(&self.controller),
            self.output.clone(),
            self.tick,
        ));
        if let Some(previous) = self
            .countdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle)
        {
            previous.abort();
        }

        info!("Quiz countdown started");
        true
    }

    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn answer(&self, raw: &str) -> Option<QuizOutcome> {
        let mut controller = self.controller.lock().await;
        let outcome = controller.submit_answer(raw)?;
        flush(&mut controller, &self.output);
        Some(outcome)
    }

    /// Saves the final score; only accepted after time is up
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn save_score(&self, name: &str) -> Result<SubmitOutcome, QuizError> {
        let score = {
            let controller = self.controller.lock().await;
            if controller.state() != QuizState::Finished {
                return Err(QuizError::NotAccepting(controller.state()));
            }
            controller.score()
        };

        Ok(self.reporter.submit(name, score).await)
    }

    pub async fn show_ranking(&self) -> LeaderboardView {
        self.output.play_sound(SoundCue::Attack);
        self.reporter.show_ranking(RankingTarget::Standalone).await
    }

    pub async fn snapshot(&self) -> QuizSnapshot {
        self.controller.lock().await.snapshot()
    }

    /// Waits until the running countdown has ended the quiz
    pub async fn settle(&self) {
        let handle = self
            .countdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

impl Drop for QuizSession {
    fn drop(&mut self) {
        if let Some(handle) = self
            .countdown
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

fn flush(controller: &mut QuizController, output: &EffectDispatcher) {
    let effects = controller.take_effects();
    output.dispatch(effects, GameEvent::QuizUpdated(controller.snapshot()));
}

async fn countdown(controller: Arc<Mutex<QuizController>>, output: EffectDispatcher, tick: Duration) {
    let mut interval = interval_at(Instant::now() + tick, tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let mut controller = controller.lock().await;
        if controller.state() != QuizState::Running {
            break;
        }
        let ended = controller.tick();
        flush(&mut controller, &output);

        if ended {
            output.publish(GameEvent::SessionEnded {
                reason: EndReason::TimeUp,
                reload_required: false,
            });
            break;
        }
    }
}
