use rand::rngs::StdRng;
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use super::controller::{AnswerOutcome, RoundController, RoundError, RoundState, Verdict};
use super::CombatSnapshot;
use crate::config::CombatConfig;
use crate::effects::{EffectDispatcher, SoundCue};
use crate::event::{EndReason, GameEvent, RankingTarget};
use crate::leaderboard::{LeaderboardView, ScoreReporter, SubmitOutcome};

/// Delays between the steps of a delayed transition
#[derive(Debug, Clone, Copy)]
struct Delays {
    victory: Duration,
    spawn: Duration,
    game_over: Duration,
}

/// One player's combat game
///
/// Serializes commands onto the round controller, dispatches the effects of
/// every transition, and runs the delayed steps after a monster or the hero
/// falls. The controller lock is never held across a timer.
pub struct CombatSession {
    session_id: String,
    controller: Arc<Mutex<RoundController>>,
    output: EffectDispatcher,
    reporter: ScoreReporter,
    delays: Delays,
    transition: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl CombatSession {
    pub fn new(
        session_id: impl Into<String>,
        config: CombatConfig,
        rng: StdRng,
        output: EffectDispatcher,
        reporter: ScoreReporter,
    ) -> Self {
        let delays = Delays {
            victory: config.victory_delay,
            spawn: config.spawn_delay,
            game_over: config.game_over_delay,
        };

        Self {
            session_id: session_id.into(),
            controller: Arc::new(Mutex::new(RoundController::new(config, rng))),
            output,
            reporter,
            delays,
            transition: std::sync::Mutex::new(None),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Publishes the opening narration and the first snapshot
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn begin(&self) {
        let mut controller = self.controller.lock().await;
        flush(&mut controller, &self.output);
        info!("Combat session started");
    }

    /// Opens a round with a fresh problem
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn attack(&self) -> Result<(), RoundError> {
        let mut controller = self.controller.lock().await;
        let result = controller.start_round(Instant::now()).map(|_| ());
        flush(&mut controller, &self.output);
        result
    }

    /// Submits an answer. Non-numeric input, or input while no problem is
    /// open, is ignored and returns `None`.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn answer(&self, raw: &str) -> Option<AnswerOutcome> {
        let mut controller = self.controller.lock().await;
        let outcome = controller.submit_answer(raw, Instant::now())?;
        flush(&mut controller, &self.output);

        match outcome.verdict {
            Verdict::Continue => {
                resolve(&mut controller, &self.output);
            }
            Verdict::MonsterDefeated => {
                drop(controller);
                self.schedule(victory_sequence(
                    Arc::clone(&self.controller),
                    self.output.clone(),
                    self.delays,
                ));
            }
            Verdict::HeroDefeated => {
                resolve(&mut controller, &self.output);
                drop(controller);
                self.schedule(game_over_sequence(self.output.clone(), self.delays));
            }
        }

        Some(outcome)
    }

    /// Saves the final score; only accepted once the game is cleared
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn save_score(&self, name: &str) -> Result<SubmitOutcome, RoundError> {
        let score = {
            let controller = self.controller.lock().await;
            if controller.state() != RoundState::GameClear {
                return Err(RoundError::NotAccepting(controller.state()));
            }
            controller.score()
        };

        Ok(self.reporter.submit(name, score).await)
    }

    /// Opens the standalone ranking
    pub async fn show_ranking(&self) -> LeaderboardView {
        self.output.play_sound(SoundCue::Attack);
        self.reporter.show_ranking(RankingTarget::Standalone).await
    }

    pub async fn snapshot(&self) -> CombatSnapshot {
        self.controller.lock().await.snapshot()
    }

    /// Waits for a running delayed transition to finish
    pub async fn settle(&self) {
        let handle = self
            .transition
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    fn schedule(&self, sequence: impl std::future::Future<Output = ()> + Send + 'static) {
        let handle = tokio::spawn(sequence);
        let previous = self
            .transition
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if previous.is_some_and(|previous| !previous.is_finished()) {
            debug!(session_id = %self.session_id, "Replaced a running transition");
        }
    }
}

impl Drop for CombatSession {
    fn drop(&mut self) {
        if let Some(handle) = self
            .transition
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

fn flush(controller: &mut RoundController, output: &EffectDispatcher) {
    let effects = controller.take_effects();
    output.dispatch(effects, GameEvent::CombatUpdated(controller.snapshot()));
}

fn resolve(controller: &mut RoundController, output: &EffectDispatcher) -> Option<RoundState> {
    let state = controller.resolve().ok();
    flush(controller, output);
    state
}

async fn victory_sequence(
    controller: Arc<Mutex<RoundController>>,
    output: EffectDispatcher,
    delays: Delays,
) {
    tokio::time::sleep(delays.victory).await;

    let state = resolve(&mut *controller.lock().await, &output);
    match state {
        Some(RoundState::LevelTransition) => {
            tokio::time::sleep(delays.spawn).await;
            let mut controller = controller.lock().await;
            if controller.spawn_monster().is_ok() {
                info!(level = controller.level(), "Next monster spawned");
            }
            flush(&mut controller, &output);
        }
        Some(RoundState::GameClear) => {
            output.publish(GameEvent::SessionEnded {
                reason: EndReason::FinalBossCleared,
                reload_required: false,
            });
        }
        _ => {}
    }
}

async fn game_over_sequence(output: EffectDispatcher, delays: Delays) {
    tokio::time::sleep(delays.game_over).await;
    output.publish(GameEvent::SessionEnded {
        reason: EndReason::HeroDefeated,
        reload_required: true,
    });
}
