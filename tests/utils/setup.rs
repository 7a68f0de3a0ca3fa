//! Builders for sessions wired to an event bus, the way the server wires them
#![allow(dead_code)] // Test utilities may not all be used in every test

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::broadcast;

use math_quest::{
    combat::CombatSession,
    event::{EventBus, GameEvent},
    leaderboard::{InMemoryScoreStore, ScoreStore},
    quiz::QuizSession,
    shared::{AppState, GameKind, Leaderboards},
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub state: AppState,
    /// Backing store unless another one was supplied
    pub memory_store: Arc<InMemoryScoreStore>,
    seed: u64,
}

pub struct TestSetupBuilder {
    store: Option<Arc<dyn ScoreStore>>,
    seed: u64,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            seed: 7,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ScoreStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> TestSetup {
        let memory_store = Arc::new(InMemoryScoreStore::new());
        let store: Arc<dyn ScoreStore> = match self.store {
            Some(store) => store,
            None => memory_store.clone(),
        };

        TestSetup {
            state: AppState::new(
                Leaderboards::new(store, "scores", "quiz_scores"),
                EventBus::new(),
                10,
            ),
            memory_store,
            seed: self.seed,
        }
    }
}

impl TestSetup {
    /// Creates a combat session plus a receiver subscribed before it speaks
    pub async fn combat_session(
        &self,
        session_id: &str,
    ) -> (Arc<CombatSession>, broadcast::Receiver<GameEvent>) {
        let receiver = self.state.event_bus.subscribe_to_session(session_id).await;
        let output = self
            .state
            .session_output(session_id, self.state.combat_config.message_cadence)
            .await;
        let session = Arc::new(CombatSession::new(
            session_id,
            self.state.combat_config.clone(),
            StdRng::seed_from_u64(self.seed),
            output.clone(),
            self.state.score_reporter(GameKind::Combat, output),
        ));
        session.begin().await;
        (session, receiver)
    }

    pub async fn quiz_session(
        &self,
        session_id: &str,
    ) -> (Arc<QuizSession>, broadcast::Receiver<GameEvent>) {
        let receiver = self.state.event_bus.subscribe_to_session(session_id).await;
        let output = self
            .state
            .session_output(session_id, self.state.quiz_config.message_cadence)
            .await;
        let session = Arc::new(QuizSession::new(
            session_id,
            self.state.quiz_config.clone(),
            StdRng::seed_from_u64(self.seed),
            output.clone(),
            self.state.score_reporter(GameKind::Quiz, output),
        ));
        session.begin().await;
        (session, receiver)
    }
}
