// Library crate for the Math Quest game server
// This file exposes the public API for integration tests

pub mod combat;
pub mod config;
pub mod effects;
pub mod event;
pub mod leaderboard;
pub mod messages;
pub mod problem;
pub mod quiz;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use combat::{CombatSession, RoundState};
pub use event::{EventBus, GameEvent, SessionSubscription};
pub use leaderboard::{LeaderboardClient, ScoreStore};
pub use quiz::{QuizSession, QuizState};
pub use shared::{AppError, AppState, GameKind, Leaderboards};
pub use websockets::{MessageHandler, MessageType, WebSocketMessage, WebSocketSessionSubscriber};
