use async_trait::async_trait;
use thiserror::Error;

use super::events::GameEvent;

/// Errors that can occur when handling session events
#[derive(Debug, Error)]
pub enum SessionEventError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Trait for components that react to session events
///
/// This keeps rendering and transport concerns out of the game logic: the
/// controllers never know who is listening.
#[async_trait]
pub trait SessionEventHandler: Send + Sync {
    async fn handle_session_event(
        &self,
        session_id: &str,
        event: GameEvent,
    ) -> Result<(), SessionEventError>;

    /// Get a human-readable name for this handler (for logging/debugging)
    fn handler_name(&self) -> &'static str;
}
