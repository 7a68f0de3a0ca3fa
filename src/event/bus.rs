use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::GameEvent;

/// Buffered events per session before slow receivers start lagging
const SESSION_CAPACITY: usize = 256;

/// Event bus for distributing events throughout the application
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    /// Session-specific event channels: session_id -> sender
    session_channels: Arc<RwLock<HashMap<String, broadcast::Sender<GameEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            session_channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Subscribe to events for a specific session
    pub async fn subscribe_to_session(&self, session_id: &str) -> broadcast::Receiver<GameEvent> {
        self.sender(session_id).await.subscribe()
    }

    /// Returns a handle that can publish to a session without awaiting
    pub async fn publisher(&self, session_id: &str) -> SessionPublisher {
        SessionPublisher {
            session_id: session_id.to_string(),
            sender: self.sender(session_id).await,
        }
    }

    /// Drops the channel of a finished session
    pub async fn remove_session(&self, session_id: &str) {
        let mut session_channels = self.session_channels.write().await;
        if session_channels.remove(session_id).is_some() {
            debug!(session_id = %session_id, "Session channel removed");
        }
    }

    async fn sender(&self, session_id: &str) -> broadcast::Sender<GameEvent> {
        let session_channels = self.session_channels.read().await;

        if let Some(sender) = session_channels.get(session_id) {
            sender.clone()
        } else {
            debug!(session_id = %session_id, "Creating new session channel");
            drop(session_channels);

            let mut session_channels = self.session_channels.write().await;
            session_channels
                .entry(session_id.to_string())
                .or_insert_with(|| broadcast::channel(SESSION_CAPACITY).0)
                .clone()
        }
    }
}

/// Fire-and-forget sender bound to one session's channel
#[derive(Debug, Clone)]
pub struct SessionPublisher {
    session_id: String,
    sender: broadcast::Sender<GameEvent>,
}

impl SessionPublisher {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Publishes an event; never blocks and never fails the caller
    pub fn publish(&self, event: GameEvent) {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(
                    session_id = %self.session_id,
                    event_type,
                    receivers = receiver_count,
                    "Session event emitted"
                );
            }
            Err(_) => {
                debug!(
                    session_id = %self.session_id,
                    event_type,
                    "Session event emitted with no receivers"
                );
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::SoundCue;

    #[tokio::test]
    async fn test_subscriber_receives_session_events() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe_to_session("session-1").await;

        bus.publisher("session-1")
            .await
            .publish(GameEvent::Sound(SoundCue::Attack));

        match receiver.recv().await.unwrap() {
            GameEvent::Sound(cue) => assert_eq!(cue, SoundCue::Attack),
            other => panic!("Unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let bus = EventBus::new();
        let mut other = bus.subscribe_to_session("session-2").await;

        let publisher = bus.publisher("session-1").await;
        publisher.publish(GameEvent::Sound(SoundCue::Wrong));

        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_without_receivers_does_not_fail() {
        let bus = EventBus::new();
        let publisher = bus.publisher("lonely").await;

        publisher.publish(GameEvent::Sound(SoundCue::Correct));

        bus.remove_session("lonely").await;
    }
}
