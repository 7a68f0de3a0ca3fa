use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::event::{GameEvent, SessionEventError, SessionEventHandler};

use super::presenter::present;

/// WebSocket-specific session event handler
///
/// Renders each event into client messages and queues them on the
/// connection's outbound channel.
pub struct WebSocketSessionSubscriber {
    outbound: mpsc::UnboundedSender<String>,
}

impl WebSocketSessionSubscriber {
    pub fn new(outbound: mpsc::UnboundedSender<String>) -> Self {
        Self { outbound }
    }
}

#[async_trait]
impl SessionEventHandler for WebSocketSessionSubscriber {
    async fn handle_session_event(
        &self,
        session_id: &str,
        event: GameEvent,
    ) -> Result<(), SessionEventError> {
        let messages =
            present(&event).map_err(|e| SessionEventError::Serialization(e.to_string()))?;

        debug!(
            session_id = %session_id,
            event_type = event.event_type(),
            messages = messages.len(),
            "Forwarding session event to socket"
        );

        for message in messages {
            let json = serde_json::to_string(&message)
                .map_err(|e| SessionEventError::Serialization(e.to_string()))?;
            self.outbound
                .send(json)
                .map_err(|e| SessionEventError::ConnectionError(e.to_string()))?;
        }
        Ok(())
    }

    fn handler_name(&self) -> &'static str {
        "WebSocketSessionSubscriber"
    }
}
