use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{bus::EventBus, session_handler::SessionEventHandler};

/// Routes one session's events to a handler
pub struct SessionSubscription {
    session_id: String,
    handler: Arc<dyn SessionEventHandler>,
    event_bus: EventBus,
}

impl SessionSubscription {
    pub fn new(
        session_id: String,
        handler: Arc<dyn SessionEventHandler>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            session_id,
            handler,
            event_bus,
        }
    }

    /// Start the subscription - spawns a background task that listens to session
    /// events and routes them to the handler until the channel closes
    pub async fn start(self) -> JoinHandle<()> {
        let session_id = self.session_id.clone();
        let handler_name = self.handler.handler_name();

        info!(
            session_id = %session_id,
            handler = handler_name,
            "Starting session subscription"
        );

        let mut receiver = self.event_bus.subscribe_to_session(&session_id).await;

        tokio::spawn(async move {
            loop {
                let event = match receiver.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            session_id = %session_id,
                            handler = handler_name,
                            skipped,
                            "Session subscriber lagged, events dropped"
                        );
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                debug!(
                    session_id = %session_id,
                    handler = handler_name,
                    event_type = event.event_type(),
                    "Received session event"
                );

                if let Err(e) = self.handler.handle_session_event(&session_id, event).await {
                    warn!(
                        session_id = %session_id,
                        handler = handler_name,
                        error = %e,
                        "Session event handler failed"
                    );
                }
            }

            info!(
                session_id = %session_id,
                handler = handler_name,
                "Session subscription ended - no more events"
            );
        })
    }
}
