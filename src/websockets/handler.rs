use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::combat::CombatSession;
use crate::event::SessionSubscription;
use crate::leaderboard::SubmitOutcome;
use crate::quiz::QuizSession;
use crate::shared::{AppState, GameKind};

use super::messages::{AnswerPayload, MessageType, SaveScorePayload, WebSocketMessage};
use super::socket::{Connection, MessageHandler};
use super::websocket_session_subscriber::WebSocketSessionSubscriber;

/// Parses a client message, logging anything that is not one
fn parse(session_id: &str, message: &str) -> Option<WebSocketMessage> {
    match serde_json::from_str::<WebSocketMessage>(message) {
        Ok(ws_message) => Some(ws_message),
        Err(e) => {
            warn!(
                session_id = %session_id,
                error = %e,
                "Failed to parse WebSocket message"
            );
            None
        }
    }
}

fn answer_text(message: &WebSocketMessage) -> Option<String> {
    message
        .payload_as::<AnswerPayload>()
        .ok()
        .map(|payload| payload.raw())
}

fn player_name(message: &WebSocketMessage) -> String {
    message
        .payload_as::<SaveScorePayload>()
        .unwrap_or_default()
        .name
}

/// Replies with an ERROR message on the sender's own socket
fn reply_error(outbound: &mpsc::UnboundedSender<String>, text: impl Into<String>) {
    let Ok(message) = WebSocketMessage::error(text) else {
        return;
    };
    if let Ok(json) = serde_json::to_string(&message) {
        let _ = outbound.send(json);
    }
}

fn report_submit(outbound: &mpsc::UnboundedSender<String>, outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Saved { id } => debug!(id = %id, "Score saved from socket"),
        // The SUBMIT_STATUS message already carries the failure text
        SubmitOutcome::Failed { .. } => {}
        SubmitOutcome::Busy => reply_error(outbound, "A score was already submitted"),
    }
}

/// Message handler for a combat socket
pub struct CombatReceiveHandler {
    session: Arc<CombatSession>,
    outbound: mpsc::UnboundedSender<String>,
}

impl CombatReceiveHandler {
    pub fn new(session: Arc<CombatSession>, outbound: mpsc::UnboundedSender<String>) -> Self {
        Self { session, outbound }
    }
}

#[async_trait]
impl MessageHandler for CombatReceiveHandler {
    async fn handle_message(&self, session_id: &str, message: String) {
        let Some(ws_message) = parse(session_id, &message) else {
            return;
        };
        debug!(session_id = %session_id, message_type = ?ws_message.message_type, "Combat command");

        match ws_message.message_type {
            MessageType::Attack => {
                if let Err(e) = self.session.attack().await {
                    reply_error(&self.outbound, e.to_string());
                }
            }
            MessageType::Answer => {
                if let Some(raw) = answer_text(&ws_message) {
                    self.session.answer(&raw).await;
                }
            }
            // Store calls run beside the command stream so later input is not held up
            MessageType::SaveScore => {
                let session = Arc::clone(&self.session);
                let outbound = self.outbound.clone();
                let name = player_name(&ws_message);
                tokio::spawn(async move {
                    match session.save_score(&name).await {
                        Ok(outcome) => report_submit(&outbound, outcome),
                        Err(e) => reply_error(&outbound, e.to_string()),
                    }
                });
            }
            MessageType::ViewRanking => {
                let session = Arc::clone(&self.session);
                tokio::spawn(async move {
                    session.show_ranking().await;
                });
            }
            other => {
                debug!(message_type = ?other, "Unhandled combat message type");
            }
        }
    }
}

/// Message handler for a quiz socket
pub struct QuizReceiveHandler {
    session: Arc<QuizSession>,
    outbound: mpsc::UnboundedSender<String>,
}

impl QuizReceiveHandler {
    pub fn new(session: Arc<QuizSession>, outbound: mpsc::UnboundedSender<String>) -> Self {
        Self { session, outbound }
    }
}

#[async_trait]
impl MessageHandler for QuizReceiveHandler {
    async fn handle_message(&self, session_id: &str, message: String) {
        let Some(ws_message) = parse(session_id, &message) else {
            return;
        };
        debug!(session_id = %session_id, message_type = ?ws_message.message_type, "Quiz command");

        match ws_message.message_type {
            MessageType::Start => {
                if !self.session.start().await {
                    reply_error(&self.outbound, "The quiz is already running");
                }
            }
            MessageType::Answer => {
                if let Some(raw) = answer_text(&ws_message) {
                    self.session.answer(&raw).await;
                }
            }
            MessageType::SaveScore => {
                let session = Arc::clone(&self.session);
                let outbound = self.outbound.clone();
                let name = player_name(&ws_message);
                tokio::spawn(async move {
                    match session.save_score(&name).await {
                        Ok(outcome) => report_submit(&outbound, outcome),
                        Err(e) => reply_error(&outbound, e.to_string()),
                    }
                });
            }
            MessageType::ViewRanking => {
                let session = Arc::clone(&self.session);
                tokio::spawn(async move {
                    session.show_ranking().await;
                });
            }
            other => {
                debug!(message_type = ?other, "Unhandled quiz message type");
            }
        }
    }
}

/// WebSocket endpoint for the combat game
/// GET /ws/combat
pub async fn combat_websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> Response {
    info!("Combat WebSocket connection requested");
    ws.on_upgrade(move |socket| {
        handle_websocket_connection(Box::new(socket), GameKind::Combat, app_state)
    })
}

/// WebSocket endpoint for the speed quiz
/// GET /ws/quiz
pub async fn quiz_websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> Response {
    info!("Quiz WebSocket connection requested");
    ws.on_upgrade(move |socket| {
        handle_websocket_connection(Box::new(socket), GameKind::Quiz, app_state)
    })
}

/// Runs one game session for the lifetime of an upgraded socket
pub async fn handle_websocket_connection(
    socket: Box<dyn super::socket::SocketWrapper>,
    kind: GameKind,
    app_state: AppState,
) {
    let session_id = Uuid::new_v4().to_string();
    info!(session_id = %session_id, kind = ?kind, "WebSocket connection established");

    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    // Subscribe before the session publishes its opening events
    let subscription = SessionSubscription::new(
        session_id.clone(),
        Arc::new(WebSocketSessionSubscriber::new(outbound_sender.clone())),
        app_state.event_bus.clone(),
    )
    .start()
    .await;

    let message_handler: Arc<dyn MessageHandler> = match kind {
        GameKind::Combat => {
            let output = app_state
                .session_output(&session_id, app_state.combat_config.message_cadence)
                .await;
            let session = Arc::new(CombatSession::new(
                session_id.clone(),
                app_state.combat_config.clone(),
                StdRng::from_os_rng(),
                output.clone(),
                app_state.score_reporter(kind, output),
            ));
            session.begin().await;
            Arc::new(CombatReceiveHandler::new(session, outbound_sender))
        }
        GameKind::Quiz => {
            let output = app_state
                .session_output(&session_id, app_state.quiz_config.message_cadence)
                .await;
            let session = Arc::new(QuizSession::new(
                session_id.clone(),
                app_state.quiz_config.clone(),
                StdRng::from_os_rng(),
                output.clone(),
                app_state.score_reporter(kind, output),
            ));
            session.begin().await;
            Arc::new(QuizReceiveHandler::new(session, outbound_sender))
        }
    };

    let connection = Connection::new(
        session_id.clone(),
        socket,
        outbound_receiver,
        message_handler,
    );

    // Run the connection until disconnect
    match connection.run().await {
        Ok(()) => {
            info!(session_id = %session_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(session_id = %session_id, error = %e, "WebSocket connection error");
        }
    }

    // The session and its timers are dropped with the connection
    subscription.abort();
    app_state.event_bus.remove_session(&session_id).await;
    info!(session_id = %session_id, "Session closed");
}
