use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// A frame read from the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Text frame holding one JSON command
    Command(String),
    /// Ping, pong or binary frame; never dispatched
    Control,
}

/// The two directions of a client socket
#[async_trait]
pub trait SocketWrapper: Send {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError>;

    /// Next frame from the client, `None` once it has gone away
    async fn receive_frame(&mut self) -> Result<Option<Inbound>, SocketError>;

    async fn close(&mut self) -> Result<(), SocketError>;
}

/// Reacts to one client command at a time
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle_message(&self, session_id: &str, message: String);
}

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("Send failed: {0}")]
    SendFailed(String),
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),
}

#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.send(Message::Text(message))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_frame(&mut self) -> Result<Option<Inbound>, SocketError> {
        match self.next().await {
            Some(Ok(Message::Text(text))) => Ok(Some(Inbound::Command(text))),
            Some(Ok(Message::Close(_))) | None => Ok(None),
            Some(Ok(_)) => Ok(Some(Inbound::Control)),
            Some(Err(e)) => Err(SocketError::ReceiveFailed(e.to_string())),
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// One client's socket bound to one game session
///
/// Commands are queued to a dispatch task in arrival order, so the socket
/// keeps delivering session updates while a handler is still busy.
pub struct Connection {
    pub session_id: String,
    socket: Box<dyn SocketWrapper>,
    outbound_receiver: mpsc::UnboundedReceiver<String>,
    message_handler: Arc<dyn MessageHandler>,
}

impl Connection {
    pub fn new(
        session_id: String,
        socket: Box<dyn SocketWrapper>,
        outbound_receiver: mpsc::UnboundedReceiver<String>,
        message_handler: Arc<dyn MessageHandler>,
    ) -> Self {
        Self {
            session_id,
            socket,
            outbound_receiver,
            message_handler,
        }
    }

    /// Pumps both directions until either side goes away
    pub async fn run(mut self) -> Result<(), SocketError> {
        let (command_sender, command_receiver) = mpsc::unbounded_channel();
        let dispatcher = spawn_dispatcher(
            self.session_id.clone(),
            command_receiver,
            Arc::clone(&self.message_handler),
        );

        let result = self.pump(command_sender).await;

        // Commands still queued belong to a client that has left
        dispatcher.abort();
        let _ = self.socket.close().await;
        result
    }

    async fn pump(&mut self, commands: mpsc::UnboundedSender<String>) -> Result<(), SocketError> {
        loop {
            tokio::select! {
                outbound = self.outbound_receiver.recv() => match outbound {
                    Some(message) => self.socket.send_message(message).await?,
                    None => return Ok(()),
                },
                inbound = self.socket.receive_frame() => match inbound? {
                    Some(Inbound::Command(text)) => {
                        if commands.send(text).is_err() {
                            return Ok(());
                        }
                    }
                    Some(Inbound::Control) => {
                        trace!(session_id = %self.session_id, "Control frame skipped");
                    }
                    None => return Ok(()),
                },
            }
        }
    }
}

fn spawn_dispatcher(
    session_id: String,
    mut commands: mpsc::UnboundedReceiver<String>,
    handler: Arc<dyn MessageHandler>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(command) = commands.recv().await {
            handler.handle_message(&session_id, command).await;
        }
        debug!(session_id = %session_id, "Command dispatch finished");
    })
}
