// Presentation adapter: one websocket per game session

// Public API
pub use handler::{
    combat_websocket_handler, handle_websocket_connection, quiz_websocket_handler,
    CombatReceiveHandler, QuizReceiveHandler,
};
pub use messages::{MessageType, WebSocketMessage};
pub use presenter::present;
pub use socket::{Inbound, MessageHandler, SocketError, SocketWrapper};
pub use websocket_session_subscriber::WebSocketSessionSubscriber;

pub use crate::shared::GameKind;

// Internal modules
mod handler;
pub mod messages;
mod presenter;
mod socket;
mod websocket_session_subscriber;
