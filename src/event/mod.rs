// Event-driven plumbing between game sessions and their observers
//
// Sessions publish facts onto a per-session broadcast channel; the
// presentation layer subscribes and renders. Publishing never blocks.

// Public API - what other modules can use
pub use bus::{EventBus, SessionPublisher};
pub use events::{EndReason, GameEvent, RankingTarget};
pub use session_handler::{SessionEventError, SessionEventHandler};
pub use session_subscription::SessionSubscription;

// Internal modules
mod bus;
mod events;
mod session_handler;
mod session_subscription;
