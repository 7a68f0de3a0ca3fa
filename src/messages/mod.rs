// Narrative message log
//
// Game events can produce several lines at once; the queue releases them to
// the log one at a time so the player can read each.

pub use log::{MessageLog, PublishingLog, LOG_CAPACITY};
pub use queue::{MessageQueue, DEFAULT_CADENCE};

mod log;
mod queue;

/// Receives narrative lines as they are released by the queue
pub trait LogSink: Send + Sync {
    fn append(&self, line: String);
}
