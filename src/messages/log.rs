use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use super::LogSink;
use crate::event::{GameEvent, SessionPublisher};

/// Number of narrative lines kept visible
pub const LOG_CAPACITY: usize = 6;

/// Bounded narrative log, newest line first
#[derive(Debug, Clone)]
pub struct MessageLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }
}

impl MessageLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Adds a line at the top, evicting the oldest beyond capacity
    pub fn push(&mut self, line: String) {
        self.lines.push_front(line);
        self.lines.truncate(self.capacity);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Log sink that keeps a `MessageLog` and publishes it after every line
pub struct PublishingLog {
    log: Mutex<MessageLog>,
    publisher: SessionPublisher,
}

impl PublishingLog {
    pub fn new(publisher: SessionPublisher) -> Self {
        Self {
            log: Mutex::new(MessageLog::default()),
            publisher,
        }
    }
}

impl LogSink for PublishingLog {
    fn append(&self, line: String) {
        let lines = {
            let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
            log.push(line);
            log.lines()
        };
        self.publisher.publish(GameEvent::LogUpdated { lines });
    }
}
