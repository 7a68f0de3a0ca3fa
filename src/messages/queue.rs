use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, trace};

use super::LogSink;

/// Delay between two narrative lines
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(800);

/// Serializes narrative lines so they reach the log one at a time
///
/// A drain task is spawned when the first line arrives and exits once it
/// finds the queue empty. At most one drain task runs per queue.
#[derive(Clone)]
pub struct MessageQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    state: Mutex<QueueState>,
    sink: Arc<dyn LogSink>,
    cadence: Duration,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<String>,
    draining: bool,
}

impl MessageQueue {
    pub fn new(sink: Arc<dyn LogSink>, cadence: Duration) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState::default()),
                sink,
                cadence,
            }),
        }
    }

    /// Appends a line; starts the drain task if none is running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn enqueue(&self, text: impl Into<String>) {
        let text = text.into();
        let start_drain = {
            let mut state = self.inner.lock();
            trace!(pending = state.pending.len(), text = %text, "Queueing message");
            state.pending.push_back(text);
            !std::mem::replace(&mut state.draining, true)
        };

        if start_drain {
            debug!("Starting message drain");
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move { inner.drain().await });
        }
    }

    /// Lines still waiting to be shown
    pub fn pending_len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn is_draining(&self) -> bool {
        self.inner.lock().draining
    }
}

impl QueueInner {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn drain(&self) {
        loop {
            let next = {
                let mut state = self.lock();
                match state.pending.pop_front() {
                    Some(line) => line,
                    None => {
                        state.draining = false;
                        debug!("Message drain finished");
                        return;
                    }
                }
            };

            self.sink.append(next);
            tokio::time::sleep(self.cadence).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[derive(Default)]
    struct RecordingSink {
        lines: Mutex<Vec<(String, Instant)>>,
    }

    impl RecordingSink {
        fn delivered(&self) -> Vec<(String, Instant)> {
            self.lines.lock().unwrap().clone()
        }
    }

    impl LogSink for RecordingSink {
        fn append(&self, line: String) {
            self.lines.lock().unwrap().push((line, Instant::now()));
        }
    }

    fn queue() -> (MessageQueue, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        (MessageQueue::new(sink.clone(), DEFAULT_CADENCE), sink)
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivers_in_fifo_order_at_fixed_cadence() {
        let (queue, sink) = queue();

        queue.enqueue("m1");
        queue.enqueue("m2");
        queue.enqueue("m3");

        tokio::time::sleep(Duration::from_secs(5)).await;

        let delivered = sink.delivered();
        let lines: Vec<&str> = delivered.iter().map(|(line, _)| line.as_str()).collect();
        assert_eq!(lines, vec!["m1", "m2", "m3"]);

        for pair in delivered.windows(2) {
            assert!(pair[1].1 - pair[0].1 >= DEFAULT_CADENCE);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_one_line_per_interval() {
        let (queue, sink) = queue();

        queue.enqueue("first");
        queue.enqueue("second");

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(sink.delivered().len(), 1);
        assert_eq!(queue.pending_len(), 1);

        tokio::time::sleep(Duration::from_millis(800)).await;
        assert_eq!(sink.delivered().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enqueue_while_draining_reuses_running_drain() {
        let (queue, sink) = queue();

        queue.enqueue("a");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(queue.is_draining());

        // A second drain would deliver "b" immediately instead of after the cadence.
        queue.enqueue("b");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(sink.delivered().len(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        let delivered = sink.delivered();
        assert_eq!(delivered.len(), 2);
        assert!(delivered[1].1 - delivered[0].1 >= DEFAULT_CADENCE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_stops_when_empty_and_restarts_lazily() {
        let (queue, sink) = queue();

        queue.enqueue("one");
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!queue.is_draining());

        queue.enqueue("two");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(sink.delivered().len(), 2);
    }
}
