//! Mock collaborators for the integration suites
#![allow(dead_code)] // Test utilities may not all be used in every test

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

use math_quest::leaderboard::{
    InMemoryScoreStore, LeaderboardEntry, OrderField, ScoreRecord, ScoreStore, StoreError,
};
use math_quest::websockets::{Inbound, SocketError, SocketWrapper};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Score store that rejects every request and counts the attempts
#[derive(Default)]
pub struct FailingScoreStore {
    attempts: AtomicUsize,
}

impl FailingScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoreStore for FailingScoreStore {
    async fn insert(&self, _collection: &str, _record: ScoreRecord) -> Result<String, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Rejected("write rejected by rules".to_string()))
    }

    async fn query(
        &self,
        _collection: &str,
        _order_by: OrderField,
        _limit_to_last: usize,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Transport("network unreachable".to_string()))
    }
}

/// Score store that answers correctly but only after a long delay
pub struct SlowScoreStore {
    delay: Duration,
    inner: InMemoryScoreStore,
}

impl SlowScoreStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: InMemoryScoreStore::new(),
        }
    }
}

#[async_trait]
impl ScoreStore for SlowScoreStore {
    async fn insert(&self, collection: &str, record: ScoreRecord) -> Result<String, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.insert(collection, record).await
    }

    async fn query(
        &self,
        collection: &str,
        order_by: OrderField,
        limit_to_last: usize,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.query(collection, order_by, limit_to_last).await
    }
}

/// In-process stand-in for a client's websocket
///
/// Text pushed through `client` arrives as inbound messages; everything the
/// server sends is recorded. Dropping `client` closes the socket.
pub struct MockSocket {
    inbound: mpsc::UnboundedReceiver<String>,
    sent: Arc<Mutex<Vec<String>>>,
}

pub struct MockClient {
    pub client: mpsc::UnboundedSender<String>,
    pub sent: Arc<Mutex<Vec<String>>>,
}

impl MockSocket {
    pub fn pair() -> (MockSocket, MockClient) {
        let (client, inbound) = mpsc::unbounded_channel();
        let sent = Arc::new(Mutex::new(Vec::new()));
        (
            MockSocket {
                inbound,
                sent: sent.clone(),
            },
            MockClient { client, sent },
        )
    }
}

#[async_trait]
impl SocketWrapper for MockSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.sent.lock().await.push(message);
        Ok(())
    }

    async fn receive_frame(&mut self) -> Result<Option<Inbound>, SocketError> {
        Ok(self.inbound.recv().await.map(Inbound::Command))
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        Ok(())
    }
}

impl MockClient {
    pub fn send(&self, json: &str) {
        self.client.send(json.to_string()).unwrap();
    }

    pub async fn sent_messages(&self) -> Vec<math_quest::WebSocketMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect()
    }
}
