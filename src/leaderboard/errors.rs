use thiserror::Error;

/// Failure reported by a score store
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Malformed record: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Error)]
pub enum LeaderboardError {
    #[error("Failed to save score: {0}")]
    RemoteWriteFailure(#[source] StoreError),

    #[error("Failed to load ranking: {0}")]
    RemoteReadFailure(#[source] StoreError),
}

impl LeaderboardError {
    /// Message suitable for showing to the player
    pub fn user_message(&self) -> &'static str {
        match self {
            LeaderboardError::RemoteWriteFailure(_) => "Could not save your score. Please try again.",
            LeaderboardError::RemoteReadFailure(_) => "Could not load the ranking.",
        }
    }
}
