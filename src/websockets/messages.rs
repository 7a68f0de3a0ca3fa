use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::effects::{HealthBand, SoundCue};
use crate::event::{EndReason, RankingTarget};
use crate::leaderboard::{RankedEntry, SubmitPhase};

/// Message types for WebSocket communication
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    // Client -> Server
    Start,
    Attack,
    Answer,
    SaveScore,
    ViewRanking,

    // Server -> Client
    HealthBar,
    Score,
    Level,
    Combo,
    TimeLeft,
    Monster,
    Modal,
    Problem,
    Log,
    Sound,
    Visual,
    Leaderboard,
    SubmitStatus,
    SessionEnded,
    Error,
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
}

/// Base structure for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub meta: Option<WebSocketMessageMeta>,
}

/// Client-to-Server message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerPayload {
    /// Raw text of the answer field; numbers are accepted too
    pub value: serde_json::Value,
}

impl AnswerPayload {
    pub fn raw(&self) -> String {
        match &self.value {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveScorePayload {
    #[serde(default)]
    pub name: String,
}

/// Server-to-Client message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthBarPayload {
    /// "hero" or "monster"
    pub id: String,
    pub current: u32,
    pub max: u32,
    pub band: HealthBand,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePayload {
    pub score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelPayload {
    pub level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboPayload {
    pub combo: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeLeftPayload {
    pub seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonsterPayload {
    pub name: String,
    pub avatar: String,
    pub is_boss: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalPayload {
    pub name: String,
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemPayload {
    /// Empty when no problem is on screen
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogPayload {
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundPayload {
    pub cue: SoundCue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardPayload {
    pub target: RankingTarget,
    pub entries: Vec<RankedEntry>,
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitStatusPayload {
    pub phase: SubmitPhase,
    pub enabled: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEndedPayload {
    pub reason: EndReason,
    pub reload_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
            }),
        }
    }

    /// Builds a message from any serializable payload
    pub fn with_payload<T: Serialize>(
        message_type: MessageType,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(message_type, serde_json::to_value(payload)?))
    }

    /// Create a MODAL message
    pub fn modal(name: &str, visible: bool) -> Result<Self, serde_json::Error> {
        Self::with_payload(
            MessageType::Modal,
            &ModalPayload {
                name: name.to_string(),
                visible,
            },
        )
    }

    /// Create an ERROR message
    pub fn error(message: impl Into<String>) -> Result<Self, serde_json::Error> {
        Self::with_payload(
            MessageType::Error,
            &ErrorPayload {
                message: message.into(),
            },
        )
    }

    /// Decodes the payload into the type expected for this message
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
