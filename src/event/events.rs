use serde::{Deserialize, Serialize};

use crate::combat::CombatSnapshot;
use crate::effects::{SoundCue, VisualEffect};
use crate::leaderboard::{LeaderboardView, SubmitStatus};
use crate::quiz::QuizSnapshot;

/// Where a ranking was requested from, so the presenter can pick the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingTarget {
    /// The board shown after a score was saved
    AfterSubmit,
    /// The standalone ranking modal
    Standalone,
}

/// Why a session stopped accepting input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    HeroDefeated,
    FinalBossCleared,
    TimeUp,
}

/// Events that can occur in a game session
///
/// Events represent facts about things that have already happened. The
/// presentation layer observes them; nothing in the game logic waits on them.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// The combat state changed and should be re-rendered
    CombatUpdated(CombatSnapshot),

    /// The quiz state changed and should be re-rendered
    QuizUpdated(QuizSnapshot),

    /// A sound cue should be played
    Sound(SoundCue),

    /// A transient visual effect should be shown
    Visual(VisualEffect),

    /// The narrative log changed, newest line first
    LogUpdated { lines: Vec<String> },

    /// A ranking finished loading (or failed to)
    Leaderboard {
        target: RankingTarget,
        view: LeaderboardView,
    },

    /// The score submission control changed
    SubmitStatusChanged(SubmitStatus),

    /// The session reached a terminal state
    SessionEnded {
        reason: EndReason,
        reload_required: bool,
    },
}

impl GameEvent {
    /// Get a human-readable description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::CombatUpdated(_) => "combat_updated",
            GameEvent::QuizUpdated(_) => "quiz_updated",
            GameEvent::Sound(_) => "sound",
            GameEvent::Visual(_) => "visual",
            GameEvent::LogUpdated { .. } => "log_updated",
            GameEvent::Leaderboard { .. } => "leaderboard",
            GameEvent::SubmitStatusChanged(_) => "submit_status_changed",
            GameEvent::SessionEnded { .. } => "session_ended",
        }
    }
}
