// Feedback effects keyed to discrete game events
//
// Controllers only record *which* cue should fire; the dispatcher hands the
// cues to an `EffectSink` and never waits on it. How a cue sounds or looks is
// up to the presentation layer.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

pub use dispatcher::{EffectDispatcher, EffectSink, PublishingEffects};

mod dispatcher;

/// Categorized sound cue
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SoundCue {
    Attack,
    Correct,
    Wrong,
    LevelUp,
    GameClear,
}

/// What a visual effect is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Target {
    Hero,
    Monster,
    AnswerInput,
}

/// Transient visual effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisualEffect {
    /// Floating "-N" over the target
    DamageNumber { target: Target, amount: u32 },
    Shake { target: Target },
    /// Combo counter pop on a correct quiz answer
    ComboPop { combo: u32 },
    /// Enlarged boss avatar on spawn
    BossEntrance,
}

/// Colour band of a health bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    High,
    Mid,
    Low,
}

impl HealthBand {
    /// Below 30% is low, below 60% is mid
    pub fn for_health(current: u32, max: u32) -> Self {
        if max == 0 {
            return HealthBand::Low;
        }
        let percent = u64::from(current) * 100 / u64::from(max);
        match percent {
            0..=29 => HealthBand::Low,
            30..=59 => HealthBand::Mid,
            _ => HealthBand::High,
        }
    }
}

/// A side effect recorded by a controller during a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Sound(SoundCue),
    Visual(VisualEffect),
    /// A narrative line for the message queue
    Narrate(String),
    /// The visible state changed
    Refresh,
}
