use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::problem::is_boss_level;

const MONSTER_AVATARS: [&str; 9] = ["👾", "🐉", "🦖", "👹", "👻", "🤖", "🦇", "💀", "👽"];
const BOSS_AVATARS: [&str; 5] = ["👺", "🐲", "🧛", "🧟", "🦈"];

/// A named actor with bounded health
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    max_health: u32,
    health: u32,
}

impl Entity {
    /// Creates an entity at full health. `max_health` must be positive.
    pub fn new(name: impl Into<String>, max_health: u32) -> Self {
        debug_assert!(max_health > 0, "entities need positive max health");
        Self {
            name: name.into(),
            max_health,
            health: max_health,
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    /// Applies damage, clamping health at zero. Returns the new health.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }
}

/// The opponent of one level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub entity: Entity,
    pub level: u32,
    pub is_boss: bool,
    pub avatar: String,
}

impl Monster {
    /// Spawns the monster for `level`; every fifth level is a boss
    pub fn spawn<R: Rng + ?Sized>(level: u32, rng: &mut R) -> Self {
        let is_boss = is_boss_level(level);
        let (name, max_health, avatars) = if is_boss {
            (
                format!("[BOSS] Lv.{} Monster", level),
                50 + level * 15,
                &BOSS_AVATARS[..],
            )
        } else {
            (
                format!("Lv.{} Monster", level),
                20 + level * 10,
                &MONSTER_AVATARS[..],
            )
        };

        let avatar = avatars.choose(rng).copied().unwrap_or("👾").to_string();

        Self {
            entity: Entity::new(name, max_health),
            level,
            is_boss,
            avatar,
        }
    }
}
