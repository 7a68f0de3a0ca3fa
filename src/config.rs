use std::ops::RangeInclusive;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::messages::DEFAULT_CADENCE;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_COLLECTION: &str = "scores";
const DEFAULT_QUIZ_COLLECTION: &str = "quiz_scores";
const DEFAULT_LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Process-level settings read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Postgres connection string; the in-memory store is used when absent
    pub database_url: Option<String>,
    /// Combat ranking collection
    pub leaderboard_collection: String,
    pub quiz_leaderboard_collection: String,
    pub leaderboard_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_url: None,
            leaderboard_collection: DEFAULT_COLLECTION.to_string(),
            quiz_leaderboard_collection: DEFAULT_QUIZ_COLLECTION.to_string(),
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `DATABASE_URL`, `LEADERBOARD_COLLECTION`,
    /// `QUIZ_LEADERBOARD_COLLECTION` and `LEADERBOARD_SIZE`, falling back to
    /// defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let leaderboard_size = match lookup("LEADERBOARD_SIZE") {
            Some(value) => match value.trim().parse::<usize>().ok() {
                Some(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "LEADERBOARD_SIZE",
                        value,
                    })
                }
            },
            None => defaults.leaderboard_size,
        };

        let config = Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            leaderboard_collection: lookup("LEADERBOARD_COLLECTION")
                .unwrap_or(defaults.leaderboard_collection),
            quiz_leaderboard_collection: lookup("QUIZ_LEADERBOARD_COLLECTION")
                .unwrap_or(defaults.quiz_leaderboard_collection),
            leaderboard_size,
        };

        info!(
            bind_addr = %config.bind_addr,
            persistent = config.database_url.is_some(),
            collection = %config.leaderboard_collection,
            quiz_collection = %config.quiz_leaderboard_collection,
            leaderboard_size = config.leaderboard_size,
            "Loaded server configuration"
        );

        Ok(config)
    }
}

/// Tuning constants of the combat game
#[derive(Debug, Clone)]
pub struct CombatConfig {
    pub hero_name: String,
    pub hero_max_health: u32,
    /// Clearing this level's monster ends the game
    pub final_level: u32,
    /// Damage dealt to the monster on a correct answer
    pub attack_damage: RangeInclusive<u32>,
    /// Damage taken by the hero on a wrong answer
    pub counter_damage: RangeInclusive<u32>,
    pub base_points: u32,
    /// Seconds during which a correct answer still earns a speed bonus
    pub speed_bonus_window: Duration,
    /// Bonus points per second left in the window
    pub speed_bonus_rate: u32,
    pub level_up_bonus: u32,
    pub clear_bonus: u32,
    /// Points per remaining hero health point on clear
    pub health_bonus_rate: u32,
    /// Pause between a monster falling and the level advancing
    pub victory_delay: Duration,
    /// Pause between the level advancing and the next monster appearing
    pub spawn_delay: Duration,
    /// Pause between the hero falling and the session closing
    pub game_over_delay: Duration,
    pub message_cadence: Duration,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            hero_name: "Hero".to_string(),
            hero_max_health: 100,
            final_level: 10,
            attack_damage: 10..=14,
            counter_damage: 5..=9,
            base_points: 10,
            speed_bonus_window: Duration::from_secs(10),
            speed_bonus_rate: 5,
            level_up_bonus: 100,
            clear_bonus: 1000,
            health_bonus_rate: 10,
            victory_delay: Duration::from_millis(1000),
            spawn_delay: Duration::from_millis(1500),
            game_over_delay: Duration::from_millis(500),
            message_cadence: DEFAULT_CADENCE,
        }
    }
}

/// Tuning constants of the speed quiz
#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub duration_secs: u32,
    pub base_points: u32,
    /// Extra points per combo step beyond the first correct answer
    pub combo_step: u32,
    pub tick: Duration,
    pub message_cadence: Duration,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            duration_secs: 60,
            base_points: 10,
            combo_step: 2,
            tick: Duration::from_secs(1),
            message_cadence: DEFAULT_CADENCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert!(config.database_url.is_none());
        assert_eq!(config.leaderboard_collection, "scores");
        assert_eq!(config.quiz_leaderboard_collection, "quiz_scores");
        assert_eq!(config.leaderboard_size, 10);
    }

    #[test]
    fn test_environment_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "postgres://localhost/quest"),
            ("LEADERBOARD_COLLECTION", "battle_scores"),
            ("QUIZ_LEADERBOARD_COLLECTION", "sprint_scores"),
            ("LEADERBOARD_SIZE", "25"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/quest")
        );
        assert_eq!(config.leaderboard_collection, "battle_scores");
        assert_eq!(config.quiz_leaderboard_collection, "sprint_scores");
        assert_eq!(config.leaderboard_size, 25);
    }

    #[test]
    fn test_rejects_invalid_leaderboard_size() {
        let result = ServerConfig::from_lookup(lookup(&[("LEADERBOARD_SIZE", "0")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: "LEADERBOARD_SIZE",
                ..
            })
        ));
    }
}
