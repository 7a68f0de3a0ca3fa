use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};

use super::entity::{Entity, Monster};
use crate::config::CombatConfig;
use crate::effects::{Effect, SoundCue, Target, VisualEffect};
use crate::problem::{generate_combat, Problem};

/// Where a combat session is in its round cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoundState {
    /// Waiting for the attack command
    Idle,
    /// A problem is on screen and the answer input is open
    AwaitingInput,
    /// An answer was evaluated; terminal checks are pending
    Resolving,
    /// The monster fell; the next one has not appeared yet
    LevelTransition,
    GameOver,
    GameClear,
}

impl RoundState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RoundState::GameOver | RoundState::GameClear)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("Command not accepted while {0}")]
    NotAccepting(RoundState),
}

/// What an evaluated answer means for the battle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    MonsterDefeated,
    HeroDefeated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    /// The answer the problem asked for
    pub expected: u32,
    /// Damage dealt to the monster, or taken by the hero
    pub damage: u32,
    pub speed_bonus: u32,
    /// Points added to the score by this answer
    pub points: u32,
    pub verdict: Verdict,
}

/// Everything the presentation layer needs to draw a combat session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatSnapshot {
    pub state: RoundState,
    pub level: u32,
    pub score: u32,
    pub hero: Entity,
    pub monster: Monster,
    pub problem: Option<Problem>,
}

/// Combat round state machine
///
/// Pure state and transition logic: every transition records its side
/// effects, which the caller drains with `take_effects` and dispatches.
/// Timing is supplied by the caller so the controller never sleeps.
pub struct RoundController {
    config: CombatConfig,
    rng: StdRng,
    state: RoundState,
    level: u32,
    score: u32,
    hero: Entity,
    monster: Monster,
    problem: Option<Problem>,
    problem_started_at: Option<Instant>,
    pending_verdict: Option<Verdict>,
    effects: Vec<Effect>,
}

impl RoundController {
    pub fn new(config: CombatConfig, mut rng: StdRng) -> Self {
        let level = 1;
        let hero = Entity::new(config.hero_name.clone(), config.hero_max_health);
        let monster = Monster::spawn(level, &mut rng);

        let mut controller = Self {
            config,
            rng,
            state: RoundState::Idle,
            level,
            score: 0,
            hero,
            monster,
            problem: None,
            problem_started_at: None,
            pending_verdict: None,
            effects: Vec::new(),
        };
        controller.announce_monster();
        controller.narrate("Battle start!");
        controller
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn hero(&self) -> &Entity {
        &self.hero
    }

    pub fn monster(&self) -> &Monster {
        &self.monster
    }

    pub fn current_problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    pub fn snapshot(&self) -> CombatSnapshot {
        CombatSnapshot {
            state: self.state,
            level: self.level,
            score: self.score,
            hero: self.hero.clone(),
            monster: self.monster.clone(),
            problem: self.problem.clone(),
        }
    }

    /// Drains the effects recorded since the last call
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Presents a fresh problem and opens the answer input
    pub fn start_round(&mut self, now: Instant) -> Result<&Problem, RoundError> {
        if !matches!(self.state, RoundState::Idle | RoundState::AwaitingInput) {
            return Err(RoundError::NotAccepting(self.state));
        }

        self.effects.push(Effect::Sound(SoundCue::Attack));
        let problem = generate_combat(self.level, &mut self.rng);
        debug!(level = self.level, problem = %problem, "Round started");

        self.problem_started_at = Some(now);
        self.state = RoundState::AwaitingInput;
        self.effects.push(Effect::Refresh);
        Ok(&*self.problem.insert(problem))
    }

    /// Evaluates a raw answer.
    ///
    /// Returns `None` without any transition when no problem is open or the
    /// input is not an integer.
    pub fn submit_answer(&mut self, raw: &str, now: Instant) -> Option<AnswerOutcome> {
        if self.state != RoundState::AwaitingInput {
            return None;
        }
        let value: i64 = raw.trim().parse().ok()?;
        let problem = self.problem.take()?;

        self.state = RoundState::Resolving;
        let expected = problem.answer();

        let outcome = if problem.is_correct(value) {
            let elapsed = self
                .problem_started_at
                .map(|started| now.saturating_duration_since(started))
                .unwrap_or_default();
            let speed_bonus = self.speed_bonus(elapsed);
            let damage = self.rng.random_range(self.config.attack_damage.clone());
            let points = self.config.base_points + speed_bonus;

            self.effects.push(Effect::Sound(SoundCue::Correct));
            self.narrate(format!("Correct! {} bonus points!", speed_bonus));
            self.narrate(format!("Dealt {} damage!", damage));

            self.score += points;
            self.monster.entity.take_damage(damage);
            self.show_hit(Target::Monster, damage);

            AnswerOutcome {
                correct: true,
                expected,
                damage,
                speed_bonus,
                points,
                verdict: Verdict::Continue,
            }
        } else {
            let damage = self.rng.random_range(self.config.counter_damage.clone());

            self.effects.push(Effect::Sound(SoundCue::Wrong));
            self.narrate(format!("Too bad... the answer was {}.", expected));
            self.narrate(format!("{} took {} damage!", self.hero.name, damage));

            self.hero.take_damage(damage);
            self.show_hit(Target::Hero, damage);

            AnswerOutcome {
                correct: false,
                expected,
                damage,
                speed_bonus: 0,
                points: 0,
                verdict: Verdict::Continue,
            }
        };

        // Monster defeat is checked first, so a double knockout is a win.
        let verdict = if self.monster.entity.is_defeated() {
            Verdict::MonsterDefeated
        } else if self.hero.is_defeated() {
            Verdict::HeroDefeated
        } else {
            Verdict::Continue
        };
        self.pending_verdict = Some(verdict);
        self.effects.push(Effect::Refresh);

        info!(
            correct = outcome.correct,
            damage = outcome.damage,
            score = self.score,
            verdict = ?verdict,
            "Answer resolved"
        );

        Some(AnswerOutcome { verdict, ..outcome })
    }

    /// Applies the terminal checks of the last answer
    pub fn resolve(&mut self) -> Result<RoundState, RoundError> {
        if self.state != RoundState::Resolving {
            return Err(RoundError::NotAccepting(self.state));
        }

        self.state = match self.pending_verdict.take().unwrap_or(Verdict::Continue) {
            Verdict::MonsterDefeated if self.level >= self.config.final_level => {
                self.clear_game();
                RoundState::GameClear
            }
            Verdict::MonsterDefeated => {
                self.narrate("Monster defeated!");
                self.effects.push(Effect::Sound(SoundCue::LevelUp));
                self.level += 1;
                self.score += self.config.level_up_bonus;
                info!(level = self.level, score = self.score, "Level up");
                RoundState::LevelTransition
            }
            Verdict::HeroDefeated => {
                self.narrate(format!("{} has fallen...", self.hero.name));
                self.effects.push(Effect::Sound(SoundCue::Wrong));
                info!(level = self.level, score = self.score, "Game over");
                RoundState::GameOver
            }
            Verdict::Continue => RoundState::Idle,
        };

        self.effects.push(Effect::Refresh);
        Ok(self.state)
    }

    /// Brings in the current level's monster after a level transition
    pub fn spawn_monster(&mut self) -> Result<&Monster, RoundError> {
        if self.state != RoundState::LevelTransition {
            return Err(RoundError::NotAccepting(self.state));
        }

        self.monster = Monster::spawn(self.level, &mut self.rng);
        self.announce_monster();
        self.state = RoundState::Idle;
        Ok(&self.monster)
    }

    fn speed_bonus(&self, elapsed: std::time::Duration) -> u32 {
        let remaining = self.config.speed_bonus_window.saturating_sub(elapsed);
        (remaining.as_secs_f64() * f64::from(self.config.speed_bonus_rate)).floor() as u32
    }

    fn clear_game(&mut self) {
        let health_bonus = self.hero.health() * self.config.health_bonus_rate;

        self.effects.push(Effect::Sound(SoundCue::GameClear));
        self.narrate("All monsters defeated!");
        self.narrate(format!("HP bonus: {} points!", health_bonus));
        self.score += self.config.clear_bonus + health_bonus;

        info!(score = self.score, health_bonus, "Game cleared");
    }

    fn announce_monster(&mut self) {
        if self.monster.is_boss {
            self.effects.push(Effect::Sound(SoundCue::Wrong));
            self.effects.push(Effect::Visual(VisualEffect::BossEntrance));
            self.narrate("A mighty boss appears!");
        } else {
            self.narrate(format!("A Lv.{} monster appears!", self.level));
        }
        self.effects.push(Effect::Refresh);
    }

    fn show_hit(&mut self, target: Target, amount: u32) {
        self.effects
            .push(Effect::Visual(VisualEffect::DamageNumber { target, amount }));
        self.effects.push(Effect::Visual(VisualEffect::Shake { target }));
    }

    fn narrate(&mut self, line: impl Into<String>) {
        self.effects.push(Effect::Narrate(line.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Operator;
    use rand::SeedableRng;
    use std::time::Duration;

    fn controller() -> RoundController {
        RoundController::new(CombatConfig::default(), StdRng::seed_from_u64(11))
    }

    /// Opens a round and swaps in a known problem
    fn open_round(controller: &mut RoundController, problem: Problem, at: Instant) {
        controller.start_round(at).unwrap();
        controller.problem = Some(problem);
        controller.take_effects();
    }

    fn seven_minus_three() -> Problem {
        Problem::Standard {
            op: Operator::Subtract,
            a: 7,
            b: 3,
            answer: 4,
        }
    }

    fn sounds(effects: &[Effect]) -> Vec<SoundCue> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Sound(cue) => Some(*cue),
                _ => None,
            })
            .collect()
    }

    fn narration(effects: &[Effect]) -> Vec<String> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Narrate(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_new_session_starts_idle_at_level_one() {
        let mut controller = controller();

        assert_eq!(controller.state(), RoundState::Idle);
        assert_eq!(controller.level(), 1);
        assert_eq!(controller.score(), 0);
        assert_eq!(controller.hero().health(), 100);
        assert_eq!(controller.monster().entity.max_health(), 30);
        assert_eq!(
            narration(&controller.take_effects()),
            vec!["A Lv.1 monster appears!", "Battle start!"]
        );
    }

    #[test]
    fn test_start_round_opens_input_with_attack_cue() {
        let mut controller = controller();
        controller.take_effects();

        controller.start_round(Instant::now()).unwrap();

        assert_eq!(controller.state(), RoundState::AwaitingInput);
        assert!(controller.current_problem().is_some());
        assert_eq!(sounds(&controller.take_effects()), vec![SoundCue::Attack]);
    }

    #[test]
    fn test_correct_answer_within_two_seconds() {
        let mut controller = controller();
        let start = Instant::now();
        open_round(&mut controller, seven_minus_three(), start);

        let outcome = controller
            .submit_answer("4", start + Duration::from_secs(2))
            .unwrap();

        assert!(outcome.correct);
        assert_eq!(outcome.speed_bonus, 40);
        assert_eq!(outcome.points, 50);
        assert!((10..=14).contains(&outcome.damage));
        assert_eq!(controller.score(), 50);
        assert_eq!(controller.monster().entity.health(), 30 - outcome.damage);
        assert_eq!(controller.hero().health(), 100);
        assert_eq!(controller.state(), RoundState::Resolving);
        assert_eq!(outcome.verdict, Verdict::Continue);

        let effects = controller.take_effects();
        assert_eq!(sounds(&effects), vec![SoundCue::Correct]);
        assert!(effects.contains(&Effect::Visual(VisualEffect::Shake {
            target: Target::Monster
        })));
    }

    #[test]
    fn test_slow_answer_earns_no_bonus() {
        let mut controller = controller();
        let start = Instant::now();
        open_round(&mut controller, seven_minus_three(), start);

        let outcome = controller
            .submit_answer("4", start + Duration::from_secs(12))
            .unwrap();

        assert_eq!(outcome.speed_bonus, 0);
        assert_eq!(controller.score(), 10);
    }

    #[test]
    fn test_wrong_answer_hurts_hero_and_reveals_answer() {
        let mut controller = controller();
        let start = Instant::now();
        open_round(&mut controller, seven_minus_three(), start);

        let outcome = controller.submit_answer("5", start).unwrap();

        assert!(!outcome.correct);
        assert!((5..=9).contains(&outcome.damage));
        assert_eq!(controller.hero().health(), 100 - outcome.damage);
        assert_eq!(controller.monster().entity.health(), 30);
        assert_eq!(controller.score(), 0);

        let effects = controller.take_effects();
        assert_eq!(sounds(&effects), vec![SoundCue::Wrong]);
        assert_eq!(
            narration(&effects).first().map(String::as_str),
            Some("Too bad... the answer was 4.")
        );
    }

    #[test]
    fn test_non_numeric_input_is_ignored() {
        let mut controller = controller();
        let start = Instant::now();
        open_round(&mut controller, seven_minus_three(), start);

        assert!(controller.submit_answer("", start).is_none());
        assert!(controller.submit_answer("four", start).is_none());
        assert!(controller.submit_answer("4.5", start).is_none());

        assert_eq!(controller.state(), RoundState::AwaitingInput);
        assert!(controller.take_effects().is_empty());
        assert!(controller.submit_answer(" 4 ", start).is_some());
    }

    #[test]
    fn test_answer_without_open_round_is_ignored() {
        let mut controller = controller();
        assert!(controller.submit_answer("4", Instant::now()).is_none());
        assert_eq!(controller.state(), RoundState::Idle);
    }

    #[test]
    fn test_no_new_round_while_resolving() {
        let mut controller = controller();
        let start = Instant::now();
        open_round(&mut controller, seven_minus_three(), start);
        controller.submit_answer("4", start).unwrap();

        assert_eq!(
            controller.start_round(start).unwrap_err(),
            RoundError::NotAccepting(RoundState::Resolving)
        );
        assert!(controller.submit_answer("4", start).is_none());
    }

    #[test]
    fn test_surviving_round_returns_to_idle() {
        let mut controller = controller();
        let start = Instant::now();
        open_round(&mut controller, seven_minus_three(), start);
        controller.submit_answer("4", start).unwrap();

        assert_eq!(controller.resolve().unwrap(), RoundState::Idle);
        assert!(controller.start_round(start).is_ok());
    }

    #[test]
    fn test_defeating_monster_advances_level() {
        let mut controller = controller();
        let start = Instant::now();
        controller.monster.entity.take_damage(25);
        open_round(&mut controller, seven_minus_three(), start);

        let outcome = controller
            .submit_answer("4", start + Duration::from_secs(10))
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::MonsterDefeated);

        assert_eq!(controller.resolve().unwrap(), RoundState::LevelTransition);
        assert_eq!(controller.level(), 2);
        assert_eq!(controller.score(), 10 + 100);
        assert!(sounds(&controller.take_effects()).contains(&SoundCue::LevelUp));

        assert!(controller.start_round(start).is_err());
        let monster = controller.spawn_monster().unwrap();
        assert_eq!(monster.level, 2);
        assert_eq!(monster.entity.max_health(), 40);
        assert_eq!(controller.state(), RoundState::Idle);
    }

    #[test]
    fn test_boss_spawns_on_fifth_level() {
        let mut controller = controller();
        controller.level = 5;
        controller.state = RoundState::LevelTransition;

        let boss = controller.spawn_monster().unwrap();
        assert!(boss.is_boss);

        let effects = controller.take_effects();
        assert!(effects.contains(&Effect::Visual(VisualEffect::BossEntrance)));
        assert_eq!(sounds(&effects), vec![SoundCue::Wrong]);
    }

    #[test]
    fn test_final_boss_clear_awards_bonuses() {
        let mut controller = controller();
        let start = Instant::now();
        controller.level = 10;
        controller.hero.take_damage(40);
        controller.monster.entity.take_damage(29);
        open_round(&mut controller, seven_minus_three(), start);

        controller
            .submit_answer("4", start + Duration::from_secs(10))
            .unwrap();
        assert_eq!(controller.resolve().unwrap(), RoundState::GameClear);

        assert_eq!(controller.score(), 10 + 1000 + 60 * 10);
        assert!(controller.state().is_terminal());
        assert!(sounds(&controller.take_effects()).contains(&SoundCue::GameClear));
    }

    #[test]
    fn test_hero_defeat_ends_game() {
        let mut controller = controller();
        let start = Instant::now();
        controller.hero.take_damage(98);
        open_round(&mut controller, seven_minus_three(), start);

        let outcome = controller.submit_answer("0", start).unwrap();
        assert_eq!(outcome.verdict, Verdict::HeroDefeated);
        assert_eq!(controller.resolve().unwrap(), RoundState::GameOver);
        assert!(controller.start_round(start).is_err());
    }

    #[test]
    fn test_double_defeat_resolves_as_win() {
        let mut controller = controller();
        let start = Instant::now();
        controller.hero.take_damage(100);
        controller.monster.entity.take_damage(30);
        open_round(&mut controller, seven_minus_three(), start);

        let outcome = controller.submit_answer("4", start).unwrap();

        assert_eq!(outcome.verdict, Verdict::MonsterDefeated);
        assert_eq!(controller.resolve().unwrap(), RoundState::LevelTransition);
    }
}
