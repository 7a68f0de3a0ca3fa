use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::QuizConfig;
use crate::effects::{Effect, SoundCue, Target, VisualEffect};
use crate::problem::{generate_quiz, Problem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuizState {
    Ready,
    Running,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("Command not accepted while {0}")]
    NotAccepting(QuizState),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSnapshot {
    pub state: QuizState,
    pub score: u32,
    pub combo: u32,
    pub time_left: u32,
    pub problem: Option<Problem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    pub correct: bool,
    pub expected: u32,
    pub points: u32,
    /// Combo after this answer
    pub combo: u32,
}

/// Speed quiz state machine
///
/// Like the combat controller it records effects instead of performing
/// them. The countdown is driven from outside through `tick`.
pub struct QuizController {
    config: QuizConfig,
    rng: StdRng,
    state: QuizState,
    score: u32,
    combo: u32,
    time_left: u32,
    problem: Option<Problem>,
    effects: Vec<Effect>,
}

impl QuizController {
    pub fn new(config: QuizConfig, rng: StdRng) -> Self {
        let time_left = config.duration_secs;
        Self {
            config,
            rng,
            state: QuizState::Ready,
            score: 0,
            combo: 0,
            time_left,
            problem: None,
            effects: Vec::new(),
        }
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn current_problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    pub fn snapshot(&self) -> QuizSnapshot {
        QuizSnapshot {
            state: self.state,
            score: self.score,
            combo: self.combo,
            time_left: self.time_left,
            problem: self.problem.clone(),
        }
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Resets the session and shows the first problem. Ignored while running.
    pub fn start(&mut self) -> bool {
        if self.state == QuizState::Running {
            return false;
        }

        self.state = QuizState::Running;
        self.score = 0;
        self.combo = 0;
        self.time_left = self.config.duration_secs;
        self.next_problem();

        info!(duration = self.time_left, "Quiz started");
        self.effects.push(Effect::Refresh);
        true
    }

    /// Evaluates a raw answer; `None` when not running or not an integer
    pub fn submit_answer(&mut self, raw: &str) -> Option<QuizOutcome> {
        if self.state != QuizState::Running {
            return None;
        }
        let value: i64 = raw.trim().parse().ok()?;
        let problem = self.problem.as_ref()?;
        let expected = problem.answer();

        let outcome = if problem.is_correct(value) {
            self.combo += 1;
            let points = self.config.base_points + (self.combo - 1) * self.config.combo_step;
            self.score += points;

            self.effects.push(Effect::Sound(SoundCue::Correct));
            self.effects.push(Effect::Visual(VisualEffect::ComboPop { combo: self.combo }));

            QuizOutcome {
                correct: true,
                expected,
                points,
                combo: self.combo,
            }
        } else {
            self.combo = 0;

            self.effects.push(Effect::Sound(SoundCue::Wrong));
            self.effects.push(Effect::Visual(VisualEffect::Shake {
                target: Target::AnswerInput,
            }));

            QuizOutcome {
                correct: false,
                expected,
                points: 0,
                combo: 0,
            }
        };

        debug!(
            correct = outcome.correct,
            combo = self.combo,
            score = self.score,
            "Quiz answer evaluated"
        );

        self.next_problem();
        self.effects.push(Effect::Refresh);
        Some(outcome)
    }

    /// Counts down one second. Returns true when this tick ended the quiz.
    pub fn tick(&mut self) -> bool {
        if self.state != QuizState::Running {
            return false;
        }

        self.time_left = self.time_left.saturating_sub(1);
        self.effects.push(Effect::Refresh);

        if self.time_left == 0 {
            self.end();
            return true;
        }
        false
    }

    /// Stops the quiz and announces the final score
    pub fn end(&mut self) {
        if self.state != QuizState::Running {
            return;
        }

        self.state = QuizState::Finished;
        self.problem = None;
        self.effects.push(Effect::Sound(SoundCue::GameClear));
        self.effects.push(Effect::Narrate("Time's up!".to_string()));
        self.effects
            .push(Effect::Narrate(format!("Final score: {} points", self.score)));
        self.effects.push(Effect::Refresh);

        info!(score = self.score, "Quiz finished");
    }

    fn next_problem(&mut self) {
        self.problem = Some(generate_quiz(&mut self.rng));
    }
}
