use rand::Rng;

use super::{Operator, Problem};

/// Every fifth level is a boss level
pub const BOSS_LEVEL_INTERVAL: u32 = 5;

/// Level from which missing-operand variants appear
const VARIETY_FROM_LEVEL: u32 = 5;

/// Roll thresholds for the variant pick on varied levels
const MISSING_LEFT_THRESHOLD: f64 = 0.33;
const MISSING_RIGHT_THRESHOLD: f64 = 0.66;

/// Operand ranges for the quiz game
const QUIZ_MIN_SUM: u32 = 2;
const QUIZ_MAX_SUM: u32 = 20;

pub fn is_boss_level(level: u32) -> bool {
    level % BOSS_LEVEL_INTERVAL == 0
}

/// Operand ranges for non-boss combat levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyTier {
    /// Levels 1-2
    Beginner,
    /// Levels 3-4
    Easy,
    /// Levels 5-9
    Medium,
    /// Level 10 and up
    Hard,
}

impl DifficultyTier {
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=2 => DifficultyTier::Beginner,
            3..=4 => DifficultyTier::Easy,
            5..=9 => DifficultyTier::Medium,
            _ => DifficultyTier::Hard,
        }
    }

    /// Draws a minuend and a subtrahend strictly smaller than it
    fn draw_operands<R: Rng + ?Sized>(self, rng: &mut R) -> (u32, u32) {
        match self {
            DifficultyTier::Beginner => {
                let a: u32 = rng.random_range(1..=10);
                let b = rng.random_range(0..a);
                (a, b)
            }
            DifficultyTier::Easy => {
                let a: u32 = rng.random_range(5..=24);
                let b = rng.random_range(1..=a.div_ceil(2));
                (a, b)
            }
            DifficultyTier::Medium => {
                let a: u32 = rng.random_range(10..=49);
                let b = rng.random_range(5..=24u32).min(a - 1);
                (a, b)
            }
            DifficultyTier::Hard => {
                let a: u32 = rng.random_range(10..=99);
                let b = rng.random_range(5..=54u32).min(a - 1);
                (a, b)
            }
        }
    }
}

/// Generates a subtraction problem for the given combat level.
///
/// Boss levels always get a three-term problem. From level 5 on, regular
/// levels may hide either operand instead of asking for the difference.
/// Levels below 1 are not validated here.
pub fn generate_combat<R: Rng + ?Sized>(level: u32, rng: &mut R) -> Problem {
    if is_boss_level(level) {
        return generate_boss(level, rng);
    }

    let (a, b) = DifficultyTier::for_level(level).draw_operands(rng);
    let difference = a - b;

    let roll: f64 = if level >= VARIETY_FROM_LEVEL {
        rng.random()
    } else {
        1.0
    };

    if roll < MISSING_LEFT_THRESHOLD {
        Problem::MissingLeftOperand {
            op: Operator::Subtract,
            b,
            result: difference,
            answer: a,
        }
    } else if roll < MISSING_RIGHT_THRESHOLD {
        Problem::MissingRightOperand {
            op: Operator::Subtract,
            a,
            result: difference,
            answer: b,
        }
    } else {
        Problem::Standard {
            op: Operator::Subtract,
            a,
            b,
            answer: difference,
        }
    }
}

fn generate_boss<R: Rng + ?Sized>(level: u32, rng: &mut R) -> Problem {
    let base = level * 2;

    // Only tiny minuends (level 0) can go negative; redraw those.
    loop {
        let a = rng.random_range(base..=base + 29);
        let cap = (a / 3).max(1);
        let b = rng.random_range(1..=cap);
        let c = rng.random_range(1..=cap);

        if let Some(answer) = a.checked_sub(b).and_then(|rest| rest.checked_sub(c)) {
            return Problem::ThreeTerm { a, b, c, answer };
        }
    }
}

/// Generates an addition problem with one operand hidden
pub fn generate_quiz<R: Rng + ?Sized>(rng: &mut R) -> Problem {
    let sum = rng.random_range(QUIZ_MIN_SUM..=QUIZ_MAX_SUM);
    let a = rng.random_range(1..sum);
    let b = sum - a;

    if rng.random_bool(0.5) {
        Problem::MissingLeftOperand {
            op: Operator::Add,
            b,
            result: sum,
            answer: a,
        }
    } else {
        Problem::MissingRightOperand {
            op: Operator::Add,
            a,
            result: sum,
            answer: b,
        }
    }
}
