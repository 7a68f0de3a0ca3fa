// Arithmetic challenges for both games
//
// A problem is created fresh for every round and thrown away once the answer
// has been evaluated. Generation lives in `generator`; this module only holds
// the shape of a challenge and how it is shown to the player.

use serde::{Deserialize, Serialize};
use std::fmt;

pub use generator::{generate_combat, generate_quiz, is_boss_level, DifficultyTier};

mod generator;

/// Operator joining the two visible operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Subtract,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
        }
    }
}

/// One arithmetic challenge. Every variant carries exactly one `answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Problem {
    /// `a op b = ?`
    Standard {
        op: Operator,
        a: u32,
        b: u32,
        answer: u32,
    },
    /// `? op b = result`, the answer is the hidden left operand
    MissingLeftOperand {
        op: Operator,
        b: u32,
        result: u32,
        answer: u32,
    },
    /// `a op ? = result`, the answer is the hidden right operand
    MissingRightOperand {
        op: Operator,
        a: u32,
        result: u32,
        answer: u32,
    },
    /// `a - b - c = ?`, boss levels only
    ThreeTerm { a: u32, b: u32, c: u32, answer: u32 },
}

impl Problem {
    pub fn answer(&self) -> u32 {
        match self {
            Problem::Standard { answer, .. }
            | Problem::MissingLeftOperand { answer, .. }
            | Problem::MissingRightOperand { answer, .. }
            | Problem::ThreeTerm { answer, .. } => *answer,
        }
    }

    /// Checks a parsed player answer against this problem
    pub fn is_correct(&self, value: i64) -> bool {
        value == i64::from(self.answer())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Problem::Standard { .. } => "standard",
            Problem::MissingLeftOperand { .. } => "missing_left_operand",
            Problem::MissingRightOperand { .. } => "missing_right_operand",
            Problem::ThreeTerm { .. } => "three_term",
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Standard { op, a, b, .. } => write!(f, "{} {} {} = ?", a, op.symbol(), b),
            Problem::MissingLeftOperand { op, b, result, .. } => {
                write!(f, "? {} {} = {}", op.symbol(), b, result)
            }
            Problem::MissingRightOperand { op, a, result, .. } => {
                write!(f, "{} {} ? = {}", a, op.symbol(), result)
            }
            Problem::ThreeTerm { a, b, c, .. } => write!(f, "{} - {} - {} = ?", a, b, c),
        }
    }
}
