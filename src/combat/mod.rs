// RPG combat game
//
// The controller is a pure state machine over hero, monster and problem; the
// session drives it from player commands and timers.

pub use controller::{
    AnswerOutcome, CombatSnapshot, RoundController, RoundError, RoundState, Verdict,
};
pub use entity::{Entity, Monster};
pub use session::CombatSession;

mod controller;
mod entity;
mod session;
