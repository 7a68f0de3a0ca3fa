// 60-second addition quiz with a combo multiplier

pub use controller::{QuizController, QuizError, QuizOutcome, QuizSnapshot, QuizState};
pub use session::QuizSession;

mod controller;
mod session;
