//! Sequencing Quiz
//!
//! Pure ordering-game reducer, its types, and the built-in questions.

pub mod game;
pub mod questions;
pub mod types;

pub use game::{STARTING_SCORE, WRONG_DROP_PENALTY, apply_drop, deal_actions, new_game};
pub use questions::{question_by_id, sample_questions};
pub use types::*;
