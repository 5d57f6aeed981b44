//! Sequencing Quiz Reducer
//!
//! Pure state transitions for the drag/tap ordering game. The reducer
//! owns no state: callers hold a `GameState` and replace it with the value
//! returned here after every drop.

use crate::sequencing::types::{
    ActionStep, FeedbackReading, GameLogEntry, GameLogStatus, GameState, SequencingQuestion,
};
use rand::seq::SliceRandom;
use uuid::Uuid;

pub const STARTING_SCORE: u32 = 100;
pub const WRONG_DROP_PENALTY: u32 = 10;

pub fn new_game() -> GameState {
    GameState {
        score: STARTING_SCORE,
        chain: Vec::new(),
        is_completed: false,
        log: Vec::new(),
    }
}

/// The full deck for a question (correct steps + distractors), shuffled.
pub fn deal_actions(question: &SequencingQuestion) -> Vec<ActionStep> {
    let mut deck: Vec<ActionStep> = question
        .correct_sequence
        .iter()
        .chain(question.distractors.iter())
        .cloned()
        .collect();
    deck.shuffle(&mut rand::rng());
    deck
}

/// Apply one dropped card. Returns the next state and whether the drop
/// was accepted.
///
/// A drop matching the next expected step extends the chain; completion is
/// marked exactly once, when the chain reaches the full sequence length.
/// Any other drop costs `WRONG_DROP_PENALTY` (score floors at 0) and
/// leaves the chain unchanged - replaying the same wrong card keeps
/// penalizing.
pub fn apply_drop(
    question: &SequencingQuestion,
    state: &GameState,
    dropped_id: &str,
    timestamp: i64,
) -> (GameState, bool) {
    if state.is_completed {
        return (state.clone(), false);
    }

    let step_index = state.current_step();
    let Some(expected) = question.correct_sequence.get(step_index) else {
        return (state.clone(), false);
    };

    let mut next = state.clone();

    if dropped_id == expected.id {
        next.chain.push(expected.clone());
        next.log.push(log_entry(
            timestamp,
            format!("Step {}: {}", step_index + 1, expected.label),
            GameLogStatus::Success,
            Some(expected.icon.clone()),
        ));

        if next.chain.len() == question.correct_sequence.len() {
            next.is_completed = true;
            next.log.push(log_entry(
                timestamp,
                "Sequence completed!".to_string(),
                GameLogStatus::Success,
                None,
            ));
        }
        (next, true)
    } else {
        next.score = next.score.saturating_sub(WRONG_DROP_PENALTY);
        let label = find_label(question, dropped_id).unwrap_or(dropped_id);
        next.log.push(log_entry(
            timestamp,
            format!("Wrong: {label}"),
            GameLogStatus::Error,
            None,
        ));
        (next, false)
    }
}

/// Readout to display for the current progress, when the question has an
/// instrument panel.
pub fn current_feedback<'a>(
    question: &'a SequencingQuestion,
    state: &GameState,
) -> Option<&'a FeedbackReading> {
    let config = question.feedback_config.as_ref()?;
    Some(
        config
            .readings
            .get(&state.current_step())
            .unwrap_or(&config.initial_reading),
    )
}

fn find_label<'a>(question: &'a SequencingQuestion, id: &str) -> Option<&'a str> {
    question
        .correct_sequence
        .iter()
        .chain(question.distractors.iter())
        .find(|a| a.id == id)
        .map(|a| a.label.as_str())
}

fn log_entry(
    timestamp: i64,
    action: String,
    status: GameLogStatus,
    icon: Option<String>,
) -> GameLogEntry {
    GameLogEntry {
        id: Uuid::new_v4().simple().to_string(),
        timestamp,
        action,
        status,
        icon,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_card(id: &str, label: &str) -> ActionStep {
        ActionStep {
            id: id.to_string(),
            label: label.to_string(),
            icon: "•".to_string(),
            category: None,
        }
    }

    fn question() -> SequencingQuestion {
        SequencingQuestion {
            id: "q".to_string(),
            title: "Test".to_string(),
            description: String::new(),
            correct_sequence: vec![
                step_card("a", "First"),
                step_card("b", "Second"),
                step_card("c", "Third"),
            ],
            distractors: vec![step_card("d", "Trap")],
            feedback_config: None,
        }
    }

    #[test]
    fn distractor_first_penalizes_and_keeps_chain_empty() {
        let q = question();
        let (state, accepted) = apply_drop(&q, &new_game(), "d", 0);
        assert!(!accepted);
        assert!(state.chain.is_empty());
        assert_eq!(state.score, 90);
    }

    #[test]
    fn in_order_drops_complete_exactly_once() {
        let q = question();
        let mut state = new_game();
        for (i, id) in ["a", "b", "c"].iter().enumerate() {
            let (next, accepted) = apply_drop(&q, &state, id, i as i64);
            assert!(accepted);
            state = next;
        }
        assert!(state.is_completed);
        assert_eq!(state.chain.len(), 3);
        assert_eq!(state.score, STARTING_SCORE);

        let completions = state
            .log
            .iter()
            .filter(|e| e.action == "Sequence completed!")
            .count();
        assert_eq!(completions, 1);

        // Drops after completion are ignored.
        let (after, accepted) = apply_drop(&q, &state, "d", 99);
        assert!(!accepted);
        assert_eq!(after.score, state.score);
        assert_eq!(after.log.len(), state.log.len());
    }

    #[test]
    fn repeated_wrong_drops_keep_penalizing_to_zero_floor() {
        let q = question();
        let mut state = new_game();
        for i in 0..12 {
            let (next, accepted) = apply_drop(&q, &state, "d", i);
            assert!(!accepted);
            state = next;
        }
        assert_eq!(state.score, 0);
        assert!(state.chain.is_empty());
    }

    #[test]
    fn out_of_order_correct_card_is_still_wrong() {
        let q = question();
        let (state, accepted) = apply_drop(&q, &new_game(), "b", 0);
        assert!(!accepted);
        assert_eq!(state.score, 90);
        assert!(state.chain.is_empty());
    }

    #[test]
    fn deal_contains_every_card_exactly_once() {
        let q = question();
        let deck = deal_actions(&q);
        assert_eq!(deck.len(), 4);
        for id in ["a", "b", "c", "d"] {
            assert_eq!(deck.iter().filter(|c| c.id == id).count(), 1);
        }
    }
}
