//! Sequencing Quiz Types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One draggable step card.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionStep {
    pub id: String,
    pub label: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    Normal,
    Warning,
    Danger,
}

/// Instrument readout shown after a given number of completed steps.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReading {
    pub display: String,
    pub value: f64,
    pub unit: String,
    pub status: ReadingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    Multimeter,
    Tuner,
}

/// Per-step readout table attached to questions with an instrument panel.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackConfig {
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,
    pub readings: BTreeMap<usize, FeedbackReading>,
    pub initial_reading: FeedbackReading,
}

/// A complete ordering challenge: the correct procedure plus distractors.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SequencingQuestion {
    pub id: String,
    pub title: String,
    pub description: String,
    pub correct_sequence: Vec<ActionStep>,
    pub distractors: Vec<ActionStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_config: Option<FeedbackConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameLogStatus {
    Success,
    Error,
    Info,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GameLogEntry {
    pub id: String,
    pub timestamp: i64,
    pub action: String,
    pub status: GameLogStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Quiz session state. Only the reducer in `game` produces new values.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub score: u32,
    pub chain: Vec<ActionStep>,
    pub is_completed: bool,
    pub log: Vec<GameLogEntry>,
}

impl GameState {
    /// Index of the next expected step.
    pub fn current_step(&self) -> usize {
        self.chain.len()
    }
}
