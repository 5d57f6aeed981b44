//! Quiz Question Generation
//!
//! Glue to an OpenAI-compatible chat-completion endpoint that turns a
//! free-text prompt into a sequencing question. The model is asked for
//! strict JSON; anything else is a recoverable `GenerateError`.

use crate::sequencing::types::{ActionStep, SequencingQuestion};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const SYSTEM_PROMPT: &str = r#"You are an expert at creating educational sequencing challenges for trades and technical training. Generate a sequencing question based on the user's prompt.

The question should have:
1. A clear title (short, descriptive)
2. A detailed description explaining the scenario
3. A starting point (initial state description)
4. An ending point (goal state description)
5. Between 4-8 correct action steps in proper order
6. 2-4 distractor steps (incorrect actions)
7. Each action should have:
   - A short label (action name)
   - An appropriate emoji icon
   - Optional feedback text (for correct actions only)

Respond ONLY with valid JSON in this exact format:
{
  "title": "string",
  "description": "string",
  "startingPoint": "string",
  "endingPoint": "string",
  "maxSteps": number,
  "actions": [
    {
      "label": "string",
      "icon": "emoji",
      "feedback": "string (optional)",
      "isCorrect": boolean,
      "correctOrder": number (only if isCorrect is true, 0-indexed)
    }
  ]
}

Make it realistic, practical, and educational. Include safety considerations if relevant."#;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl GenerateConfig {
    /// Read endpoint/key/model from `QUIZGEN_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("QUIZGEN_ENDPOINT")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            api_key: std::env::var("QUIZGEN_API_KEY").ok(),
            model: std::env::var("QUIZGEN_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum GenerateError {
    MissingApiKey,
    Http(reqwest::Error),
    EmptyResponse,
    BadPayload(serde_json::Error),
    InvalidStructure(&'static str),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::MissingApiKey => write!(f, "quiz generation API key not configured"),
            GenerateError::Http(e) => write!(f, "completion request failed: {e}"),
            GenerateError::EmptyResponse => write!(f, "no content generated"),
            GenerateError::BadPayload(e) => write!(f, "failed to parse model response: {e}"),
            GenerateError::InvalidStructure(what) => {
                write!(f, "invalid question structure from model: {what}")
            }
        }
    }
}

impl std::error::Error for GenerateError {}

impl From<reqwest::Error> for GenerateError {
    fn from(e: reqwest::Error) -> Self {
        GenerateError::Http(e)
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Model-authored question, pre-conversion.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub starting_point: String,
    #[serde(default)]
    pub ending_point: String,
    #[serde(default)]
    pub max_steps: u32,
    pub actions: Vec<GeneratedAction>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAction {
    pub label: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_order: Option<u32>,
}

// ============================================================================
// Generation
// ============================================================================

/// Forward `prompt` to the completion endpoint and parse the reply into a
/// `GeneratedQuestion`.
pub async fn generate_question(
    client: &reqwest::Client,
    config: &GenerateConfig,
    prompt: &str,
) -> Result<GeneratedQuestion, GenerateError> {
    let api_key = config.api_key.as_deref().ok_or(GenerateError::MissingApiKey)?;

    let request = ChatRequest {
        model: &config.model,
        messages: [
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: prompt,
            },
        ],
        temperature: 0.8,
        max_tokens: 2000,
    };

    let response: ChatResponse = client
        .post(&config.endpoint)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let content = response
        .choices
        .first()
        .and_then(|c| c.message.content.as_deref())
        .ok_or(GenerateError::EmptyResponse)?;

    parse_generated(content)
}

/// Parse a model reply, tolerating markdown code fences around the JSON.
pub fn parse_generated(content: &str) -> Result<GeneratedQuestion, GenerateError> {
    let clean = content
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string();

    let mut question: GeneratedQuestion =
        serde_json::from_str(&clean).map_err(GenerateError::BadPayload)?;

    if question.title.is_empty() {
        return Err(GenerateError::InvalidStructure("missing title"));
    }
    if question.actions.is_empty() {
        return Err(GenerateError::InvalidStructure("no actions"));
    }

    // maxSteps always reflects the actual correct-action count.
    question.max_steps = question.actions.iter().filter(|a| a.is_correct).count() as u32;
    if question.max_steps == 0 {
        return Err(GenerateError::InvalidStructure("no correct actions"));
    }

    Ok(question)
}

/// Convert a generated question into a playable `SequencingQuestion`:
/// correct actions ordered by `correctOrder`, the rest as distractors.
pub fn into_sequencing_question(generated: GeneratedQuestion) -> SequencingQuestion {
    let question_id = Uuid::new_v4().simple().to_string();

    let mut correct: Vec<&GeneratedAction> =
        generated.actions.iter().filter(|a| a.is_correct).collect();
    correct.sort_by_key(|a| a.correct_order.unwrap_or(u32::MAX));

    let to_step = |index: usize, action: &GeneratedAction| ActionStep {
        id: format!("{question_id}-{index}"),
        label: action.label.clone(),
        icon: action.icon.clone(),
        category: None,
    };

    let correct_sequence: Vec<ActionStep> = correct
        .iter()
        .enumerate()
        .map(|(i, a)| to_step(i, a))
        .collect();
    let distractors: Vec<ActionStep> = generated
        .actions
        .iter()
        .filter(|a| !a.is_correct)
        .enumerate()
        .map(|(i, a)| to_step(correct_sequence.len() + i, a))
        .collect();

    SequencingQuestion {
        id: question_id,
        title: generated.title,
        description: generated.description,
        correct_sequence,
        distractors,
        feedback_config: None,
    }
}
