//! HTTP Control API
//!
//! REST surface over a single simulator session:
//! - list/load/reset scenarios
//! - dispatch simulator actions
//! - read state snapshots, tools, fault types
//! - serve built-in quiz questions and proxy quiz generation
//!
//! The engine is synchronous and single-writer; the API serializes access
//! through one mutex, one logical session per server instance.

use crate::genquiz::{self, GenerateConfig};
use crate::sequencing;
use crate::simulator::scenarios;
use crate::simulator::types::{ActionResult, SimulatorAction};
use crate::simulator::SimulatorEngine;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tracing::{error, info};

/// HTTP API server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

pub struct AppState {
    pub engine: Mutex<SimulatorEngine>,
    pub client: reqwest::Client,
    pub generate: GenerateConfig,
}

pub type SharedState = Arc<AppState>;

pub fn create_shared_state(generate: GenerateConfig) -> SharedState {
    Arc::new(AppState {
        engine: Mutex::new(SimulatorEngine::new()),
        client: reqwest::Client::new(),
        generate,
    })
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioSummary {
    id: String,
    title: String,
    description: String,
    difficulty: crate::simulator::types::Difficulty,
    symptoms: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct GenerateRequest {
    prompt: String,
}

#[derive(Serialize)]
struct GenerateResponse {
    question: sequencing::SequencingQuestion,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> &'static str {
    "ok"
}

async fn list_scenarios() -> Json<Vec<ScenarioSummary>> {
    let summaries = scenarios::all_scenarios()
        .into_iter()
        .map(|s| ScenarioSummary {
            id: s.id,
            title: s.title,
            description: s.description,
            difficulty: s.difficulty,
            symptoms: s.symptoms,
        })
        .collect();
    Json(summaries)
}

async fn load_scenario(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let Some(scenario) = scenarios::scenario_by_id(&id) else {
        return error_response(StatusCode::NOT_FOUND, format!("unknown scenario: {id}"));
    };

    info!(scenario = %id, "loading scenario");
    let result = state.engine.lock().expect("engine mutex poisoned").load_scenario(scenario);
    Json(result).into_response()
}

async fn reset_scenario(State(state): State<SharedState>) -> Json<ActionResult> {
    Json(state.engine.lock().expect("engine mutex poisoned").reset_scenario())
}

/// Dispatch one action. An unknown action tag never reaches the engine:
/// serde rejects it here with a 4xx.
async fn dispatch_action(
    State(state): State<SharedState>,
    Json(action): Json<SimulatorAction>,
) -> Json<ActionResult> {
    Json(state.engine.lock().expect("engine mutex poisoned").dispatch(action))
}

async fn get_state(State(state): State<SharedState>) -> Response {
    let engine = state.engine.lock().expect("engine mutex poisoned");
    Json(engine.get_state().clone()).into_response()
}

async fn list_tools(State(state): State<SharedState>) -> Response {
    let engine = state.engine.lock().expect("engine mutex poisoned");
    Json(engine.get_available_tools()).into_response()
}

async fn list_fault_types(State(state): State<SharedState>) -> Response {
    let engine = state.engine.lock().expect("engine mutex poisoned");
    Json(engine.get_fault_types()).into_response()
}

async fn list_questions() -> Json<Vec<sequencing::SequencingQuestion>> {
    Json(sequencing::sample_questions())
}

async fn generate_question(
    State(state): State<SharedState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    if request.prompt.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Prompt is required");
    }

    match genquiz::generate_question(&state.client, &state.generate, &request.prompt).await {
        Ok(generated) => Json(GenerateResponse {
            question: genquiz::into_sequencing_question(generated),
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "question generation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

// ============================================================================
// Router / Server
// ============================================================================

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/scenarios", get(list_scenarios))
        .route("/api/scenarios/{id}/load", post(load_scenario))
        .route("/api/reset", post(reset_scenario))
        .route("/api/action", post(dispatch_action))
        .route("/api/state", get(get_state))
        .route("/api/tools", get(list_tools))
        .route("/api/fault-types", get(list_fault_types))
        .route("/api/questions", get(list_questions))
        .route("/api/generate-question", post(generate_question))
        .with_state(state)
}

pub async fn serve(config: ApiConfig, state: SharedState) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "control API listening");
    axum::serve(listener, router(state)).await
}
