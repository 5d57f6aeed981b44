//! hvacsim CLI
//!
//! Usage:
//!   hvacsim list
//!   hvacsim serve --port 8080
//!   hvacsim replay --scenario failed-capacitor --actions session.json

use clap::{Parser, Subcommand};
use hvacsim::api::{self, ApiConfig};
use hvacsim::genquiz::GenerateConfig;
use hvacsim::sequencing;
use hvacsim::simulator::types::{LogLevel, SimulatorAction};
use hvacsim::simulator::{SimulatorEngine, format_value, scenarios};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "hvacsim")]
#[command(about = "AC fault-diagnosis training simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in scenarios and quiz questions
    List,

    /// Serve the HTTP control API for one simulator session
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Replay a JSON action script against a scenario and print the log
    Replay {
        /// Scenario id to load
        #[arg(short, long)]
        scenario: String,

        /// Path to a JSON array of simulator actions
        #[arg(short, long)]
        actions: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            run_list();
            ExitCode::SUCCESS
        }
        Commands::Serve { host, port } => run_serve(host, port).await,
        Commands::Replay { scenario, actions } => run_replay(&scenario, &actions),
    }
}

fn run_list() {
    println!("Scenarios:");
    for scenario in scenarios::all_scenarios() {
        println!(
            "  {:<26} [{:?}] {}",
            scenario.id, scenario.difficulty, scenario.title
        );
    }

    println!("\nQuiz questions:");
    for question in sequencing::sample_questions() {
        println!(
            "  {:<26} {} ({} steps)",
            question.id,
            question.title,
            question.correct_sequence.len()
        );
    }
}

async fn run_serve(host: String, port: u16) -> ExitCode {
    let state = api::create_shared_state(GenerateConfig::from_env());
    let config = ApiConfig { host, port };
    match api::serve(config, state).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("server error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_replay(scenario_id: &str, actions_path: &PathBuf) -> ExitCode {
    let Some(scenario) = scenarios::scenario_by_id(scenario_id) else {
        eprintln!("unknown scenario: {scenario_id}");
        return ExitCode::FAILURE;
    };

    let script = match std::fs::read_to_string(actions_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("cannot read {}: {e}", actions_path.display());
            return ExitCode::FAILURE;
        }
    };
    let actions: Vec<SimulatorAction> = match serde_json::from_str(&script) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("invalid action script: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut engine = SimulatorEngine::new();
    engine.load_scenario(scenario);

    for action in actions {
        let result = engine.dispatch(action);
        let marker = if result.success { "ok " } else { "FAIL" };
        println!("[{marker}] {}", result.message);
        if let Some(warning) = &result.safety_warning {
            println!("       safety: {warning}");
        }
    }

    let state = engine.get_state();
    println!("\nSession log:");
    for entry in &state.logs {
        let level = match entry.level {
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Danger => "DANGER",
            LogLevel::Success => "success",
        };
        match &entry.details {
            Some(details) => println!("  [{level:<7}] {} - {details}", entry.message),
            None => println!("  [{level:<7}] {}", entry.message),
        }
    }

    println!("\nMeasurements:");
    for m in &state.measurements {
        println!(
            "  {} = {}",
            m.mode.label(),
            format_value(m.value, m.mode.unit())
        );
    }
    println!(
        "\nComplete: {} (correct diagnosis: {})",
        state.is_complete, state.correct_diagnosis
    );

    ExitCode::SUCCESS
}
