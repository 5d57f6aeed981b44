//! AC Fault-Diagnosis Simulator
//!
//! The engine, its domain types, the fixed component/tool registries, and
//! the scenario store.

pub mod components;
pub mod engine;
pub mod scenarios;
pub mod types;

pub use components::{ComponentSet, all_tools, tool_by_id};
pub use engine::{SimulatorEngine, create_engine, format_value};
pub use types::*;
