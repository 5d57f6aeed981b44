//! hvacsim - AC Fault-Diagnosis Training Simulator
//!
//! A deterministic training simulator for AC-unit electrical diagnostics:
//! a scripted fault-diagnosis engine with a virtual multimeter, plus a
//! pure sequencing-quiz reducer. The `api` module wraps one engine session
//! in a REST control surface; `genquiz` generates new quiz questions
//! through an external completion API.

pub mod api;
pub mod genquiz;
pub mod sequencing;
pub mod simulator;

pub use simulator::{SimulatorEngine, create_engine};
