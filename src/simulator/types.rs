//! Simulator Domain Types
//!
//! Serde-backed types shared by the engine, the scenario store, and the
//! control API. Field names serialize as camelCase to stay compatible with
//! the scenario JSON format consumed by view layers.

use serde::{Deserialize, Serialize};

// ============================================================================
// Components
// ============================================================================

/// Closed set of electrical parts in the simulated condensing unit.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ComponentId {
    PowerSupply,
    Thermostat,
    Contactor,
    Capacitor,
    Compressor,
    IndoorFan,
    OutdoorFan,
}

impl ComponentId {
    /// All component ids, in registry order.
    pub const ALL: [ComponentId; 7] = [
        ComponentId::PowerSupply,
        ComponentId::Thermostat,
        ComponentId::Contactor,
        ComponentId::Capacitor,
        ComponentId::Compressor,
        ComponentId::IndoorFan,
        ComponentId::OutdoorFan,
    ];

    /// Stable ordinal used to index the component arena.
    pub fn index(self) -> usize {
        match self {
            ComponentId::PowerSupply => 0,
            ComponentId::Thermostat => 1,
            ComponentId::Contactor => 2,
            ComponentId::Capacitor => 3,
            ComponentId::Compressor => 4,
            ComponentId::IndoorFan => 5,
            ComponentId::OutdoorFan => 6,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    Operational,
    Faulty,
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TerminalType {
    Line,
    Load,
    Common,
    Run,
    Start,
    Signal,
    Ground,
}

/// Named, typed connection point where measurement probes attach.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Terminal {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub terminal_type: TerminalType,
}

/// One electrical part plus its derived energization state.
///
/// `is_energized`, `has_dangerous_voltage` and `has_stored_charge` are
/// recomputed from power/thermostat/fault state after every mutating
/// action; only the discharge action writes them directly.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    pub description: String,
    pub terminals: Vec<Terminal>,
    pub status: ComponentStatus,
    pub is_energized: bool,
    pub has_dangerous_voltage: bool,
    pub has_stored_charge: bool,
}

// ============================================================================
// Tools
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    Multimeter,
    ClampMeter,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementMode {
    VoltageAc,
    VoltageDc,
    Resistance,
    Continuity,
    Capacitance,
    CurrentAc,
    CurrentDc,
}

impl MeasurementMode {
    /// Display unit for readings taken in this mode.
    pub fn unit(self) -> &'static str {
        match self {
            MeasurementMode::VoltageAc | MeasurementMode::VoltageDc => "V",
            MeasurementMode::Resistance => "Ω",
            MeasurementMode::Continuity => "",
            MeasurementMode::Capacitance => "µF",
            MeasurementMode::CurrentAc | MeasurementMode::CurrentDc => "A",
        }
    }

    /// Human-readable mode name for log lines.
    pub fn label(self) -> &'static str {
        match self {
            MeasurementMode::VoltageAc => "AC Voltage",
            MeasurementMode::VoltageDc => "DC Voltage",
            MeasurementMode::Resistance => "Resistance",
            MeasurementMode::Continuity => "Continuity",
            MeasurementMode::Capacitance => "Capacitance",
            MeasurementMode::CurrentAc => "AC Current",
            MeasurementMode::CurrentDc => "DC Current",
        }
    }
}

/// Instrument definition from the fixed tool registry.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub id: ToolId,
    pub name: String,
    pub description: String,
    pub modes: Vec<MeasurementMode>,
    pub icon: String,
}

// ============================================================================
// Measurements
// ============================================================================

/// Probe placement: one component terminal.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementPoint {
    pub component_id: ComponentId,
    pub terminal_id: String,
}

/// A completed reading. `value: None` is the OL (open line) sentinel.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub id: String,
    pub timestamp: i64,
    pub tool: ToolId,
    pub mode: MeasurementMode,
    pub points: Vec<MeasurementPoint>,
    pub value: Option<f64>,
    pub unit: String,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

// ============================================================================
// Log
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warning,
    Danger,
    Success,
}

/// Append-only audit trail entry.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub timestamp: i64,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// ============================================================================
// Scenarios
// ============================================================================

/// Closed vocabulary of diagnosable failure modes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FaultType {
    OpenCircuit,
    ShortCircuit,
    HighResistance,
    FailedCapacitor,
    StuckContactor,
    BadThermostat,
    GroundedWinding,
    NoFault,
}

impl FaultType {
    /// Wire-format token, used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            FaultType::OpenCircuit => "open_circuit",
            FaultType::ShortCircuit => "short_circuit",
            FaultType::HighResistance => "high_resistance",
            FaultType::FailedCapacitor => "failed_capacitor",
            FaultType::StuckContactor => "stuck_contactor",
            FaultType::BadThermostat => "bad_thermostat",
            FaultType::GroundedWinding => "grounded_winding",
            FaultType::NoFault => "no_fault",
        }
    }
}

/// One seeded defect: the answer key for diagnosis.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Fault {
    pub component_id: ComponentId,
    #[serde(rename = "type")]
    pub fault_type: FaultType,
    pub description: String,
}

/// Scripted reading for a specific probe placement and mode.
///
/// Two-point placements match symmetrically (from→to equals to→from);
/// single-point placements match on `terminal_from` alone.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedReading {
    pub component_id: ComponentId,
    pub terminal_from: String,
    pub terminal_to: String,
    pub mode: MeasurementMode,
    pub value: f64,
    /// Tolerance in percent, carried for view-layer grading.
    pub tolerance: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticStep {
    pub order: u32,
    pub description: String,
    pub action: String,
    pub expected_result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Immutable scenario record. The engine treats this as read-only input;
/// validation happens in the scenario store before loading.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub symptoms: Vec<String>,
    pub faults: Vec<Fault>,
    pub expected_readings: Vec<ExpectedReading>,
    pub normal_readings: Vec<ExpectedReading>,
    pub diagnostic_steps: Vec<DiagnosticStep>,
    pub learning_objectives: Vec<String>,
}

// ============================================================================
// Simulation State
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SafetyState {
    pub capacitor_discharged: bool,
    pub power_isolated: bool,
    pub warnings_acknowledged: Vec<String>,
}

/// The single mutable aggregate, owned exclusively by the engine.
/// Consumers read snapshots; nothing outside the engine writes here.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SimulationState {
    pub scenario: Option<Scenario>,
    pub components: super::components::ComponentSet,
    pub current_tool: Option<ToolId>,
    pub current_mode: Option<MeasurementMode>,
    pub measurements: Vec<Measurement>,
    pub logs: Vec<LogEntry>,
    pub safety: SafetyState,
    pub is_power_on: bool,
    pub is_thermostat_calling: bool,
    pub is_complete: bool,
    pub correct_diagnosis: bool,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

// ============================================================================
// Action Protocol
// ============================================================================

/// User intents consumed by `SimulatorEngine::dispatch`.
///
/// The tag set is closed: an unknown `type` fails serde deserialization at
/// the API boundary, so the engine's match stays exhaustive.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum SimulatorAction {
    SelectTool {
        timestamp: i64,
        tool_id: ToolId,
    },
    SetToolMode {
        timestamp: i64,
        mode: MeasurementMode,
    },
    TakeMeasurement {
        timestamp: i64,
        points: Vec<MeasurementPoint>,
    },
    DischargeCapacitor {
        timestamp: i64,
        component_id: ComponentId,
    },
    TogglePower {
        timestamp: i64,
    },
    ToggleThermostat {
        timestamp: i64,
        calling: bool,
    },
    DiagnoseFault {
        timestamp: i64,
        component_id: ComponentId,
        fault_type: FaultType,
    },
}

impl SimulatorAction {
    /// Caller-supplied timestamp carried by every action variant.
    pub fn timestamp(&self) -> i64 {
        match *self {
            SimulatorAction::SelectTool { timestamp, .. }
            | SimulatorAction::SetToolMode { timestamp, .. }
            | SimulatorAction::TakeMeasurement { timestamp, .. }
            | SimulatorAction::DischargeCapacitor { timestamp, .. }
            | SimulatorAction::TogglePower { timestamp }
            | SimulatorAction::ToggleThermostat { timestamp, .. }
            | SimulatorAction::DiagnoseFault { timestamp, .. } => timestamp,
        }
    }
}

// ============================================================================
// Result Protocol
// ============================================================================

/// Structured outcome of one dispatched action.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_entry: Option<LogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement: Option<Measurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consequence: Option<String>,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            log_entry: None,
            measurement: None,
            safety_warning: None,
            consequence: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            log_entry: None,
            measurement: None,
            safety_warning: None,
            consequence: None,
        }
    }
}
