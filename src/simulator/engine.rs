//! Fault-Diagnosis Simulation Engine
//!
//! Deterministic state machine over a fixed component set. The engine is
//! the sole writer of `SimulationState`: callers feed `SimulatorAction`
//! values through `dispatch` and re-read the state afterwards. Measurement
//! values come from the loaded scenario's scripted readings, falling back
//! to mode-specific synthetic defaults.

use crate::simulator::components::{ComponentSet, all_tools, tool_by_id};
use crate::simulator::types::*;
use tracing::{debug, warn};
use uuid::Uuid;

fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Outcome of value resolution for one probe placement.
struct Reading {
    value: Option<f64>,
    is_valid: bool,
    error_message: Option<String>,
}

impl Reading {
    fn valid(value: Option<f64>) -> Self {
        Self {
            value,
            is_valid: true,
            error_message: None,
        }
    }

    fn invalid(message: &str) -> Self {
        Self {
            value: None,
            is_valid: false,
            error_message: Some(message.to_string()),
        }
    }
}

/// Safety gate finding raised before a measurement is taken.
struct SafetyFinding {
    level: LogLevel,
    message: String,
    details: String,
    consequence: Option<String>,
}

pub struct SimulatorEngine {
    state: SimulationState,
}

impl SimulatorEngine {
    pub fn new() -> Self {
        Self {
            state: Self::initial_state(),
        }
    }

    fn initial_state() -> SimulationState {
        SimulationState {
            scenario: None,
            components: ComponentSet::new(),
            current_tool: None,
            current_mode: None,
            measurements: Vec::new(),
            logs: Vec::new(),
            safety: SafetyState::default(),
            is_power_on: true,
            is_thermostat_calling: true,
            is_complete: false,
            correct_diagnosis: false,
            start_time: None,
            end_time: None,
        }
    }

    // ------------------------------------------------------------------------
    // State access
    // ------------------------------------------------------------------------

    /// Read-only view of the current state. The borrow checker enforces
    /// what the single-writer contract requires: consumers only read.
    pub fn get_state(&self) -> &SimulationState {
        &self.state
    }

    pub fn get_components_array(&self) -> Vec<Component> {
        self.state.components.iter().cloned().collect()
    }

    pub fn get_available_tools(&self) -> &'static [Tool] {
        all_tools()
    }

    pub fn get_current_tool(&self) -> Option<&'static Tool> {
        self.state.current_tool.map(tool_by_id)
    }

    pub fn get_scenario_symptoms(&self) -> Vec<String> {
        self.state
            .scenario
            .as_ref()
            .map(|s| s.symptoms.clone())
            .unwrap_or_default()
    }

    pub fn get_diagnostic_steps(&self) -> Vec<DiagnosticStep> {
        self.state
            .scenario
            .as_ref()
            .map(|s| s.diagnostic_steps.clone())
            .unwrap_or_default()
    }

    /// The diagnosable fault kinds (`no_fault` is scenario data, not a
    /// diagnosis a learner can submit).
    pub fn get_fault_types(&self) -> [FaultType; 7] {
        [
            FaultType::OpenCircuit,
            FaultType::ShortCircuit,
            FaultType::HighResistance,
            FaultType::FailedCapacitor,
            FaultType::StuckContactor,
            FaultType::BadThermostat,
            FaultType::GroundedWinding,
        ]
    }

    // ------------------------------------------------------------------------
    // Scenario lifecycle
    // ------------------------------------------------------------------------

    /// Replace the whole state with a fresh session for `scenario`.
    /// Malformed scenarios are the data store's responsibility; the engine
    /// does not validate.
    pub fn load_scenario(&mut self, scenario: Scenario) -> ActionResult {
        self.state = Self::initial_state();
        self.state.start_time = Some(chrono::Utc::now().timestamp_millis());

        for fault in &scenario.faults {
            self.state.components.get_mut(fault.component_id).status = ComponentStatus::Faulty;
        }

        let title = scenario.title.clone();
        let description = scenario.description.clone();
        self.state.scenario = Some(scenario);
        self.update_component_states();

        let ts = self.state.start_time.unwrap_or_default();
        let log_entry = self.log(
            ts,
            LogLevel::Info,
            format!("Scenario loaded: {title}"),
            Some(description),
        );

        debug!(scenario = %title, "scenario loaded");
        ActionResult {
            log_entry: Some(log_entry),
            ..ActionResult::ok(format!("Scenario \"{title}\" loaded successfully"))
        }
    }

    /// Reload the currently held scenario. Fails without mutating state
    /// when nothing is loaded.
    pub fn reset_scenario(&mut self) -> ActionResult {
        match self.state.scenario.clone() {
            Some(scenario) => self.load_scenario(scenario),
            None => ActionResult::fail("No scenario loaded to reset"),
        }
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    pub fn dispatch(&mut self, action: SimulatorAction) -> ActionResult {
        match action {
            SimulatorAction::SelectTool { timestamp, tool_id } => {
                self.select_tool(timestamp, tool_id)
            }
            SimulatorAction::SetToolMode { timestamp, mode } => self.set_tool_mode(timestamp, mode),
            SimulatorAction::TakeMeasurement { timestamp, points } => {
                self.take_measurement(timestamp, &points)
            }
            SimulatorAction::DischargeCapacitor {
                timestamp,
                component_id,
            } => self.discharge_capacitor(timestamp, component_id),
            SimulatorAction::TogglePower { timestamp } => self.toggle_power(timestamp),
            SimulatorAction::ToggleThermostat { timestamp, calling } => {
                self.toggle_thermostat(timestamp, calling)
            }
            SimulatorAction::DiagnoseFault {
                timestamp,
                component_id,
                fault_type,
            } => self.diagnose_fault(timestamp, component_id, fault_type),
        }
    }

    // ------------------------------------------------------------------------
    // Tool operations
    // ------------------------------------------------------------------------

    fn select_tool(&mut self, timestamp: i64, tool_id: ToolId) -> ActionResult {
        let tool = tool_by_id(tool_id);
        self.state.current_tool = Some(tool_id);
        self.state.current_mode = Some(tool.modes[0]);

        let log_entry = self.log(
            timestamp,
            LogLevel::Info,
            format!("Selected {}", tool.name),
            None,
        );
        ActionResult {
            log_entry: Some(log_entry),
            ..ActionResult::ok(format!("{} selected", tool.name))
        }
    }

    fn set_tool_mode(&mut self, timestamp: i64, mode: MeasurementMode) -> ActionResult {
        let Some(tool_id) = self.state.current_tool else {
            return ActionResult::fail("No tool selected");
        };

        let tool = tool_by_id(tool_id);
        if !tool.modes.contains(&mode) {
            return ActionResult::fail(format!(
                "Mode {} not available on {}",
                mode.label(),
                tool.name
            ));
        }

        self.state.current_mode = Some(mode);
        let log_entry = self.log(
            timestamp,
            LogLevel::Info,
            format!("Set mode to {}", mode.label()),
            None,
        );
        ActionResult {
            log_entry: Some(log_entry),
            ..ActionResult::ok(format!("Mode set to {}", mode.label()))
        }
    }

    // ------------------------------------------------------------------------
    // Measurements
    // ------------------------------------------------------------------------

    fn take_measurement(&mut self, timestamp: i64, points: &[MeasurementPoint]) -> ActionResult {
        let (Some(tool_id), Some(mode)) = (self.state.current_tool, self.state.current_mode) else {
            return ActionResult::fail("Select a tool and mode first");
        };
        if points.is_empty() || points.len() > 2 {
            return ActionResult::fail("Place one or two probes first");
        }

        if let Some(finding) = self.check_measurement_safety(points) {
            let blocking = finding.level == LogLevel::Danger;
            let log_entry = self.log(
                timestamp,
                finding.level,
                finding.message.clone(),
                Some(finding.details),
            );
            if blocking {
                warn!(message = %finding.message, "measurement blocked by safety gate");
                return ActionResult {
                    log_entry: Some(log_entry),
                    safety_warning: Some(finding.message.clone()),
                    consequence: finding.consequence,
                    ..ActionResult::fail(finding.message)
                };
            }
        }

        let reading = self.resolve_value(points, mode);
        if !reading.is_valid {
            let message = reading
                .error_message
                .unwrap_or_else(|| "Measurement not possible".to_string());
            return ActionResult::fail(message);
        }

        let measurement = Measurement {
            id: generate_id(),
            timestamp,
            tool: tool_id,
            mode,
            points: points.to_vec(),
            value: reading.value,
            unit: mode.unit().to_string(),
            is_valid: true,
            error_message: None,
        };
        self.state.measurements.push(measurement.clone());

        let value_str = format_value(reading.value, mode.unit());
        let log_entry = self.log(
            timestamp,
            LogLevel::Info,
            format!("Measured {}: {value_str}", mode.label()),
            Some(self.describe_location(points)),
        );

        ActionResult {
            log_entry: Some(log_entry),
            measurement: Some(measurement),
            ..ActionResult::ok(format!("Measurement: {value_str}"))
        }
    }

    /// Capacitor charge is a hard stop; live voltage is informational.
    fn check_measurement_safety(&self, points: &[MeasurementPoint]) -> Option<SafetyFinding> {
        for point in points {
            if point.component_id == ComponentId::Capacitor {
                let capacitor = self.state.components.get(ComponentId::Capacitor);
                if capacitor.has_stored_charge && !self.state.safety.capacitor_discharged {
                    return Some(SafetyFinding {
                        level: LogLevel::Danger,
                        message: "DANGER: Capacitor not discharged!".to_string(),
                        details: "The capacitor may hold a lethal charge. Always discharge before testing.".to_string(),
                        consequence: Some(
                            "In a real scenario, this could cause serious injury or death."
                                .to_string(),
                        ),
                    });
                }
            }
        }

        if self.state.is_power_on {
            for point in points {
                if self.state.components.get(point.component_id).has_dangerous_voltage {
                    return Some(SafetyFinding {
                        level: LogLevel::Warning,
                        message: "Warning: live voltage present".to_string(),
                        details: "Use caution when probing energized circuits.".to_string(),
                        consequence: None,
                    });
                }
            }
        }

        None
    }

    /// Scripted readings win over the baseline, which wins over synthetic
    /// defaults. First match in each list applies.
    fn resolve_value(&self, points: &[MeasurementPoint], mode: MeasurementMode) -> Reading {
        let Some(scenario) = &self.state.scenario else {
            return Reading::invalid("No scenario loaded");
        };

        if let Some(value) = find_scripted(&scenario.expected_readings, points, mode) {
            return Reading::valid(Some(value));
        }
        if let Some(value) = find_scripted(&scenario.normal_readings, points, mode) {
            return Reading::valid(Some(value));
        }

        self.synthetic_reading(points, mode)
    }

    /// Mode-specific defaults when the scenario has no scripted value.
    /// Current stays 0 in every synthetic path; nonzero current must come
    /// from scenario data.
    fn synthetic_reading(&self, points: &[MeasurementPoint], mode: MeasurementMode) -> Reading {
        let component = self.state.components.get(points[0].component_id);

        match mode {
            MeasurementMode::VoltageAc => {
                if !self.state.is_power_on {
                    return Reading::valid(Some(0.0));
                }
                if component.is_energized && component.has_dangerous_voltage {
                    return Reading::valid(Some(240.0));
                }
                Reading::valid(Some(0.0))
            }
            MeasurementMode::VoltageDc => Reading::valid(Some(0.0)),
            MeasurementMode::Resistance => {
                if self.state.is_power_on {
                    return Reading::invalid("Turn off power for resistance measurement");
                }
                Reading::valid(None)
            }
            MeasurementMode::Continuity => {
                if self.state.is_power_on {
                    return Reading::invalid("Turn off power for continuity test");
                }
                Reading::valid(None)
            }
            MeasurementMode::Capacitance => {
                if points[0].component_id == ComponentId::Capacitor {
                    if !self.state.safety.capacitor_discharged {
                        return Reading::invalid("Discharge capacitor first");
                    }
                    // Nominal healthy value; a faulted capacitor reads low
                    // only when the scenario scripts it.
                    return Reading::valid(Some(45.0));
                }
                Reading::valid(Some(0.0))
            }
            MeasurementMode::CurrentAc | MeasurementMode::CurrentDc => Reading::valid(Some(0.0)),
        }
    }

    fn describe_location(&self, points: &[MeasurementPoint]) -> String {
        let first = self.state.components.get(points[0].component_id);
        match points.get(1) {
            Some(second_point) => {
                let second = self.state.components.get(second_point.component_id);
                format!(
                    "{}:{} to {}:{}",
                    first.name, points[0].terminal_id, second.name, second_point.terminal_id
                )
            }
            None => format!("{}:{}", first.name, points[0].terminal_id),
        }
    }

    // ------------------------------------------------------------------------
    // Safety operations
    // ------------------------------------------------------------------------

    fn discharge_capacitor(&mut self, timestamp: i64, component_id: ComponentId) -> ActionResult {
        if component_id != ComponentId::Capacitor {
            return ActionResult::fail("Can only discharge capacitor component");
        }

        if self.state.is_power_on {
            let log_entry = self.log(
                timestamp,
                LogLevel::Warning,
                "Cannot safely discharge capacitor with power on".to_string(),
                Some("Turn off power before discharging the capacitor".to_string()),
            );
            warn!("discharge attempted with power on");
            return ActionResult {
                log_entry: Some(log_entry),
                safety_warning: Some("Power must be off to safely discharge capacitor".to_string()),
                ..ActionResult::fail("Turn off power before discharging")
            };
        }

        self.state
            .components
            .get_mut(ComponentId::Capacitor)
            .has_stored_charge = false;
        self.state.safety.capacitor_discharged = true;

        let log_entry = self.log(
            timestamp,
            LogLevel::Success,
            "Capacitor safely discharged".to_string(),
            Some("Bleed resistor placed across the HERM and C terminals".to_string()),
        );
        ActionResult {
            log_entry: Some(log_entry),
            ..ActionResult::ok("Capacitor discharged safely")
        }
    }

    fn toggle_power(&mut self, timestamp: i64) -> ActionResult {
        self.state.is_power_on = !self.state.is_power_on;
        self.state.safety.power_isolated = !self.state.is_power_on;

        // Re-energizing recharges the capacitor.
        if self.state.is_power_on {
            self.state
                .components
                .get_mut(ComponentId::Capacitor)
                .has_stored_charge = true;
            self.state.safety.capacitor_discharged = false;
        }

        self.update_component_states();

        let (status, level, details) = if self.state.is_power_on {
            ("ON", LogLevel::Warning, "System is now energized - use caution")
        } else {
            ("OFF", LogLevel::Success, "System is de-energized - safe to work on")
        };
        let log_entry = self.log(
            timestamp,
            level,
            format!("Power {status}"),
            Some(details.to_string()),
        );
        ActionResult {
            log_entry: Some(log_entry),
            ..ActionResult::ok(format!("Power turned {status}"))
        }
    }

    fn toggle_thermostat(&mut self, timestamp: i64, calling: bool) -> ActionResult {
        self.state.is_thermostat_calling = calling;
        self.update_component_states();

        let status = if calling {
            "calling for cooling"
        } else {
            "satisfied (not calling)"
        };
        let log_entry = self.log(timestamp, LogLevel::Info, format!("Thermostat {status}"), None);
        ActionResult {
            log_entry: Some(log_entry),
            ..ActionResult::ok(format!("Thermostat set to {status}"))
        }
    }

    // ------------------------------------------------------------------------
    // Derived energization
    // ------------------------------------------------------------------------

    /// Recompute every component's derived booleans from
    /// (power, thermostat, faults). Whole-set recomputation keeps the
    /// energization state a pure function of those inputs.
    fn update_component_states(&mut self) {
        let power = self.state.is_power_on;
        let calling = self.state.is_thermostat_calling;
        let compressor_faulty = self.is_component_faulty(ComponentId::Compressor);
        let outdoor_fan_faulty = self.is_component_faulty(ComponentId::OutdoorFan);

        for id in ComponentId::ALL {
            let stored_charge = self.state.components.get(id).has_stored_charge;
            let component = self.state.components.get_mut(id);
            let (energized, dangerous) = match id {
                ComponentId::PowerSupply => (power, power),
                // 24V control loop, never a shock hazard.
                ComponentId::Thermostat => (power, false),
                ComponentId::Contactor => (power && calling, power),
                ComponentId::Capacitor => (power && calling, power || stored_charge),
                ComponentId::Compressor => {
                    (power && calling && !compressor_faulty, power && calling)
                }
                ComponentId::IndoorFan => (power && calling, power),
                ComponentId::OutdoorFan => {
                    (power && calling && !outdoor_fan_faulty, power && calling)
                }
            };
            component.is_energized = energized;
            component.has_dangerous_voltage = dangerous;
        }
    }

    fn is_component_faulty(&self, component_id: ComponentId) -> bool {
        self.state
            .scenario
            .as_ref()
            .is_some_and(|s| s.faults.iter().any(|f| f.component_id == component_id))
    }

    // ------------------------------------------------------------------------
    // Diagnosis
    // ------------------------------------------------------------------------

    fn diagnose_fault(
        &mut self,
        timestamp: i64,
        component_id: ComponentId,
        fault_type: FaultType,
    ) -> ActionResult {
        let Some(scenario) = &self.state.scenario else {
            return ActionResult::fail("No scenario loaded");
        };

        let matched = scenario
            .faults
            .iter()
            .find(|f| f.component_id == component_id && f.fault_type == fault_type)
            .cloned();

        match matched {
            Some(fault) => {
                self.state.is_complete = true;
                self.state.correct_diagnosis = true;
                self.state.end_time = Some(timestamp);

                let elapsed_s = self
                    .state
                    .start_time
                    .map(|start| ((timestamp - start).max(0) / 1000) as u64)
                    .unwrap_or(0);
                let details = format!(
                    "Completed in {}m {}s with {} measurements",
                    elapsed_s / 60,
                    elapsed_s % 60,
                    self.state.measurements.len()
                );

                let log_entry = self.log(
                    timestamp,
                    LogLevel::Success,
                    format!("Correct diagnosis! {}", fault.description),
                    Some(details),
                );
                ActionResult {
                    log_entry: Some(log_entry),
                    ..ActionResult::ok("Correct diagnosis!")
                }
            }
            None => {
                let component_name = self.state.components.get(component_id).name.clone();
                let log_entry = self.log(
                    timestamp,
                    LogLevel::Warning,
                    format!(
                        "Incorrect diagnosis: {component_name} - {}",
                        fault_type.as_str()
                    ),
                    Some("Review your measurements and try again".to_string()),
                );
                ActionResult {
                    log_entry: Some(log_entry),
                    ..ActionResult::fail("Incorrect diagnosis. Keep investigating.")
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Log helper
    // ------------------------------------------------------------------------

    fn log(
        &mut self,
        timestamp: i64,
        level: LogLevel,
        message: String,
        details: Option<String>,
    ) -> LogEntry {
        let entry = LogEntry {
            id: generate_id(),
            timestamp,
            level,
            message,
            details,
        };
        self.state.logs.push(entry.clone());
        entry
    }
}

impl Default for SimulatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Fresh engine with empty initial state, no scenario loaded.
pub fn create_engine() -> SimulatorEngine {
    SimulatorEngine::new()
}

/// `OL` is the display convention for an open-line (`None`) value.
pub fn format_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.2} {unit}").trim_end().to_string(),
        None => "OL".to_string(),
    }
}

/// Match probe points against one scripted reading. Two-point placements
/// match with either probe orientation.
fn points_match(points: &[MeasurementPoint], reading: &ExpectedReading) -> bool {
    match points {
        [a, b] => {
            a.component_id == reading.component_id
                && b.component_id == reading.component_id
                && ((a.terminal_id == reading.terminal_from && b.terminal_id == reading.terminal_to)
                    || (a.terminal_id == reading.terminal_to
                        && b.terminal_id == reading.terminal_from))
        }
        [single] => {
            single.component_id == reading.component_id
                && single.terminal_id == reading.terminal_from
        }
        _ => false,
    }
}

fn find_scripted(
    readings: &[ExpectedReading],
    points: &[MeasurementPoint],
    mode: MeasurementMode,
) -> Option<f64> {
    readings
        .iter()
        .find(|r| r.mode == mode && points_match(points, r))
        .map(|r| r.value)
}
