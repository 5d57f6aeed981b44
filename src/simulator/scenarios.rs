//! Scenario Store
//!
//! Built-in training scenarios plus parsing/validation for externally
//! supplied scenario JSON. Validation lives here; the engine trusts every
//! `Scenario` it is handed.

use crate::simulator::types::{
    ComponentId, DiagnosticStep, Difficulty, ExpectedReading, Fault, FaultType, MeasurementMode,
    Scenario,
};

fn fault(component_id: ComponentId, fault_type: FaultType, description: &str) -> Fault {
    Fault {
        component_id,
        fault_type,
        description: description.to_string(),
    }
}

fn reading(
    component_id: ComponentId,
    from: &str,
    to: &str,
    mode: MeasurementMode,
    value: f64,
    tolerance: f64,
) -> ExpectedReading {
    ExpectedReading {
        component_id,
        terminal_from: from.to_string(),
        terminal_to: to.to_string(),
        mode,
        value,
        tolerance,
    }
}

fn step(order: u32, description: &str, action: &str, expected_result: &str, hint: Option<&str>) -> DiagnosticStep {
    DiagnosticStep {
        order,
        description: description.to_string(),
        action: action.to_string(),
        expected_result: expected_result.to_string(),
        hint: hint.map(str::to_string),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Built-in Scenarios
// ============================================================================

fn failed_capacitor() -> Scenario {
    Scenario {
        id: "failed-capacitor".to_string(),
        title: "Failed Run Capacitor".to_string(),
        description: "The outdoor unit hums but the compressor never starts. Find the failed part."
            .to_string(),
        difficulty: Difficulty::Beginner,
        symptoms: strings(&[
            "Outdoor unit hums but the compressor does not start",
            "Condenser fan struggles to spin up",
            "Breaker has not tripped",
        ]),
        faults: vec![fault(
            ComponentId::Capacitor,
            FaultType::FailedCapacitor,
            "Run capacitor has lost most of its capacitance and cannot start the compressor",
        )],
        expected_readings: vec![
            reading(ComponentId::Capacitor, "C", "HERM", MeasurementMode::Capacitance, 12.3, 5.0),
            reading(ComponentId::Capacitor, "C", "FAN", MeasurementMode::Capacitance, 3.1, 5.0),
        ],
        normal_readings: vec![
            reading(ComponentId::PowerSupply, "L1", "L2", MeasurementMode::VoltageAc, 240.0, 5.0),
            reading(ComponentId::Contactor, "L1_IN", "L2_IN", MeasurementMode::VoltageAc, 240.0, 5.0),
            reading(ComponentId::Thermostat, "R", "C", MeasurementMode::VoltageAc, 24.0, 10.0),
        ],
        diagnostic_steps: vec![
            step(
                1,
                "Confirm supply voltage at the disconnect",
                "Measure AC voltage across L1 and L2",
                "About 240V",
                None,
            ),
            step(
                2,
                "Isolate the unit",
                "Turn off power at the disconnect",
                "Power off, safe to open the panel",
                None,
            ),
            step(
                3,
                "Discharge the run capacitor",
                "Bleed the capacitor before touching its terminals",
                "No stored charge remains",
                Some("Capacitors hold a charge long after power is removed"),
            ),
            step(
                4,
                "Measure capacitance on both sections",
                "Check C to HERM and C to FAN in capacitance mode",
                "Well below the nameplate rating",
                Some("Compare against the 45 µF HERM / 5 µF FAN rating"),
            ),
        ],
        learning_objectives: strings(&[
            "Discharge a capacitor safely before testing",
            "Measure capacitance against the nameplate rating",
            "Distinguish a failed capacitor from a failed compressor",
        ]),
    }
}

fn stuck_contactor() -> Scenario {
    Scenario {
        id: "stuck-contactor".to_string(),
        title: "Welded Contactor Contacts".to_string(),
        description:
            "The compressor keeps running even when the thermostat is satisfied. Trace the control circuit."
                .to_string(),
        difficulty: Difficulty::Intermediate,
        symptoms: strings(&[
            "Compressor runs even when the thermostat is satisfied",
            "Unit never cycles off",
            "House gets colder than the setpoint",
        ]),
        faults: vec![fault(
            ComponentId::Contactor,
            FaultType::StuckContactor,
            "Contactor contacts are welded closed and pass power with no call for cooling",
        )],
        expected_readings: vec![reading(
            ComponentId::Contactor,
            "L1_OUT",
            "L2_OUT",
            MeasurementMode::VoltageAc,
            240.0,
            5.0,
        )],
        normal_readings: vec![
            reading(ComponentId::PowerSupply, "L1", "L2", MeasurementMode::VoltageAc, 240.0, 5.0),
            reading(ComponentId::Thermostat, "R", "C", MeasurementMode::VoltageAc, 24.0, 10.0),
            reading(ComponentId::Contactor, "COIL_1", "COIL_2", MeasurementMode::Resistance, 18.5, 10.0),
        ],
        diagnostic_steps: vec![
            step(
                1,
                "Set the thermostat so it stops calling",
                "Toggle the thermostat to satisfied",
                "Compressor should stop but does not",
                None,
            ),
            step(
                2,
                "Check the contactor load side",
                "Measure AC voltage across L1_OUT and L2_OUT with no call",
                "240V on the load side with the coil de-energized",
                Some("Load-side voltage with no call means the contacts are closed"),
            ),
            step(
                3,
                "Verify the coil is intact",
                "Power off, then measure coil resistance",
                "A normal coil resistance, the coil is not the problem",
                None,
            ),
        ],
        learning_objectives: strings(&[
            "Separate control-circuit faults from load-side faults",
            "Recognize welded contacts from load-side voltage with no call",
        ]),
    }
}

fn compressor_open_winding() -> Scenario {
    Scenario {
        id: "compressor-open-winding".to_string(),
        title: "Compressor Open Winding".to_string(),
        description:
            "Power reaches the compressor but it draws no current. Prove the winding is open."
                .to_string(),
        difficulty: Difficulty::Advanced,
        symptoms: strings(&[
            "Condenser fan runs but the compressor is silent",
            "No cooling at the registers",
            "No breaker trips or fuses blown",
        ]),
        faults: vec![fault(
            ComponentId::Compressor,
            FaultType::OpenCircuit,
            "Compressor start winding is open internally",
        )],
        expected_readings: vec![reading(
            ComponentId::Compressor,
            "C",
            "",
            MeasurementMode::CurrentAc,
            0.0,
            0.0,
        )],
        normal_readings: vec![
            reading(ComponentId::PowerSupply, "L1", "L2", MeasurementMode::VoltageAc, 240.0, 5.0),
            reading(ComponentId::Contactor, "L1_OUT", "L2_OUT", MeasurementMode::VoltageAc, 240.0, 5.0),
            reading(ComponentId::Compressor, "C", "R", MeasurementMode::Resistance, 2.4, 10.0),
        ],
        diagnostic_steps: vec![
            step(
                1,
                "Confirm the contactor is delivering power",
                "Measure AC voltage across the contactor load side while calling",
                "About 240V",
                None,
            ),
            step(
                2,
                "Clamp the compressor common wire",
                "Measure AC current at the compressor C terminal",
                "0 A while commanded on",
                Some("Voltage present with zero draw points inside the compressor"),
            ),
            step(
                3,
                "Ohm out the windings with power off",
                "Measure resistance C to R and C to S",
                "C-R reads a few ohms, C-S reads OL",
                Some("An OL winding is an open circuit"),
            ),
        ],
        learning_objectives: strings(&[
            "Use a clamp meter to confirm zero current draw",
            "Identify an open winding from an OL resistance reading",
            "Work through a fault that needs more than one instrument",
        ]),
    }
}

fn outdoor_fan_failure() -> Scenario {
    Scenario {
        id: "outdoor-fan-failure".to_string(),
        title: "Condenser Fan Failure".to_string(),
        description:
            "The compressor runs but the condenser fan never spins, and head pressure climbs."
                .to_string(),
        difficulty: Difficulty::Intermediate,
        symptoms: strings(&[
            "Compressor runs but the outdoor fan blade never moves",
            "Unit trips on high pressure after a few minutes",
            "Fan blade spins freely by hand with power off",
        ]),
        faults: vec![fault(
            ComponentId::OutdoorFan,
            FaultType::OpenCircuit,
            "Condenser fan motor winding is open",
        )],
        expected_readings: vec![reading(
            ComponentId::OutdoorFan,
            "L",
            "",
            MeasurementMode::CurrentAc,
            0.0,
            0.0,
        )],
        normal_readings: vec![
            reading(ComponentId::OutdoorFan, "L", "N", MeasurementMode::VoltageAc, 240.0, 5.0),
            reading(ComponentId::Capacitor, "C", "FAN", MeasurementMode::Capacitance, 5.0, 6.0),
            reading(ComponentId::Capacitor, "C", "HERM", MeasurementMode::Capacitance, 45.0, 6.0),
        ],
        diagnostic_steps: vec![
            step(
                1,
                "Confirm voltage at the fan motor",
                "Measure AC voltage across the motor L and N leads",
                "About 240V at the motor",
                None,
            ),
            step(
                2,
                "Rule out the capacitor fan section",
                "Power off, discharge, then measure C to FAN capacitance",
                "Close to the 5 µF rating",
                None,
            ),
            step(
                3,
                "Ohm the motor windings",
                "Measure resistance across the motor leads with power off",
                "OL on the open winding",
                Some("Voltage in, no current, good capacitor: the motor itself is open"),
            ),
        ],
        learning_objectives: strings(&[
            "Isolate a motor fault from its run capacitor",
            "Confirm an open motor winding",
        ]),
    }
}

fn thermostat_failure() -> Scenario {
    Scenario {
        id: "thermostat-failure".to_string(),
        title: "Dead Thermostat Call".to_string(),
        description:
            "Nothing runs on a hot day. Decide whether the thermostat is actually asking for cooling."
                .to_string(),
        difficulty: Difficulty::Beginner,
        symptoms: strings(&[
            "System never starts even on a hot day",
            "Thermostat display is lit",
            "Indoor and outdoor units are both silent",
        ]),
        faults: vec![fault(
            ComponentId::Thermostat,
            FaultType::BadThermostat,
            "Thermostat cooling contacts no longer close the Y circuit",
        )],
        expected_readings: vec![reading(
            ComponentId::Thermostat,
            "Y",
            "C",
            MeasurementMode::VoltageAc,
            0.0,
            0.0,
        )],
        normal_readings: vec![reading(
            ComponentId::Thermostat,
            "R",
            "C",
            MeasurementMode::VoltageAc,
            24.0,
            10.0,
        )],
        diagnostic_steps: vec![
            step(
                1,
                "Verify the 24V control supply",
                "Measure AC voltage from R to C",
                "About 24V",
                Some("No R-to-C voltage would point at the transformer instead"),
            ),
            step(
                2,
                "Check the cooling call output",
                "Measure AC voltage from Y to C with the thermostat calling",
                "0V even though the thermostat is calling",
                Some("24V in, 0V out across the call contacts"),
            ),
        ],
        learning_objectives: strings(&[
            "Trace the 24V control circuit",
            "Distinguish a dead thermostat from a dead transformer",
        ]),
    }
}

// ============================================================================
// Store API
// ============================================================================

/// All built-in scenarios, in teaching order.
pub fn all_scenarios() -> Vec<Scenario> {
    vec![
        failed_capacitor(),
        thermostat_failure(),
        stuck_contactor(),
        outdoor_fan_failure(),
        compressor_open_winding(),
    ]
}

pub fn scenario_by_id(id: &str) -> Option<Scenario> {
    all_scenarios().into_iter().find(|s| s.id == id)
}

pub fn scenarios_by_difficulty(difficulty: Difficulty) -> Vec<Scenario> {
    all_scenarios()
        .into_iter()
        .filter(|s| s.difficulty == difficulty)
        .collect()
}

/// Parse an external scenario record from JSON.
pub fn parse_scenario(json: &str) -> Result<Scenario, serde_json::Error> {
    serde_json::from_str(json)
}

/// Shallow shape check for untyped scenario JSON, run before parsing
/// records from outside the crate. The engine itself never validates.
pub fn validate_scenario(value: &serde_json::Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };

    let has_str = |key: &str| obj.get(key).is_some_and(|v| v.is_string());
    let has_array = |key: &str| obj.get(key).is_some_and(|v| v.is_array());

    has_str("id")
        && has_str("title")
        && has_str("description")
        && obj
            .get("difficulty")
            .and_then(|v| v.as_str())
            .is_some_and(|d| matches!(d, "beginner" | "intermediate" | "advanced"))
        && has_array("symptoms")
        && has_array("faults")
        && has_array("expectedReadings")
        && has_array("diagnosticSteps")
        && has_array("learningObjectives")
}
