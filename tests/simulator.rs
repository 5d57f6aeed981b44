//! Engine integration tests: scenario lifecycle, safety gates, scripted
//! vs synthetic readings, and diagnosis through the public API.

use hvacsim::simulator::scenarios::{all_scenarios, scenario_by_id};
use hvacsim::simulator::types::*;
use hvacsim::simulator::SimulatorEngine;

fn now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn point(component_id: ComponentId, terminal_id: &str) -> MeasurementPoint {
    MeasurementPoint {
        component_id,
        terminal_id: terminal_id.to_string(),
    }
}

fn select(engine: &mut SimulatorEngine, tool_id: ToolId) {
    let result = engine.dispatch(SimulatorAction::SelectTool {
        timestamp: now(),
        tool_id,
    });
    assert!(result.success);
}

fn set_mode(engine: &mut SimulatorEngine, mode: MeasurementMode) {
    let result = engine.dispatch(SimulatorAction::SetToolMode {
        timestamp: now(),
        mode,
    });
    assert!(result.success, "{}", result.message);
}

fn measure(engine: &mut SimulatorEngine, points: Vec<MeasurementPoint>) -> ActionResult {
    engine.dispatch(SimulatorAction::TakeMeasurement {
        timestamp: now(),
        points,
    })
}

fn power_off(engine: &mut SimulatorEngine) {
    assert!(engine.get_state().is_power_on, "power already off");
    let result = engine.dispatch(SimulatorAction::TogglePower { timestamp: now() });
    assert!(result.success);
}

fn discharge(engine: &mut SimulatorEngine) -> ActionResult {
    engine.dispatch(SimulatorAction::DischargeCapacitor {
        timestamp: now(),
        component_id: ComponentId::Capacitor,
    })
}

fn loaded_engine(id: &str) -> SimulatorEngine {
    let mut engine = SimulatorEngine::new();
    let result = engine.load_scenario(scenario_by_id(id).unwrap());
    assert!(result.success);
    engine
}

// ============================================================================
// Scenario lifecycle
// ============================================================================

#[test]
fn load_marks_only_faulted_components() {
    let engine = loaded_engine("failed-capacitor");
    let state = engine.get_state();

    assert_eq!(
        state.components.get(ComponentId::Capacitor).status,
        ComponentStatus::Faulty
    );
    for id in ComponentId::ALL {
        if id != ComponentId::Capacitor {
            assert_eq!(state.components.get(id).status, ComponentStatus::Unknown);
        }
    }
    assert_eq!(state.logs.len(), 1);
    assert_eq!(state.logs[0].level, LogLevel::Info);
    assert!(state.start_time.is_some());
}

#[test]
fn reset_without_scenario_fails_without_mutation() {
    let mut engine = SimulatorEngine::new();
    let result = engine.reset_scenario();
    assert!(!result.success);
    assert!(engine.get_state().logs.is_empty());
    assert!(engine.get_state().scenario.is_none());
}

#[test]
fn reset_reproduces_a_fresh_load() {
    let mut engine = loaded_engine("failed-capacitor");

    // Churn the session: tool, power, discharge, a reading, a wrong guess.
    select(&mut engine, ToolId::Multimeter);
    power_off(&mut engine);
    assert!(discharge(&mut engine).success);
    set_mode(&mut engine, MeasurementMode::Capacitance);
    assert!(measure(&mut engine, vec![
        point(ComponentId::Capacitor, "C"),
        point(ComponentId::Capacitor, "HERM"),
    ])
    .success);
    engine.dispatch(SimulatorAction::DiagnoseFault {
        timestamp: now(),
        component_id: ComponentId::Compressor,
        fault_type: FaultType::OpenCircuit,
    });

    assert!(engine.reset_scenario().success);
    let state = engine.get_state();
    let fresh = loaded_engine("failed-capacitor");
    let fresh_state = fresh.get_state();

    for id in ComponentId::ALL {
        let a = state.components.get(id);
        let b = fresh_state.components.get(id);
        assert_eq!(a.status, b.status);
        assert_eq!(a.is_energized, b.is_energized);
        assert_eq!(a.has_dangerous_voltage, b.has_dangerous_voltage);
        assert_eq!(a.has_stored_charge, b.has_stored_charge);
    }
    assert!(state.measurements.is_empty());
    assert_eq!(state.logs.len(), 1);
    assert_eq!(state.current_tool, None);
    assert_eq!(state.current_mode, None);
    assert!(state.is_power_on);
    assert!(state.is_thermostat_calling);
    assert!(!state.is_complete);
    assert!(!state.correct_diagnosis);
    assert!(!state.safety.capacitor_discharged);
    assert!(!state.safety.power_isolated);
}

// ============================================================================
// Derived energization
// ============================================================================

/// Independent rendition of the energization table, for cross-checking.
fn expect_energized(id: ComponentId, power: bool, calling: bool, faults: &[ComponentId]) -> bool {
    match id {
        ComponentId::PowerSupply | ComponentId::Thermostat => power,
        ComponentId::Contactor | ComponentId::Capacitor | ComponentId::IndoorFan => {
            power && calling
        }
        ComponentId::Compressor | ComponentId::OutdoorFan => {
            power && calling && !faults.contains(&id)
        }
    }
}

#[test]
fn energization_is_a_pure_function_of_power_thermostat_and_faults() {
    for scenario_record in all_scenarios() {
        let faults: Vec<ComponentId> = scenario_record
            .faults
            .iter()
            .map(|f| f.component_id)
            .collect();

        let mut engine = SimulatorEngine::new();
        engine.load_scenario(scenario_record);

        // Walk through every (power, calling) combination twice over.
        let toggles = [
            (false, true),
            (false, false),
            (true, false),
            (true, true),
            (false, true),
            (true, true),
        ];
        for (want_power, want_calling) in toggles {
            if engine.get_state().is_power_on != want_power {
                engine.dispatch(SimulatorAction::TogglePower { timestamp: now() });
            }
            engine.dispatch(SimulatorAction::ToggleThermostat {
                timestamp: now(),
                calling: want_calling,
            });

            let state = engine.get_state();
            for id in ComponentId::ALL {
                assert_eq!(
                    state.components.get(id).is_energized,
                    expect_energized(id, want_power, want_calling, &faults),
                    "{id:?} with power={want_power} calling={want_calling}"
                );
            }
            assert!(
                !state.components.get(ComponentId::Thermostat).has_dangerous_voltage,
                "24V control loop is never a shock hazard"
            );
        }
    }
}

#[test]
fn power_on_recharges_the_capacitor() {
    let mut engine = loaded_engine("failed-capacitor");
    power_off(&mut engine);
    assert!(discharge(&mut engine).success);
    assert!(engine.get_state().safety.capacitor_discharged);
    assert!(engine.get_state().safety.power_isolated);

    engine.dispatch(SimulatorAction::TogglePower { timestamp: now() });
    let state = engine.get_state();
    assert!(state.components.get(ComponentId::Capacitor).has_stored_charge);
    assert!(!state.safety.capacitor_discharged);
    assert!(!state.safety.power_isolated);
}

// ============================================================================
// Safety gates
// ============================================================================

#[test]
fn charged_capacitor_blocks_measurement_and_records_nothing() {
    let mut engine = loaded_engine("failed-capacitor");
    select(&mut engine, ToolId::Multimeter);
    set_mode(&mut engine, MeasurementMode::Capacitance);

    let result = measure(&mut engine, vec![
        point(ComponentId::Capacitor, "C"),
        point(ComponentId::Capacitor, "HERM"),
    ]);
    assert!(!result.success);
    assert!(result.safety_warning.as_deref().is_some_and(|w| !w.is_empty()));
    assert!(result.consequence.is_some());
    assert!(engine.get_state().measurements.is_empty());
    assert_eq!(engine.get_state().logs.last().unwrap().level, LogLevel::Danger);

    // Power off makes no difference while charge is stored.
    power_off(&mut engine);
    let result = measure(&mut engine, vec![
        point(ComponentId::Capacitor, "C"),
        point(ComponentId::Capacitor, "HERM"),
    ]);
    assert!(!result.success, "still charged after power off");
    assert!(result.safety_warning.is_some());
    assert!(engine.get_state().measurements.is_empty());
}

#[test]
fn live_voltage_warns_but_still_takes_the_reading() {
    let mut engine = loaded_engine("failed-capacitor");
    select(&mut engine, ToolId::Multimeter);

    let result = measure(&mut engine, vec![
        point(ComponentId::PowerSupply, "L1"),
        point(ComponentId::PowerSupply, "L2"),
    ]);
    assert!(result.success);
    assert_eq!(result.measurement.unwrap().value, Some(240.0));
    assert!(engine
        .get_state()
        .logs
        .iter()
        .any(|e| e.level == LogLevel::Warning));
}

#[test]
fn discharge_with_power_on_always_fails() {
    let mut engine = loaded_engine("failed-capacitor");
    for _ in 0..3 {
        let result = discharge(&mut engine);
        assert!(!result.success);
        assert!(result.safety_warning.is_some());
        assert!(!engine.get_state().safety.capacitor_discharged);
        assert!(engine.get_state().components.get(ComponentId::Capacitor).has_stored_charge);
    }
}

#[test]
fn discharge_targets_only_the_capacitor() {
    let mut engine = loaded_engine("failed-capacitor");
    power_off(&mut engine);
    let logs_before = engine.get_state().logs.len();
    let result = engine.dispatch(SimulatorAction::DischargeCapacitor {
        timestamp: now(),
        component_id: ComponentId::Compressor,
    });
    assert!(!result.success);
    assert_eq!(engine.get_state().logs.len(), logs_before);
}

// ============================================================================
// Measurement resolution
// ============================================================================

#[test]
fn scripted_reading_beats_synthetic_default() {
    let mut engine = loaded_engine("failed-capacitor");
    power_off(&mut engine);
    assert!(discharge(&mut engine).success);
    select(&mut engine, ToolId::Multimeter);
    set_mode(&mut engine, MeasurementMode::Capacitance);

    // Scripted failed value, either probe orientation.
    let herm = measure(&mut engine, vec![
        point(ComponentId::Capacitor, "HERM"),
        point(ComponentId::Capacitor, "C"),
    ]);
    assert_eq!(herm.measurement.unwrap().value, Some(12.3));

    let fan = measure(&mut engine, vec![
        point(ComponentId::Capacitor, "C"),
        point(ComponentId::Capacitor, "FAN"),
    ]);
    assert_eq!(fan.measurement.unwrap().value, Some(3.1));

    // Unscripted capacitor pair falls back to the healthy synthetic 45.
    let synthetic = measure(&mut engine, vec![
        point(ComponentId::Capacitor, "HERM"),
        point(ComponentId::Capacitor, "FAN"),
    ]);
    assert_eq!(synthetic.measurement.unwrap().value, Some(45.0));
}

#[test]
fn capacitance_on_other_components_reads_zero() {
    let mut engine = loaded_engine("failed-capacitor");
    power_off(&mut engine);
    select(&mut engine, ToolId::Multimeter);
    set_mode(&mut engine, MeasurementMode::Capacitance);

    let other = measure(&mut engine, vec![
        point(ComponentId::Compressor, "C"),
        point(ComponentId::Compressor, "R"),
    ]);
    assert_eq!(other.measurement.unwrap().value, Some(0.0));
}

#[test]
fn unscripted_resistance_with_power_off_reads_ol() {
    let mut engine = loaded_engine("failed-capacitor");
    power_off(&mut engine);
    select(&mut engine, ToolId::Multimeter);
    set_mode(&mut engine, MeasurementMode::Resistance);

    let result = measure(&mut engine, vec![
        point(ComponentId::Compressor, "C"),
        point(ComponentId::Compressor, "S"),
    ]);
    assert!(result.success);

    let measurement = result.measurement.unwrap();
    assert_eq!(measurement.value, None);
    assert!(measurement.is_valid);

    // The log renders the OL sentinel, never 0 or NaN.
    let entry = result.log_entry.unwrap();
    assert!(entry.message.contains("OL"), "got: {}", entry.message);
    assert!(!entry.message.contains("NaN"));
    assert!(!entry.message.contains("0.00"));
}

#[test]
fn resistance_with_power_on_is_invalid_and_not_recorded() {
    let mut engine = loaded_engine("failed-capacitor");
    select(&mut engine, ToolId::Multimeter);
    set_mode(&mut engine, MeasurementMode::Resistance);

    let result = measure(&mut engine, vec![
        point(ComponentId::Compressor, "C"),
        point(ComponentId::Compressor, "R"),
    ]);
    assert!(!result.success);
    assert!(result.message.contains("Turn off power"));
    assert!(result.safety_warning.is_none(), "hint, not a hazard");
    assert!(engine.get_state().measurements.is_empty());
}

#[test]
fn synthetic_voltage_tracks_energization() {
    let mut engine = loaded_engine("compressor-open-winding");
    select(&mut engine, ToolId::Multimeter);

    // Thermostat carries 24V control only: synthetic AC voltage is 0.
    let result = measure(&mut engine, vec![
        point(ComponentId::Thermostat, "Y"),
        point(ComponentId::Thermostat, "G"),
    ]);
    assert_eq!(result.measurement.unwrap().value, Some(0.0));

    // Power off: everything reads 0.
    power_off(&mut engine);
    let result = measure(&mut engine, vec![
        point(ComponentId::PowerSupply, "L1"),
        point(ComponentId::PowerSupply, "N"),
    ]);
    assert_eq!(result.measurement.unwrap().value, Some(0.0));
}

#[test]
fn synthetic_current_stays_zero_even_when_running() {
    let mut engine = loaded_engine("failed-capacitor");
    select(&mut engine, ToolId::ClampMeter);
    assert_eq!(engine.get_state().current_mode, Some(MeasurementMode::CurrentAc));

    // Power on, thermostat calling, indoor fan energized - still 0 A
    // without a scripted reading.
    let result = measure(&mut engine, vec![point(ComponentId::IndoorFan, "L")]);
    assert_eq!(result.measurement.unwrap().value, Some(0.0));
}

#[test]
fn scripted_current_comes_from_scenario_data() {
    let mut engine = loaded_engine("compressor-open-winding");
    select(&mut engine, ToolId::ClampMeter);

    let result = measure(&mut engine, vec![point(ComponentId::Compressor, "C")]);
    let measurement = result.measurement.unwrap();
    assert_eq!(measurement.value, Some(0.0));
    assert_eq!(measurement.unit, "A");
}

// ============================================================================
// Diagnosis
// ============================================================================

#[test]
fn diagnosis_requires_exact_component_and_fault_match() {
    let mut engine = loaded_engine("failed-capacitor");

    // Wrong component.
    let result = engine.dispatch(SimulatorAction::DiagnoseFault {
        timestamp: now(),
        component_id: ComponentId::Compressor,
        fault_type: FaultType::FailedCapacitor,
    });
    assert!(!result.success);
    assert!(!engine.get_state().is_complete);

    // Right component, wrong fault type.
    let result = engine.dispatch(SimulatorAction::DiagnoseFault {
        timestamp: now(),
        component_id: ComponentId::Capacitor,
        fault_type: FaultType::OpenCircuit,
    });
    assert!(!result.success);
    assert!(!engine.get_state().is_complete);
    assert_eq!(engine.get_state().logs.last().unwrap().level, LogLevel::Warning);

    // Retries are unlimited; the exact pair wins.
    let result = engine.dispatch(SimulatorAction::DiagnoseFault {
        timestamp: now(),
        component_id: ComponentId::Capacitor,
        fault_type: FaultType::FailedCapacitor,
    });
    assert!(result.success);

    let state = engine.get_state();
    assert!(state.is_complete);
    assert!(state.correct_diagnosis);
    assert!(state.end_time.is_some());
    assert_eq!(state.logs.last().unwrap().level, LogLevel::Success);
}

#[test]
fn every_built_in_scenario_is_solvable_by_its_answer_key() {
    for scenario_record in all_scenarios() {
        let answer = scenario_record.faults[0].clone();
        let mut engine = SimulatorEngine::new();
        engine.load_scenario(scenario_record);

        let result = engine.dispatch(SimulatorAction::DiagnoseFault {
            timestamp: now(),
            component_id: answer.component_id,
            fault_type: answer.fault_type,
        });
        assert!(result.success);
        assert!(engine.get_state().is_complete);
    }
}

#[test]
fn actions_round_trip_through_their_wire_format() {
    let action = SimulatorAction::DiagnoseFault {
        timestamp: 1700000000000,
        component_id: ComponentId::Capacitor,
        fault_type: FaultType::FailedCapacitor,
    };
    let json = serde_json::to_string(&action).unwrap();
    assert!(json.contains("\"type\":\"diagnose_fault\""));
    assert!(json.contains("\"componentId\":\"capacitor\""));
    assert!(json.contains("\"faultType\":\"failed_capacitor\""));

    let back: SimulatorAction = serde_json::from_str(&json).unwrap();
    assert_eq!(back.timestamp(), 1700000000000);

    // Unknown tags never reach the engine.
    assert!(serde_json::from_str::<SimulatorAction>(r#"{"type":"format_disk","timestamp":0}"#).is_err());
}
