//! Built-in Sequencing Questions

use crate::sequencing::types::{
    ActionStep, FeedbackConfig, FeedbackReading, FeedbackType, ReadingStatus, SequencingQuestion,
};
use std::collections::BTreeMap;

fn card(id: &str, label: &str, icon: &str) -> ActionStep {
    ActionStep {
        id: id.to_string(),
        label: label.to_string(),
        icon: icon.to_string(),
        category: None,
    }
}

fn readout(display: &str, value: f64, unit: &str, status: ReadingStatus, description: &str) -> FeedbackReading {
    FeedbackReading {
        display: display.to_string(),
        value,
        unit: unit.to_string(),
        status,
        description: Some(description.to_string()),
    }
}

fn capacitor_replacement() -> SequencingQuestion {
    let mut readings = BTreeMap::new();
    readings.insert(
        1,
        readout("0.0", 0.0, "V", ReadingStatus::Normal, "Power verified off at the disconnect"),
    );
    readings.insert(
        2,
        readout("0.0", 0.0, "V", ReadingStatus::Normal, "Capacitor discharged, no stored energy"),
    );
    readings.insert(
        3,
        readout("12.3", 12.3, "µF", ReadingStatus::Danger, "Far below the 45 µF rating - confirmed faulty"),
    );
    readings.insert(
        4,
        readout("0.0", 0.0, "µF", ReadingStatus::Normal, "Old capacitor out, leads open"),
    );
    readings.insert(
        5,
        readout("44.8", 44.8, "µF", ReadingStatus::Normal, "New capacitor reads at rating"),
    );
    readings.insert(
        6,
        readout("4.8", 4.8, "A", ReadingStatus::Normal, "Normal compressor current draw"),
    );

    SequencingQuestion {
        id: "hvac-capacitor-replacement".to_string(),
        title: "Replace Run Capacitor".to_string(),
        description:
            "The AC unit is not cooling and the capacitor needs replacement. Follow electrical safety procedures."
                .to_string(),
        correct_sequence: vec![
            card("hvac-1", "Turn off power at breaker", "🔴"),
            card("hvac-2", "Discharge the capacitor", "⚡"),
            card("hvac-3", "Measure capacitance", "📊"),
            card("hvac-4", "Remove old capacitor", "🔧"),
            card("hvac-5", "Install new capacitor", "✅"),
            card("hvac-6", "Restore power and test", "🟢"),
        ],
        distractors: vec![
            card("hvac-d1", "Work with power on", "💀"),
            card("hvac-d2", "Skip discharge step", "⚠️"),
            card("hvac-d3", "Use wrong capacitance value", "❌"),
        ],
        feedback_config: Some(FeedbackConfig {
            feedback_type: FeedbackType::Multimeter,
            readings,
            initial_reading: readout(
                "240",
                240.0,
                "V",
                ReadingStatus::Danger,
                "Live voltage present - unit is energized",
            ),
        }),
    }
}

fn turbine_blade_inspection() -> SequencingQuestion {
    SequencingQuestion {
        id: "wind-turbine-inspection".to_string(),
        title: "Wind Turbine Blade Inspection".to_string(),
        description:
            "Perform a scheduled inspection of wind turbine blades. Safety at height is critical!"
                .to_string(),
        correct_sequence: vec![
            card("wind-1", "Verify LOTO is in place", "🔒"),
            card("wind-2", "Don fall protection harness", "🦺"),
            card("wind-3", "Ascend to nacelle", "🧗"),
            card("wind-4", "Position blade for access", "🔄"),
            card("wind-5", "Inspect blade surface", "🔍"),
            card("wind-6", "Document findings with photos", "📸"),
            card("wind-7", "Descend and complete report", "📋"),
        ],
        distractors: vec![
            card("wind-d1", "Climb without fall protection", "💀"),
            card("wind-d2", "Skip LOTO verification", "⚠️"),
            card("wind-d3", "Work during high winds", "🌪️"),
        ],
        feedback_config: None,
    }
}

fn solar_panel_install() -> SequencingQuestion {
    SequencingQuestion {
        id: "solar-panel-install".to_string(),
        title: "Rooftop Solar Panel Installation".to_string(),
        description:
            "Install a residential solar panel array. Proper sequence ensures safety and optimal performance."
                .to_string(),
        correct_sequence: vec![
            card("solar-1", "De-energize main breaker", "🔴"),
            card("solar-2", "Mount panels to rails", "🔧"),
            card("solar-3", "Connect panel strings", "🔌"),
            card("solar-4", "Run conduit to inverter", "🏠"),
            card("solar-5", "Wire inverter and breaker", "⚡"),
            card("solar-6", "Commission the system", "✅"),
            card("solar-7", "Configure monitoring app", "📱"),
        ],
        distractors: vec![
            card("solar-d1", "Connect panels before mounting", "❌"),
            card("solar-d2", "Work with panels energized", "💀"),
            card("solar-d3", "Skip grounding conductors", "⚠️"),
        ],
        feedback_config: None,
    }
}

/// All built-in questions.
pub fn sample_questions() -> Vec<SequencingQuestion> {
    vec![
        capacitor_replacement(),
        turbine_blade_inspection(),
        solar_panel_install(),
    ]
}

pub fn question_by_id(id: &str) -> Option<SequencingQuestion> {
    sample_questions().into_iter().find(|q| q.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencing::game::{apply_drop, current_feedback, new_game};

    #[test]
    fn sample_questions_have_unique_card_ids() {
        for question in sample_questions() {
            let mut ids: Vec<_> = question
                .correct_sequence
                .iter()
                .chain(question.distractors.iter())
                .map(|c| c.id.clone())
                .collect();
            let total = ids.len();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), total, "{} has duplicate card ids", question.id);
        }
    }

    #[test]
    fn capacitor_walkthrough_feedback_tracks_progress() {
        let q = question_by_id("hvac-capacitor-replacement").unwrap();
        let mut state = new_game();

        let initial = current_feedback(&q, &state).unwrap();
        assert_eq!(initial.status, ReadingStatus::Danger);
        assert_eq!(initial.value, 240.0);

        // Kill power, discharge, then measure: the readout shows the
        // failed capacitor's low value.
        for id in ["hvac-1", "hvac-2", "hvac-3"] {
            let (next, accepted) = apply_drop(&q, &state, id, 0);
            assert!(accepted);
            state = next;
        }
        let reading = current_feedback(&q, &state).unwrap();
        assert_eq!(reading.value, 12.3);
        assert_eq!(reading.status, ReadingStatus::Danger);
    }
}
