//! Component and Tool Registries
//!
//! Fixed definitions for the seven electrical parts and two instruments.
//! Components are rebuilt fresh on every scenario load; tools are a static
//! immutable registry.

use crate::simulator::types::{
    Component, ComponentId, ComponentStatus, MeasurementMode, Terminal, TerminalType, Tool, ToolId,
};
use once_cell::sync::Lazy;
use serde::Serialize;

// ============================================================================
// Component Arena
// ============================================================================

/// Fixed-size component arena indexed by `ComponentId` ordinal.
///
/// The component set never grows or shrinks, so a plain array replaces the
/// keyed map a dynamic registry would need.
#[derive(Serialize, Debug, Clone)]
#[serde(transparent)]
pub struct ComponentSet {
    slots: [Component; 7],
}

impl ComponentSet {
    /// Build all seven components in their powered-down template state.
    pub fn new() -> Self {
        Self {
            slots: ComponentId::ALL.map(build_component),
        }
    }

    pub fn get(&self, id: ComponentId) -> &Component {
        &self.slots[id.index()]
    }

    pub fn get_mut(&mut self, id: ComponentId) -> &mut Component {
        &mut self.slots[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.slots.iter()
    }
}

impl Default for ComponentSet {
    fn default() -> Self {
        Self::new()
    }
}

fn terminal(id: &str, label: &str, terminal_type: TerminalType) -> Terminal {
    Terminal {
        id: id.to_string(),
        label: label.to_string(),
        terminal_type,
    }
}

/// Instantiate one component from its template. Status starts `unknown`;
/// only the capacitor starts with stored charge.
pub fn build_component(id: ComponentId) -> Component {
    let (name, description, terminals) = match id {
        ComponentId::PowerSupply => (
            "Power Supply",
            "Main 240V AC power supply with circuit breaker",
            vec![
                terminal("L1", "Line 1 (Hot)", TerminalType::Line),
                terminal("L2", "Line 2 (Hot)", TerminalType::Line),
                terminal("N", "Neutral", TerminalType::Common),
                terminal("G", "Ground", TerminalType::Ground),
            ],
        ),
        ComponentId::Thermostat => (
            "Thermostat",
            "Temperature controller that signals the AC to turn on/off",
            vec![
                terminal("R", "R (24V Hot)", TerminalType::Line),
                terminal("Y", "Y (Cooling Call)", TerminalType::Signal),
                terminal("G", "G (Fan)", TerminalType::Signal),
                terminal("C", "C (Common)", TerminalType::Common),
            ],
        ),
        ComponentId::Contactor => (
            "Contactor",
            "Electromagnetic relay that connects power to compressor and outdoor fan",
            vec![
                terminal("L1_IN", "L1 Input", TerminalType::Line),
                terminal("L2_IN", "L2 Input", TerminalType::Line),
                terminal("L1_OUT", "L1 Output", TerminalType::Load),
                terminal("L2_OUT", "L2 Output", TerminalType::Load),
                terminal("COIL_1", "Coil Terminal 1", TerminalType::Signal),
                terminal("COIL_2", "Coil Terminal 2", TerminalType::Common),
            ],
        ),
        ComponentId::Capacitor => (
            "Run Capacitor",
            "Dual run capacitor for compressor and fan motor start/run assistance",
            vec![
                terminal("C", "Common", TerminalType::Common),
                terminal("HERM", "Hermetic (Compressor)", TerminalType::Run),
                terminal("FAN", "Fan", TerminalType::Run),
            ],
        ),
        ComponentId::Compressor => (
            "Compressor",
            "Hermetic compressor that circulates refrigerant",
            vec![
                terminal("C", "Common", TerminalType::Common),
                terminal("R", "Run", TerminalType::Run),
                terminal("S", "Start", TerminalType::Start),
            ],
        ),
        ComponentId::IndoorFan => (
            "Indoor Blower Motor",
            "Fan motor that circulates air over evaporator coil",
            vec![
                terminal("L", "Line", TerminalType::Line),
                terminal("N", "Neutral", TerminalType::Common),
                terminal("CAP", "Capacitor", TerminalType::Run),
                terminal("HI", "High Speed", TerminalType::Signal),
                terminal("MED", "Medium Speed", TerminalType::Signal),
                terminal("LO", "Low Speed", TerminalType::Signal),
            ],
        ),
        ComponentId::OutdoorFan => (
            "Condenser Fan Motor",
            "Fan motor that cools the condenser coil",
            vec![
                terminal("L", "Line", TerminalType::Line),
                terminal("N", "Neutral/Common", TerminalType::Common),
                terminal("CAP", "Capacitor", TerminalType::Run),
            ],
        ),
    };

    Component {
        id,
        name: name.to_string(),
        description: description.to_string(),
        terminals,
        status: ComponentStatus::Unknown,
        is_energized: false,
        has_dangerous_voltage: false,
        has_stored_charge: id == ComponentId::Capacitor,
    }
}

// ============================================================================
// Tool Registry
// ============================================================================

static TOOLS: Lazy<Vec<Tool>> = Lazy::new(|| {
    vec![
        Tool {
            id: ToolId::Multimeter,
            name: "Digital Multimeter".to_string(),
            description: "Measures voltage, resistance, continuity, and capacitance".to_string(),
            modes: vec![
                MeasurementMode::VoltageAc,
                MeasurementMode::VoltageDc,
                MeasurementMode::Resistance,
                MeasurementMode::Continuity,
                MeasurementMode::Capacitance,
            ],
            icon: "⚡".to_string(),
        },
        Tool {
            id: ToolId::ClampMeter,
            name: "Clamp Meter".to_string(),
            description: "Measures current without breaking the circuit".to_string(),
            modes: vec![MeasurementMode::CurrentAc, MeasurementMode::CurrentDc],
            icon: "🔌".to_string(),
        },
    ]
});

pub fn all_tools() -> &'static [Tool] {
    &TOOLS
}

pub fn tool_by_id(id: ToolId) -> &'static Tool {
    TOOLS
        .iter()
        .find(|t| t.id == id)
        .expect("tool registry covers every ToolId")
}
