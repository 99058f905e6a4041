//! Electricity & Circuits: a battery, a bulb and (from level 2) a switch.

use crate::experiment::{locked, ActionError, Experiment, Feedback, Level};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Battery,
    Bulb,
    Switch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CircuitAction {
    /// Add the component if absent, remove it if present.
    Toggle { component: Component },
    FlipSwitch,
    Reset,
}

/// What a test of the circuit finds, in the order it is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitStatus {
    MissingBattery,
    MissingBulb,
    MissingSwitch,
    SwitchOff,
    Closed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CircuitLab {
    pub battery: bool,
    pub bulb: bool,
    pub switch: bool,
    pub switch_on: bool,
    /// Set by the last passing test; any change to the circuit clears it.
    pub lit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitReadout {
    pub status: CircuitStatus,
    pub lit: bool,
}

fn requires_switch(level: Level) -> bool {
    level.get() >= 2
}

impl CircuitLab {
    pub fn status(&self, level: Level) -> CircuitStatus {
        if !self.battery {
            CircuitStatus::MissingBattery
        } else if !self.bulb {
            CircuitStatus::MissingBulb
        } else if requires_switch(level) && !self.switch {
            CircuitStatus::MissingSwitch
        } else if requires_switch(level) && !self.switch_on {
            CircuitStatus::SwitchOff
        } else {
            CircuitStatus::Closed
        }
    }
}

impl Experiment for CircuitLab {
    type Action = CircuitAction;
    type Readout = CircuitReadout;

    fn for_level(_level: Level) -> Self {
        Self::default()
    }

    fn apply(&mut self, level: Level, action: CircuitAction) -> Result<(), ActionError> {
        match action {
            CircuitAction::Toggle { component } => match component {
                Component::Battery => self.battery = !self.battery,
                Component::Bulb => self.bulb = !self.bulb,
                Component::Switch => {
                    if !self.switch && !requires_switch(level) {
                        return Err(locked("switch", "the switch is introduced at level 2"));
                    }
                    self.switch = !self.switch;
                    if !self.switch {
                        self.switch_on = false;
                    }
                }
            },
            CircuitAction::FlipSwitch => {
                if !self.switch {
                    return Err(locked("flip_switch", "add a switch to the circuit first"));
                }
                self.switch_on = !self.switch_on;
            }
            CircuitAction::Reset => *self = Self::default(),
        }
        self.lit = false;
        Ok(())
    }

    fn evaluate(&self, level: Level) -> Feedback {
        match self.status(level) {
            CircuitStatus::MissingBattery => Feedback::hint(
                "⚠️ You need a battery to provide electrical energy! A battery converts chemical energy into electrical energy, creating a flow of electrons (current).",
            ),
            CircuitStatus::MissingBulb => Feedback::hint(
                "⚠️ You need a bulb to complete the circuit! The bulb converts electrical energy into light energy when current flows through its filament.",
            ),
            CircuitStatus::MissingSwitch => Feedback::hint(
                "⚠️ This level requires a switch! A switch is used to control whether the circuit is open (no current) or closed (current flows).",
            ),
            CircuitStatus::SwitchOff => Feedback::hint(
                "💡 The switch is OFF! When the switch is open, it breaks the circuit path. No current can flow, so the bulb won't light up. Turn it ON to close the circuit.",
            ),
            CircuitStatus::Closed => {
                let via_switch = if requires_switch(level) {
                    "closed switch → "
                } else {
                    ""
                };
                Feedback::pass(format!(
                    "✅ Circuit Complete! Current flows from the battery's positive terminal → through the {via_switch}bulb → back to the negative terminal. The complete path allows electrons to flow continuously, lighting the bulb. This is a CLOSED CIRCUIT."
                ))
            }
        }
    }

    fn readout(&self, level: Level) -> CircuitReadout {
        CircuitReadout {
            status: self.status(level),
            lit: self.lit,
        }
    }

    fn on_evaluated(&mut self, _level: Level, passed: bool) {
        self.lit = passed;
    }
}
