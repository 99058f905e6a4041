//! Heat: conduction through metal, wood and plastic.
//!
//! Heating and cooling are linear per tick and stop on their own at the
//! boiling point or at freezing.

use crate::experiment::{locked, ActionError, Experiment, Feedback, Level, TickOutcome};
use serde::{Deserialize, Serialize};

pub const ROOM_TEMPERATURE: f64 = 25.0;
pub const MAX_TEMPERATURE: f64 = 100.0;
pub const MIN_TEMPERATURE: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conductivity {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaterialProperties {
    pub conductivity: Conductivity,
    /// Degrees gained per tick while heating.
    pub heat_rate: f64,
    /// Degrees lost per tick while cooling.
    pub cool_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Metal,
    Wood,
    Plastic,
}

impl Material {
    pub fn name(self) -> &'static str {
        match self {
            Material::Metal => "metal",
            Material::Wood => "wood",
            Material::Plastic => "plastic",
        }
    }

    pub fn properties(self) -> MaterialProperties {
        match self {
            Material::Metal => MaterialProperties {
                conductivity: Conductivity::High,
                heat_rate: 2.0,
                cool_rate: 1.5,
            },
            Material::Wood => MaterialProperties {
                conductivity: Conductivity::Low,
                heat_rate: 0.5,
                cool_rate: 0.3,
            },
            Material::Plastic => MaterialProperties {
                conductivity: Conductivity::Low,
                heat_rate: 0.7,
                cool_rate: 0.4,
            },
        }
    }

    /// Materials that can be picked at `level`.
    pub fn offered_at(level: Level) -> &'static [Material] {
        match level.get() {
            1 => &[Material::Metal],
            2 => &[Material::Wood],
            _ => &[Material::Metal, Material::Plastic],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatMode {
    Idle,
    Heating,
    Cooling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureBand {
    Cold,
    Room,
    Warm,
    Hot,
    VeryHot,
}

impl TemperatureBand {
    pub fn of(celsius: f64) -> Self {
        if celsius < 15.0 {
            TemperatureBand::Cold
        } else if celsius < 30.0 {
            TemperatureBand::Room
        } else if celsius < 50.0 {
            TemperatureBand::Warm
        } else if celsius < 70.0 {
            TemperatureBand::Hot
        } else {
            TemperatureBand::VeryHot
        }
    }

    fn describe(self) -> &'static str {
        match self {
            TemperatureBand::Cold => "This is COLD - lower than room temperature.",
            TemperatureBand::Room => "This is room temperature - comfortable to touch.",
            TemperatureBand::Warm => "This is WARM - noticeable heat but safe.",
            TemperatureBand::Hot => "This is HOT - uncomfortable to touch for long.",
            TemperatureBand::VeryHot => {
                "This is VERY HOT - dangerous to touch! Water would boil at 100°C."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeatAction {
    Heat,
    Cool,
    Stop,
    SelectMaterial { material: Material },
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatLab {
    pub temperature: f64,
    pub material: Material,
    pub mode: HeatMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatReadout {
    pub temperature: f64,
    pub band: TemperatureBand,
    pub conductivity: Conductivity,
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Experiment for HeatLab {
    type Action = HeatAction;
    type Readout = HeatReadout;

    fn for_level(level: Level) -> Self {
        let material = match level.get() {
            1 => Material::Metal,
            2 => Material::Wood,
            _ => Material::Plastic,
        };
        Self {
            temperature: ROOM_TEMPERATURE,
            material,
            mode: HeatMode::Idle,
        }
    }

    fn apply(&mut self, level: Level, action: HeatAction) -> Result<(), ActionError> {
        match action {
            HeatAction::Heat => {
                if self.mode == HeatMode::Heating {
                    return Err(locked("heat", "already heating"));
                }
                if self.temperature >= MAX_TEMPERATURE {
                    return Err(locked("heat", "already at the boiling point"));
                }
                self.mode = HeatMode::Heating;
            }
            HeatAction::Cool => {
                if self.mode == HeatMode::Cooling {
                    return Err(locked("cool", "already cooling"));
                }
                if self.temperature <= MIN_TEMPERATURE {
                    return Err(locked("cool", "already at freezing"));
                }
                self.mode = HeatMode::Cooling;
            }
            HeatAction::Stop => {
                if self.mode == HeatMode::Idle {
                    return Err(locked("stop", "nothing is heating or cooling"));
                }
                self.mode = HeatMode::Idle;
            }
            HeatAction::SelectMaterial { material } => {
                if self.mode != HeatMode::Idle {
                    return Err(locked("material", "stop heating or cooling first"));
                }
                if !Material::offered_at(level).contains(&material) {
                    return Err(locked("material", "not offered at this level"));
                }
                self.material = material;
            }
            HeatAction::Reset => {
                self.temperature = ROOM_TEMPERATURE;
                self.mode = HeatMode::Idle;
            }
        }
        Ok(())
    }

    fn evaluate(&self, _level: Level) -> Feedback {
        let name = self.material.name();
        let mut text = String::new();

        if self.mode == HeatMode::Heating || self.temperature > 30.0 {
            text.push_str(&format!(
                "When we heat {name}, thermal energy is transferred to it. "
            ));
            match self.material.properties().conductivity {
                Conductivity::High => text.push_str(
                    "Metal is a GOOD CONDUCTOR of heat. Its atoms are closely packed and transfer heat energy quickly through vibrations. That's why metal spoons get hot fast! ",
                ),
                Conductivity::Low => text.push_str(&format!(
                    "{} is a POOR CONDUCTOR (or insulator) of heat. Its atoms don't transfer heat energy efficiently. That's why {name} handles stay cool longer! ",
                    capitalize(name)
                )),
            }
        }

        if self.mode == HeatMode::Cooling || self.temperature < 70.0 {
            text.push_str(&format!(
                "When cooling, heat energy moves from the {name} to the surrounding air. This is called HEAT TRANSFER. Heat always flows from hot to cold objects until they reach the same temperature. "
            ));
        }

        text.push_str(&format!(
            "\n\nCurrent temperature: {:.1}°C. {}",
            self.temperature,
            TemperatureBand::of(self.temperature).describe()
        ));

        Feedback::pass(text)
    }

    fn readout(&self, _level: Level) -> HeatReadout {
        HeatReadout {
            temperature: self.temperature,
            band: TemperatureBand::of(self.temperature),
            conductivity: self.material.properties().conductivity,
        }
    }

    fn tick(&mut self, _level: Level) -> TickOutcome {
        let props = self.material.properties();
        let at_limit = match self.mode {
            HeatMode::Idle => return TickOutcome::Idle,
            HeatMode::Heating => {
                self.temperature = (self.temperature + props.heat_rate).min(MAX_TEMPERATURE);
                self.temperature >= MAX_TEMPERATURE
            }
            HeatMode::Cooling => {
                self.temperature = (self.temperature - props.cool_rate).max(MIN_TEMPERATURE);
                self.temperature <= MIN_TEMPERATURE
            }
        };

        if at_limit {
            self.mode = HeatMode::Idle;
            TickOutcome::Stopped { evaluate: false }
        } else {
            TickOutcome::Advanced
        }
    }

    fn is_running(&self) -> bool {
        self.mode != HeatMode::Idle
    }
}
