//! Air Around Us: a squeezed bottle (level 1) and a balloon rising through
//! thinning air (levels 2-3).

use crate::experiment::{check_range, locked, ActionError, Experiment, Feedback, Level};
use serde::{Deserialize, Serialize};

const ALTITUDE_MIN: f64 = 0.0;
const ALTITUDE_MAX: f64 = 100.0;

/// Pressure never drops below this share of sea level.
const PRESSURE_FLOOR: f64 = 20.0;
const PRESSURE_DROP_PER_METER: f64 = 0.3;

const BALLOON_BASE: f64 = 50.0;
const BALLOON_MAX: f64 = 120.0;
const BALLOON_GROWTH_PER_METER: f64 = 0.5;

/// Air pressure at `altitude`, in percent of sea level.
pub fn pressure_at(altitude: f64) -> f64 {
    (100.0 - altitude * PRESSURE_DROP_PER_METER).max(PRESSURE_FLOOR)
}

pub fn balloon_size_at(altitude: f64) -> f64 {
    (BALLOON_BASE + altitude * BALLOON_GROWTH_PER_METER).min(BALLOON_MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BottleState {
    Normal,
    Compressed,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AirAction {
    Compress,
    Release,
    ResetBottle,
    SetAltitude { altitude: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirLab {
    pub bottle: BottleState,
    pub altitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirReadout {
    /// Percent of sea-level pressure.
    pub pressure: f64,
    pub balloon_size: f64,
    /// Balloon size relative to its size on the ground, in percent.
    pub balloon_percent: f64,
}

fn is_bottle_level(level: Level) -> bool {
    level == Level::FIRST
}

impl Experiment for AirLab {
    type Action = AirAction;
    type Readout = AirReadout;

    fn for_level(_level: Level) -> Self {
        Self {
            bottle: BottleState::Normal,
            altitude: ALTITUDE_MIN,
        }
    }

    fn apply(&mut self, level: Level, action: AirAction) -> Result<(), ActionError> {
        let bottle = is_bottle_level(level);
        match action {
            AirAction::SetAltitude { altitude } => {
                if bottle {
                    return Err(locked("altitude", "the balloon appears at level 2"));
                }
                self.altitude = check_range("altitude", altitude, ALTITUDE_MIN, ALTITUDE_MAX)?;
            }
            _ if !bottle => {
                return Err(locked("bottle", "the bottle experiment is finished"));
            }
            AirAction::Compress => {
                if self.bottle == BottleState::Empty {
                    return Err(locked("compress", "the bottle is empty; reset it first"));
                }
                self.bottle = BottleState::Compressed;
            }
            AirAction::Release => {
                if self.bottle != BottleState::Compressed {
                    return Err(locked("release", "squeeze the bottle first"));
                }
                self.bottle = BottleState::Empty;
            }
            AirAction::ResetBottle => self.bottle = BottleState::Normal,
        }
        Ok(())
    }

    fn evaluate(&self, level: Level) -> Feedback {
        if is_bottle_level(level) {
            return Feedback::pass(match self.bottle {
                BottleState::Normal => "The bottle contains air at normal atmospheric pressure. Air is a mixture of gases (78% Nitrogen, 21% Oxygen, 1% other gases). Even though we can't see air, it has mass and occupies space. The air molecules are moving freely inside the bottle, colliding with the walls and creating pressure.",
                BottleState::Compressed => "When we squeeze the bottle, we COMPRESS the air inside. This means the same amount of air now occupies less space. The air molecules are packed closer together, creating HIGHER PRESSURE. You can feel this pressure pushing back when you squeeze! This demonstrates that air occupies space and can be compressed.",
                BottleState::Empty => "When we release the compressed bottle, air rushes OUT because the pressure inside was higher than outside. Air always moves from HIGH pressure to LOW pressure. This is why wind blows - it's air moving from high pressure areas to low pressure areas! The bottle returns to its original shape as air flows back in.",
            });
        }

        let readout = self.readout(level);
        Feedback::pass(format!(
            "At {}m altitude:\n\n\
             Air Pressure: {:.1}% of sea level pressure\n\
             Balloon Size: {:.0}% of original size\n\n\
             🎈 Why does the balloon expand?\n\
             As we go higher, there are fewer air molecules above us, so atmospheric pressure DECREASES. \
             The air inside the balloon pushes outward with the same force, but there's less outside pressure pushing back, \
             so the balloon EXPANDS!\n\n\
             This is why:\n\
             • Airplane cabins are pressurized\n\
             • Your ears \"pop\" when going up mountains\n\
             • Chip bags puff up on airplanes\n\
             • Weather balloons expand as they rise",
            self.altitude, readout.pressure, readout.balloon_percent
        ))
    }

    fn readout(&self, _level: Level) -> AirReadout {
        let balloon_size = balloon_size_at(self.altitude);
        AirReadout {
            pressure: pressure_at(self.altitude),
            balloon_size,
            balloon_percent: balloon_size / BALLOON_BASE * 100.0,
        }
    }
}
