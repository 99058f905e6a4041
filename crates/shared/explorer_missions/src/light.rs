//! Light & Shadows: the law of reflection (levels 1-2) and shadow length (level 3).

use crate::experiment::{check_range, locked, ActionError, Experiment, Feedback, Level};
use serde::{Deserialize, Serialize};

const ANGLE_MIN: f64 = 0.0;
const ANGLE_MAX: f64 = 180.0;
const HEIGHT_MIN: f64 = 40.0;
const HEIGHT_MAX: f64 = 120.0;
const DISTANCE_MIN: f64 = 100.0;
const DISTANCE_MAX: f64 = 300.0;

/// Largest deviation (degrees) from the expected reflection still accepted.
const REFLECTION_TOLERANCE: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LightAction {
    SetLightAngle { degrees: f64 },
    SetMirrorAngle { degrees: f64 },
    SetObjectHeight { height: f64 },
    SetSourceDistance { distance: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightLab {
    pub light_angle: f64,
    pub mirror_angle: f64,
    pub object_height: f64,
    pub source_distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightReadout {
    pub incidence_angle: f64,
    /// Direction of the reflected ray.
    pub reflection_angle: f64,
    pub shadow_length: f64,
}

fn is_mirror_level(level: Level) -> bool {
    level.get() <= 2
}

impl LightLab {
    /// Angle between the incoming ray and the mirror's normal.
    pub fn incidence_angle(&self) -> f64 {
        (self.light_angle - self.mirror_angle).abs()
    }

    pub fn reflection_angle(&self) -> f64 {
        self.mirror_angle + self.incidence_angle()
    }

    fn expected_reflection(&self) -> f64 {
        self.mirror_angle + (self.mirror_angle - self.light_angle)
    }

    pub fn shadow_length(&self) -> f64 {
        self.object_height * (self.source_distance / 100.0)
    }
}

impl Experiment for LightLab {
    type Action = LightAction;
    type Readout = LightReadout;

    fn for_level(level: Level) -> Self {
        match level.get() {
            1 => Self {
                light_angle: 45.0,
                mirror_angle: 90.0,
                object_height: 60.0,
                source_distance: 150.0,
            },
            2 => Self {
                light_angle: 60.0,
                mirror_angle: 45.0,
                object_height: 60.0,
                source_distance: 150.0,
            },
            _ => Self {
                light_angle: 60.0,
                mirror_angle: 45.0,
                object_height: 80.0,
                source_distance: 200.0,
            },
        }
    }

    fn apply(&mut self, level: Level, action: LightAction) -> Result<(), ActionError> {
        let mirror = is_mirror_level(level);
        match action {
            LightAction::SetLightAngle { degrees } => {
                if !mirror {
                    return Err(locked("light_angle", "the mirror experiment is finished"));
                }
                self.light_angle = check_range("light_angle", degrees, ANGLE_MIN, ANGLE_MAX)?;
            }
            LightAction::SetMirrorAngle { degrees } => {
                if !mirror {
                    return Err(locked("mirror_angle", "the mirror experiment is finished"));
                }
                self.mirror_angle = check_range("mirror_angle", degrees, ANGLE_MIN, ANGLE_MAX)?;
            }
            LightAction::SetObjectHeight { height } => {
                if mirror {
                    return Err(locked("object_height", "shadows are explored at level 3"));
                }
                self.object_height = check_range("object_height", height, HEIGHT_MIN, HEIGHT_MAX)?;
            }
            LightAction::SetSourceDistance { distance } => {
                if mirror {
                    return Err(locked("source_distance", "shadows are explored at level 3"));
                }
                self.source_distance =
                    check_range("source_distance", distance, DISTANCE_MIN, DISTANCE_MAX)?;
            }
        }
        Ok(())
    }

    fn evaluate(&self, level: Level) -> Feedback {
        if !is_mirror_level(level) {
            return Feedback::pass(format!(
                "The shadow length is {:.0}px. When the light source is {}px away and the object is {}px tall, the shadow forms behind the object. The closer the light source, the longer the shadow!",
                self.shadow_length(),
                self.source_distance,
                self.object_height
            ));
        }

        let deviation = (self.reflection_angle() - self.expected_reflection()).abs();
        if deviation < REFLECTION_TOLERANCE {
            Feedback::pass(format!(
                "Perfect! When light hits a mirror at {}° from the normal, it reflects at the same angle on the other side. This is the Law of Reflection: Angle of Incidence = Angle of Reflection.",
                self.incidence_angle()
            ))
        } else {
            Feedback::hint(format!(
                "Not quite. With the light at {}° and the mirror at {}°, the ray would leave {deviation:.0}° away from where the Law of Reflection sends it. Keep the light on the same side of the mirror's normal and try again.",
                self.light_angle, self.mirror_angle
            ))
        }
    }

    fn readout(&self, _level: Level) -> LightReadout {
        LightReadout {
            incidence_angle: self.incidence_angle(),
            reflection_angle: self.reflection_angle(),
            shadow_length: self.shadow_length(),
        }
    }
}
