//! Motion & Measurement: predict the speed a car needs to cover a distance.
//!
//! The car moves in fixed ticks of [`TICK_SECONDS`]. Time is kept as a tick
//! count so repeated runs do not accumulate floating point drift; when the car
//! reaches the finish line the run stops and the screen evaluates on its own.

use crate::experiment::{
    check_range, locked, ActionError, Experiment, Feedback, Level, TickOutcome, TICK_SECONDS,
};
use serde::{Deserialize, Serialize};

const SPEED_MIN: f64 = 1.0;
const SPEED_MAX: f64 = 15.0;
const DEFAULT_SPEED: f64 = 5.0;

/// Largest prediction error (m/s) still accepted as correct.
const SPEED_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionAction {
    SetSpeed { speed: f64 },
    Start,
    Pause,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionLab {
    pub target_distance: f64,
    /// Predicted speed from the slider.
    pub user_speed: f64,
    /// Speed the car actually drives at; latched from `user_speed` on start.
    pub speed: f64,
    pub distance: f64,
    pub elapsed_ticks: u32,
    pub running: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionReadout {
    pub time: f64,
    pub distance: f64,
    /// Percent of the target distance covered.
    pub progress: f64,
    pub actual_speed: Option<f64>,
}

impl MotionLab {
    pub fn time(&self) -> f64 {
        self.elapsed_ticks as f64 * TICK_SECONDS
    }

    /// Distance over time, once the car has moved.
    pub fn actual_speed(&self) -> Option<f64> {
        let time = self.time();
        (time > 0.0).then(|| self.target_distance / time)
    }

    pub fn arrived(&self) -> bool {
        self.distance >= self.target_distance
    }
}

impl Experiment for MotionLab {
    type Action = MotionAction;
    type Readout = MotionReadout;

    fn for_level(level: Level) -> Self {
        let (target_distance, speed) = match level.get() {
            1 => (50.0, 5.0),
            2 => (100.0, 8.0),
            _ => (75.0, 6.0),
        };
        Self {
            target_distance,
            user_speed: DEFAULT_SPEED,
            speed,
            distance: 0.0,
            elapsed_ticks: 0,
            running: false,
        }
    }

    fn apply(&mut self, _level: Level, action: MotionAction) -> Result<(), ActionError> {
        match action {
            MotionAction::SetSpeed { speed } => {
                if self.distance > 0.0 {
                    return Err(locked("speed", "the car has already moved; reset first"));
                }
                self.user_speed = check_range("speed", speed, SPEED_MIN, SPEED_MAX)?;
            }
            MotionAction::Start => {
                if self.running {
                    return Err(locked("start", "the car is already moving"));
                }
                if self.arrived() {
                    return Err(locked("start", "the car is at the finish line"));
                }
                if self.distance == 0.0 {
                    self.speed = self.user_speed;
                }
                self.running = true;
            }
            MotionAction::Pause => {
                if !self.running {
                    return Err(locked("pause", "the car is not moving"));
                }
                self.running = false;
            }
            MotionAction::Reset => {
                self.running = false;
                self.distance = 0.0;
                self.elapsed_ticks = 0;
            }
        }
        Ok(())
    }

    fn evaluate(&self, _level: Level) -> Feedback {
        let Some(actual) = self.actual_speed() else {
            return Feedback::hint(
                "Start the car first! Speed can only be measured once the car has covered some distance in some time.",
            );
        };
        let target = self.target_distance;
        let time = self.time();

        if (actual - self.user_speed).abs() < SPEED_TOLERANCE {
            Feedback::pass(format!(
                "Perfect! The car traveled {target}m in {time:.1}s. Speed = Distance ÷ Time = {target} ÷ {time:.1} = {actual:.2} m/s. Your prediction was spot on!"
            ))
        } else {
            Feedback::hint(format!(
                "The car traveled {target}m in {time:.1}s. Actual Speed = {actual:.2} m/s. You predicted {} m/s. Remember: Speed = Distance ÷ Time. Try again!",
                self.user_speed
            ))
        }
    }

    fn readout(&self, _level: Level) -> MotionReadout {
        MotionReadout {
            time: self.time(),
            distance: self.distance,
            progress: self.distance / self.target_distance * 100.0,
            actual_speed: self.actual_speed(),
        }
    }

    fn advance(&mut self, next: Level) {
        let user_speed = self.user_speed;
        *self = Self::for_level(next);
        self.user_speed = user_speed;
    }

    fn tick(&mut self, _level: Level) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        self.elapsed_ticks += 1;
        self.distance = (self.distance + self.speed * TICK_SECONDS).min(self.target_distance);

        if self.arrived() {
            self.running = false;
            TickOutcome::Stopped { evaluate: true }
        } else {
            TickOutcome::Advanced
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
