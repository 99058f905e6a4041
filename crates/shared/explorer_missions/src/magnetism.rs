//! Magnetism: like poles repel, unlike poles attract.

use crate::experiment::{ActionError, Experiment, Feedback, Level};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pole {
    North,
    South,
}

impl Pole {
    pub fn flipped(self) -> Self {
        match self {
            Pole::North => Pole::South,
            Pole::South => Pole::North,
        }
    }

    pub fn shout(self) -> &'static str {
        match self {
            Pole::North => "NORTH",
            Pole::South => "SOUTH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interaction {
    None,
    Attract,
    Repel,
}

impl Interaction {
    pub fn between(a: Pole, b: Pole) -> Self {
        if a == b {
            Interaction::Repel
        } else {
            Interaction::Attract
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MagnetAction {
    FlipFirst,
    FlipSecond,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MagnetLab {
    /// Facing pole of the left magnet.
    pub first: Pole,
    /// Facing pole of the right magnet.
    pub second: Pole,
    /// Shown after a test; cleared by any flip.
    pub interaction: Interaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MagnetReadout {
    pub interaction: Interaction,
}

impl Experiment for MagnetLab {
    type Action = MagnetAction;
    type Readout = MagnetReadout;

    fn for_level(_level: Level) -> Self {
        Self {
            first: Pole::North,
            second: Pole::North,
            interaction: Interaction::None,
        }
    }

    fn apply(&mut self, _level: Level, action: MagnetAction) -> Result<(), ActionError> {
        match action {
            MagnetAction::FlipFirst => self.first = self.first.flipped(),
            MagnetAction::FlipSecond => self.second = self.second.flipped(),
        }
        self.interaction = Interaction::None;
        Ok(())
    }

    fn evaluate(&self, _level: Level) -> Feedback {
        match Interaction::between(self.first, self.second) {
            Interaction::Attract => Feedback::pass(format!(
                "🟢 Attraction! The magnets have opposite poles facing each other ({}-{}). Unlike poles (N-S or S-N) ATTRACT each other. The magnetic forces pull the magnets together. This happens because the magnetic field lines flow from North to South, creating a pulling force.",
                self.first.shout(),
                self.second.shout()
            )),
            Interaction::Repel | Interaction::None => Feedback::hint(format!(
                "🔴 Repulsion! Both magnets have their {} poles facing each other. Like poles (N-N or S-S) REPEL each other. The magnetic forces push the magnets apart. This happens because the magnetic field lines are in opposite directions at the poles.",
                self.first.shout()
            )),
        }
    }

    fn readout(&self, _level: Level) -> MagnetReadout {
        MagnetReadout {
            interaction: self.interaction,
        }
    }

    fn on_evaluated(&mut self, _level: Level, _passed: bool) {
        self.interaction = Interaction::between(self.first, self.second);
    }

    fn advance(&mut self, _next: Level) {
        self.interaction = Interaction::None;
    }
}
