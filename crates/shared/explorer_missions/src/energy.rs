//! Sources of Energy: source → electrical energy → output device.

use crate::experiment::{ActionError, Experiment, Feedback, Level, TickOutcome};
use serde::{Deserialize, Serialize};

/// Length of the transformation animation (2 s).
pub const TRANSFORM_TICKS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergySource {
    Solar,
    Hydro,
    Wind,
    Battery,
}

impl EnergySource {
    pub fn name(self) -> &'static str {
        match self {
            EnergySource::Solar => "Solar Panel",
            EnergySource::Hydro => "Water Turbine",
            EnergySource::Wind => "Wind Turbine",
            EnergySource::Battery => "Battery",
        }
    }

    /// Form of energy the source takes in.
    pub fn input(self) -> &'static str {
        match self {
            EnergySource::Solar => "Light Energy from Sun",
            EnergySource::Hydro => "Kinetic Energy from Water",
            EnergySource::Wind => "Kinetic Energy from Wind",
            EnergySource::Battery => "Chemical Energy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyOutput {
    Light,
    Motion,
    Heat,
    Sound,
}

impl EnergyOutput {
    pub fn name(self) -> &'static str {
        match self {
            EnergyOutput::Light => "Light Bulb",
            EnergyOutput::Motion => "Motor/Fan",
            EnergyOutput::Heat => "Heater",
            EnergyOutput::Sound => "Speaker",
        }
    }

    /// Form of energy the device turns electricity into.
    pub fn converts_to(self) -> &'static str {
        match self {
            EnergyOutput::Light => "light energy (and some heat)",
            EnergyOutput::Motion => "kinetic energy (motion)",
            EnergyOutput::Heat => "heat energy",
            EnergyOutput::Sound => "sound energy",
        }
    }

    pub fn example(self) -> &'static str {
        match self {
            EnergyOutput::Light => "Bulbs, LEDs, tube lights",
            EnergyOutput::Motion => "Fans, washing machines, cars",
            EnergyOutput::Heat => "Iron, heater, electric stove",
            EnergyOutput::Sound => "Speakers, bells, alarms",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnergyAction {
    SelectSource { source: EnergySource },
    SelectOutput { output: EnergyOutput },
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnergyLab {
    pub source: Option<EnergySource>,
    pub output: Option<EnergyOutput>,
    /// Ticks left in the transformation animation.
    pub transforming_ticks: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnergyReadout {
    pub transforming: bool,
    /// `[input, "Electrical Energy", output]` once both ends are chosen.
    pub chain: Option<[&'static str; 3]>,
}

impl Experiment for EnergyLab {
    type Action = EnergyAction;
    type Readout = EnergyReadout;

    fn for_level(_level: Level) -> Self {
        Self::default()
    }

    fn apply(&mut self, _level: Level, action: EnergyAction) -> Result<(), ActionError> {
        match action {
            EnergyAction::SelectSource { source } => self.source = Some(source),
            EnergyAction::SelectOutput { output } => self.output = Some(output),
            EnergyAction::Reset => *self = Self::default(),
        }
        Ok(())
    }

    fn evaluate(&self, _level: Level) -> Feedback {
        let (Some(source), Some(output)) = (self.source, self.output) else {
            return Feedback::hint(
                "⚠️ Please select both an energy source and an output device to see energy transformation!",
            );
        };

        Feedback::pass(format!(
            "🌟 Energy Transformation Complete!\n\n\
             1️⃣ INPUT: {} takes {}\n\
             2️⃣ CONVERSION: It converts this to ELECTRICAL ENERGY\n\
             3️⃣ OUTPUT: The {} then converts electrical energy to {}\n\n\
             Real-world example: {}\n\n\
             ⚡ Key Principle: Energy cannot be created or destroyed, only transformed from one form to another! This is called the LAW OF CONSERVATION OF ENERGY.\n\n\
             💡 Fun Fact: Some energy is always \"lost\" as heat during transformation - no machine is 100% efficient!",
            source.name(),
            source.input(),
            output.name(),
            output.converts_to(),
            output.example()
        ))
    }

    fn readout(&self, _level: Level) -> EnergyReadout {
        EnergyReadout {
            transforming: self.is_running(),
            chain: self
                .source
                .zip(self.output)
                .map(|(s, o)| [s.input(), "Electrical Energy", o.converts_to()]),
        }
    }

    fn on_evaluated(&mut self, _level: Level, passed: bool) {
        if passed {
            self.transforming_ticks = TRANSFORM_TICKS;
        }
    }

    fn tick(&mut self, _level: Level) -> TickOutcome {
        match self.transforming_ticks {
            0 => TickOutcome::Idle,
            1 => {
                self.transforming_ticks = 0;
                TickOutcome::Stopped { evaluate: false }
            }
            _ => {
                self.transforming_ticks -= 1;
                TickOutcome::Advanced
            }
        }
    }

    fn is_running(&self) -> bool {
        self.transforming_ticks > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{MissionScreen, Signal};

    fn choose(screen: &mut MissionScreen<EnergyLab>, source: EnergySource, output: EnergyOutput) {
        screen
            .dispatch(EnergyAction::SelectSource { source })
            .unwrap();
        screen
            .dispatch(EnergyAction::SelectOutput { output })
            .unwrap();
    }

    #[test]
    fn needs_both_source_and_output() {
        let mut screen = MissionScreen::<EnergyLab>::new();
        screen
            .dispatch(EnergyAction::SelectSource {
                source: EnergySource::Wind,
            })
            .unwrap();
        let t = screen.evaluate();
        assert!(!t.running);
        assert!(!screen.feedback().unwrap().passed);
        assert!(screen.readout().chain.is_none());
    }

    #[test]
    fn transformation_runs_for_two_seconds() {
        let mut screen = MissionScreen::<EnergyLab>::new();
        choose(&mut screen, EnergySource::Solar, EnergyOutput::Sound);
        assert!(screen.evaluate().running);

        let text = &screen.feedback().unwrap().text;
        assert!(text.contains("INPUT: Solar Panel takes Light Energy from Sun"));
        assert!(text.contains("converts electrical energy to sound energy"));

        let mut ticks = 1;
        while screen.tick().running {
            ticks += 1;
        }
        assert_eq!(ticks, TRANSFORM_TICKS);
        assert!(!screen.readout().transforming);
        // The explanation stays up after the animation.
        assert!(screen.feedback().is_some());
    }

    #[test]
    fn chain_names_every_stage() {
        let mut screen = MissionScreen::<EnergyLab>::new();
        choose(&mut screen, EnergySource::Hydro, EnergyOutput::Motion);
        assert_eq!(
            screen.readout().chain,
            Some([
                "Kinetic Energy from Water",
                "Electrical Energy",
                "kinetic energy (motion)"
            ])
        );
    }

    #[test]
    fn level_change_clears_selection_and_final_level_completes() {
        let mut screen = MissionScreen::<EnergyLab>::new();
        for _ in 0..2 {
            choose(&mut screen, EnergySource::Battery, EnergyOutput::Light);
            screen.evaluate();
            screen.next_level().unwrap();
            assert_eq!(screen.experiment(), &EnergyLab::default());
        }
        choose(&mut screen, EnergySource::Wind, EnergyOutput::Heat);
        assert_eq!(screen.evaluate().signal, Signal::Completed);
    }
}
