//! The shape every mission shares.
//!
//! A mission is an [`Experiment`] (topic-specific state plus pure formulas)
//! wrapped in a [`MissionScreen`], which owns everything the seven missions
//! have in common: the level counter, the visible feedback, evaluation stats
//! and the one-shot completion latch.
//!
//! The screen is the only place that enforces the progression rules:
//!
//! - every control action clears the shown feedback;
//! - the next level is reachable only while a passing feedback is shown;
//! - completion is signalled once, on the first passing evaluation at the
//!   final level.

use crate::stats::EvalStats;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Wall-clock period of one simulation tick.
pub const TICK_MS: u64 = 100;

/// Simulated seconds covered by one tick.
pub const TICK_SECONDS: f64 = TICK_MS as f64 / 1000.0;

/// Progress stage within a mission. Always in `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const FIRST: Level = Level(1);
    pub const FINAL: Level = Level(3);

    pub fn new(n: u8) -> Option<Self> {
        (Self::FIRST.0..=Self::FINAL.0)
            .contains(&n)
            .then_some(Level(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_final(self) -> bool {
        self == Self::FINAL
    }

    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Level::new(n).ok_or_else(|| format!("level {n} is outside 1..=3"))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.0, Self::FINAL.0)
    }
}

/// Explanation shown after an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Whether the evaluation met the level's target condition.
    pub passed: bool,
    pub text: String,
}

impl Feedback {
    pub fn pass(text: impl Into<String>) -> Self {
        Self {
            passed: true,
            text: text.into(),
        }
    }

    pub fn hint(text: impl Into<String>) -> Self {
        Self {
            passed: false,
            text: text.into(),
        }
    }
}

/// A control that the current experiment state does not accept.
///
/// These mirror controls that a UI would render disabled; a wrong answer is
/// never an `ActionError`, it is a failing [`Feedback`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("{control} = {value} is outside {min}..={max}")]
    OutOfRange {
        control: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{control} is locked: {reason}")]
    Locked {
        control: &'static str,
        reason: &'static str,
    },

    #[error("the next level unlocks after a successful evaluation below the final level")]
    LevelLocked,
}

/// Validate a slider value against its inclusive bounds.
pub(crate) fn check_range(
    control: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<f64, ActionError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ActionError::OutOfRange {
            control,
            value,
            min,
            max,
        })
    }
}

pub(crate) fn locked(control: &'static str, reason: &'static str) -> ActionError {
    ActionError::Locked { control, reason }
}

/// Result of advancing a time-driven experiment by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing is running; the tick had no effect.
    Idle,
    /// State advanced and the experiment keeps running.
    Advanced,
    /// State advanced and the experiment stopped at its threshold.
    /// `evaluate` asks the screen to evaluate immediately.
    Stopped { evaluate: bool },
}

/// Topic-specific state and formulas of one mission.
///
/// Implementations hold only their own fields; level, feedback and
/// completion are owned by [`MissionScreen`].
pub trait Experiment: fmt::Debug + Clone + Serialize {
    type Action: fmt::Debug + Clone;
    type Readout: fmt::Debug + Clone + Serialize;

    /// Initial configuration of `level`.
    fn for_level(level: Level) -> Self;

    /// Apply one control action.
    fn apply(&mut self, level: Level, action: Self::Action) -> Result<(), ActionError>;

    /// Render the explanation for the current state. Must be pure.
    fn evaluate(&self, level: Level) -> Feedback;

    /// Derived display values.
    fn readout(&self, level: Level) -> Self::Readout;

    /// Hook for state that only changes as a consequence of evaluating
    /// (a lit bulb, a visible magnetic interaction, ...).
    fn on_evaluated(&mut self, _level: Level, _passed: bool) {}

    /// Move to the configuration of `next`.
    fn advance(&mut self, next: Level) {
        *self = Self::for_level(next);
    }

    fn tick(&mut self, _level: Level) -> TickOutcome {
        TickOutcome::Idle
    }

    /// Whether the host should keep delivering ticks.
    fn is_running(&self) -> bool {
        false
    }
}

/// Notification a screen sends to its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    #[default]
    None,
    /// The mission was just completed. Sent at most once per screen.
    Completed,
}

/// What changed after a screen operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Transition {
    /// The experiment wants ticks.
    pub running: bool,
    pub signal: Signal,
}

/// One mounted mission: an experiment plus its progression state.
#[derive(Debug, Clone)]
pub struct MissionScreen<E: Experiment> {
    level: Level,
    experiment: E,
    feedback: Option<Feedback>,
    completion_sent: bool,
    stats: EvalStats,
}

impl<E: Experiment> Default for MissionScreen<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Experiment> MissionScreen<E> {
    pub fn new() -> Self {
        Self {
            level: Level::FIRST,
            experiment: E::for_level(Level::FIRST),
            feedback: None,
            completion_sent: false,
            stats: EvalStats::new(),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn experiment(&self) -> &E {
        &self.experiment
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn stats(&self) -> &EvalStats {
        &self.stats
    }

    pub fn readout(&self) -> E::Readout {
        self.experiment.readout(self.level)
    }

    pub fn is_running(&self) -> bool {
        self.experiment.is_running()
    }

    /// The completion signal has been sent.
    pub fn is_complete(&self) -> bool {
        self.completion_sent
    }

    pub fn can_advance(&self) -> bool {
        !self.level.is_final() && self.feedback.as_ref().is_some_and(|f| f.passed)
    }

    pub fn dispatch(&mut self, action: E::Action) -> Result<Transition, ActionError> {
        self.experiment.apply(self.level, action)?;
        self.feedback = None;
        Ok(self.transition(Signal::None))
    }

    pub fn evaluate(&mut self) -> Transition {
        let feedback = self.experiment.evaluate(self.level);
        let passed = feedback.passed;
        self.experiment.on_evaluated(self.level, passed);
        self.stats.record(passed);
        self.feedback = Some(feedback);

        let signal = if passed && self.level.is_final() && !self.completion_sent {
            self.completion_sent = true;
            Signal::Completed
        } else {
            Signal::None
        };
        self.transition(signal)
    }

    pub fn next_level(&mut self) -> Result<Transition, ActionError> {
        let next = match self.level.next() {
            Some(next) if self.can_advance() => next,
            _ => return Err(ActionError::LevelLocked),
        };
        self.experiment.advance(next);
        self.level = next;
        self.feedback = None;
        Ok(self.transition(Signal::None))
    }

    pub fn tick(&mut self) -> Transition {
        match self.experiment.tick(self.level) {
            TickOutcome::Stopped { evaluate: true } => self.evaluate(),
            TickOutcome::Idle | TickOutcome::Advanced | TickOutcome::Stopped { .. } => {
                self.transition(Signal::None)
            }
        }
    }

    pub fn snapshot(&self) -> ScreenSnapshot<E> {
        ScreenSnapshot {
            level: self.level,
            running: self.is_running(),
            complete: self.completion_sent,
            can_advance: self.can_advance(),
            feedback: self.feedback.clone(),
            stats: self.stats.clone(),
            state: self.experiment.clone(),
            readout: self.readout(),
        }
    }

    fn transition(&self, signal: Signal) -> Transition {
        Transition {
            running: self.experiment.is_running(),
            signal,
        }
    }
}

/// Serializable view of a screen for UI clients.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "")]
pub struct ScreenSnapshot<E: Experiment> {
    pub level: Level,
    pub running: bool,
    pub complete: bool,
    pub can_advance: bool,
    pub feedback: Option<Feedback>,
    pub stats: EvalStats,
    pub state: E,
    pub readout: E::Readout,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal experiment: pass iff the dial is set to the level number.
    #[derive(Debug, Clone, Serialize)]
    struct Dial {
        value: u8,
        ticks_left: u8,
    }

    #[derive(Debug, Clone)]
    enum DialAction {
        Set(u8),
        Spin(u8),
    }

    impl Experiment for Dial {
        type Action = DialAction;
        type Readout = u8;

        fn for_level(_level: Level) -> Self {
            Dial {
                value: 0,
                ticks_left: 0,
            }
        }

        fn apply(&mut self, _level: Level, action: DialAction) -> Result<(), ActionError> {
            match action {
                DialAction::Set(v) => {
                    check_range("dial", v as f64, 0.0, 3.0)?;
                    self.value = v;
                }
                DialAction::Spin(n) => self.ticks_left = n,
            }
            Ok(())
        }

        fn evaluate(&self, level: Level) -> Feedback {
            if self.value == level.get() {
                Feedback::pass("yes")
            } else {
                Feedback::hint("no")
            }
        }

        fn readout(&self, _level: Level) -> u8 {
            self.value
        }

        fn tick(&mut self, _level: Level) -> TickOutcome {
            match self.ticks_left {
                0 => TickOutcome::Idle,
                1 => {
                    self.ticks_left = 0;
                    self.value = 3;
                    TickOutcome::Stopped { evaluate: true }
                }
                _ => {
                    self.ticks_left -= 1;
                    TickOutcome::Advanced
                }
            }
        }

        fn is_running(&self) -> bool {
            self.ticks_left > 0
        }
    }

    fn pass_level(screen: &mut MissionScreen<Dial>) -> Transition {
        let target = screen.level().get();
        screen.dispatch(DialAction::Set(target)).unwrap();
        screen.evaluate()
    }

    #[test]
    fn level_stays_in_bounds() {
        assert!(Level::new(0).is_none());
        assert!(Level::new(4).is_none());
        assert_eq!(Level::FINAL.next(), None);
        assert_eq!(Level::FIRST.next(), Level::new(2));
        assert!(serde_json::from_str::<Level>("7").is_err());
        assert_eq!(serde_json::from_str::<Level>("2").unwrap().get(), 2);
    }

    #[test]
    fn actions_clear_feedback() {
        let mut screen = MissionScreen::<Dial>::new();
        screen.evaluate();
        assert!(screen.feedback().is_some());
        screen.dispatch(DialAction::Set(2)).unwrap();
        assert!(screen.feedback().is_none());
    }

    #[test]
    fn rejected_action_keeps_feedback() {
        let mut screen = MissionScreen::<Dial>::new();
        screen.evaluate();
        let err = screen.dispatch(DialAction::Set(9)).unwrap_err();
        assert!(matches!(err, ActionError::OutOfRange { control: "dial", .. }));
        assert!(screen.feedback().is_some());
    }

    #[test]
    fn next_level_requires_passing_feedback() {
        let mut screen = MissionScreen::<Dial>::new();
        assert_eq!(screen.next_level(), Err(ActionError::LevelLocked));

        screen.evaluate();
        assert!(!screen.feedback().unwrap().passed);
        assert_eq!(screen.next_level(), Err(ActionError::LevelLocked));

        pass_level(&mut screen);
        screen.next_level().unwrap();
        assert_eq!(screen.level().get(), 2);
        assert!(screen.feedback().is_none());
    }

    #[test]
    fn completion_fires_once_at_final_level() {
        let mut screen = MissionScreen::<Dial>::new();
        let mut completions = 0;

        for _ in 0..2 {
            if pass_level(&mut screen).signal == Signal::Completed {
                completions += 1;
            }
            screen.next_level().unwrap();
        }
        assert_eq!(screen.level(), Level::FINAL);
        assert_eq!(completions, 0);

        for _ in 0..3 {
            if pass_level(&mut screen).signal == Signal::Completed {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert!(screen.is_complete());
        assert_eq!(screen.next_level(), Err(ActionError::LevelLocked));
        assert_eq!(screen.level(), Level::FINAL);
    }

    #[test]
    fn stopped_tick_can_trigger_evaluation() {
        let mut screen = MissionScreen::<Dial>::new();
        screen.dispatch(DialAction::Spin(3)).unwrap();
        assert!(screen.is_running());

        assert!(screen.tick().running);
        assert!(screen.tick().running);
        let last = screen.tick();
        assert!(!last.running);
        assert_eq!(screen.stats().evaluations, 1);
        assert!(!screen.feedback().unwrap().passed);

        assert_eq!(screen.tick(), Transition::default());
    }
}
