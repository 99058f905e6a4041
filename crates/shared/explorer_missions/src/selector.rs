//! The mission menu: catalog, completed-set and the one active screen.

use crate::air::{AirAction, AirLab};
use crate::catalog::{MissionDescriptor, MissionId, CATALOG};
use crate::circuit::{CircuitAction, CircuitLab};
use crate::energy::{EnergyAction, EnergyLab};
use crate::experiment::{ActionError, Level, MissionScreen, ScreenSnapshot, Signal, Transition};
use crate::stats::EvalStats;
use crate::heat::{HeatAction, HeatLab};
use crate::light::{LightAction, LightLab};
use crate::magnetism::{MagnetAction, MagnetLab};
use crate::motion::{MotionAction, MotionLab};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectorError {
    #[error("no mission is open")]
    NoActiveMission,

    #[error("{action} action sent while {active} is open")]
    WrongMission { active: MissionId, action: MissionId },

    #[error(transparent)]
    Action(#[from] ActionError),
}

/// A control action addressed to one mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mission", content = "action", rename_all = "snake_case")]
pub enum MissionAction {
    Motion(MotionAction),
    Light(LightAction),
    Circuit(CircuitAction),
    Magnetism(MagnetAction),
    Heat(HeatAction),
    Energy(EnergyAction),
    Air(AirAction),
}

impl MissionAction {
    pub fn mission(&self) -> MissionId {
        match self {
            MissionAction::Motion(_) => MissionId::Motion,
            MissionAction::Light(_) => MissionId::Light,
            MissionAction::Circuit(_) => MissionId::Circuit,
            MissionAction::Magnetism(_) => MissionId::Magnetism,
            MissionAction::Heat(_) => MissionId::Heat,
            MissionAction::Energy(_) => MissionId::Energy,
            MissionAction::Air(_) => MissionId::Air,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mission", rename_all = "snake_case")]
pub enum MissionSnapshot {
    Motion(ScreenSnapshot<MotionLab>),
    Light(ScreenSnapshot<LightLab>),
    Circuit(ScreenSnapshot<CircuitLab>),
    Magnetism(ScreenSnapshot<MagnetLab>),
    Heat(ScreenSnapshot<HeatLab>),
    Energy(ScreenSnapshot<EnergyLab>),
    Air(ScreenSnapshot<AirLab>),
}

/// The mounted mission screen.
#[derive(Debug, Clone)]
pub enum ActiveMission {
    Motion(MissionScreen<MotionLab>),
    Light(MissionScreen<LightLab>),
    Circuit(MissionScreen<CircuitLab>),
    Magnetism(MissionScreen<MagnetLab>),
    Heat(MissionScreen<HeatLab>),
    Energy(MissionScreen<EnergyLab>),
    Air(MissionScreen<AirLab>),
}

/// Run `$body` with `$screen` bound to whichever screen is mounted.
macro_rules! with_screen {
    ($active:expr, $screen:ident => $body:expr) => {
        match $active {
            ActiveMission::Motion($screen) => $body,
            ActiveMission::Light($screen) => $body,
            ActiveMission::Circuit($screen) => $body,
            ActiveMission::Magnetism($screen) => $body,
            ActiveMission::Heat($screen) => $body,
            ActiveMission::Energy($screen) => $body,
            ActiveMission::Air($screen) => $body,
        }
    };
}

impl ActiveMission {
    /// A fresh screen at level 1.
    pub fn mount(id: MissionId) -> Self {
        match id {
            MissionId::Motion => ActiveMission::Motion(MissionScreen::new()),
            MissionId::Light => ActiveMission::Light(MissionScreen::new()),
            MissionId::Circuit => ActiveMission::Circuit(MissionScreen::new()),
            MissionId::Magnetism => ActiveMission::Magnetism(MissionScreen::new()),
            MissionId::Heat => ActiveMission::Heat(MissionScreen::new()),
            MissionId::Energy => ActiveMission::Energy(MissionScreen::new()),
            MissionId::Air => ActiveMission::Air(MissionScreen::new()),
        }
    }

    pub fn id(&self) -> MissionId {
        match self {
            ActiveMission::Motion(_) => MissionId::Motion,
            ActiveMission::Light(_) => MissionId::Light,
            ActiveMission::Circuit(_) => MissionId::Circuit,
            ActiveMission::Magnetism(_) => MissionId::Magnetism,
            ActiveMission::Heat(_) => MissionId::Heat,
            ActiveMission::Energy(_) => MissionId::Energy,
            ActiveMission::Air(_) => MissionId::Air,
        }
    }

    pub fn level(&self) -> Level {
        with_screen!(self, s => s.level())
    }

    pub fn is_running(&self) -> bool {
        with_screen!(self, s => s.is_running())
    }

    pub fn is_complete(&self) -> bool {
        with_screen!(self, s => s.is_complete())
    }

    pub fn stats(&self) -> &EvalStats {
        with_screen!(self, s => s.stats())
    }

    pub fn dispatch(&mut self, action: MissionAction) -> Result<Transition, SelectorError> {
        let transition = match (&mut *self, action) {
            (ActiveMission::Motion(s), MissionAction::Motion(a)) => s.dispatch(a)?,
            (ActiveMission::Light(s), MissionAction::Light(a)) => s.dispatch(a)?,
            (ActiveMission::Circuit(s), MissionAction::Circuit(a)) => s.dispatch(a)?,
            (ActiveMission::Magnetism(s), MissionAction::Magnetism(a)) => s.dispatch(a)?,
            (ActiveMission::Heat(s), MissionAction::Heat(a)) => s.dispatch(a)?,
            (ActiveMission::Energy(s), MissionAction::Energy(a)) => s.dispatch(a)?,
            (ActiveMission::Air(s), MissionAction::Air(a)) => s.dispatch(a)?,
            (active, action) => {
                return Err(SelectorError::WrongMission {
                    active: active.id(),
                    action: action.mission(),
                })
            }
        };
        Ok(transition)
    }

    pub fn evaluate(&mut self) -> Transition {
        with_screen!(self, s => s.evaluate())
    }

    pub fn next_level(&mut self) -> Result<Transition, ActionError> {
        with_screen!(self, s => s.next_level())
    }

    pub fn tick(&mut self) -> Transition {
        with_screen!(self, s => s.tick())
    }

    pub fn snapshot(&self) -> MissionSnapshot {
        match self {
            ActiveMission::Motion(s) => MissionSnapshot::Motion(s.snapshot()),
            ActiveMission::Light(s) => MissionSnapshot::Light(s.snapshot()),
            ActiveMission::Circuit(s) => MissionSnapshot::Circuit(s.snapshot()),
            ActiveMission::Magnetism(s) => MissionSnapshot::Magnetism(s.snapshot()),
            ActiveMission::Heat(s) => MissionSnapshot::Heat(s.snapshot()),
            ActiveMission::Energy(s) => MissionSnapshot::Energy(s.snapshot()),
            ActiveMission::Air(s) => MissionSnapshot::Air(s.snapshot()),
        }
    }
}

/// Owns the completed-set and routes to at most one mission screen.
#[derive(Debug, Clone, Default)]
pub struct MissionSelector {
    completed: HashSet<MissionId>,
    active: Option<ActiveMission>,
}

impl MissionSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &'static [MissionDescriptor] {
        CATALOG
    }

    /// Mount a fresh screen for `id`, discarding any screen already open.
    pub fn open(&mut self, id: MissionId) -> &ActiveMission {
        self.active.insert(ActiveMission::mount(id))
    }

    /// Unmount the active screen. Returns the mission that was open.
    pub fn back(&mut self) -> Option<MissionId> {
        self.active.take().map(|m| m.id())
    }

    pub fn active(&self) -> Option<&ActiveMission> {
        self.active.as_ref()
    }

    pub fn dispatch(&mut self, action: MissionAction) -> Result<Transition, SelectorError> {
        let active = self.active_mut()?;
        let transition = active.dispatch(action)?;
        Ok(self.absorb(transition))
    }

    pub fn evaluate(&mut self) -> Result<Transition, SelectorError> {
        let transition = self.active_mut()?.evaluate();
        Ok(self.absorb(transition))
    }

    pub fn next_level(&mut self) -> Result<Transition, SelectorError> {
        let transition = self.active_mut()?.next_level()?;
        Ok(self.absorb(transition))
    }

    pub fn tick(&mut self) -> Result<Transition, SelectorError> {
        let transition = self.active_mut()?.tick();
        Ok(self.absorb(transition))
    }

    /// Add `id` to the completed-set. Returns `false` if it was already there.
    pub fn record_completion(&mut self, id: MissionId) -> bool {
        self.completed.insert(id)
    }

    pub fn is_completed(&self, id: MissionId) -> bool {
        self.completed.contains(&id)
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Completed missions in catalog order.
    pub fn completed(&self) -> Vec<MissionId> {
        MissionId::all()
            .iter()
            .copied()
            .filter(|id| self.completed.contains(id))
            .collect()
    }

    fn active_mut(&mut self) -> Result<&mut ActiveMission, SelectorError> {
        self.active.as_mut().ok_or(SelectorError::NoActiveMission)
    }

    fn absorb(&mut self, transition: Transition) -> Transition {
        if transition.signal == Signal::Completed {
            if let Some(id) = self.active.as_ref().map(ActiveMission::id) {
                self.record_completion(id);
            }
        }
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_magnetism(selector: &mut MissionSelector) -> Vec<Signal> {
        selector.open(MissionId::Magnetism);
        selector
            .dispatch(MissionAction::Magnetism(MagnetAction::FlipFirst))
            .unwrap();
        let mut signals = Vec::new();
        for _ in 0..2 {
            signals.push(selector.evaluate().unwrap().signal);
            selector.next_level().unwrap();
        }
        signals.push(selector.evaluate().unwrap().signal);
        signals
    }

    #[test]
    fn completion_is_recorded_once() {
        let mut selector = MissionSelector::new();
        let signals = complete_magnetism(&mut selector);
        assert_eq!(signals, vec![Signal::None, Signal::None, Signal::Completed]);
        assert!(selector.is_completed(MissionId::Magnetism));
        assert_eq!(selector.completed_count(), 1);

        // Re-evaluating and replaying the mission never grows the set.
        assert_eq!(selector.evaluate().unwrap().signal, Signal::None);
        complete_magnetism(&mut selector);
        assert_eq!(selector.completed_count(), 1);
        assert!(!selector.record_completion(MissionId::Magnetism));
    }

    #[test]
    fn reopening_starts_at_level_one() {
        let mut selector = MissionSelector::new();
        complete_magnetism(&mut selector);
        assert_eq!(selector.active().unwrap().level(), Level::FINAL);

        assert_eq!(selector.back(), Some(MissionId::Magnetism));
        assert!(selector.active().is_none());

        let screen = selector.open(MissionId::Magnetism);
        assert_eq!(screen.level(), Level::FIRST);
        assert!(!screen.is_complete());
        assert_eq!(screen.stats().evaluations, 0);
    }

    #[test]
    fn opening_another_mission_replaces_the_screen() {
        let mut selector = MissionSelector::new();
        selector.open(MissionId::Heat);
        selector.open(MissionId::Air);
        assert_eq!(selector.active().map(ActiveMission::id), Some(MissionId::Air));
    }

    #[test]
    fn actions_need_the_matching_mission() {
        let mut selector = MissionSelector::new();
        let flip = MissionAction::Magnetism(MagnetAction::FlipFirst);
        assert_eq!(
            selector.dispatch(flip.clone()),
            Err(SelectorError::NoActiveMission)
        );
        assert_eq!(selector.evaluate(), Err(SelectorError::NoActiveMission));

        selector.open(MissionId::Circuit);
        assert_eq!(
            selector.dispatch(flip),
            Err(SelectorError::WrongMission {
                active: MissionId::Circuit,
                action: MissionId::Magnetism,
            })
        );
        assert_eq!(
            selector.next_level(),
            Err(SelectorError::Action(ActionError::LevelLocked))
        );
    }

    #[test]
    fn completed_list_follows_catalog_order() {
        let mut selector = MissionSelector::new();
        selector.record_completion(MissionId::Air);
        selector.record_completion(MissionId::Motion);
        selector.record_completion(MissionId::Heat);
        assert_eq!(
            selector.completed(),
            vec![MissionId::Motion, MissionId::Heat, MissionId::Air]
        );
    }

    #[test]
    fn ticks_drive_the_active_screen() {
        let mut selector = MissionSelector::new();
        assert_eq!(selector.tick(), Err(SelectorError::NoActiveMission));

        selector.open(MissionId::Heat);
        let started = selector
            .dispatch(MissionAction::Heat(HeatAction::Heat))
            .unwrap();
        assert!(started.running);
        selector.tick().unwrap();
        match selector.active().unwrap().snapshot() {
            MissionSnapshot::Heat(s) => assert_eq!(s.state.temperature, 27.0),
            other => panic!("unexpected snapshot {other:?}"),
        }
    }

    #[test]
    fn actions_and_snapshots_use_tagged_json() {
        let action: MissionAction = serde_json::from_str(
            r#"{"mission":"motion","action":{"kind":"set_speed","speed":7.0}}"#,
        )
        .unwrap();
        assert_eq!(
            action,
            MissionAction::Motion(MotionAction::SetSpeed { speed: 7.0 })
        );

        let mut selector = MissionSelector::new();
        selector.open(MissionId::Air);
        let json = serde_json::to_value(selector.active().unwrap().snapshot()).unwrap();
        assert_eq!(json["mission"], "air");
        assert_eq!(json["level"], 1);
        assert_eq!(json["readout"]["pressure"], 100.0);
        assert_eq!(json["state"]["bottle"], "normal");
    }
}
