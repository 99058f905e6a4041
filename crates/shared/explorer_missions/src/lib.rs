//! Physics Explorer missions.
//!
//! Seven small experiments (motion, light, circuits, magnetism, heat, energy,
//! air), each played through three levels. The crate is UI-agnostic: hosts
//! mount a screen through [`selector::MissionSelector`], forward control
//! actions, and deliver ticks every [`experiment::TICK_MS`] while an
//! experiment reports that it is running.

pub mod catalog;
pub mod experiment;
pub mod selector;
pub mod stats;

pub mod air;
pub mod circuit;
pub mod energy;
pub mod heat;
pub mod light;
pub mod magnetism;
pub mod motion;

pub use catalog::{MissionDescriptor, MissionId, CATALOG};
pub use experiment::{
    ActionError, Experiment, Feedback, Level, MissionScreen, Signal, Transition, TICK_MS,
};
pub use selector::{ActiveMission, MissionAction, MissionSelector, MissionSnapshot, SelectorError};
