//! Line-delimited JSON protocol between `explorerd` and its clients.
//!
//! Each request and response is a single JSON object on its own line,
//! tagged by `"type"`.

use explorer_missions::{MissionAction, MissionDescriptor, MissionId, MissionSnapshot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// The mission menu, with completion marks.
    Catalog,
    GetState,
    /// Mount a fresh screen for `mission` at level 1.
    Open { mission: MissionId },
    /// Leave the active mission, discarding its state.
    Back,
    Act { action: MissionAction },
    Evaluate,
    NextLevel,
    Shutdown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Response {
    Catalog {
        missions: Vec<CatalogEntry>,
        completed: usize,
        total: usize,
    },
    State(Box<StateSnapshot>),
    Success {
        message: String,
    },
    Error {
        message: String,
    },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub mission: MissionDescriptor,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub tick_ms: u64,
    /// A tick loop is driving the active experiment.
    pub ticking: bool,
    pub completed: Vec<MissionId>,
    pub total: usize,
    pub active: Option<MissionSnapshot>,
    /// Share of passing evaluations on the active screen, overall and over
    /// the recent window.
    pub pass_rate: Option<f32>,
    pub recent_rate: Option<f32>,
}
