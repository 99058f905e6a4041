//! Mission inventory shown by the selector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionId {
    Motion,
    Light,
    Circuit,
    Magnetism,
    Heat,
    Energy,
    Air,
}

impl MissionId {
    pub fn label(self) -> &'static str {
        match self {
            MissionId::Motion => "motion",
            MissionId::Light => "light",
            MissionId::Circuit => "circuit",
            MissionId::Magnetism => "magnetism",
            MissionId::Heat => "heat",
            MissionId::Energy => "energy",
            MissionId::Air => "air",
        }
    }

    pub fn descriptor(self) -> &'static MissionDescriptor {
        // CATALOG is declared in `all()` order.
        &CATALOG[self as usize]
    }

    pub fn all() -> &'static [MissionId] {
        &[
            MissionId::Motion,
            MissionId::Light,
            MissionId::Circuit,
            MissionId::Magnetism,
            MissionId::Heat,
            MissionId::Energy,
            MissionId::Air,
        ]
    }
}

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mission `{0}`")]
pub struct UnknownMission(pub String);

impl FromStr for MissionId {
    type Err = UnknownMission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        MissionId::all()
            .iter()
            .copied()
            .find(|id| id.label() == wanted)
            .ok_or_else(|| UnknownMission(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissionDescriptor {
    pub id: MissionId,
    pub title: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    /// CSS hex colour used for the mission's card.
    pub accent: &'static str,
}

pub const CATALOG: &[MissionDescriptor] = &[
    MissionDescriptor {
        id: MissionId::Motion,
        title: "Motion & Measurement",
        icon: "📘",
        description: "Learn about distance, time, and speed",
        accent: "#3b82f6",
    },
    MissionDescriptor {
        id: MissionId::Light,
        title: "Light & Shadows",
        icon: "💡",
        description: "Explore reflection, shadows, and mirrors",
        accent: "#eab308",
    },
    MissionDescriptor {
        id: MissionId::Circuit,
        title: "Electricity & Circuits",
        icon: "⚡",
        description: "Build circuits and understand current flow",
        accent: "#a855f7",
    },
    MissionDescriptor {
        id: MissionId::Magnetism,
        title: "Magnetism",
        icon: "🧲",
        description: "Discover attraction and repulsion",
        accent: "#ef4444",
    },
    MissionDescriptor {
        id: MissionId::Heat,
        title: "Heat",
        icon: "🌡️",
        description: "Understand temperature and heat transfer",
        accent: "#f97316",
    },
    MissionDescriptor {
        id: MissionId::Energy,
        title: "Sources of Energy",
        icon: "☀️",
        description: "Learn about energy transformation",
        accent: "#22c55e",
    },
    MissionDescriptor {
        id: MissionId::Air,
        title: "Air Around Us",
        icon: "💨",
        description: "Explore air pressure and properties",
        accent: "#06b6d4",
    },
];
