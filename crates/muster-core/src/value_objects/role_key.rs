//! In-game role keys a member can express a preference for

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of in-game roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoleKey {
    #[serde(rename = "rifleman")]
    Rifleman,
    #[serde(rename = "autorifleman")]
    Autorifleman,
    #[serde(rename = "grenadier")]
    Grenadier,
    #[serde(rename = "marksman")]
    Marksman,
    #[serde(rename = "pointman")]
    Pointman,
    #[serde(rename = "medic")]
    Medic,
    #[serde(rename = "corpsman")]
    Corpsman,
    #[serde(rename = "sniper")]
    Sniper,
    #[serde(rename = "armour_crew")]
    ArmourCrew,
    #[serde(rename = "helicopter_pilot")]
    HelicopterPilot,
    #[serde(rename = "fixed-wing_pilot")]
    FixedWingPilot,
    #[serde(rename = "leadership")]
    Leadership,
}

impl RoleKey {
    /// Every role, in display order
    pub const ALL: [RoleKey; 12] = [
        Self::Rifleman,
        Self::Autorifleman,
        Self::Grenadier,
        Self::Marksman,
        Self::Pointman,
        Self::Medic,
        Self::Corpsman,
        Self::Sniper,
        Self::ArmourCrew,
        Self::HelicopterPilot,
        Self::FixedWingPilot,
        Self::Leadership,
    ];

    /// Key as stored in documents and used in commands
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rifleman => "rifleman",
            Self::Autorifleman => "autorifleman",
            Self::Grenadier => "grenadier",
            Self::Marksman => "marksman",
            Self::Pointman => "pointman",
            Self::Medic => "medic",
            Self::Corpsman => "corpsman",
            Self::Sniper => "sniper",
            Self::ArmourCrew => "armour_crew",
            Self::HelicopterPilot => "helicopter_pilot",
            Self::FixedWingPilot => "fixed-wing_pilot",
            Self::Leadership => "leadership",
        }
    }

    /// One-line description shown by `/preferences roles list`
    pub const fn description(self) -> &'static str {
        match self {
            Self::Rifleman => {
                "The backbone of the team, providing suppressive fire and maneuvering to outflank the enemy."
            }
            Self::Autorifleman => "High-volume suppressive fire assault infantry.",
            Self::Grenadier => "High-angle indirect fire support infantry.",
            Self::Marksman => "Long-range high-precision anti-personnel fire support infantry.",
            Self::Pointman => "Close-quarters anti-garrison infantry. Shotgun specialist.",
            Self::Medic => {
                "Primary medical support, including first aid, triage, treatment, surgery, and evacuation."
            }
            Self::Corpsman => "Assists the medic by providing first-response medical care.",
            Self::Sniper => "Pathfinder and long-range anti-material specialist.",
            Self::ArmourCrew => {
                "Armoured-vehicle crew. Driver, gunner, and loader for tanks and APCs. Doesn't include commander role, see leadership for that."
            }
            Self::HelicopterPilot => "Rotary-wing pilot.",
            Self::FixedWingPilot => "Fixed-wing pilot.",
            Self::Leadership => "Team leaders, section commanders, tank commanders, wing commanders, etc.",
        }
    }

    /// Look up a role by its key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == key)
    }
}

impl fmt::Display for RoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoleKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("Unknown role: {s}"))
    }
}
