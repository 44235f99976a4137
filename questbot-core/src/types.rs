//! Identity types shared by every questbot component.
//!
//! World identifiers mirror the numeric keys of the world store; the
//! player key is opaque and only ever compared, hashed and displayed.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

numeric_id!(
    /// Key of a location in the world store.
    LocationId
);
numeric_id!(
    /// Key of a non-player character in the world store.
    NpcId
);
numeric_id!(
    /// Key of an enemy definition in the world store.
    EnemyId
);
numeric_id!(
    /// Key of a quest definition in the world store.
    QuestId
);

/// Opaque per-player key handed over by the chat transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerKey(pub u64);

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PlayerKey {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

// ---------------------------------------------------------------------------
// Vitals
// ---------------------------------------------------------------------------

/// Read-only view of a player's vitals, with regeneration already applied.
///
/// Handed to renderers so they never reach into the session itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vitals {
    /// Display name chosen at creation.
    pub name: String,
    /// Current level (starts at 1).
    pub level: u32,
    /// Current hit points.
    pub hp: i32,
    /// Level-scaled cap on hit points.
    pub max_hp: i32,
    /// Damage dealt by a successful attack.
    pub damage: u32,
}
