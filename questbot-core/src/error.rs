//! Error types for the questbot engine core.

use thiserror::Error;

use crate::types::{EnemyId, LocationId, QuestId};

/// Top-level error type for all engine-core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The world store has no location with this id.
    #[error("Location not found: {0}")]
    LocationNotFound(LocationId),

    /// The world store has no enemy with this id.
    #[error("Enemy not found: {0}")]
    EnemyNotFound(EnemyId),

    /// A snapshot was requested for a location definition that does not exist.
    #[error("Invalid location: no definition to build a snapshot from")]
    InvalidLocation,

    /// A quest definition breaks the one-goal invariant.
    #[error("Invalid quest {id}: {reason}")]
    InvalidQuest {
        /// Offending quest.
        id: QuestId,
        /// What is wrong with its goal columns.
        reason: String,
    },

    /// The quest is not held, already completed, or its goal is not met.
    #[error("Quest {0} cannot be completed")]
    NotCompletable(QuestId),

    /// The quest is not offered by anyone in the current location.
    #[error("Quest {0} is not available here")]
    QuestNotFound(QuestId),

    /// Tried to hand over an item the player does not carry.
    #[error("Item not held: {0}")]
    ItemNotHeld(String),

    /// The targeted encounter has already been defeated.
    #[error("Enemy {0} is already dead")]
    EncounterAlreadyDead(EnemyId),

    /// The targeted enemy is not present in the current location.
    #[error("Enemy {0} is not present here")]
    EncounterNotFound(EnemyId),

    /// SQLite world store error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Whether this error signals broken world data rather than an expected
    /// gameplay outcome. Integrity faults abort the current interaction and
    /// are reported to the transport as internal errors.
    #[must_use]
    pub fn is_integrity_fault(&self) -> bool {
        matches!(
            self,
            Self::LocationNotFound(_)
                | Self::EnemyNotFound(_)
                | Self::InvalidLocation
                | Self::InvalidQuest { .. }
                | Self::Database(_)
        )
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, CoreError>;
