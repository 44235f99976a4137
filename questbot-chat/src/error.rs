//! Error types for the chat layer.

use questbot_core::CoreError;
use thiserror::Error;

/// Failure that aborts one interaction.
///
/// Expected gameplay outcomes never show up here; they become replies.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Broken world data or a store failure from the core.
    #[error("Internal error: {0}")]
    Internal(#[from] CoreError),
}

impl ChatError {
    /// Whether the failure comes from broken world data.
    #[must_use]
    pub fn is_integrity_fault(&self) -> bool {
        match self {
            Self::Internal(core) => core.is_integrity_fault(),
        }
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, ChatError>;
