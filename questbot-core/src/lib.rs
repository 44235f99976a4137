//! # questbot-core
//!
//! Session game-state engine for a chat-driven text adventure.
//!
//! A player explores a level-gated graph of locations, takes quests from
//! characters and fights enemies with opposed dice rolls. This crate holds
//! everything with real invariants:
//!
//! - **World** — immutable definitions behind the [`WorldStore`] trait
//!   (in-memory or read-only SQLite)
//! - **Snapshot** — the per-player, exclusion-filtered view of a location
//! - **Combat** — the stateless opposed-roll resolver
//! - **Quest** — the Offered → Taken → Completable → Completed lifecycle
//! - **Session** — the [`PlayerSession`] aggregate that ties it together
//!
//! Randomness and time come in through the [`DiceRoller`] and [`Clock`]
//! ports, so every fight and every regeneration step is reproducible.

#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod combat;
pub mod config;
pub mod dice;
pub mod error;
pub mod inventory;
pub mod quest;
pub mod selection;
pub mod session;
pub mod snapshot;
pub mod types;
pub mod world;

pub use clock::{Clock, ManualClock, SystemClock};
pub use combat::{resolve_attack, AttackRoll, Exchange};
pub use config::EngineConfig;
pub use dice::{DiceRoller, ScriptedDice, StdDice};
pub use error::{CoreError, Result};
pub use inventory::Inventory;
pub use quest::{QuestCompletion, QuestLog, QuestState};
pub use selection::{resolve, MatchRule, Named};
pub use session::{AttackOutcome, DamageOutcome, PlayerSession, SessionRules};
pub use snapshot::{EnemyEncounter, LocationSnapshot};
pub use types::*;
pub use world::{
    DirectionDef, EnemyDef, GoalKind, InMemoryWorld, LocationDef, NpcDef, QuestDef, QuestGoal,
    SqliteWorld, WorldStore,
};
