//! World definitions and the read-only [`WorldStore`] adapter.
//!
//! Definitions are immutable and shared by every session. The engine only
//! ever reads them; seeding a store is somebody else's job.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryWorld;
pub use sqlite::SqliteWorld;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{EnemyId, LocationId, NpcId, QuestId};

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// A location as stored in the world, before any per-player filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDef {
    /// Unique id.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Description shown on arrival.
    pub description: String,
    /// Minimum player level required to enter.
    pub level: u32,
    /// Optional image reference.
    pub image: Option<String>,
    /// Outgoing edges to other locations.
    pub directions: Vec<DirectionDef>,
    /// Characters standing here.
    pub npcs: Vec<NpcDef>,
    /// Enemies lurking here.
    pub enemies: Vec<EnemyDef>,
}

/// A directed edge between two locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionDef {
    /// Phrase shown to the player ("To the old mill").
    pub name: String,
    /// Where the edge leads.
    pub target: LocationId,
    /// Level gate of the target location.
    pub target_level: u32,
}

impl DirectionDef {
    /// Whether a player of `level` may travel this way.
    #[must_use]
    pub fn is_open_for(&self, level: u32) -> bool {
        self.target_level <= level
    }
}

/// A non-player character and every quest it can give.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcDef {
    /// Unique id.
    pub id: NpcId,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// What the character says when approached.
    pub phrase: String,
    /// Optional image reference.
    pub image: Option<String>,
    /// Quests offered by this character.
    pub quests: Vec<QuestDef>,
}

/// An enemy template. Combat works on an [`crate::snapshot::EnemyEncounter`] copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDef {
    /// Unique id.
    pub id: EnemyId,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Battle cry.
    pub phrase: String,
    /// Level added to every defence roll.
    pub level: u32,
    /// Starting hit points.
    pub health: i32,
    /// Damage dealt when it wins an exchange.
    pub damage: u32,
    /// Item names dropped on death.
    pub loot: Vec<String>,
    /// Optional image reference.
    pub image: Option<String>,
}

/// What has to happen for a quest to be handed in.
///
/// Exactly one goal per quest: the enum makes the invariant structural.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestGoal {
    /// Deliver one unit of an item.
    Bring {
        /// Item name as it appears in the inventory.
        item: String,
    },
    /// Defeat a specific enemy.
    Kill {
        /// Enemy to defeat.
        enemy: EnemyId,
    },
    /// Carry a message to another character.
    Talk {
        /// Character that must receive the message.
        npc: NpcId,
    },
}

impl QuestGoal {
    /// Goal category.
    #[must_use]
    pub fn kind(&self) -> GoalKind {
        match self {
            Self::Bring { .. } => GoalKind::Bring,
            Self::Kill { .. } => GoalKind::Kill,
            Self::Talk { .. } => GoalKind::Talk,
        }
    }
}

/// Quest completion category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalKind {
    /// Deliver an item.
    Bring,
    /// Defeat an enemy.
    Kill,
    /// Deliver a message.
    Talk,
}

/// An immutable quest definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestDef {
    /// Unique id.
    pub id: QuestId,
    /// Character that gives (and takes back) the quest.
    pub npc_id: NpcId,
    /// Name of that character, kept for message-delivery menus.
    pub npc_name: String,
    /// Display name.
    pub name: String,
    /// Task description.
    pub description: String,
    /// Text shown on completion.
    pub congratulation: String,
    /// Completing this quest finishes the game.
    pub is_final: bool,
    /// Completion goal.
    pub goal: QuestGoal,
}

// ---------------------------------------------------------------------------
// Store contract
// ---------------------------------------------------------------------------

/// Read-only access to world definitions.
///
/// Implementations must be shareable across sessions. A missing id is an
/// error (`LocationNotFound` / `EnemyNotFound`), never a silent default.
pub trait WorldStore: Send + Sync {
    /// Fetch a location with its directions, characters and enemies.
    ///
    /// # Errors
    /// `CoreError::LocationNotFound` if no such location exists.
    fn location(&self, id: LocationId) -> Result<LocationDef>;

    /// All locations whose level gate equals `level`.
    ///
    /// # Errors
    /// Backend failures only; an empty level yields an empty list.
    fn locations_at_level(&self, level: u32) -> Result<Vec<LocationDef>>;

    /// Fetch an enemy definition.
    ///
    /// # Errors
    /// `CoreError::EnemyNotFound` if no such enemy exists.
    fn enemy(&self, id: EnemyId) -> Result<EnemyDef>;
}

impl<W: WorldStore + ?Sized> WorldStore for std::sync::Arc<W> {
    fn location(&self, id: LocationId) -> Result<LocationDef> {
        (**self).location(id)
    }

    fn locations_at_level(&self, level: u32) -> Result<Vec<LocationDef>> {
        (**self).locations_at_level(level)
    }

    fn enemy(&self, id: EnemyId) -> Result<EnemyDef> {
        (**self).enemy(id)
    }
}
