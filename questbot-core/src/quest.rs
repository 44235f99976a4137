//! Quest lifecycle: Offered → Taken → Completable → Completed.
//!
//! The [`QuestLog`] only tracks which quests are held and which are done.
//! Completion side effects that touch the rest of the player (inventory,
//! level) are applied by [`crate::session::PlayerSession`].

use std::collections::BTreeSet;

use serde::Serialize;

use crate::inventory::Inventory;
use crate::types::{EnemyId, QuestId};
use crate::world::{QuestDef, QuestGoal};

/// Where a quest stands for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QuestState {
    /// Visible on its giver, not held.
    Offered,
    /// Held, goal not met yet.
    Taken,
    /// Held and ready to hand in.
    Completable,
    /// Done; never offered again.
    Completed,
}

/// What a completion did to the player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestCompletion {
    /// The completed quest.
    pub quest: QuestDef,
    /// Player level after the level-up.
    pub new_level: u32,
    /// Whether this completion ends the game.
    pub is_final: bool,
}

/// Whether the Bring/Kill predicate holds.
///
/// Talk quests never satisfy it: they complete only by delivering the
/// message to the goal character.
#[must_use]
pub fn goal_met(goal: &QuestGoal, inventory: &Inventory, killed: &BTreeSet<EnemyId>) -> bool {
    match goal {
        QuestGoal::Bring { item } => inventory.contains(item),
        QuestGoal::Kill { enemy } => killed.contains(enemy),
        QuestGoal::Talk { .. } => false,
    }
}

/// Held and completed quests of one player.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QuestLog {
    active: Vec<QuestDef>,
    completed: BTreeSet<QuestId>,
}

impl QuestLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the quest is currently held.
    #[must_use]
    pub fn has(&self, id: QuestId) -> bool {
        self.active.iter().any(|q| q.id == id)
    }

    /// Whether the quest was ever completed.
    #[must_use]
    pub fn is_completed(&self, id: QuestId) -> bool {
        self.completed.contains(&id)
    }

    /// Start holding `quest`. Returns `false` (and does nothing) if it is
    /// already held or already completed.
    pub fn take(&mut self, quest: &QuestDef) -> bool {
        if self.has(quest.id) || self.is_completed(quest.id) {
            return false;
        }
        self.active.push(quest.clone());
        true
    }

    /// Held quest by id.
    #[must_use]
    pub fn get(&self, id: QuestId) -> Option<&QuestDef> {
        self.active.iter().find(|q| q.id == id)
    }

    /// Move a held quest to the completed set.
    pub(crate) fn finish(&mut self, id: QuestId) -> Option<QuestDef> {
        let idx = self.active.iter().position(|q| q.id == id)?;
        let quest = self.active.remove(idx);
        self.completed.insert(id);
        Some(quest)
    }

    /// Lifecycle state of `quest` given the player's inventory and kills.
    #[must_use]
    pub fn state(&self, quest: &QuestDef, inventory: &Inventory, killed: &BTreeSet<EnemyId>) -> QuestState {
        if self.is_completed(quest.id) {
            QuestState::Completed
        } else if !self.has(quest.id) {
            QuestState::Offered
        } else if goal_met(&quest.goal, inventory, killed) {
            QuestState::Completable
        } else {
            QuestState::Taken
        }
    }

    /// Held quests, in the order they were taken.
    #[must_use]
    pub fn active(&self) -> &[QuestDef] {
        &self.active
    }

    /// Ids of every completed quest.
    #[must_use]
    pub fn completed(&self) -> &BTreeSet<QuestId> {
        &self.completed
    }
}
