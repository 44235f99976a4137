//! Location snapshots: the per-player, exclusion-filtered view of a location.
//!
//! A snapshot is rebuilt on every entry. Directions are copied verbatim (a
//! gated direction stays visible; gates are checked at traversal time),
//! completed quests are hidden from each character's offer list, and
//! defeated enemies are left out entirely.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::types::{EnemyId, LocationId, NpcId, QuestId};
use crate::world::{DirectionDef, EnemyDef, LocationDef, NpcDef};

/// A combat-scoped, mutable copy of an enemy definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyEncounter {
    /// Template this encounter was copied from.
    pub def: EnemyDef,
    /// Remaining hit points.
    pub hp: i32,
}

impl EnemyEncounter {
    /// Fresh encounter at full health.
    #[must_use]
    pub fn new(def: EnemyDef) -> Self {
        let hp = def.health;
        Self { def, hp }
    }

    /// Enemy id.
    #[must_use]
    pub fn id(&self) -> EnemyId {
        self.def.id
    }

    /// Whether the encounter has been defeated.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Apply damage, saturating at the bottom of the range.
    pub fn take_damage(&mut self, amount: u32) {
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        self.hp = self.hp.saturating_sub(amount);
    }
}

/// The location as one particular player sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSnapshot {
    /// Location id.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Description shown on arrival.
    pub description: String,
    /// Level gate of this location.
    pub level: u32,
    /// Optional image reference.
    pub image: Option<String>,
    /// Outgoing directions, gated ones included.
    pub directions: Vec<DirectionDef>,
    /// Characters, each offering only quests the player has not completed.
    pub npcs: Vec<NpcDef>,
    /// Enemies the player has not killed yet.
    pub enemies: Vec<EnemyEncounter>,
}

impl LocationSnapshot {
    /// Project `def` through the player's exclusion sets.
    ///
    /// # Errors
    /// `CoreError::InvalidLocation` when `def` is absent.
    pub fn build(
        def: Option<&LocationDef>,
        killed: &BTreeSet<EnemyId>,
        completed: &BTreeSet<QuestId>,
    ) -> Result<Self> {
        let def = def.ok_or(CoreError::InvalidLocation)?;

        let npcs = def
            .npcs
            .iter()
            .map(|npc| NpcDef {
                quests: npc
                    .quests
                    .iter()
                    .filter(|q| !completed.contains(&q.id))
                    .cloned()
                    .collect(),
                ..npc.clone()
            })
            .collect();

        let enemies = def
            .enemies
            .iter()
            .filter(|e| !killed.contains(&e.id))
            .cloned()
            .map(EnemyEncounter::new)
            .collect();

        Ok(Self {
            id: def.id,
            name: def.name.clone(),
            description: def.description.clone(),
            level: def.level,
            image: def.image.clone(),
            directions: def.directions.clone(),
            npcs,
            enemies,
        })
    }

    /// Character by id.
    #[must_use]
    pub fn npc(&self, id: NpcId) -> Option<&NpcDef> {
        self.npcs.iter().find(|n| n.id == id)
    }

    /// Encounter by enemy id.
    #[must_use]
    pub fn encounter(&self, id: EnemyId) -> Option<&EnemyEncounter> {
        self.enemies.iter().find(|e| e.id() == id)
    }

    /// Mutable encounter by enemy id.
    pub fn encounter_mut(&mut self, id: EnemyId) -> Option<&mut EnemyEncounter> {
        self.enemies.iter_mut().find(|e| e.id() == id)
    }

    /// Drop a defeated encounter.
    pub fn remove_encounter(&mut self, id: EnemyId) {
        self.enemies.retain(|e| e.id() != id);
    }

    /// Drop a completed quest from its giver's offer list.
    pub fn remove_quest(&mut self, npc: NpcId, quest: QuestId) {
        if let Some(npc) = self.npcs.iter_mut().find(|n| n.id == npc) {
            npc.quests.retain(|q| q.id != quest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{QuestDef, QuestGoal};

    fn quest(id: u32) -> QuestDef {
        QuestDef {
            id: QuestId(id),
            npc_id: NpcId(1),
            npc_name: "Mira".into(),
            name: format!("Quest {id}"),
            description: String::new(),
            congratulation: String::new(),
            is_final: false,
            goal: QuestGoal::Bring { item: "Amulet".into() },
        }
    }

    fn enemy(id: u32) -> EnemyDef {
        EnemyDef {
            id: EnemyId(id),
            name: format!("Enemy {id}"),
            description: String::new(),
            phrase: String::new(),
            level: 1,
            health: 5,
            damage: 1,
            loot: vec![],
            image: None,
        }
    }

    fn square() -> LocationDef {
        LocationDef {
            id: LocationId(1),
            name: "Square".into(),
            description: "Busy".into(),
            level: 1,
            image: None,
            directions: vec![DirectionDef {
                name: "Up the hill".into(),
                target: LocationId(2),
                target_level: 5,
            }],
            npcs: vec![NpcDef {
                id: NpcId(1),
                name: "Mira".into(),
                description: String::new(),
                phrase: String::new(),
                image: None,
                quests: vec![quest(1), quest(2)],
            }],
            enemies: vec![enemy(1), enemy(2)],
        }
    }

    #[test]
    fn filters_completed_quests_and_killed_enemies() {
        let killed = BTreeSet::from([EnemyId(2)]);
        let completed = BTreeSet::from([QuestId(1)]);
        let snap = LocationSnapshot::build(Some(&square()), &killed, &completed).expect("build");

        let quests: Vec<QuestId> = snap.npcs[0].quests.iter().map(|q| q.id).collect();
        assert_eq!(quests, vec![QuestId(2)]);
        assert_eq!(snap.enemies.len(), 1);
        assert_eq!(snap.enemies[0].id(), EnemyId(1));
        assert_eq!(snap.enemies[0].hp, 5);
    }

    #[test]
    fn gated_directions_stay_visible() {
        let snap =
            LocationSnapshot::build(Some(&square()), &BTreeSet::new(), &BTreeSet::new()).expect("build");
        assert_eq!(snap.directions.len(), 1);
        assert_eq!(snap.directions[0].target_level, 5);
    }

    #[test]
    fn absent_definition_is_invalid() {
        let err = LocationSnapshot::build(None, &BTreeSet::new(), &BTreeSet::new()).expect_err("none");
        assert!(matches!(err, CoreError::InvalidLocation));
    }

    #[test]
    fn build_does_not_touch_the_definition() {
        let def = square();
        let before = def.clone();
        let mut snap =
            LocationSnapshot::build(Some(&def), &BTreeSet::new(), &BTreeSet::new()).expect("build");
        snap.remove_quest(NpcId(1), QuestId(1));
        snap.remove_encounter(EnemyId(1));
        assert_eq!(def, before);
        assert_eq!(snap.npcs[0].quests.len(), 1);
        assert!(snap.encounter(EnemyId(1)).is_none());
    }

    #[test]
    fn encounter_damage_saturates() {
        let mut enc = EnemyEncounter::new(enemy(1));
        enc.take_damage(3);
        assert_eq!(enc.hp, 2);
        assert!(!enc.is_dead());
        enc.take_damage(u32::MAX);
        assert!(enc.is_dead());
    }
}
