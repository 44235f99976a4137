//! The player session: the root aggregate of per-player game state.
//!
//! A [`PlayerSession`] owns vitals, inventory, the quest log, the kill log
//! and the current [`LocationSnapshot`]. Every mutation of those goes
//! through the methods here so the invariants hold at all times:
//!
//! - `0 < hp ≤ hp_per_level × level` while alive
//! - `level` and `damage` only grow, together, via [`PlayerSession::advance_level`]
//! - completed quests and killed enemies are append-only

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::combat::{resolve_attack, AttackRoll, Exchange};
use crate::dice::DiceRoller;
use crate::error::{CoreError, Result};
use crate::inventory::Inventory;
use crate::quest::{goal_met, QuestCompletion, QuestLog, QuestState};
use crate::selection::{resolve, MatchRule};
use crate::snapshot::{EnemyEncounter, LocationSnapshot};
use crate::types::{EnemyId, LocationId, NpcId, PlayerKey, QuestId, Vitals};
use crate::world::{DirectionDef, NpcDef, QuestDef, QuestGoal, WorldStore};

/// Tunable rules shared by every session of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRules {
    /// Hit-point cap per level.
    pub hp_per_level: i32,
    /// Time per regeneration step.
    pub heal_interval: Duration,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            hp_per_level: 10,
            heal_interval: Duration::seconds(30),
        }
    }
}

/// Result of [`PlayerSession::take_damage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DamageOutcome {
    /// Still standing with `hp` left.
    Alive {
        /// Remaining hit points.
        hp: i32,
    },
    /// Hit points dropped to zero or below.
    Dead,
}

/// Result of one attack from the player's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AttackOutcome {
    /// The player hit and the enemy survived.
    Hit {
        /// Rolls of the exchange.
        roll: AttackRoll,
        /// Enemy hit points left.
        enemy_hp: i32,
    },
    /// Equal rolls.
    Draw {
        /// Rolls of the exchange.
        roll: AttackRoll,
    },
    /// The enemy hit and the player survived.
    Struck {
        /// Rolls of the exchange.
        roll: AttackRoll,
        /// Player hit points left.
        hp: i32,
    },
    /// The enemy died; its loot is now in the inventory.
    Killed {
        /// Rolls of the exchange.
        roll: AttackRoll,
        /// Item names transferred.
        loot: Vec<String>,
    },
    /// The enemy hit and the player died.
    PlayerDied {
        /// Rolls of the exchange.
        roll: AttackRoll,
    },
}

impl AttackOutcome {
    /// Rolls behind this outcome.
    #[must_use]
    pub fn roll(&self) -> &AttackRoll {
        match self {
            Self::Hit { roll, .. }
            | Self::Draw { roll }
            | Self::Struck { roll, .. }
            | Self::Killed { roll, .. }
            | Self::PlayerDied { roll } => roll,
        }
    }
}

/// Per-player mutable game state.
#[derive(Debug, Clone)]
pub struct PlayerSession {
    id: PlayerKey,
    name: String,
    hp: i32,
    level: u32,
    damage: u32,
    inventory: Inventory,
    location: LocationSnapshot,
    quests: QuestLog,
    killed: BTreeSet<EnemyId>,
    kill_log: Vec<EnemyId>,
    last_heal: DateTime<Utc>,
    rules: SessionRules,
    finished: bool,
}

impl PlayerSession {
    /// Create a level-1 player standing at `start`.
    ///
    /// # Errors
    /// Fails if the starting location does not exist in `world`.
    pub fn new(
        id: PlayerKey,
        name: impl Into<String>,
        world: &dyn WorldStore,
        start: LocationId,
        rules: SessionRules,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let def = world.location(start)?;
        let location = LocationSnapshot::build(Some(&def), &BTreeSet::new(), &BTreeSet::new())?;
        let name = name.into();

        info!(player = %id, name = %name, location = %start, "session created");

        Ok(Self {
            id,
            name,
            hp: rules.hp_per_level,
            level: 1,
            damage: 1,
            inventory: Inventory::new(),
            location,
            quests: QuestLog::new(),
            killed: BTreeSet::new(),
            kill_log: Vec::new(),
            last_heal: now,
            rules,
            finished: false,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Player key.
    #[must_use]
    pub fn id(&self) -> PlayerKey {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored hit points, without regeneration. See [`Self::health`].
    #[must_use]
    pub fn hp(&self) -> i32 {
        self.hp
    }

    /// Current level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Damage dealt per successful hit.
    #[must_use]
    pub fn damage(&self) -> u32 {
        self.damage
    }

    /// Hit-point cap for the current level.
    #[must_use]
    pub fn max_hp(&self) -> i32 {
        let level = i32::try_from(self.level).unwrap_or(i32::MAX);
        self.rules.hp_per_level.saturating_mul(level)
    }

    /// Whether hit points have run out.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Whether a final quest has been completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Carried items.
    #[must_use]
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Current location as this player sees it.
    #[must_use]
    pub fn location(&self) -> &LocationSnapshot {
        &self.location
    }

    /// Id of the current location.
    #[must_use]
    pub fn location_id(&self) -> LocationId {
        self.location.id
    }

    /// Held quests, in the order taken.
    #[must_use]
    pub fn active_quests(&self) -> &[QuestDef] {
        self.quests.active()
    }

    /// Ids of every completed quest.
    #[must_use]
    pub fn completed_quest_ids(&self) -> &BTreeSet<QuestId> {
        self.quests.completed()
    }

    /// Ids of every killed enemy.
    #[must_use]
    pub fn killed_enemy_ids(&self) -> &BTreeSet<EnemyId> {
        &self.killed
    }

    /// Killed enemies in the order they died.
    #[must_use]
    pub fn kill_log(&self) -> &[EnemyId] {
        &self.kill_log
    }

    /// Time of the last regeneration step.
    #[must_use]
    pub fn last_heal(&self) -> DateTime<Utc> {
        self.last_heal
    }

    // -----------------------------------------------------------------------
    // Vitals
    // -----------------------------------------------------------------------

    /// Level up by `n`: level and damage grow by `n`, hit points refill.
    pub fn advance_level(&mut self, n: u32) {
        self.level += n;
        self.damage += n;
        self.hp = self.max_hp();
        info!(player = %self.id, level = self.level, "level up");
    }

    /// Lose `amount` hit points.
    pub fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        self.hp = self.hp.saturating_sub(amount);
        if self.hp <= 0 {
            info!(player = %self.id, "player died");
            DamageOutcome::Dead
        } else {
            DamageOutcome::Alive { hp: self.hp }
        }
    }

    /// Apply whole regeneration steps elapsed since the last one.
    ///
    /// Each step restores `level` hit points, capped at [`Self::max_hp`].
    /// The heal timestamp only moves when at least one step elapsed, so a
    /// second call at the same instant is a no-op. Dead players do not
    /// regenerate.
    pub fn regenerate(&mut self, now: DateTime<Utc>) {
        if self.is_dead() {
            return;
        }
        let interval = self.rules.heal_interval.num_milliseconds().max(1);
        let elapsed = (now - self.last_heal).num_milliseconds();
        if elapsed < interval {
            return;
        }
        let steps = elapsed / interval;
        let healed = i64::from(self.hp) + steps.saturating_mul(i64::from(self.level));
        let capped = healed.min(i64::from(self.max_hp()));
        self.hp = i32::try_from(capped).unwrap_or(i32::MAX);
        self.last_heal = now;
        debug!(player = %self.id, steps, hp = self.hp, "regenerated");
    }

    /// Hit points with regeneration applied.
    pub fn health(&mut self, now: DateTime<Utc>) -> i32 {
        self.regenerate(now);
        self.hp
    }

    /// Read-only vitals for renderers, regeneration applied.
    pub fn vitals(&mut self, now: DateTime<Utc>) -> Vitals {
        let hp = self.health(now);
        Vitals {
            name: self.name.clone(),
            level: self.level,
            hp,
            max_hp: self.max_hp(),
            damage: self.damage,
        }
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    /// Travel along `direction`.
    ///
    /// Returns `Ok(false)` without moving when the direction is gated above
    /// the player's level.
    ///
    /// # Errors
    /// Fails if the target location is missing from `world`.
    pub fn go_to(&mut self, direction: &DirectionDef, world: &dyn WorldStore) -> Result<bool> {
        if !direction.is_open_for(self.level) {
            debug!(
                player = %self.id,
                target = %direction.target,
                gate = direction.target_level,
                "direction gated"
            );
            return Ok(false);
        }
        let def = world.location(direction.target)?;
        self.location = LocationSnapshot::build(Some(&def), &self.killed, self.quests.completed())?;
        debug!(player = %self.id, location = %def.id, "moved");
        Ok(true)
    }

    /// Names of locations whose gate equals the current level.
    ///
    /// # Errors
    /// Backend failures from `world`.
    pub fn unlocked_location_names(&self, world: &dyn WorldStore) -> Result<Vec<String>> {
        Ok(world
            .locations_at_level(self.level)?
            .into_iter()
            .map(|l| l.name)
            .collect())
    }

    // -----------------------------------------------------------------------
    // Inventory
    // -----------------------------------------------------------------------

    /// Add one unit of `item`.
    pub fn inventory_take(&mut self, item: &str) {
        self.inventory.take(item);
    }

    /// Remove one unit of `item`.
    ///
    /// # Errors
    /// `CoreError::ItemNotHeld` if it is not carried.
    pub fn inventory_give(&mut self, item: &str) -> Result<()> {
        self.inventory.give(item)
    }

    // -----------------------------------------------------------------------
    // Quests
    // -----------------------------------------------------------------------

    /// Whether the quest is held.
    #[must_use]
    pub fn has_quest(&self, id: QuestId) -> bool {
        self.quests.has(id)
    }

    /// Whether `quest` is held and its Bring/Kill goal is met.
    #[must_use]
    pub fn can_complete(&self, quest: &QuestDef) -> bool {
        self.quests.has(quest.id) && goal_met(&quest.goal, &self.inventory, &self.killed)
    }

    /// Lifecycle state of `quest` for this player.
    #[must_use]
    pub fn quest_state(&self, quest: &QuestDef) -> QuestState {
        self.quests.state(quest, &self.inventory, &self.killed)
    }

    /// Start holding `quest`. A no-op returning `false` when already held
    /// or completed.
    pub fn take_quest(&mut self, quest: &QuestDef) -> bool {
        let taken = self.quests.take(quest);
        if taken {
            info!(player = %self.id, quest = %quest.id, "quest taken");
        } else {
            debug!(player = %self.id, quest = %quest.id, "quest already held or done");
        }
        taken
    }

    /// Hand in a held Bring or Kill quest whose goal is met.
    ///
    /// # Errors
    /// `CoreError::NotCompletable` if the quest is not held, already done,
    /// a Talk quest, or its goal is unmet.
    pub fn complete_quest(&mut self, id: QuestId) -> Result<QuestCompletion> {
        let quest = self.quests.get(id).ok_or(CoreError::NotCompletable(id))?;
        if !goal_met(&quest.goal, &self.inventory, &self.killed) {
            return Err(CoreError::NotCompletable(id));
        }
        if let QuestGoal::Bring { item } = &quest.goal {
            let item = item.clone();
            self.inventory.give(&item)?;
        }
        let quest = self.quests.finish(id).ok_or(CoreError::NotCompletable(id))?;
        Ok(self.apply_completion(quest))
    }

    /// Deliver a message to `npc` on behalf of the giver named at the end
    /// of `giver_text`.
    ///
    /// Only held Talk quests whose goal is `npc` are eligible. The longest
    /// matching giver name wins, and among that giver's quests the first
    /// taken one is completed. Returns `None` when nothing matches.
    pub fn deliver_message(&mut self, giver_text: &str, npc: NpcId) -> Option<QuestCompletion> {
        let text = giver_text.trim();
        let mut best: Option<&QuestDef> = None;
        for quest in self.quests.active() {
            let giver = quest.npc_name.as_str();
            if quest.goal != (QuestGoal::Talk { npc }) || giver.is_empty() || !text.ends_with(giver) {
                continue;
            }
            if best.is_none_or(|b| giver.len() > b.npc_name.len()) {
                best = Some(quest);
            }
        }
        let id = best?.id;
        let quest = self.quests.finish(id)?;
        Some(self.apply_completion(quest))
    }

    /// Givers of held Talk quests addressed to `npc`, without repeats.
    #[must_use]
    pub fn messages_for(&self, npc: NpcId) -> Vec<String> {
        let mut givers: Vec<String> = Vec::new();
        for quest in self.quests.active() {
            if quest.goal == (QuestGoal::Talk { npc }) && !givers.contains(&quest.npc_name) {
                givers.push(quest.npc_name.clone());
            }
        }
        givers
    }

    /// Whether any quest offered by `npc` can be handed in right now.
    #[must_use]
    pub fn npc_has_completable_quests(&self, npc: &NpcDef) -> bool {
        npc.quests.iter().any(|q| self.can_complete(q))
    }

    /// Whether `npc` offers a quest the player has not taken.
    #[must_use]
    pub fn npc_has_untaken_quests(&self, npc: &NpcDef) -> bool {
        npc.quests.iter().any(|q| !self.has_quest(q.id))
    }

    fn apply_completion(&mut self, quest: QuestDef) -> QuestCompletion {
        self.location.remove_quest(quest.npc_id, quest.id);
        self.advance_level(1);
        if quest.is_final {
            self.finished = true;
            info!(player = %self.id, quest = %quest.id, "game completed");
        }
        info!(player = %self.id, quest = %quest.id, level = self.level, "quest completed");
        QuestCompletion {
            is_final: quest.is_final,
            new_level: self.level,
            quest,
        }
    }

    // -----------------------------------------------------------------------
    // Combat
    // -----------------------------------------------------------------------

    /// One exchange against the enemy `enemy` in the current location.
    ///
    /// A kill transfers loot, records the kill and removes the encounter
    /// from the snapshot. A lethal counter-hit is reported as
    /// [`AttackOutcome::PlayerDied`].
    ///
    /// # Errors
    /// `EncounterNotFound` if the enemy is not here, `EncounterAlreadyDead`
    /// if it was already defeated.
    pub fn attack(&mut self, enemy: EnemyId, dice: &dyn DiceRoller, sides: u32) -> Result<AttackOutcome> {
        let (roll, enemy_hp, loot) = {
            let encounter = self
                .location
                .encounter_mut(enemy)
                .ok_or(CoreError::EncounterNotFound(enemy))?;
            let roll = resolve_attack(self.level, self.damage, encounter, dice, sides)?;
            (roll, encounter.hp, encounter.def.loot.clone())
        };

        let outcome = match roll.exchange {
            Exchange::AttackerHit { killed: true, .. } => {
                for item in &loot {
                    self.inventory.take(item);
                }
                if self.killed.insert(enemy) {
                    self.kill_log.push(enemy);
                }
                self.location.remove_encounter(enemy);
                info!(player = %self.id, enemy = %enemy, loot = loot.len(), "enemy killed");
                AttackOutcome::Killed { roll, loot }
            }
            Exchange::AttackerHit { .. } => AttackOutcome::Hit { roll, enemy_hp },
            Exchange::DefenderHit { damage } => match self.take_damage(damage) {
                DamageOutcome::Alive { hp } => AttackOutcome::Struck { roll, hp },
                DamageOutcome::Dead => AttackOutcome::PlayerDied { roll },
            },
            Exchange::Draw => AttackOutcome::Draw { roll },
        };
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Character here whose name ends the text ("Talk to Mira").
    #[must_use]
    pub fn find_npc(&self, raw: &str) -> Option<&NpcDef> {
        resolve(&self.location.npcs, raw, MatchRule::Suffix)
    }

    /// Quest offered by `npc` whose name starts the text.
    #[must_use]
    pub fn find_npc_quest(&self, npc: NpcId, raw: &str) -> Option<&QuestDef> {
        let npc = self.location.npc(npc)?;
        resolve(&npc.quests, raw, MatchRule::Prefix)
    }

    /// Held quest whose name starts the text.
    #[must_use]
    pub fn find_active_quest(&self, raw: &str) -> Option<&QuestDef> {
        resolve(self.quests.active(), raw, MatchRule::Prefix)
    }

    /// Enemy here whose name equals the text.
    #[must_use]
    pub fn find_enemy(&self, raw: &str) -> Option<&EnemyEncounter> {
        resolve(&self.location.enemies, raw, MatchRule::Exact)
    }

    /// Direction here whose name equals the text.
    #[must_use]
    pub fn find_direction(&self, raw: &str) -> Option<&DirectionDef> {
        resolve(&self.location.directions, raw, MatchRule::Exact)
    }

    /// Names of killed enemies, in kill order.
    ///
    /// # Errors
    /// Fails if a killed enemy vanished from `world`.
    pub fn killed_enemy_names(&self, world: &dyn WorldStore) -> Result<Vec<String>> {
        self.kill_log
            .iter()
            .map(|id| world.enemy(*id).map(|e| e.name))
            .collect()
    }
}
