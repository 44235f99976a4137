//! Opposed-roll combat resolution.
//!
//! Each exchange draws two dice: the attacker's first, then the
//! defender's. The higher total (die + level) wins the exchange; equal
//! totals are a draw. The resolver only ever mutates the defender: damage
//! to the attacker is reported back so the session can apply it and
//! decide whether the player died.

use serde::Serialize;
use tracing::debug;

use crate::dice::DiceRoller;
use crate::error::{CoreError, Result};
use crate::snapshot::EnemyEncounter;

/// Who won an exchange and what it cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Exchange {
    /// Attacker rolled higher and dealt `damage`.
    AttackerHit {
        /// Hit points removed from the defender.
        damage: u32,
        /// Whether the defender died from it.
        killed: bool,
    },
    /// Defender rolled higher; the attacker must take `damage`.
    DefenderHit {
        /// Hit points the attacker loses.
        damage: u32,
    },
    /// Equal totals, nothing happens.
    Draw,
}

/// Both totals of one exchange plus its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttackRoll {
    /// Attacker die plus attacker level.
    pub attacker_roll: u32,
    /// Defender die plus defender level.
    pub defender_roll: u32,
    /// Outcome.
    pub exchange: Exchange,
}

/// Resolve one exchange between an attacker and `defender`.
///
/// # Errors
/// `CoreError::EncounterAlreadyDead` if the defender is already defeated.
pub fn resolve_attack(
    attacker_level: u32,
    attacker_damage: u32,
    defender: &mut EnemyEncounter,
    dice: &dyn DiceRoller,
    sides: u32,
) -> Result<AttackRoll> {
    if defender.is_dead() {
        return Err(CoreError::EncounterAlreadyDead(defender.id()));
    }

    let attacker_roll = dice.roll(sides) + attacker_level;
    let defender_roll = dice.roll(sides) + defender.def.level;

    let exchange = match attacker_roll.cmp(&defender_roll) {
        std::cmp::Ordering::Greater => {
            defender.take_damage(attacker_damage);
            Exchange::AttackerHit {
                damage: attacker_damage,
                killed: defender.is_dead(),
            }
        }
        std::cmp::Ordering::Less => Exchange::DefenderHit {
            damage: defender.def.damage,
        },
        std::cmp::Ordering::Equal => Exchange::Draw,
    };

    debug!(
        enemy = %defender.id(),
        attacker_roll,
        defender_roll,
        enemy_hp = defender.hp,
        "combat exchange"
    );

    Ok(AttackRoll {
        attacker_roll,
        defender_roll,
        exchange,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::types::EnemyId;
    use crate::world::EnemyDef;

    fn encounter(level: u32, health: i32, damage: u32) -> EnemyEncounter {
        EnemyEncounter::new(EnemyDef {
            id: EnemyId(1),
            name: "Wolf".into(),
            description: String::new(),
            phrase: String::new(),
            level,
            health,
            damage,
            loot: vec![],
            image: None,
        })
    }

    #[test]
    fn higher_attacker_roll_deals_damage() {
        let mut wolf = encounter(1, 10, 2);
        let dice = ScriptedDice::new([6, 1]);
        let roll = resolve_attack(1, 1, &mut wolf, &dice, 6).expect("alive");
        assert_eq!(roll.attacker_roll, 7);
        assert_eq!(roll.defender_roll, 2);
        assert_eq!(roll.exchange, Exchange::AttackerHit { damage: 1, killed: false });
        assert_eq!(wolf.hp, 9);
    }

    #[test]
    fn higher_defender_roll_reports_damage_without_touching_defender() {
        let mut wolf = encounter(3, 10, 4);
        let dice = ScriptedDice::new([1, 6]);
        let roll = resolve_attack(1, 1, &mut wolf, &dice, 6).expect("alive");
        assert_eq!(roll.exchange, Exchange::DefenderHit { damage: 4 });
        assert_eq!(wolf.hp, 10);
    }

    #[test]
    fn equal_rolls_draw() {
        let mut wolf = encounter(1, 10, 2);
        let dice = ScriptedDice::new([3, 3]);
        let roll = resolve_attack(1, 5, &mut wolf, &dice, 6).expect("alive");
        assert_eq!(roll.exchange, Exchange::Draw);
        assert_eq!(wolf.hp, 10);
    }

    #[test]
    fn lethal_hit_marks_defender_dead() {
        let mut wolf = encounter(1, 1, 2);
        let dice = ScriptedDice::new([5, 1]);
        let roll = resolve_attack(1, 1, &mut wolf, &dice, 6).expect("alive");
        assert_eq!(roll.exchange, Exchange::AttackerHit { damage: 1, killed: true });
        assert!(wolf.is_dead());
    }

    #[test]
    fn dead_defender_is_rejected_without_rolling() {
        let mut wolf = encounter(1, 0, 2);
        let dice = ScriptedDice::new([6, 1]);
        let err = resolve_attack(1, 1, &mut wolf, &dice, 6).expect_err("dead");
        assert!(matches!(err, CoreError::EncounterAlreadyDead(EnemyId(1))));
        assert_eq!(dice.remaining(), 2);
    }
}
