//! Property-Based Tests for the session engine
//!
//! Uses `proptest` to check the vitals, regeneration, dice and quest
//! invariants under random inputs.

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;

use questbot_core::{
    resolve_attack, DiceRoller, EnemyDef, EnemyEncounter, EnemyId, Exchange, InMemoryWorld,
    LocationDef, LocationId, NpcDef, NpcId, PlayerKey, PlayerSession, QuestDef, QuestGoal,
    QuestId, ScriptedDice, SessionRules, StdDice,
};

fn t0() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn world_with_bring_quest() -> InMemoryWorld {
    InMemoryWorld::new().with_location(LocationDef {
        id: LocationId(1),
        name: "Camp".into(),
        description: String::new(),
        level: 1,
        image: None,
        directions: vec![],
        npcs: vec![NpcDef {
            id: NpcId(1),
            name: "Quartermaster".into(),
            description: String::new(),
            phrase: String::new(),
            image: None,
            quests: vec![QuestDef {
                id: QuestId(1),
                npc_id: NpcId(1),
                npc_name: "Quartermaster".into(),
                name: "Supplies".into(),
                description: String::new(),
                congratulation: String::new(),
                is_final: false,
                goal: QuestGoal::Bring { item: "Rope".into() },
            }],
        }],
        enemies: vec![],
    })
}

fn player(world: &InMemoryWorld) -> PlayerSession {
    PlayerSession::new(PlayerKey(1), "Prop", world, LocationId(1), SessionRules::default(), t0())
        .expect("start")
}

fn wolf(level: u32, health: i32, damage: u32) -> EnemyEncounter {
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

// ---------------------------------------------------------------------------
// Property: alive players stay within 0 < hp <= 10 × level
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn hp_stays_within_cap(
        levels in 0u32..5,
        hits in proptest::collection::vec(0u32..8, 0..10),
        waits in proptest::collection::vec(0i64..200, 0..10),
    ) {
        let world = world_with_bring_quest();
        let mut p = player(&world);
        p.advance_level(levels);
        let mut now = t0();
        for (hit, wait) in hits.iter().zip(waits.iter()) {
            p.take_damage(*hit);
            now += Duration::seconds(*wait);
            let hp = p.health(now);
            if p.is_dead() {
                break;
            }
            prop_assert!(hp > 0);
            prop_assert!(hp <= 10 * i32::try_from(p.level()).expect("small"));
        }
    }
}

// ---------------------------------------------------------------------------
// Property: regeneration never decreases hp and is idempotent per instant
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn regeneration_monotone_and_idempotent(damage in 1u32..9, wait in 0i64..600) {
        let world = world_with_bring_quest();
        let mut p = player(&world);
        p.take_damage(damage);
        let before = p.hp();
        let now = t0() + Duration::seconds(wait);
        let once = p.health(now);
        let twice = p.health(now);
        prop_assert!(once >= before);
        prop_assert_eq!(once, twice);
        let expected = (i64::from(before) + wait / 30).min(10);
        prop_assert_eq!(i64::from(once), expected);
    }
}

// ---------------------------------------------------------------------------
// Property: level-up fully heals and raises damage by the delta
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn advance_level_heals_fully(n in 1u32..20, damage in 0u32..9) {
        let world = world_with_bring_quest();
        let mut p = player(&world);
        p.take_damage(damage);
        let dmg_before = p.damage();
        p.advance_level(n);
        prop_assert_eq!(p.level(), 1 + n);
        prop_assert_eq!(p.damage(), dmg_before + n);
        prop_assert_eq!(p.hp(), p.max_hp());
        prop_assert_eq!(p.hp(), 10 * i32::try_from(1 + n).expect("small"));
    }
}

// ---------------------------------------------------------------------------
// Property: dice stay in range; scripted combat is deterministic
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn seeded_dice_in_range(seed in any::<u64>()) {
        let dice = StdDice::seeded(seed);
        for _ in 0..64 {
            let face = dice.roll(6);
            prop_assert!((1..=6).contains(&face));
        }
    }

    #[test]
    fn scripted_exchange_is_deterministic(
        a in 1u32..=6,
        d in 1u32..=6,
        attacker_level in 1u32..5,
        enemy_level in 1u32..5,
    ) {
        let mut left = wolf(enemy_level, 20, 3);
        let mut right = wolf(enemy_level, 20, 3);
        let first = resolve_attack(attacker_level, 2, &mut left, &ScriptedDice::new([a, d]), 6)
            .expect("alive");
        let second = resolve_attack(attacker_level, 2, &mut right, &ScriptedDice::new([a, d]), 6)
            .expect("alive");
        prop_assert_eq!(first, second);
        prop_assert_eq!(left.hp, right.hp);
        prop_assert_eq!(first.attacker_roll, a + attacker_level);
        prop_assert_eq!(first.defender_roll, d + enemy_level);
        match first.exchange {
            Exchange::AttackerHit { damage, .. } => {
                prop_assert!(first.attacker_roll > first.defender_roll);
                prop_assert_eq!(damage, 2);
                prop_assert_eq!(left.hp, 18);
            }
            Exchange::DefenderHit { damage } => {
                prop_assert!(first.attacker_roll < first.defender_roll);
                prop_assert_eq!(damage, 3);
                prop_assert_eq!(left.hp, 20);
            }
            Exchange::Draw => {
                prop_assert_eq!(first.attacker_roll, first.defender_roll);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property: a Bring completion consumes exactly one unit
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn bring_completion_consumes_one(ropes in 1u32..6) {
        let world = world_with_bring_quest();
        let mut p = player(&world);
        let quest = p.find_npc_quest(NpcId(1), "Supplies").cloned().expect("offered");
        p.take_quest(&quest);
        for _ in 0..ropes {
            p.inventory_take("Rope");
        }
        p.complete_quest(quest.id).expect("completable");
        prop_assert_eq!(p.inventory().count("Rope"), ropes - 1);
        prop_assert_eq!(p.inventory().contains("Rope"), ropes > 1);
        prop_assert!(!p.has_quest(quest.id));
        prop_assert_eq!(p.completed_quest_ids().len(), 1);
        prop_assert!(p.complete_quest(quest.id).is_err());
        prop_assert_eq!(p.completed_quest_ids().len(), 1);
    }
}
