//! questbot Benchmark Suite
//!
//! Hot paths of a chat turn:
//!   combat_exchange ............. one dice exchange against an encounter
//!   regeneration_lazy ........... catching up a day of heal steps
//!   snapshot_build_50_enemies ... per-player location filtering
//!   engine_attack_turn .......... one "Attack" event through the facade

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use questbot_chat::GameEngine;
use questbot_core::{
    resolve_attack, EnemyDef, EnemyEncounter, EnemyId, EngineConfig, InMemoryWorld, LocationDef,
    LocationId, LocationSnapshot, ManualClock, NpcDef, NpcId, PlayerKey, PlayerSession, QuestDef,
    QuestGoal, QuestId, SessionRules, StdDice,
};

fn make_enemy(i: u32, health: i32, damage: u32) -> EnemyDef {
    EnemyDef {
        id: EnemyId(i),
        name: format!("Enemy {i}"),
        description: "A benchmark foe".to_string(),
        phrase: "...".to_string(),
        level: 1 + i % 5,
        health,
        damage,
        loot: vec![format!("Trophy {i}")],
        image: None,
    }
}

fn make_location(enemies: u32, health: i32) -> LocationDef {
    let quests = (0..enemies)
        .map(|i| QuestDef {
            id: QuestId(i),
            npc_id: NpcId(1),
            npc_name: "Quartermaster".to_string(),
            name: format!("Bounty {i}"),
            description: String::new(),
            congratulation: String::new(),
            is_final: false,
            goal: QuestGoal::Kill { enemy: EnemyId(i) },
        })
        .collect();
    LocationDef {
        id: LocationId(1),
        name: "Arena".to_string(),
        description: String::new(),
        level: 1,
        image: None,
        directions: vec![],
        npcs: vec![NpcDef {
            id: NpcId(1),
            name: "Quartermaster".to_string(),
            description: String::new(),
            phrase: String::new(),
            image: None,
            quests,
        }],
        enemies: (0..enemies).map(|i| make_enemy(i, health, 0)).collect(),
    }
}

fn t0() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Benchmark: One combat exchange.
fn bench_combat_exchange(c: &mut Criterion) {
    let dice = StdDice::seeded(42);
    let mut enemy = EnemyEncounter::new(make_enemy(1, i32::MAX, 3));

    c.bench_function("combat_exchange", |b| {
        b.iter(|| {
            let roll = resolve_attack(black_box(3), black_box(1), &mut enemy, &dice, 6);
            let _ = black_box(roll);
        });
    });
}

/// Benchmark: Lazy regeneration after a day away.
fn bench_regeneration(c: &mut Criterion) {
    let world = InMemoryWorld::new().with_location(make_location(1, 10));
    let session = PlayerSession::new(
        PlayerKey(1),
        "Bench",
        &world,
        LocationId(1),
        SessionRules::default(),
        t0(),
    )
    .expect("start location exists");
    let later = t0() + Duration::days(1);

    c.bench_function("regeneration_lazy", |b| {
        b.iter(|| {
            let mut s = session.clone();
            s.take_damage(9);
            black_box(s.health(black_box(later)));
        });
    });
}

/// Benchmark: Snapshot build for 50 enemies with half already killed.
fn bench_snapshot_build(c: &mut Criterion) {
    let def = make_location(50, 10);
    let killed: BTreeSet<EnemyId> = (0..50).step_by(2).map(EnemyId).collect();
    let completed: BTreeSet<QuestId> = (0..50).step_by(3).map(QuestId).collect();

    c.bench_function("snapshot_build_50_enemies", |b| {
        b.iter(|| {
            let snapshot =
                LocationSnapshot::build(Some(black_box(&def)), black_box(&killed), black_box(&completed));
            let _ = black_box(snapshot);
        });
    });
}

/// Benchmark: A full "Attack" event, from text to replies.
fn bench_engine_turn(c: &mut Criterion) {
    let world = InMemoryWorld::new().with_location(make_location(1, i32::MAX));
    let engine = GameEngine::new(Arc::new(world), EngineConfig::default())
        .with_dice(Arc::new(StdDice::seeded(7)))
        .with_clock(Arc::new(ManualClock::default()));
    let key = PlayerKey(1);
    for text in ["/start", "Bench", "Start game", "Inspect enemies", "Enemy 0", "Engage"] {
        engine.handle(key, text).expect("setup turn");
    }

    c.bench_function("engine_attack_turn", |b| {
        b.iter(|| {
            let response = engine.handle(key, black_box("Attack")).expect("attack turn");
            black_box(response);
        });
    });
}

criterion_group!(
    benches,
    bench_combat_exchange,
    bench_regeneration,
    bench_snapshot_build,
    bench_engine_turn,
);
criterion_main!(benches);
