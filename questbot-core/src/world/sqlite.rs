//! Read-only SQLite world store.
//!
//! The world database is produced by a separate seeding tool; this adapter
//! only reads it. The expected schema is [`SCHEMA`]:
//!
//! ```sql
//! location  (id, image, name, description, level)
//! direction (id, name, from_location_id, to_location_id)
//! npc       (id, location_id, image, name, description, phrase)
//! enemy     (id, location_id, image, name, description, phrase, level, health, damage)
//! item      (id, enemy_id, name)
//! quest     (id, npc_id, name, description, congratulation, is_final,
//!            goal_item_id, goal_npc_id, goal_enemy_id)
//! ```
//!
//! A quest row must set exactly one of the three goal columns.

use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::types::{EnemyId, LocationId, NpcId, QuestId};
use crate::world::{DirectionDef, EnemyDef, LocationDef, NpcDef, QuestDef, QuestGoal, WorldStore};

/// DDL of the world database, for seeders and tests.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS location (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    image       TEXT,
    name        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL,
    level       INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS direction (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT NOT NULL,
    from_location_id INTEGER NOT NULL REFERENCES location(id),
    to_location_id   INTEGER NOT NULL REFERENCES location(id)
);
CREATE TABLE IF NOT EXISTS npc (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    location_id INTEGER NOT NULL REFERENCES location(id),
    image       TEXT,
    name        TEXT NOT NULL,
    description TEXT NOT NULL,
    phrase      TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS enemy (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    location_id INTEGER NOT NULL REFERENCES location(id),
    image       TEXT,
    name        TEXT NOT NULL,
    description TEXT NOT NULL,
    phrase      TEXT NOT NULL,
    level       INTEGER NOT NULL,
    health      INTEGER NOT NULL,
    damage      INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS item (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    enemy_id INTEGER REFERENCES enemy(id),
    name     TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS quest (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    npc_id         INTEGER NOT NULL REFERENCES npc(id),
    name           TEXT NOT NULL,
    description    TEXT NOT NULL,
    congratulation TEXT NOT NULL,
    is_final       INTEGER NOT NULL DEFAULT 0,
    goal_item_id   INTEGER REFERENCES item(id),
    goal_npc_id    INTEGER REFERENCES npc(id),
    goal_enemy_id  INTEGER REFERENCES enemy(id)
);
";

/// World store over a read-only SQLite connection.
pub struct SqliteWorld {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteWorld")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

/// Quest row before its goal columns are validated.
struct QuestRow {
    id: QuestId,
    npc_id: NpcId,
    npc_name: String,
    name: String,
    description: String,
    congratulation: String,
    is_final: bool,
    goal_item_id: Option<u32>,
    goal_item_name: Option<String>,
    goal_npc_id: Option<u32>,
    goal_enemy_id: Option<u32>,
}

impl QuestRow {
    fn into_def(self) -> Result<QuestDef> {
        let goal = match (self.goal_item_id, self.goal_npc_id, self.goal_enemy_id) {
            (Some(item_id), None, None) => QuestGoal::Bring {
                item: self.goal_item_name.ok_or_else(|| CoreError::InvalidQuest {
                    id: self.id,
                    reason: format!("goal item {item_id} does not exist"),
                })?,
            },
            (None, Some(npc), None) => QuestGoal::Talk { npc: NpcId(npc) },
            (None, None, Some(enemy)) => QuestGoal::Kill {
                enemy: EnemyId(enemy),
            },
            (None, None, None) => {
                return Err(CoreError::InvalidQuest {
                    id: self.id,
                    reason: "quest has no goal".to_string(),
                });
            }
            _ => {
                return Err(CoreError::InvalidQuest {
                    id: self.id,
                    reason: "quest has more than one goal".to_string(),
                });
            }
        };

        Ok(QuestDef {
            id: self.id,
            npc_id: self.npc_id,
            npc_name: self.npc_name,
            name: self.name,
            description: self.description,
            congratulation: self.congratulation,
            is_final: self.is_final,
            goal,
        })
    }
}

/// Empty image columns mean "no image".
fn image_ref(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

impl SqliteWorld {
    /// Open an existing world database read-only.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&db_path, flags)?;
        conn.busy_timeout(Duration::from_secs(5))?;

        info!(path = %db_path.display(), "world store opened");

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    /// Wrap an already-open connection (useful for tests).
    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            db_path: PathBuf::from(":memory:"),
        }
    }

    fn load_location(conn: &Connection, id: LocationId) -> Result<LocationDef> {
        let head = conn
            .query_row(
                "SELECT name, description, level, image FROM location WHERE id = ?1",
                params![id.0],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;
        let Some((name, description, level, image)) = head else {
            return Err(CoreError::LocationNotFound(id));
        };

        let directions = Self::load_directions(conn, id)?;
        let npcs = Self::load_npcs(conn, id)?;
        let enemies = Self::load_enemies(conn, id)?;

        debug!(
            location = %id,
            directions = directions.len(),
            npcs = npcs.len(),
            enemies = enemies.len(),
            "location loaded"
        );

        Ok(LocationDef {
            id,
            name,
            description,
            level,
            image: image_ref(image),
            directions,
            npcs,
            enemies,
        })
    }

    fn load_directions(conn: &Connection, from: LocationId) -> Result<Vec<DirectionDef>> {
        let mut stmt = conn.prepare(
            "SELECT d.name, d.to_location_id, t.level
             FROM direction d LEFT JOIN location t ON t.id = d.to_location_id
             WHERE d.from_location_id = ?1
             ORDER BY d.id",
        )?;
        let rows = stmt
            .query_map(params![from.0], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    LocationId(row.get(1)?),
                    row.get::<_, Option<u32>>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(name, target, level)| {
                let target_level = level.ok_or(CoreError::LocationNotFound(target))?;
                Ok(DirectionDef {
                    name,
                    target,
                    target_level,
                })
            })
            .collect()
    }

    fn load_npcs(conn: &Connection, location: LocationId) -> Result<Vec<NpcDef>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, description, phrase, image FROM npc
             WHERE location_id = ?1 ORDER BY id",
        )?;
        let heads = stmt
            .query_map(params![location.0], |row| {
                Ok(NpcDef {
                    id: NpcId(row.get(0)?),
                    name: row.get(1)?,
                    description: row.get(2)?,
                    phrase: row.get(3)?,
                    image: image_ref(row.get(4)?),
                    quests: Vec::new(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        heads
            .into_iter()
            .map(|mut npc| {
                npc.quests = Self::load_quests(conn, npc.id)?;
                Ok(npc)
            })
            .collect()
    }

    fn load_quests(conn: &Connection, npc: NpcId) -> Result<Vec<QuestDef>> {
        let mut stmt = conn.prepare(
            "SELECT q.id, q.npc_id, n.name, q.name, q.description, q.congratulation,
                    q.is_final, q.goal_item_id, i.name, q.goal_npc_id, q.goal_enemy_id
             FROM quest q
             JOIN npc n ON n.id = q.npc_id
             LEFT JOIN item i ON i.id = q.goal_item_id
             WHERE q.npc_id = ?1
             ORDER BY q.id",
        )?;
        let rows = stmt
            .query_map(params![npc.0], |row| {
                Ok(QuestRow {
                    id: QuestId(row.get(0)?),
                    npc_id: NpcId(row.get(1)?),
                    npc_name: row.get(2)?,
                    name: row.get(3)?,
                    description: row.get(4)?,
                    congratulation: row.get(5)?,
                    is_final: row.get(6)?,
                    goal_item_id: row.get(7)?,
                    goal_item_name: row.get(8)?,
                    goal_npc_id: row.get(9)?,
                    goal_enemy_id: row.get(10)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(QuestRow::into_def).collect()
    }

    fn load_enemies(conn: &Connection, location: LocationId) -> Result<Vec<EnemyDef>> {
        let mut stmt = conn.prepare(
            "SELECT id FROM enemy WHERE location_id = ?1 ORDER BY id",
        )?;
        let ids = stmt
            .query_map(params![location.0], |row| row.get::<_, u32>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        ids.into_iter()
            .map(|id| Self::load_enemy(conn, EnemyId(id)))
            .collect()
    }

    fn load_enemy(conn: &Connection, id: EnemyId) -> Result<EnemyDef> {
        let enemy = conn
            .query_row(
                "SELECT name, description, phrase, level, health, damage, image
                 FROM enemy WHERE id = ?1",
                params![id.0],
                |row| {
                    Ok(EnemyDef {
                        id,
                        name: row.get(0)?,
                        description: row.get(1)?,
                        phrase: row.get(2)?,
                        level: row.get(3)?,
                        health: row.get(4)?,
                        damage: row.get(5)?,
                        loot: Vec::new(),
                        image: image_ref(row.get(6)?),
                    })
                },
            )
            .optional()?;
        let Some(mut enemy) = enemy else {
            return Err(CoreError::EnemyNotFound(id));
        };

        let mut stmt = conn.prepare("SELECT name FROM item WHERE enemy_id = ?1 ORDER BY id")?;
        enemy.loot = stmt
            .query_map(params![id.0], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(enemy)
    }
}

impl WorldStore for SqliteWorld {
    fn location(&self, id: LocationId) -> Result<LocationDef> {
        let conn = self.conn.lock();
        Self::load_location(&conn, id)
    }

    fn locations_at_level(&self, level: u32) -> Result<Vec<LocationDef>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id FROM location WHERE level = ?1 ORDER BY id")?;
        let ids = stmt
            .query_map(params![level], |row| row.get::<_, u32>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        ids.into_iter()
            .map(|id| Self::load_location(&conn, LocationId(id)))
            .collect()
    }

    fn enemy(&self, id: EnemyId) -> Result<EnemyDef> {
        let conn = self.conn.lock();
        Self::load_enemy(&conn, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SqliteWorld {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute_batch(SCHEMA).expect("schema");
        conn.execute_batch(
            "INSERT INTO location (id, image, name, description, level) VALUES
                (1, '', 'Village', 'A quiet village', 1),
                (2, 'img/forest.png', 'Forest', 'Dark woods', 2);
             INSERT INTO direction (name, from_location_id, to_location_id) VALUES
                ('To the forest', 1, 2),
                ('Back to the village', 2, 1);
             INSERT INTO npc (id, location_id, image, name, description, phrase) VALUES
                (1, 1, NULL, 'Elder', 'Old and wise', 'Welcome, child'),
                (2, 2, NULL, 'Hermit', 'Keeps to himself', 'Leave me be');
             INSERT INTO enemy (id, location_id, image, name, description, phrase, level, health, damage) VALUES
                (1, 2, NULL, 'Wolf', 'Hungry', 'Grr', 1, 3, 2);
             INSERT INTO item (id, enemy_id, name) VALUES
                (1, 1, 'Wolf pelt'),
                (2, 1, 'Fang');
             INSERT INTO quest (id, npc_id, name, description, congratulation, is_final,
                                goal_item_id, goal_npc_id, goal_enemy_id) VALUES
                (1, 1, 'Pelt', 'Bring me a pelt', 'Thanks!', 0, 1, NULL, NULL),
                (2, 1, 'Hunt', 'Kill the wolf', 'Well done', 0, NULL, NULL, 1),
                (3, 1, 'Word', 'Tell the hermit', 'He heard you', 1, NULL, 2, NULL);",
        )
        .expect("seed");
        SqliteWorld::from_connection(conn)
    }

    #[test]
    fn loads_location_graph() {
        let world = seeded();
        let village = world.location(LocationId(1)).expect("village");
        assert_eq!(village.name, "Village");
        assert_eq!(village.image, None);
        assert_eq!(village.directions.len(), 1);
        assert_eq!(village.directions[0].target, LocationId(2));
        assert_eq!(village.directions[0].target_level, 2);
        assert_eq!(village.npcs.len(), 1);
        assert!(village.enemies.is_empty());

        let quests = &village.npcs[0].quests;
        assert_eq!(quests.len(), 3);
        assert_eq!(quests[0].goal, QuestGoal::Bring { item: "Wolf pelt".into() });
        assert_eq!(quests[1].goal, QuestGoal::Kill { enemy: EnemyId(1) });
        assert_eq!(quests[2].goal, QuestGoal::Talk { npc: NpcId(2) });
        assert!(quests[2].is_final);
        assert_eq!(quests[0].npc_name, "Elder");
    }

    #[test]
    fn loads_enemy_with_loot() {
        let world = seeded();
        let forest = world.location(LocationId(2)).expect("forest");
        assert_eq!(forest.image.as_deref(), Some("img/forest.png"));
        assert_eq!(forest.enemies.len(), 1);
        let wolf = world.enemy(EnemyId(1)).expect("wolf");
        assert_eq!(wolf.loot, vec!["Wolf pelt".to_string(), "Fang".to_string()]);
        assert_eq!(wolf.health, 3);
        assert_eq!(wolf.damage, 2);
    }

    #[test]
    fn missing_rows_are_not_found() {
        let world = seeded();
        assert!(matches!(
            world.location(LocationId(42)),
            Err(CoreError::LocationNotFound(LocationId(42)))
        ));
        assert!(matches!(
            world.enemy(EnemyId(42)),
            Err(CoreError::EnemyNotFound(EnemyId(42)))
        ));
    }

    #[test]
    fn quest_without_goal_is_invalid() {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute_batch(SCHEMA).expect("schema");
        conn.execute_batch(
            "INSERT INTO location (id, name, description, level) VALUES (1, 'Void', '', 1);
             INSERT INTO npc (id, location_id, name, description, phrase) VALUES (1, 1, 'Ghost', '', '');
             INSERT INTO quest (id, npc_id, name, description, congratulation) VALUES (7, 1, 'Nothing', '', '');",
        )
        .expect("seed");
        let world = SqliteWorld::from_connection(conn);
        let err = world.location(LocationId(1)).expect_err("invalid quest");
        assert!(matches!(err, CoreError::InvalidQuest { id: QuestId(7), .. }));
        assert!(err.is_integrity_fault());
    }

    #[test]
    fn dangling_direction_is_reported() {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute_batch(SCHEMA).expect("schema");
        conn.execute_batch(
            "PRAGMA foreign_keys = OFF;
             INSERT INTO location (id, name, description, level) VALUES (1, 'Shore', '', 1);
             INSERT INTO direction (name, from_location_id, to_location_id) VALUES ('Into the fog', 1, 99);",
        )
        .expect("seed");
        let world = SqliteWorld::from_connection(conn);
        let err = world.location(LocationId(1)).expect_err("dangling direction");
        assert!(matches!(err, CoreError::LocationNotFound(LocationId(99))));
        assert!(err.is_integrity_fault());
    }

    #[test]
    fn locations_at_level_loads_each() {
        let world = seeded();
        let second = world.locations_at_level(2).expect("query");
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "Forest");
    }
}
