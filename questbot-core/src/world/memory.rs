//! In-memory world store, filled programmatically.

use std::collections::BTreeMap;

use crate::error::{CoreError, Result};
use crate::types::{EnemyId, LocationId};
use crate::world::{EnemyDef, LocationDef, WorldStore};

/// World definitions held in plain maps.
///
/// Enemies are indexed from the locations they are inserted with.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorld {
    locations: BTreeMap<LocationId, LocationDef>,
    enemies: BTreeMap<EnemyId, EnemyDef>,
}

impl InMemoryWorld {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a location and index its enemies.
    pub fn insert_location(&mut self, location: LocationDef) {
        for enemy in &location.enemies {
            self.enemies.insert(enemy.id, enemy.clone());
        }
        self.locations.insert(location.id, location);
    }

    /// Builder form of [`Self::insert_location`].
    #[must_use]
    pub fn with_location(mut self, location: LocationDef) -> Self {
        self.insert_location(location);
        self
    }

    /// Number of locations.
    #[must_use]
    pub fn location_count(&self) -> usize {
        self.locations.len()
    }
}

impl WorldStore for InMemoryWorld {
    fn location(&self, id: LocationId) -> Result<LocationDef> {
        self.locations
            .get(&id)
            .cloned()
            .ok_or(CoreError::LocationNotFound(id))
    }

    fn locations_at_level(&self, level: u32) -> Result<Vec<LocationDef>> {
        Ok(self
            .locations
            .values()
            .filter(|l| l.level == level)
            .cloned()
            .collect())
    }

    fn enemy(&self, id: EnemyId) -> Result<EnemyDef> {
        self.enemies
            .get(&id)
            .cloned()
            .ok_or(CoreError::EnemyNotFound(id))
    }
}
