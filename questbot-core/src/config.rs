//! Configuration for the questbot engine.
//!
//! Maps directly to `questbot.toml`. Every field has a default, so an empty
//! file (or no file at all) yields the reference rules: ten hit points per
//! level, a six-sided die, and one regeneration step every 30 seconds.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level engine configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Player progression and regeneration rules.
    #[serde(default)]
    pub player: PlayerConfig,
    /// Dice settings for combat.
    #[serde(default)]
    pub combat: CombatConfig,
    /// World store location.
    #[serde(default)]
    pub world: WorldConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| crate::CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Reject values that would make the game unplayable.
    ///
    /// # Errors
    /// Returns `CoreError::Config` naming the first offending field.
    pub fn validate(&self) -> crate::error::Result<()> {
        self.player.rules()?;
        if self.combat.die_sides == 0 {
            return Err(crate::CoreError::Config(
                "combat.die_sides must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Player progression and regeneration rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Location every new session starts in.
    #[serde(default = "default_starting_location")]
    pub starting_location: u32,
    /// Hit-point cap per level (`max_hp = hp_per_level × level`).
    #[serde(default = "default_hp_per_level")]
    pub hp_per_level: i32,
    /// Seconds per regeneration step.
    #[serde(default = "default_heal_interval")]
    pub heal_interval_secs: i64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            starting_location: default_starting_location(),
            hp_per_level: default_hp_per_level(),
            heal_interval_secs: default_heal_interval(),
        }
    }
}

impl PlayerConfig {
    /// Session rules derived from this config.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if `hp_per_level` is not positive or
    /// `heal_interval_secs` is not a positive, representable duration.
    pub fn rules(&self) -> crate::error::Result<crate::session::SessionRules> {
        if self.hp_per_level <= 0 {
            return Err(crate::CoreError::Config(format!(
                "player.hp_per_level must be positive, got {}",
                self.hp_per_level
            )));
        }
        let heal_interval = chrono::TimeDelta::try_seconds(self.heal_interval_secs)
            .filter(|d| *d > chrono::TimeDelta::zero())
            .ok_or_else(|| {
                crate::CoreError::Config(format!(
                    "player.heal_interval_secs out of range: {}",
                    self.heal_interval_secs
                ))
            })?;
        Ok(crate::session::SessionRules {
            hp_per_level: self.hp_per_level,
            heal_interval,
        })
    }
}

/// Combat dice settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatConfig {
    /// Number of faces on the combat die.
    #[serde(default = "default_die_sides")]
    pub die_sides: u32,
    /// Fixed seed for reproducible dice; `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            die_sides: default_die_sides(),
            seed: None,
        }
    }
}

/// World store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Path of the SQLite world database.
    #[serde(default)]
    pub database: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_log_level() -> String { "info".to_string() }
fn default_starting_location() -> u32 { 1 }
fn default_hp_per_level() -> i32 { 10 }
fn default_heal_interval() -> i64 { 30 }
fn default_die_sides() -> u32 { 6 }
