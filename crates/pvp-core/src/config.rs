//! Combat configuration
//!
//! Every feature of the combat engine can be toggled. A configuration is only
//! obtainable through [`CombatConfigBuilder::build`], which rejects flag
//! combinations that cannot work together, so combat resolution never sees an
//! inconsistent configuration.

use serde::{Deserialize, Serialize};

use crate::types::Ruleset;

/// Longest accepted post-hit invulnerability window (10 seconds)
pub const MAX_INVULNERABILITY_TICKS: u32 = 200;

/// Mutually incompatible configuration flags
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationConflict {
    #[error("legacy shield mechanics requested but shields are disabled")]
    LegacyShieldWithoutShield,

    #[error("sweeping edge only exists in the current ruleset")]
    SweepingUnderLegacy,

    #[error("invulnerability window of {0} ticks exceeds the maximum of {MAX_INVULNERABILITY_TICKS}")]
    InvulnerabilityTooLong(u32),
}

/// Errors raised while loading a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid combat configuration: {0}")]
    Conflict(#[from] ConfigurationConflict),

    #[error("failed to parse combat configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Validated combat feature switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombatConfig {
    pub ruleset: Ruleset,
    pub fall_damage_enabled: bool,
    pub equipment_damage_enabled: bool,
    pub shield_enabled: bool,
    pub legacy_shield_mechanics: bool,
    pub invulnerability_ticks: u32,
    pub armor_enabled: bool,
    pub exhaustion_enabled: bool,
    pub legacy_knockback: bool,
    pub sweeping_enabled: bool,
    pub sounds_enabled: bool,
}

impl Default for CombatConfig {
    fn default() -> Self {
        CombatConfigBuilder::default_options().into_unchecked()
    }
}

impl CombatConfig {
    /// The stock legacy configuration
    pub fn legacy() -> Self {
        CombatConfigBuilder::legacy_options().into_unchecked()
    }

    /// Whether legacy formulas are in effect
    pub fn is_legacy(&self) -> bool {
        self.ruleset.is_legacy()
    }

    /// Parse a TOML document. Keys that are absent keep the defaults of the
    /// document's ruleset.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let raw: RawCombatConfig = toml::from_str(source)?;
        Ok(raw.into_builder().build()?)
    }
}

/// Optional-field mirror of [`CombatConfig`] used for partial TOML documents
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawCombatConfig {
    ruleset: Option<Ruleset>,
    fall_damage_enabled: Option<bool>,
    equipment_damage_enabled: Option<bool>,
    shield_enabled: Option<bool>,
    legacy_shield_mechanics: Option<bool>,
    invulnerability_ticks: Option<u32>,
    armor_enabled: Option<bool>,
    exhaustion_enabled: Option<bool>,
    legacy_knockback: Option<bool>,
    sweeping_enabled: Option<bool>,
    sounds_enabled: Option<bool>,
}

impl RawCombatConfig {
    fn into_builder(self) -> CombatConfigBuilder {
        let mut builder = match self.ruleset.unwrap_or_default() {
            Ruleset::Legacy => CombatConfigBuilder::legacy_options(),
            Ruleset::Current => CombatConfigBuilder::default_options(),
        };
        let config = &mut builder.config;
        if let Some(v) = self.fall_damage_enabled {
            config.fall_damage_enabled = v;
        }
        if let Some(v) = self.equipment_damage_enabled {
            config.equipment_damage_enabled = v;
        }
        if let Some(v) = self.shield_enabled {
            config.shield_enabled = v;
        }
        if let Some(v) = self.legacy_shield_mechanics {
            config.legacy_shield_mechanics = v;
        }
        if let Some(v) = self.invulnerability_ticks {
            config.invulnerability_ticks = v;
        }
        if let Some(v) = self.armor_enabled {
            config.armor_enabled = v;
        }
        if let Some(v) = self.exhaustion_enabled {
            config.exhaustion_enabled = v;
        }
        if let Some(v) = self.legacy_knockback {
            config.legacy_knockback = v;
        }
        if let Some(v) = self.sweeping_enabled {
            config.sweeping_enabled = v;
        }
        if let Some(v) = self.sounds_enabled {
            config.sounds_enabled = v;
        }
        builder
    }
}

/// Builder for [`CombatConfig`]
#[derive(Debug, Clone)]
pub struct CombatConfigBuilder {
    config: CombatConfig,
}

impl CombatConfigBuilder {
    /// Everything disabled
    pub fn empty(ruleset: Ruleset) -> Self {
        Self {
            config: CombatConfig {
                ruleset,
                fall_damage_enabled: false,
                equipment_damage_enabled: false,
                shield_enabled: false,
                legacy_shield_mechanics: false,
                invulnerability_ticks: 0,
                armor_enabled: false,
                exhaustion_enabled: false,
                legacy_knockback: false,
                sweeping_enabled: false,
                sounds_enabled: false,
            },
        }
    }

    /// Current-ruleset defaults
    pub fn default_options() -> Self {
        Self {
            config: CombatConfig {
                ruleset: Ruleset::Current,
                fall_damage_enabled: true,
                equipment_damage_enabled: true,
                shield_enabled: true,
                legacy_shield_mechanics: false,
                invulnerability_ticks: 10,
                armor_enabled: true,
                exhaustion_enabled: true,
                legacy_knockback: false,
                sweeping_enabled: true,
                sounds_enabled: true,
            },
        }
    }

    /// Legacy-ruleset defaults
    pub fn legacy_options() -> Self {
        Self {
            config: CombatConfig {
                ruleset: Ruleset::Legacy,
                fall_damage_enabled: true,
                equipment_damage_enabled: true,
                shield_enabled: true,
                legacy_shield_mechanics: true,
                invulnerability_ticks: 20,
                armor_enabled: true,
                exhaustion_enabled: true,
                legacy_knockback: true,
                sweeping_enabled: false,
                sounds_enabled: true,
            },
        }
    }

    pub fn fall_damage(mut self, enabled: bool) -> Self {
        self.config.fall_damage_enabled = enabled;
        self
    }

    pub fn equipment_damage(mut self, enabled: bool) -> Self {
        self.config.equipment_damage_enabled = enabled;
        self
    }

    pub fn shield(mut self, enabled: bool) -> Self {
        self.config.shield_enabled = enabled;
        self
    }

    pub fn legacy_shield_mechanics(mut self, enabled: bool) -> Self {
        self.config.legacy_shield_mechanics = enabled;
        self
    }

    pub fn invulnerability_ticks(mut self, ticks: u32) -> Self {
        self.config.invulnerability_ticks = ticks;
        self
    }

    pub fn armor(mut self, enabled: bool) -> Self {
        self.config.armor_enabled = enabled;
        self
    }

    pub fn exhaustion(mut self, enabled: bool) -> Self {
        self.config.exhaustion_enabled = enabled;
        self
    }

    pub fn legacy_knockback(mut self, enabled: bool) -> Self {
        self.config.legacy_knockback = enabled;
        self
    }

    pub fn sweeping(mut self, enabled: bool) -> Self {
        self.config.sweeping_enabled = enabled;
        self
    }

    pub fn sounds(mut self, enabled: bool) -> Self {
        self.config.sounds_enabled = enabled;
        self
    }

    /// Validate and produce the configuration
    pub fn build(self) -> Result<CombatConfig, ConfigurationConflict> {
        let config = self.config;
        if config.legacy_shield_mechanics && !config.shield_enabled {
            return Err(ConfigurationConflict::LegacyShieldWithoutShield);
        }
        if config.sweeping_enabled && config.ruleset.is_legacy() {
            return Err(ConfigurationConflict::SweepingUnderLegacy);
        }
        if config.invulnerability_ticks > MAX_INVULNERABILITY_TICKS {
            return Err(ConfigurationConflict::InvulnerabilityTooLong(
                config.invulnerability_ticks,
            ));
        }
        Ok(config)
    }

    // The stock option sets are consistent by construction.
    fn into_unchecked(self) -> CombatConfig {
        self.config
    }
}
