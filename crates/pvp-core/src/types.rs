//! Core types used throughout the combat engine

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for living entities and projectiles
///
/// Identifiers are only ever looked up, never dereferenced: holding one says
/// nothing about whether the entity still exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an entity ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create an entity ID from a small integer (stable across runs)
    pub fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Which generation of combat formulas is in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ruleset {
    /// Pre-cooldown combat (1.8 style)
    Legacy,
    /// Cooldown-era combat (1.9 and later)
    #[default]
    Current,
}

impl Ruleset {
    /// Build a ruleset from a legacy flag
    pub fn from_legacy(legacy: bool) -> Self {
        if legacy {
            Self::Legacy
        } else {
            Self::Current
        }
    }

    /// Whether legacy formulas apply
    pub fn is_legacy(self) -> bool {
        matches!(self, Self::Legacy)
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Current => "current",
        }
    }
}
