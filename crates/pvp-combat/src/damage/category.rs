//! Damage categories and the properties that route them through the pipeline

use serde::{Deserialize, Serialize};

/// What caused a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageCategory {
    Melee,
    /// Secondary hit from a sweeping sword attack
    SweepingEdge,
    Projectile,
    Trident,
    Explosion,
    /// Standing in fire
    Fire,
    /// Burning while on fire
    FireTick,
    Lava,
    Fall,
    Magic,
    Thorns,
    Drown,
    Starvation,
    /// Falling out of the world
    Void,
    Generic,
}

impl DamageCategory {
    pub fn bypasses_invulnerability(self) -> bool {
        matches!(
            self,
            Self::FireTick | Self::Fall | Self::Void | Self::Starvation | Self::Drown
        )
    }

    pub fn bypasses_armor(self) -> bool {
        matches!(
            self,
            Self::FireTick | Self::Fall | Self::Magic | Self::Void | Self::Starvation | Self::Drown
        )
    }

    pub fn is_fire(self) -> bool {
        matches!(self, Self::Fire | Self::FireTick | Self::Lava)
    }

    pub fn is_explosion(self) -> bool {
        self == Self::Explosion
    }

    pub fn is_projectile(self) -> bool {
        matches!(self, Self::Projectile | Self::Trident)
    }

    pub fn is_fall(self) -> bool {
        self == Self::Fall
    }

    pub fn is_out_of_world(self) -> bool {
        self == Self::Void
    }

    /// Whether a raised shield can stop it
    pub fn is_blockable(self) -> bool {
        matches!(
            self,
            Self::Melee | Self::SweepingEdge | Self::Projectile | Self::Trident | Self::Explosion
        )
    }

    /// Whether the hit runs the enchantment reactions of both parties
    pub fn dispatches_reactions(self) -> bool {
        matches!(self, Self::Melee | Self::Projectile | Self::Trident)
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Melee => "melee",
            Self::SweepingEdge => "sweeping edge",
            Self::Projectile => "projectile",
            Self::Trident => "trident",
            Self::Explosion => "explosion",
            Self::Fire => "fire",
            Self::FireTick => "fire tick",
            Self::Lava => "lava",
            Self::Fall => "fall",
            Self::Magic => "magic",
            Self::Thorns => "thorns",
            Self::Drown => "drown",
            Self::Starvation => "starvation",
            Self::Void => "void",
            Self::Generic => "generic",
        }
    }
}
