//! Enchantment modifier registry
//!
//! Every enchantment kind maps to a small behavior record of plain functions
//! (see [`EnchantmentBehavior`]). Aggregation helpers read an entity's
//! equipment through the registry; a kind without a registered behavior
//! contributes nothing.

pub mod aggregate;
pub mod registry;

use serde::{Deserialize, Serialize};

pub use aggregate::{
    attack_damage_bonus, dispatch_target_damaged, dispatch_user_damaged,
    equipment_enchantment_level, explosion_knockback, pick_random_slot, protection_amount,
    MAX_PROTECTION,
};
pub use registry::{
    EnchantmentBehavior, EnchantmentRegistry, Reaction, ReactionContext, ReactionFn,
};

/// Enchantment kinds known to the combat engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnchantmentKind {
    Protection,
    FireProtection,
    BlastProtection,
    ProjectileProtection,
    FeatherFalling,
    Thorns,
    Sharpness,
    Smite,
    BaneOfArthropods,
    Impaling,
    Knockback,
    FireAspect,
    Sweeping,
    Efficiency,
    Unbreaking,
    Loyalty,
    Power,
    Punch,
    Flame,
    Infinity,
}

impl EnchantmentKind {
    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Protection => "Protection",
            Self::FireProtection => "Fire Protection",
            Self::BlastProtection => "Blast Protection",
            Self::ProjectileProtection => "Projectile Protection",
            Self::FeatherFalling => "Feather Falling",
            Self::Thorns => "Thorns",
            Self::Sharpness => "Sharpness",
            Self::Smite => "Smite",
            Self::BaneOfArthropods => "Bane of Arthropods",
            Self::Impaling => "Impaling",
            Self::Knockback => "Knockback",
            Self::FireAspect => "Fire Aspect",
            Self::Sweeping => "Sweeping Edge",
            Self::Efficiency => "Efficiency",
            Self::Unbreaking => "Unbreaking",
            Self::Loyalty => "Loyalty",
            Self::Power => "Power",
            Self::Punch => "Punch",
            Self::Flame => "Flame",
            Self::Infinity => "Infinity",
        }
    }
}
