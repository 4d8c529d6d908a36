//! Living entities, their equipment, and the registry that resolves them

pub mod equipment;
pub mod living;
pub mod registry;

use serde::{Deserialize, Serialize};

pub use equipment::{Equipment, EquipmentSlot};
pub use living::LivingEntity;
pub use registry::EntityRegistry;

/// Creature classification used by damage-type enchantments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EntityGroup {
    #[default]
    Default,
    Undead,
    Arthropod,
    Illager,
    Aquatic,
}

/// Player game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Adventure,
    Spectator,
}

impl GameMode {
    /// Creative and spectator players only take out-of-world damage
    pub fn is_damage_immune(self) -> bool {
        matches!(self, Self::Creative | Self::Spectator)
    }
}
