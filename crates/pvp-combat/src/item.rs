//! Item data model
//!
//! Materials with their armor, weapon, and durability properties, and the
//! immutable item stacks that fill equipment slots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pvp_core::Ruleset;

use crate::enchantment::EnchantmentKind;
use crate::entity::EquipmentSlot;
use crate::potion::{PotionType, Rgb, StatusEffect};

/// Tool and weapon tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolTier {
    Wood,
    Stone,
    Iron,
    Gold,
    Diamond,
    Netherite,
}

impl ToolTier {
    pub fn durability(self) -> u32 {
        match self {
            Self::Wood => 59,
            Self::Stone => 131,
            Self::Iron => 250,
            Self::Gold => 32,
            Self::Diamond => 1561,
            Self::Netherite => 2031,
        }
    }
}

/// Armor materials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmorMaterial {
    Leather,
    Chainmail,
    Iron,
    Gold,
    Diamond,
    Netherite,
    Turtle,
}

impl ArmorMaterial {
    /// Armor points for a piece of this material
    pub fn defense(self, piece: ArmorPiece) -> f32 {
        let [helmet, chestplate, leggings, boots] = match self {
            Self::Leather => [1.0, 3.0, 2.0, 1.0],
            Self::Chainmail => [2.0, 5.0, 4.0, 1.0],
            Self::Iron => [2.0, 6.0, 5.0, 2.0],
            Self::Gold => [2.0, 5.0, 3.0, 1.0],
            Self::Diamond | Self::Netherite => [3.0, 8.0, 6.0, 3.0],
            Self::Turtle => [2.0, 0.0, 0.0, 0.0],
        };
        match piece {
            ArmorPiece::Helmet => helmet,
            ArmorPiece::Chestplate => chestplate,
            ArmorPiece::Leggings => leggings,
            ArmorPiece::Boots => boots,
        }
    }

    /// Armor toughness per piece
    pub fn toughness(self) -> f32 {
        match self {
            Self::Diamond => 2.0,
            Self::Netherite => 3.0,
            _ => 0.0,
        }
    }

    /// Knockback resistance per piece
    pub fn knockback_resistance(self) -> f32 {
        match self {
            Self::Netherite => 0.1,
            _ => 0.0,
        }
    }

    fn durability_multiplier(self) -> u32 {
        match self {
            Self::Leather => 5,
            Self::Chainmail | Self::Iron => 15,
            Self::Gold => 7,
            Self::Diamond => 33,
            Self::Netherite => 37,
            Self::Turtle => 25,
        }
    }
}

/// Armor pieces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmorPiece {
    Helmet,
    Chestplate,
    Leggings,
    Boots,
}

impl ArmorPiece {
    /// Slot the piece is worn in
    pub fn slot(self) -> EquipmentSlot {
        match self {
            Self::Helmet => EquipmentSlot::Helmet,
            Self::Chestplate => EquipmentSlot::Chestplate,
            Self::Leggings => EquipmentSlot::Leggings,
            Self::Boots => EquipmentSlot::Boots,
        }
    }

    fn base_durability(self) -> u32 {
        match self {
            Self::Helmet => 11,
            Self::Chestplate => 16,
            Self::Leggings => 15,
            Self::Boots => 13,
        }
    }
}

/// Item materials known to the combat engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Air,
    Arrow,
    TippedArrow,
    SpectralArrow,
    Bow,
    Crossbow,
    Trident,
    Shield,
    Sword(ToolTier),
    Axe(ToolTier),
    Armor(ArmorMaterial, ArmorPiece),
    /// Anything else; carries no combat properties
    Other,
}

impl Material {
    /// Durability before the item breaks, if it can take damage at all
    pub fn max_durability(self) -> Option<u32> {
        match self {
            Self::Bow => Some(384),
            Self::Crossbow => Some(465),
            Self::Trident => Some(250),
            Self::Shield => Some(336),
            Self::Sword(tier) | Self::Axe(tier) => Some(tier.durability()),
            Self::Armor(material, piece) => {
                Some(piece.base_durability() * material.durability_multiplier())
            }
            _ => None,
        }
    }

    /// Base attack damage when held in the main hand (1.0 for anything that
    /// is not a weapon)
    pub fn attack_damage(self, ruleset: Ruleset) -> f32 {
        let legacy = ruleset.is_legacy();
        match self {
            Self::Sword(tier) => match (tier, legacy) {
                (ToolTier::Wood | ToolTier::Gold, false) => 4.0,
                (ToolTier::Stone, false) => 5.0,
                (ToolTier::Iron, false) => 6.0,
                (ToolTier::Diamond, false) => 7.0,
                (ToolTier::Netherite, false) => 8.0,
                (ToolTier::Wood | ToolTier::Gold, true) => 5.0,
                (ToolTier::Stone, true) => 6.0,
                (ToolTier::Iron, true) => 7.0,
                (ToolTier::Diamond, true) => 8.0,
                (ToolTier::Netherite, true) => 9.0,
            },
            Self::Axe(tier) => match (tier, legacy) {
                (ToolTier::Wood | ToolTier::Gold, false) => 7.0,
                (ToolTier::Stone | ToolTier::Iron | ToolTier::Diamond, false) => 9.0,
                (ToolTier::Netherite, false) => 10.0,
                (ToolTier::Wood | ToolTier::Gold, true) => 4.0,
                (ToolTier::Stone, true) => 5.0,
                (ToolTier::Iron, true) => 6.0,
                (ToolTier::Diamond, true) => 7.0,
                (ToolTier::Netherite, true) => 8.0,
            },
            Self::Trident => 9.0,
            _ => 1.0,
        }
    }

    /// Durability lost by the weapon on a melee hit
    pub fn attack_durability_cost(self) -> u32 {
        match self {
            Self::Sword(_) | Self::Trident => 1,
            Self::Axe(_) => 2,
            _ => 0,
        }
    }

    pub fn is_arrow(self) -> bool {
        matches!(self, Self::Arrow | Self::TippedArrow | Self::SpectralArrow)
    }

    pub fn is_sword(self) -> bool {
        matches!(self, Self::Sword(_))
    }

    pub fn is_axe(self) -> bool {
        matches!(self, Self::Axe(_))
    }

    /// Armor material and piece, if this is armor
    pub fn armor(self) -> Option<(ArmorMaterial, ArmorPiece)> {
        match self {
            Self::Armor(material, piece) => Some((material, piece)),
            _ => None,
        }
    }
}

/// Potion payload of a potion-carrying item (tipped arrows)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PotionContents {
    pub potion_type: PotionType,
    pub custom_effects: Vec<StatusEffect>,
    /// Explicit color; `None` means derive it from the effects
    pub color: Option<Rgb>,
}

impl PotionContents {
    /// Contents of a brewed potion type
    pub fn of_type(potion_type: PotionType) -> Self {
        Self {
            potion_type,
            ..Default::default()
        }
    }

    pub fn with_effect(mut self, effect: StatusEffect) -> Self {
        self.custom_effects.push(effect);
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }
}

/// An immutable stack of items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    material: Material,
    count: u8,
    /// Durability already used up
    damage: u32,
    enchantments: BTreeMap<EnchantmentKind, u8>,
    potion: Option<PotionContents>,
}

impl Default for ItemStack {
    fn default() -> Self {
        Self::air()
    }
}

impl ItemStack {
    /// One item of a material
    pub fn of(material: Material) -> Self {
        Self {
            material,
            count: if material == Material::Air { 0 } else { 1 },
            damage: 0,
            enchantments: BTreeMap::new(),
            potion: None,
        }
    }

    /// The empty stack
    pub fn air() -> Self {
        Self::of(Material::Air)
    }

    /// A tipped arrow carrying the given potion contents
    pub fn tipped_arrow(contents: PotionContents) -> Self {
        Self::of(Material::TippedArrow).with_potion(contents)
    }

    pub fn with_count(mut self, count: u8) -> Self {
        self.count = count;
        self
    }

    /// Same stack with an enchantment set (level 0 removes it)
    pub fn with_enchantment(mut self, kind: EnchantmentKind, level: u8) -> Self {
        if level == 0 {
            self.enchantments.remove(&kind);
        } else {
            self.enchantments.insert(kind, level);
        }
        self
    }

    pub fn with_potion(mut self, contents: PotionContents) -> Self {
        self.potion = Some(contents);
        self
    }

    /// Same stack with a different amount of used-up durability
    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn damage(&self) -> u32 {
        self.damage
    }

    pub fn is_air(&self) -> bool {
        self.material == Material::Air || self.count == 0
    }

    /// Level of an enchantment on this stack (0 when absent)
    pub fn enchantment_level(&self, kind: EnchantmentKind) -> u8 {
        self.enchantments.get(&kind).copied().unwrap_or(0)
    }

    /// All enchantments in kind order
    pub fn enchantments(&self) -> impl Iterator<Item = (EnchantmentKind, u8)> + '_ {
        self.enchantments.iter().map(|(&kind, &level)| (kind, level))
    }

    pub fn has_enchantments(&self) -> bool {
        !self.enchantments.is_empty()
    }

    pub fn potion(&self) -> Option<&PotionContents> {
        self.potion.as_ref()
    }

    /// Whether the stack can take durability damage
    pub fn is_damageable(&self) -> bool {
        !self.is_air() && self.material.max_durability().is_some()
    }

    /// Whether used-up durability has reached the maximum
    pub fn is_broken(&self) -> bool {
        self.material
            .max_durability()
            .is_some_and(|max| self.damage >= max)
    }
}
