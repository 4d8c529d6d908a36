//! Equipment slots and the six-slot equipment of a living entity

use serde::{Deserialize, Serialize};

use crate::item::{ArmorMaterial, ArmorPiece, ItemStack};

/// The six equipment slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EquipmentSlot {
    MainHand,
    OffHand,
    Boots,
    Leggings,
    Chestplate,
    Helmet,
}

impl EquipmentSlot {
    /// Slots in the order enchantment reactions are dispatched
    pub const REACTION_ORDER: [EquipmentSlot; 6] = [
        Self::Boots,
        Self::Leggings,
        Self::Chestplate,
        Self::Helmet,
        Self::MainHand,
        Self::OffHand,
    ];

    pub const ARMOR: [EquipmentSlot; 4] = [Self::Boots, Self::Leggings, Self::Chestplate, Self::Helmet];

    pub const HANDS: [EquipmentSlot; 2] = [Self::MainHand, Self::OffHand];

    /// All equipment slot variants
    pub fn all() -> &'static [EquipmentSlot] {
        &Self::REACTION_ORDER
    }

    pub fn is_armor(self) -> bool {
        !self.is_hand()
    }

    pub fn is_hand(self) -> bool {
        matches!(self, Self::MainHand | Self::OffHand)
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::MainHand => "Main Hand",
            Self::OffHand => "Off Hand",
            Self::Boots => "Boots",
            Self::Leggings => "Leggings",
            Self::Chestplate => "Chestplate",
            Self::Helmet => "Helmet",
        }
    }
}

/// Items held and worn by a living entity. Empty slots hold air.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub main_hand: ItemStack,
    pub off_hand: ItemStack,
    pub boots: ItemStack,
    pub leggings: ItemStack,
    pub chestplate: ItemStack,
    pub helmet: ItemStack,
}

impl Equipment {
    /// Create an empty equipment set
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a reference to the item in a slot
    pub fn get(&self, slot: EquipmentSlot) -> &ItemStack {
        match slot {
            EquipmentSlot::MainHand => &self.main_hand,
            EquipmentSlot::OffHand => &self.off_hand,
            EquipmentSlot::Boots => &self.boots,
            EquipmentSlot::Leggings => &self.leggings,
            EquipmentSlot::Chestplate => &self.chestplate,
            EquipmentSlot::Helmet => &self.helmet,
        }
    }

    /// Get a mutable reference to the item in a slot
    pub fn get_mut(&mut self, slot: EquipmentSlot) -> &mut ItemStack {
        match slot {
            EquipmentSlot::MainHand => &mut self.main_hand,
            EquipmentSlot::OffHand => &mut self.off_hand,
            EquipmentSlot::Boots => &mut self.boots,
            EquipmentSlot::Leggings => &mut self.leggings,
            EquipmentSlot::Chestplate => &mut self.chestplate,
            EquipmentSlot::Helmet => &mut self.helmet,
        }
    }

    /// Put a stack in a slot, returning what was there
    pub fn set(&mut self, slot: EquipmentSlot, stack: ItemStack) -> ItemStack {
        std::mem::replace(self.get_mut(slot), stack)
    }

    /// Builder-style [`Equipment::set`]
    pub fn with(mut self, slot: EquipmentSlot, stack: ItemStack) -> Self {
        self.set(slot, stack);
        self
    }

    /// Empty a slot, returning what was there
    pub fn clear(&mut self, slot: EquipmentSlot) -> ItemStack {
        self.set(slot, ItemStack::air())
    }

    /// Every slot with its stack, in reaction order
    pub fn iter(&self) -> impl Iterator<Item = (EquipmentSlot, &ItemStack)> {
        EquipmentSlot::REACTION_ORDER
            .iter()
            .map(move |&slot| (slot, self.get(slot)))
    }

    /// Armor points of the worn pieces. A piece only counts in its own slot.
    pub fn armor_points(&self) -> f32 {
        self.worn_armor()
            .map(|(material, piece)| material.defense(piece))
            .sum()
    }

    /// Armor toughness of the worn pieces
    pub fn armor_toughness(&self) -> f32 {
        self.worn_armor()
            .map(|(material, _)| material.toughness())
            .sum()
    }

    /// Knockback resistance granted by the worn pieces
    pub fn knockback_resistance(&self) -> f32 {
        self.worn_armor()
            .map(|(material, _)| material.knockback_resistance())
            .sum()
    }

    /// First hand whose stack matches the predicate
    pub fn holds(&self, predicate: impl Fn(&ItemStack) -> bool) -> Option<EquipmentSlot> {
        EquipmentSlot::HANDS
            .into_iter()
            .find(|&slot| predicate(self.get(slot)))
    }

    fn worn_armor(&self) -> impl Iterator<Item = (ArmorMaterial, ArmorPiece)> + '_ {
        EquipmentSlot::ARMOR.into_iter().filter_map(move |slot| {
            let stack = self.get(slot);
            if stack.is_air() {
                return None;
            }
            stack
                .material()
                .armor()
                .filter(|(_, piece)| piece.slot() == slot)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Material;

    fn armor(material: ArmorMaterial, piece: ArmorPiece) -> ItemStack {
        ItemStack::of(Material::Armor(material, piece))
    }

    #[test]
    fn test_reaction_order_starts_with_boots() {
        assert_eq!(EquipmentSlot::REACTION_ORDER[0], EquipmentSlot::Boots);
        assert_eq!(EquipmentSlot::REACTION_ORDER[5], EquipmentSlot::OffHand);
        assert_eq!(EquipmentSlot::all().len(), 6);
    }

    #[test]
    fn test_set_returns_previous() {
        let mut equipment = Equipment::new();
        let previous = equipment.set(EquipmentSlot::MainHand, ItemStack::of(Material::Bow));
        assert!(previous.is_air());
        assert_eq!(equipment.main_hand.material(), Material::Bow);
        let cleared = equipment.clear(EquipmentSlot::MainHand);
        assert_eq!(cleared.material(), Material::Bow);
        assert!(equipment.main_hand.is_air());
    }

    #[test]
    fn test_armor_points_and_toughness() {
        let equipment = Equipment::new()
            .with(EquipmentSlot::Helmet, armor(ArmorMaterial::Diamond, ArmorPiece::Helmet))
            .with(
                EquipmentSlot::Chestplate,
                armor(ArmorMaterial::Netherite, ArmorPiece::Chestplate),
            );
        assert_eq!(equipment.armor_points(), 11.0);
        assert_eq!(equipment.armor_toughness(), 5.0);
        assert!((equipment.knockback_resistance() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_misplaced_armor_does_not_count() {
        let equipment = Equipment::new().with(
            EquipmentSlot::Boots,
            armor(ArmorMaterial::Iron, ArmorPiece::Chestplate),
        );
        assert_eq!(equipment.armor_points(), 0.0);
    }

    #[test]
    fn test_holds_checks_both_hands() {
        let equipment = Equipment::new().with(EquipmentSlot::OffHand, ItemStack::of(Material::Shield));
        let slot = equipment.holds(|stack| stack.material() == Material::Shield);
        assert_eq!(slot, Some(EquipmentSlot::OffHand));
    }
}
