//! Item durability loss
//!
//! The damage pipeline never edits item damage directly. It goes through an
//! [`ItemDamage`] collaborator so a host can swap in its own rules.

use rand::RngCore;
use tracing::debug;

use pvp_core::EntityId;

use crate::damage::DamageCategory;
use crate::enchantment::EnchantmentRegistry;
use crate::entity::{EquipmentSlot, LivingEntity};
use crate::item::{ItemStack, Material};

/// An item that reached its maximum damage and was removed from its slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokenItem {
    pub owner: EntityId,
    pub slot: EquipmentSlot,
    pub material: Material,
}

/// Applies durability loss to equipped items
pub trait ItemDamage {
    /// Take `amount` durability points from the item in a slot
    fn damage_equipment(
        &self,
        enchantments: &EnchantmentRegistry,
        entity: &mut LivingEntity,
        slot: EquipmentSlot,
        amount: u32,
        rng: &mut dyn RngCore,
    ) -> Option<BrokenItem>;

    /// Wear down every worn armor piece after a hit of `damage`
    fn damage_armor(
        &self,
        enchantments: &EnchantmentRegistry,
        entity: &mut LivingEntity,
        category: DamageCategory,
        damage: f32,
        rng: &mut dyn RngCore,
    ) -> Vec<BrokenItem>;
}

/// Vanilla durability rules
#[derive(Debug, Clone, Copy, Default)]
pub struct VanillaItemDamage;

impl VanillaItemDamage {
    /// Whether an enchantment on the stack saves one point of durability
    fn point_skipped(
        enchantments: &EnchantmentRegistry,
        stack: &ItemStack,
        rng: &mut dyn RngCore,
    ) -> bool {
        stack.enchantments().any(|(kind, level)| {
            enchantments
                .get(kind)
                .and_then(|behavior| behavior.prevents_durability_loss)
                .is_some_and(|skips| skips(level, stack, rng))
        })
    }
}

impl ItemDamage for VanillaItemDamage {
    fn damage_equipment(
        &self,
        enchantments: &EnchantmentRegistry,
        entity: &mut LivingEntity,
        slot: EquipmentSlot,
        amount: u32,
        rng: &mut dyn RngCore,
    ) -> Option<BrokenItem> {
        if amount == 0 || entity.game_mode.is_damage_immune() {
            return None;
        }
        let stack = entity.equipment.get(slot);
        let max = stack.material().max_durability()?;
        if !stack.is_damageable() {
            return None;
        }

        let taken = (0..amount)
            .filter(|_| !Self::point_skipped(enchantments, stack, rng))
            .count() as u32;
        if taken == 0 {
            return None;
        }

        let damage = stack.damage() + taken;
        let material = stack.material();
        if damage >= max {
            entity.equipment.clear(slot);
            debug!(entity = %entity.id, slot = slot.name(), "Item broke");
            return Some(BrokenItem {
                owner: entity.id,
                slot,
                material,
            });
        }
        let worn = stack.clone().with_damage(damage);
        entity.equipment.set(slot, worn);
        None
    }

    fn damage_armor(
        &self,
        enchantments: &EnchantmentRegistry,
        entity: &mut LivingEntity,
        category: DamageCategory,
        damage: f32,
        rng: &mut dyn RngCore,
    ) -> Vec<BrokenItem> {
        if category.bypasses_armor() || damage <= 0.0 {
            return Vec::new();
        }
        let points = ((damage / 4.0).floor() as u32).max(1);
        let worn: Vec<EquipmentSlot> = EquipmentSlot::ARMOR
            .into_iter()
            .filter(|&slot| entity.equipment.get(slot).material().armor().is_some())
            .collect();
        worn.into_iter()
            .filter_map(|slot| self.damage_equipment(enchantments, entity, slot, points, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enchantment::EnchantmentKind;
    use crate::entity::GameMode;
    use crate::item::{ArmorMaterial, ArmorPiece, ToolTier};
    use rand::rngs::mock::StepRng;

    fn holding(stack: ItemStack) -> LivingEntity {
        let mut entity = LivingEntity::player();
        entity.equipment.set(EquipmentSlot::MainHand, stack);
        entity
    }

    #[test]
    fn test_damage_accumulates() {
        let registry = EnchantmentRegistry::vanilla();
        let mut entity = holding(ItemStack::of(Material::Sword(ToolTier::Iron)));
        let broken = VanillaItemDamage.damage_equipment(
            &registry,
            &mut entity,
            EquipmentSlot::MainHand,
            2,
            &mut StepRng::new(0, 0),
        );
        assert!(broken.is_none());
        assert_eq!(entity.equipment.main_hand.damage(), 2);
    }

    #[test]
    fn test_item_breaks_at_max() {
        let registry = EnchantmentRegistry::vanilla();
        let mut entity = holding(ItemStack::of(Material::Sword(ToolTier::Gold)).with_damage(31));
        let broken = VanillaItemDamage.damage_equipment(
            &registry,
            &mut entity,
            EquipmentSlot::MainHand,
            1,
            &mut StepRng::new(0, 0),
        );
        assert_eq!(
            broken.map(|b| b.material),
            Some(Material::Sword(ToolTier::Gold))
        );
        assert!(entity.equipment.main_hand.is_air());
    }

    #[test]
    fn test_creative_items_do_not_wear() {
        let registry = EnchantmentRegistry::vanilla();
        let mut entity = holding(ItemStack::of(Material::Bow)).with_game_mode(GameMode::Creative);
        VanillaItemDamage.damage_equipment(
            &registry,
            &mut entity,
            EquipmentSlot::MainHand,
            5,
            &mut StepRng::new(0, 0),
        );
        assert_eq!(entity.equipment.main_hand.damage(), 0);
    }

    #[test]
    fn test_undamageable_items_are_ignored() {
        let registry = EnchantmentRegistry::vanilla();
        let mut entity = holding(ItemStack::of(Material::Arrow));
        let broken = VanillaItemDamage.damage_equipment(
            &registry,
            &mut entity,
            EquipmentSlot::MainHand,
            5,
            &mut StepRng::new(0, 0),
        );
        assert!(broken.is_none());
        assert_eq!(entity.equipment.main_hand.damage(), 0);
    }

    #[test]
    fn test_unbreaking_can_save_every_point() {
        let registry = EnchantmentRegistry::vanilla();
        let sword = ItemStack::of(Material::Sword(ToolTier::Iron))
            .with_enchantment(EnchantmentKind::Unbreaking, 3);
        let mut entity = holding(sword);
        // A source that always rolls the top of the range
        let mut rng = StepRng::new(u64::from(u32::MAX / 4 * 3), 0);
        VanillaItemDamage.damage_equipment(
            &registry,
            &mut entity,
            EquipmentSlot::MainHand,
            10,
            &mut rng,
        );
        assert_eq!(entity.equipment.main_hand.damage(), 0);
    }

    #[test]
    fn test_armor_wear_is_a_quarter_of_damage() {
        let registry = EnchantmentRegistry::empty();
        let mut entity = LivingEntity::player();
        entity.equipment.set(
            EquipmentSlot::Chestplate,
            ItemStack::of(Material::Armor(ArmorMaterial::Iron, ArmorPiece::Chestplate)),
        );
        entity.equipment.set(
            EquipmentSlot::Boots,
            ItemStack::of(Material::Armor(ArmorMaterial::Iron, ArmorPiece::Boots)),
        );
        let mut rng = StepRng::new(0, 0);
        VanillaItemDamage.damage_armor(&registry, &mut entity, DamageCategory::Melee, 9.0, &mut rng);
        assert_eq!(entity.equipment.chestplate.damage(), 2);
        assert_eq!(entity.equipment.boots.damage(), 2);

        VanillaItemDamage.damage_armor(&registry, &mut entity, DamageCategory::Melee, 1.0, &mut rng);
        assert_eq!(entity.equipment.chestplate.damage(), 3);

        VanillaItemDamage.damage_armor(&registry, &mut entity, DamageCategory::Fall, 20.0, &mut rng);
        assert_eq!(entity.equipment.chestplate.damage(), 3);
    }
}
