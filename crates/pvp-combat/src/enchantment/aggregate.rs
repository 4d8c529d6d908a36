//! Equipment-wide enchantment queries and reaction dispatch

use rand::seq::SliceRandom;
use rand::RngCore;

use pvp_core::Ruleset;

use super::registry::{EnchantmentBehavior, EnchantmentRegistry, Reaction, ReactionContext, ReactionFn};
use super::EnchantmentKind;
use crate::damage::DamageCategory;
use crate::entity::{EntityGroup, Equipment, EquipmentSlot, LivingEntity};
use crate::item::ItemStack;

/// Cap on the summed protection amount. Each point is 4% reduction.
pub const MAX_PROTECTION: i32 = 20;

/// Highest level of `kind` across the slots it is effective in. Levels on
/// different slots never add up.
pub fn equipment_enchantment_level(
    registry: &EnchantmentRegistry,
    equipment: &Equipment,
    kind: EnchantmentKind,
) -> u8 {
    let Some(behavior) = registry.get(kind) else {
        return 0;
    };
    behavior
        .slots
        .iter()
        .map(|&slot| equipment.get(slot))
        .filter(|stack| !stack.is_air())
        .map(|stack| stack.enchantment_level(kind))
        .max()
        .unwrap_or(0)
}

/// Summed attack-damage bonus of every enchantment on a weapon
pub fn attack_damage_bonus(
    registry: &EnchantmentRegistry,
    stack: &ItemStack,
    group: EntityGroup,
    ruleset: Ruleset,
) -> f32 {
    if stack.is_air() {
        return 0.0;
    }
    stack
        .enchantments()
        .filter_map(|(kind, level)| {
            registry
                .get(kind)
                .map(|behavior| (behavior.attack_damage)(level, group, ruleset))
        })
        .sum()
}

/// Summed protection amount against a damage category, clamped to
/// `0..=MAX_PROTECTION`. An enchantment only counts in a slot it is
/// effective in.
pub fn protection_amount(
    registry: &EnchantmentRegistry,
    equipment: &Equipment,
    category: DamageCategory,
) -> i32 {
    let total: i32 = equipment
        .iter()
        .filter(|(_, stack)| !stack.is_air())
        .flat_map(|(slot, stack)| stack.enchantments().map(move |entry| (slot, entry)))
        .filter_map(|(slot, (kind, level))| {
            registry
                .get(kind)
                .filter(|behavior| behavior.applies_to(slot))
                .map(|behavior| (behavior.protection_amount)(level, category))
        })
        .sum();
    total.clamp(0, MAX_PROTECTION)
}

/// Uniformly pick one slot holding `kind` at level > 0 among the slots the
/// enchantment is effective in
pub fn pick_random_slot(
    registry: &EnchantmentRegistry,
    equipment: &Equipment,
    kind: EnchantmentKind,
    rng: &mut dyn RngCore,
) -> Option<EquipmentSlot> {
    let behavior = registry.get(kind)?;
    let candidates: Vec<EquipmentSlot> = behavior
        .slots
        .iter()
        .copied()
        .filter(|&slot| {
            let stack = equipment.get(slot);
            !stack.is_air() && stack.enchantment_level(kind) > 0
        })
        .collect();
    candidates.choose(rng).copied()
}

/// Explosion knockback strength after Blast Protection
pub fn explosion_knockback(
    registry: &EnchantmentRegistry,
    equipment: &Equipment,
    strength: f64,
) -> f64 {
    let level = equipment_enchantment_level(registry, equipment, EnchantmentKind::BlastProtection);
    if level == 0 {
        return strength;
    }
    strength - (strength * f64::from(f32::from(level) * 0.15)).floor()
}

/// Run the `on_user_damaged` reaction of every enchantment the hurt entity
/// carries
pub fn dispatch_user_damaged(
    registry: &EnchantmentRegistry,
    user: &LivingEntity,
    attacker: Option<&LivingEntity>,
    ruleset: Ruleset,
    rng: &mut dyn RngCore,
) -> Vec<Reaction> {
    dispatch(registry, user, attacker, ruleset, rng, |behavior| {
        behavior.on_user_damaged
    })
}

/// Run the `on_target_damaged` reaction of every enchantment the attacker
/// carries
pub fn dispatch_target_damaged(
    registry: &EnchantmentRegistry,
    user: &LivingEntity,
    target: Option<&LivingEntity>,
    ruleset: Ruleset,
    rng: &mut dyn RngCore,
) -> Vec<Reaction> {
    dispatch(registry, user, target, ruleset, rng, |behavior| {
        behavior.on_target_damaged
    })
}

/// Once per enchantment instance, in reaction slot order
fn dispatch(
    registry: &EnchantmentRegistry,
    user: &LivingEntity,
    other: Option<&LivingEntity>,
    ruleset: Ruleset,
    rng: &mut dyn RngCore,
    select: fn(&EnchantmentBehavior) -> Option<ReactionFn>,
) -> Vec<Reaction> {
    let ctx = ReactionContext {
        registry,
        user: user.id,
        user_equipment: &user.equipment,
        other: other.map(|entity| entity.id),
        other_group: other.map(|entity| entity.group),
        ruleset,
    };
    let mut reactions = Vec::new();
    for (_, stack) in user.equipment.iter() {
        if stack.is_air() {
            continue;
        }
        for (kind, level) in stack.enchantments() {
            if let Some(reaction) = registry.get(kind).and_then(select) {
                reaction(&ctx, level, rng, &mut reactions);
            }
        }
    }
    reactions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ArmorMaterial, ArmorPiece, Material, ToolTier};
    use pvp_core::EntityId;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn piece(piece: ArmorPiece) -> ItemStack {
        ItemStack::of(Material::Armor(ArmorMaterial::Iron, piece))
    }

    fn protected_set() -> Equipment {
        Equipment::new()
            .with(
                EquipmentSlot::Helmet,
                piece(ArmorPiece::Helmet).with_enchantment(EnchantmentKind::Protection, 4),
            )
            .with(
                EquipmentSlot::Chestplate,
                piece(ArmorPiece::Chestplate)
                    .with_enchantment(EnchantmentKind::Protection, 2)
                    .with_enchantment(EnchantmentKind::FireProtection, 3),
            )
            .with(
                EquipmentSlot::Boots,
                piece(ArmorPiece::Boots).with_enchantment(EnchantmentKind::FeatherFalling, 4),
            )
    }

    #[test]
    fn test_equipment_level_takes_maximum() {
        let registry = EnchantmentRegistry::vanilla();
        let equipment = protected_set();
        assert_eq!(
            equipment_enchantment_level(&registry, &equipment, EnchantmentKind::Protection),
            4
        );
        assert_eq!(
            equipment_enchantment_level(&registry, &equipment, EnchantmentKind::Sharpness),
            0
        );
    }

    #[test]
    fn test_equipment_level_ignores_ineffective_slots() {
        let registry = EnchantmentRegistry::vanilla();
        let equipment = Equipment::new().with(
            EquipmentSlot::OffHand,
            ItemStack::of(Material::Sword(ToolTier::Iron))
                .with_enchantment(EnchantmentKind::Knockback, 2),
        );
        assert_eq!(
            equipment_enchantment_level(&registry, &equipment, EnchantmentKind::Knockback),
            0
        );
    }

    #[test]
    fn test_unregistered_kind_contributes_nothing() {
        let registry = EnchantmentRegistry::empty();
        let equipment = protected_set();
        assert_eq!(
            equipment_enchantment_level(&registry, &equipment, EnchantmentKind::Protection),
            0
        );
        assert_eq!(protection_amount(&registry, &equipment, DamageCategory::Melee), 0);
    }

    #[test]
    fn test_protection_amount_sums_per_category() {
        let registry = EnchantmentRegistry::vanilla();
        let equipment = protected_set();
        assert_eq!(protection_amount(&registry, &equipment, DamageCategory::Melee), 6);
        assert_eq!(protection_amount(&registry, &equipment, DamageCategory::Fire), 12);
        assert_eq!(protection_amount(&registry, &equipment, DamageCategory::Fall), 18);
        assert_eq!(protection_amount(&registry, &equipment, DamageCategory::Void), 0);
    }

    #[test]
    fn test_protection_amount_is_capped() {
        let registry = EnchantmentRegistry::vanilla();
        let mut equipment = Equipment::new();
        for (slot, armor) in [
            (EquipmentSlot::Helmet, ArmorPiece::Helmet),
            (EquipmentSlot::Chestplate, ArmorPiece::Chestplate),
            (EquipmentSlot::Leggings, ArmorPiece::Leggings),
            (EquipmentSlot::Boots, ArmorPiece::Boots),
        ] {
            equipment.set(
                slot,
                piece(armor)
                    .with_enchantment(EnchantmentKind::Protection, 4)
                    .with_enchantment(EnchantmentKind::ProjectileProtection, 4),
            );
        }
        assert_eq!(protection_amount(&registry, &equipment, DamageCategory::Melee), 16);
        assert_eq!(
            protection_amount(&registry, &equipment, DamageCategory::Projectile),
            MAX_PROTECTION
        );
    }

    #[test]
    fn test_attack_damage_bonus_sums() {
        let registry = EnchantmentRegistry::vanilla();
        let sword = ItemStack::of(Material::Sword(ToolTier::Diamond))
            .with_enchantment(EnchantmentKind::Sharpness, 3)
            .with_enchantment(EnchantmentKind::Smite, 2);
        assert_eq!(
            attack_damage_bonus(&registry, &sword, EntityGroup::Undead, Ruleset::Current),
            7.0
        );
        assert_eq!(
            attack_damage_bonus(&registry, &sword, EntityGroup::Default, Ruleset::Current),
            2.0
        );
    }

    #[test]
    fn test_pick_random_slot_only_enchanted_pieces() {
        let registry = EnchantmentRegistry::vanilla();
        let equipment = protected_set();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let slot = pick_random_slot(&registry, &equipment, EnchantmentKind::Protection, &mut rng);
            assert!(matches!(
                slot,
                Some(EquipmentSlot::Helmet) | Some(EquipmentSlot::Chestplate)
            ));
        }
        assert_eq!(
            pick_random_slot(&registry, &equipment, EnchantmentKind::Thorns, &mut rng),
            None
        );
    }

    #[test]
    fn test_explosion_knockback_reduced_by_blast_protection() {
        let registry = EnchantmentRegistry::vanilla();
        let equipment = Equipment::new().with(
            EquipmentSlot::Leggings,
            piece(ArmorPiece::Leggings).with_enchantment(EnchantmentKind::BlastProtection, 4),
        );
        // floor(10 * 0.6) = 6
        assert!((explosion_knockback(&registry, &equipment, 10.0) - 4.0).abs() < 1e-9);
        assert_eq!(explosion_knockback(&registry, &Equipment::new(), 10.0), 10.0);
    }

    #[test]
    fn test_dispatch_runs_in_slot_order() {
        let registry = EnchantmentRegistry::vanilla();
        let thorns = |armor: ArmorPiece| piece(armor).with_enchantment(EnchantmentKind::Thorns, 1);
        let mut user = LivingEntity::new(EntityId::from_u128(1), EntityGroup::Default);
        user.equipment = Equipment::new()
            .with(EquipmentSlot::Helmet, thorns(ArmorPiece::Helmet))
            .with(EquipmentSlot::Boots, thorns(ArmorPiece::Boots));
        let attacker = LivingEntity::new(EntityId::from_u128(2), EntityGroup::Default);

        let reactions = dispatch_user_damaged(
            &registry,
            &user,
            Some(&attacker),
            Ruleset::Current,
            &mut StepRng::new(0, 0),
        );
        // Two thorns pieces, each procs once with a zero source
        let hits = reactions
            .iter()
            .filter(|r| matches!(r, Reaction::DamageEntity { .. }))
            .count();
        assert_eq!(hits, 2);
        assert!(dispatch_target_damaged(
            &registry,
            &user,
            Some(&attacker),
            Ruleset::Current,
            &mut StepRng::new(0, 0),
        )
        .is_empty());
    }
}
