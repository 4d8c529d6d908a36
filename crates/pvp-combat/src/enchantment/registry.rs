//! Behavior records for each enchantment kind
//!
//! A behavior is a table of plain functions: attack-damage bonus, protection
//! amount, the two hit reactions, and the durability interaction. Reactions
//! do not touch the world themselves; they push [`Reaction`] commands that the
//! damage pipeline carries out after the hit.

use std::collections::HashMap;
use std::fmt;

use rand::{Rng, RngCore};

use pvp_core::{EntityId, Ruleset};

use super::aggregate::pick_random_slot;
use super::EnchantmentKind;
use crate::damage::DamageCategory;
use crate::entity::{EntityGroup, Equipment, EquipmentSlot};
use crate::item::ItemStack;
use crate::potion::{EffectKind, StatusEffect};

pub type AttackDamageFn = fn(u8, EntityGroup, Ruleset) -> f32;
pub type ProtectionFn = fn(u8, DamageCategory) -> i32;
pub type ReactionFn = fn(&ReactionContext<'_>, u8, &mut dyn RngCore, &mut Vec<Reaction>);
/// Returns true when a point of durability loss should be skipped
pub type DurabilityFn = fn(u8, &ItemStack, &mut dyn RngCore) -> bool;

const ARMOR_SLOTS: &[EquipmentSlot] = &EquipmentSlot::ARMOR;
const MAIN_HAND: &[EquipmentSlot] = &[EquipmentSlot::MainHand];
const FEET: &[EquipmentSlot] = &[EquipmentSlot::Boots];
const ALL_SLOTS: &[EquipmentSlot] = &EquipmentSlot::REACTION_ORDER;

/// Thorns levels above this deal a fixed `level - 10` damage
const THORNS_FIXED_DAMAGE_THRESHOLD: u8 = 10;
/// Unbreaking is ignored on armor this often
const UNBREAKING_ARMOR_IGNORE_CHANCE: f32 = 0.6;

/// What a reaction sees of the hit
pub struct ReactionContext<'a> {
    pub registry: &'a EnchantmentRegistry,
    /// Entity carrying the enchanted item
    pub user: EntityId,
    pub user_equipment: &'a Equipment,
    /// The attacker when the user was damaged, the target when the user
    /// dealt the damage
    pub other: Option<EntityId>,
    pub other_group: Option<EntityGroup>,
    pub ruleset: Ruleset,
}

/// A side effect requested by an enchantment reaction
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// Hurt another entity
    DamageEntity {
        target: EntityId,
        source: EntityId,
        category: DamageCategory,
        amount: f32,
    },
    ApplyEffect {
        target: EntityId,
        effect: StatusEffect,
    },
    /// Take durability from an equipped item
    DamageItem {
        owner: EntityId,
        slot: EquipmentSlot,
        amount: u32,
    },
}

/// How one enchantment kind modifies combat
#[derive(Clone, Copy)]
pub struct EnchantmentBehavior {
    /// Slots the enchantment is effective in
    pub slots: &'static [EquipmentSlot],
    pub attack_damage: AttackDamageFn,
    pub protection_amount: ProtectionFn,
    /// Runs when the carrier is hurt
    pub on_user_damaged: Option<ReactionFn>,
    /// Runs when the carrier hurts another entity
    pub on_target_damaged: Option<ReactionFn>,
    pub prevents_durability_loss: Option<DurabilityFn>,
}

impl fmt::Debug for EnchantmentBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnchantmentBehavior")
            .field("slots", &self.slots)
            .field("on_user_damaged", &self.on_user_damaged.is_some())
            .field("on_target_damaged", &self.on_target_damaged.is_some())
            .field(
                "prevents_durability_loss",
                &self.prevents_durability_loss.is_some(),
            )
            .finish_non_exhaustive()
    }
}

impl EnchantmentBehavior {
    /// A behavior with no effect, valid in the given slots
    pub fn inert(slots: &'static [EquipmentSlot]) -> Self {
        Self {
            slots,
            attack_damage: no_attack_damage,
            protection_amount: no_protection,
            on_user_damaged: None,
            on_target_damaged: None,
            prevents_durability_loss: None,
        }
    }

    pub fn with_attack_damage(mut self, attack_damage: AttackDamageFn) -> Self {
        self.attack_damage = attack_damage;
        self
    }

    pub fn with_protection(mut self, protection_amount: ProtectionFn) -> Self {
        self.protection_amount = protection_amount;
        self
    }

    pub fn on_user_damaged(mut self, reaction: ReactionFn) -> Self {
        self.on_user_damaged = Some(reaction);
        self
    }

    pub fn on_target_damaged(mut self, reaction: ReactionFn) -> Self {
        self.on_target_damaged = Some(reaction);
        self
    }

    pub fn with_durability(mut self, interaction: DurabilityFn) -> Self {
        self.prevents_durability_loss = Some(interaction);
        self
    }

    /// Whether the enchantment is effective in a slot
    pub fn applies_to(&self, slot: EquipmentSlot) -> bool {
        self.slots.contains(&slot)
    }
}

/// Maps enchantment kinds to their behavior. Open for registration.
#[derive(Debug, Clone)]
pub struct EnchantmentRegistry {
    behaviors: HashMap<EnchantmentKind, EnchantmentBehavior>,
}

impl Default for EnchantmentRegistry {
    fn default() -> Self {
        Self::vanilla()
    }
}

impl EnchantmentRegistry {
    /// A registry that knows no enchantments
    pub fn empty() -> Self {
        Self {
            behaviors: HashMap::new(),
        }
    }

    /// The vanilla behavior of every [`EnchantmentKind`]
    pub fn vanilla() -> Self {
        use EnchantmentKind as K;
        let mut registry = Self::empty();

        let armor = EnchantmentBehavior::inert(ARMOR_SLOTS);
        registry.register(K::Protection, armor.with_protection(protection_points));
        registry.register(K::FireProtection, armor.with_protection(fire_protection_points));
        registry.register(K::BlastProtection, armor.with_protection(blast_protection_points));
        registry.register(
            K::ProjectileProtection,
            armor.with_protection(projectile_protection_points),
        );
        registry.register(
            K::FeatherFalling,
            EnchantmentBehavior::inert(FEET).with_protection(feather_falling_points),
        );
        registry.register(K::Thorns, armor.on_user_damaged(thorns_reaction));

        let weapon = EnchantmentBehavior::inert(MAIN_HAND);
        registry.register(K::Sharpness, weapon.with_attack_damage(sharpness_damage));
        registry.register(K::Smite, weapon.with_attack_damage(smite_damage));
        registry.register(
            K::BaneOfArthropods,
            weapon
                .with_attack_damage(bane_of_arthropods_damage)
                .on_target_damaged(bane_of_arthropods_reaction),
        );
        registry.register(K::Impaling, weapon.with_attack_damage(impaling_damage));
        for kind in [
            K::Knockback,
            K::FireAspect,
            K::Sweeping,
            K::Efficiency,
            K::Loyalty,
            K::Power,
            K::Punch,
            K::Flame,
            K::Infinity,
        ] {
            registry.register(kind, weapon);
        }

        registry.register(
            K::Unbreaking,
            EnchantmentBehavior::inert(ALL_SLOTS).with_durability(unbreaking_skips_damage),
        );
        registry
    }

    /// Add or replace the behavior of a kind, returning the previous one
    pub fn register(
        &mut self,
        kind: EnchantmentKind,
        behavior: EnchantmentBehavior,
    ) -> Option<EnchantmentBehavior> {
        self.behaviors.insert(kind, behavior)
    }

    pub fn get(&self, kind: EnchantmentKind) -> Option<&EnchantmentBehavior> {
        self.behaviors.get(&kind)
    }

    pub fn contains(&self, kind: EnchantmentKind) -> bool {
        self.behaviors.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }
}

fn no_attack_damage(_level: u8, _group: EntityGroup, _ruleset: Ruleset) -> f32 {
    0.0
}

fn no_protection(_level: u8, _category: DamageCategory) -> i32 {
    0
}

fn sharpness_damage(level: u8, _group: EntityGroup, ruleset: Ruleset) -> f32 {
    if level == 0 {
        return 0.0;
    }
    match ruleset {
        Ruleset::Legacy => f32::from(level) * 1.25,
        Ruleset::Current => 1.0 + f32::from(level - 1) * 0.5,
    }
}

fn smite_damage(level: u8, group: EntityGroup, _ruleset: Ruleset) -> f32 {
    if group == EntityGroup::Undead {
        f32::from(level) * 2.5
    } else {
        0.0
    }
}

fn bane_of_arthropods_damage(level: u8, group: EntityGroup, _ruleset: Ruleset) -> f32 {
    if group == EntityGroup::Arthropod {
        f32::from(level) * 2.5
    } else {
        0.0
    }
}

fn impaling_damage(level: u8, group: EntityGroup, ruleset: Ruleset) -> f32 {
    if group == EntityGroup::Aquatic && !ruleset.is_legacy() {
        f32::from(level) * 2.5
    } else {
        0.0
    }
}

fn protection_points(level: u8, category: DamageCategory) -> i32 {
    if category.is_out_of_world() {
        0
    } else {
        i32::from(level)
    }
}

fn fire_protection_points(level: u8, category: DamageCategory) -> i32 {
    if category.is_fire() {
        i32::from(level) * 2
    } else {
        0
    }
}

fn blast_protection_points(level: u8, category: DamageCategory) -> i32 {
    if category.is_explosion() {
        i32::from(level) * 2
    } else {
        0
    }
}

fn projectile_protection_points(level: u8, category: DamageCategory) -> i32 {
    if category.is_projectile() {
        i32::from(level) * 2
    } else {
        0
    }
}

fn feather_falling_points(level: u8, category: DamageCategory) -> i32 {
    if category.is_fall() {
        i32::from(level) * 3
    } else {
        0
    }
}

fn thorns_reaction(
    ctx: &ReactionContext<'_>,
    level: u8,
    rng: &mut dyn RngCore,
    out: &mut Vec<Reaction>,
) {
    let piece = pick_random_slot(ctx.registry, ctx.user_equipment, EnchantmentKind::Thorns, rng);
    let procs = level > 0 && rng.gen::<f32>() < 0.15 * f32::from(level);
    if procs {
        if let Some(attacker) = ctx.other {
            let amount = if level > THORNS_FIXED_DAMAGE_THRESHOLD {
                f32::from(level - THORNS_FIXED_DAMAGE_THRESHOLD)
            } else {
                1.0 + rng.gen_range(0..4) as f32
            };
            out.push(Reaction::DamageEntity {
                target: attacker,
                source: ctx.user,
                category: DamageCategory::Thorns,
                amount,
            });
        }
    }
    let wear = match (ctx.ruleset, procs) {
        (Ruleset::Current, true) => 2,
        (Ruleset::Current, false) => 0,
        (Ruleset::Legacy, true) => 3,
        (Ruleset::Legacy, false) => 1,
    };
    if let (Some(slot), true) = (piece, wear > 0) {
        out.push(Reaction::DamageItem {
            owner: ctx.user,
            slot,
            amount: wear,
        });
    }
}

fn bane_of_arthropods_reaction(
    ctx: &ReactionContext<'_>,
    level: u8,
    rng: &mut dyn RngCore,
    out: &mut Vec<Reaction>,
) {
    let Some(target) = ctx.other else { return };
    if level == 0 || ctx.other_group != Some(EntityGroup::Arthropod) {
        return;
    }
    let ticks = 20 + rng.gen_range(0..10 * u32::from(level));
    out.push(Reaction::ApplyEffect {
        target,
        effect: StatusEffect::ticks(EffectKind::Slowness, 3, ticks),
    });
}

fn unbreaking_skips_damage(level: u8, stack: &ItemStack, rng: &mut dyn RngCore) -> bool {
    if stack.material().armor().is_some() && rng.gen::<f32>() < UNBREAKING_ARMOR_IGNORE_CHANCE {
        return false;
    }
    rng.gen_range(0..=level) > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ArmorMaterial, ArmorPiece, Material};
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn thorns_chest(level: u8) -> Equipment {
        Equipment::new().with(
            EquipmentSlot::Chestplate,
            ItemStack::of(Material::Armor(ArmorMaterial::Iron, ArmorPiece::Chestplate))
                .with_enchantment(EnchantmentKind::Thorns, level),
        )
    }

    fn context<'a>(
        registry: &'a EnchantmentRegistry,
        equipment: &'a Equipment,
        ruleset: Ruleset,
        other: Option<EntityId>,
    ) -> ReactionContext<'a> {
        ReactionContext {
            registry,
            user: EntityId::from_u128(1),
            user_equipment: equipment,
            other,
            other_group: Some(EntityGroup::Arthropod),
            ruleset,
        }
    }

    #[test]
    fn test_vanilla_registers_every_kind() {
        assert_eq!(EnchantmentRegistry::vanilla().len(), 20);
        assert!(EnchantmentRegistry::empty().is_empty());
    }

    #[test]
    fn test_sharpness_by_ruleset() {
        assert_eq!(sharpness_damage(1, EntityGroup::Default, Ruleset::Current), 1.0);
        assert_eq!(sharpness_damage(5, EntityGroup::Default, Ruleset::Current), 3.0);
        assert_eq!(sharpness_damage(4, EntityGroup::Default, Ruleset::Legacy), 5.0);
    }

    #[test]
    fn test_group_bonuses() {
        assert_eq!(smite_damage(2, EntityGroup::Undead, Ruleset::Current), 5.0);
        assert_eq!(smite_damage(2, EntityGroup::Default, Ruleset::Current), 0.0);
        assert_eq!(bane_of_arthropods_damage(1, EntityGroup::Arthropod, Ruleset::Legacy), 2.5);
        assert_eq!(impaling_damage(2, EntityGroup::Aquatic, Ruleset::Current), 5.0);
        assert_eq!(impaling_damage(2, EntityGroup::Aquatic, Ruleset::Legacy), 0.0);
    }

    #[test]
    fn test_protection_points_by_category() {
        assert_eq!(protection_points(4, DamageCategory::Melee), 4);
        assert_eq!(protection_points(4, DamageCategory::Void), 0);
        assert_eq!(fire_protection_points(3, DamageCategory::Lava), 6);
        assert_eq!(fire_protection_points(3, DamageCategory::Melee), 0);
        assert_eq!(projectile_protection_points(2, DamageCategory::Trident), 4);
        assert_eq!(feather_falling_points(4, DamageCategory::Fall), 12);
    }

    #[test]
    fn test_thorns_proc_damages_attacker_and_armor() {
        let registry = EnchantmentRegistry::vanilla();
        let equipment = thorns_chest(3);
        let attacker = EntityId::from_u128(2);
        let ctx = context(&registry, &equipment, Ruleset::Current, Some(attacker));
        // An all-zero source always procs and rolls the minimum
        let mut rng = StepRng::new(0, 0);
        let mut out = Vec::new();
        thorns_reaction(&ctx, 3, &mut rng, &mut out);
        assert_eq!(
            out,
            vec![
                Reaction::DamageEntity {
                    target: attacker,
                    source: ctx.user,
                    category: DamageCategory::Thorns,
                    amount: 1.0,
                },
                Reaction::DamageItem {
                    owner: ctx.user,
                    slot: EquipmentSlot::Chestplate,
                    amount: 2,
                },
            ]
        );
    }

    #[test]
    fn test_high_level_thorns_deal_fixed_damage() {
        let registry = EnchantmentRegistry::vanilla();
        let equipment = thorns_chest(15);
        let ctx = context(&registry, &equipment, Ruleset::Legacy, Some(EntityId::from_u128(2)));
        let mut out = Vec::new();
        thorns_reaction(&ctx, 15, &mut StepRng::new(0, 0), &mut out);
        assert!(matches!(out[0], Reaction::DamageEntity { amount, .. } if amount == 5.0));
        assert!(matches!(out[1], Reaction::DamageItem { amount: 3, .. }));
    }

    #[test]
    fn test_thorns_proc_rate_scales_with_level() {
        let registry = EnchantmentRegistry::vanilla();
        let equipment = thorns_chest(2);
        let ctx = context(&registry, &equipment, Ruleset::Legacy, Some(EntityId::from_u128(2)));
        let mut rng = StdRng::seed_from_u64(7);
        let mut procs = 0;
        let mut light_wear = 0;
        for _ in 0..2000 {
            let mut out = Vec::new();
            thorns_reaction(&ctx, 2, &mut rng, &mut out);
            if out.iter().any(|r| matches!(r, Reaction::DamageEntity { .. })) {
                procs += 1;
            }
            if out.iter().any(|r| matches!(r, Reaction::DamageItem { amount: 1, .. })) {
                light_wear += 1;
            }
        }
        // 30% expected
        assert!((450..750).contains(&procs), "procs = {procs}");
        assert_eq!(procs + light_wear, 2000);
    }

    #[test]
    fn test_bane_slows_arthropods_only() {
        let registry = EnchantmentRegistry::vanilla();
        let equipment = Equipment::new();
        let target = EntityId::from_u128(3);
        let mut ctx = context(&registry, &equipment, Ruleset::Current, Some(target));
        let mut out = Vec::new();
        bane_of_arthropods_reaction(&ctx, 2, &mut StepRng::new(0, 0), &mut out);
        assert_eq!(
            out,
            vec![Reaction::ApplyEffect {
                target,
                effect: StatusEffect::ticks(EffectKind::Slowness, 3, 20),
            }]
        );

        ctx.other_group = Some(EntityGroup::Undead);
        out.clear();
        bane_of_arthropods_reaction(&ctx, 2, &mut StepRng::new(0, 0), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_unbreaking_skips_with_zero_rolls_on_tools() {
        let sword = ItemStack::of(Material::Sword(crate::item::ToolTier::Iron));
        // Zero roll means the point is taken
        assert!(!unbreaking_skips_damage(3, &sword, &mut StepRng::new(0, 0)));
        let mut rng = StdRng::seed_from_u64(1);
        let skipped = (0..1000)
            .filter(|_| unbreaking_skips_damage(3, &sword, &mut rng))
            .count();
        // 3 in 4 expected
        assert!((650..850).contains(&skipped), "skipped = {skipped}");
    }

    #[test]
    fn test_register_replaces_behavior() {
        let mut registry = EnchantmentRegistry::vanilla();
        let previous = registry.register(
            EnchantmentKind::Sharpness,
            EnchantmentBehavior::inert(MAIN_HAND),
        );
        assert!(previous.is_some());
        let behavior = registry.get(EnchantmentKind::Sharpness).unwrap();
        assert_eq!((behavior.attack_damage)(5, EntityGroup::Default, Ruleset::Current), 0.0);
    }
}
