//! The damage pipeline
//!
//! Steps, in order:
//! 1. drop hits inside the defender's invulnerability window
//! 2. fold attack-side potion effects and weapon enchantments into the amount
//! 3. raised shield
//! 4. armor, then enchantment protection
//! 5. Resistance
//! 6. knockback
//! 7. post-hit effects: fire aspect, durability, enchantment reactions,
//!    sweeping edge
//! 8. invulnerability window, health, death
//!
//! Equipment-derived values are read once, before anything is mutated.

use rand::{Rng, RngCore};
use tracing::{debug, info, trace, warn};

use pvp_core::{CombatConfig, DVec3, EntityId, Ruleset};

use super::armor::{apply_armor, apply_protection, apply_resistance};
use super::knockback::{apply_knockback, knockback_vector, shield_knockback, KnockbackParams};
use super::{DamageCategory, DamageOutcome, DamageRequest};
use crate::durability::{BrokenItem, ItemDamage};
use crate::enchantment::{
    attack_damage_bonus, dispatch_target_damaged, dispatch_user_damaged,
    equipment_enchantment_level, explosion_knockback, protection_amount, EnchantmentKind,
    EnchantmentRegistry, Reaction,
};
use crate::entity::{EntityRegistry, EquipmentSlot, LivingEntity};
use crate::error::{CombatError, InvalidRequest};
use crate::item::Material;
use crate::potion::{EffectKind, StatusEffect};
use crate::world::Cue;

/// Fire Aspect burn time per level
const FIRE_ASPECT_TICKS_PER_LEVEL: u32 = 80;
/// How long an axe disables a shield
const SHIELD_DISABLE_TICKS: u32 = 100;
const SHIELD_DISABLE_BASE_CHANCE: f32 = 0.25;
const SHIELD_DISABLE_CHANCE_PER_EFFICIENCY: f32 = 0.05;
const SHIELD_DISABLE_SPRINT_BONUS: f32 = 0.75;
/// Blocked hits below this do not wear the shield
const SHIELD_WEAR_THRESHOLD: f32 = 3.0;
/// Sweep hits land within this horizontal reach of the defender
const SWEEP_HORIZONTAL_REACH: f64 = 1.0;
const SWEEP_VERTICAL_REACH: f64 = 0.25;
/// Squared distance from the attacker a sweep can reach
const SWEEP_MAX_DISTANCE_SQ: f64 = 9.0;
const DEFENDER_EXHAUSTION: f32 = 0.1;
const ATTACK_EXHAUSTION: f32 = 0.1;
const LEGACY_ATTACK_EXHAUSTION: f32 = 0.3;

/// Everything the pipeline needs besides the entities
pub struct CombatContext<'a> {
    pub config: &'a CombatConfig,
    pub enchantments: &'a EnchantmentRegistry,
    pub item_damage: &'a dyn ItemDamage,
    pub rng: &'a mut dyn RngCore,
    /// Presentation cues produced so far
    pub cues: &'a mut Vec<Cue>,
}

impl CombatContext<'_> {
    pub(crate) fn ruleset(&self) -> Ruleset {
        self.config.ruleset
    }

    pub(crate) fn cue(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    fn report_broken(&mut self, broken: BrokenItem) {
        self.cue(Cue::ItemBroken {
            owner: broken.owner,
            slot: broken.slot,
            material: broken.material,
        });
    }

    /// Take durability from an equipped item, if equipment damage is on
    pub(crate) fn wear_item(&mut self, entity: &mut LivingEntity, slot: EquipmentSlot, amount: u32) {
        if !self.config.equipment_damage_enabled {
            return;
        }
        if let Some(broken) =
            self.item_damage
                .damage_equipment(self.enchantments, entity, slot, amount, &mut *self.rng)
        {
            self.report_broken(broken);
        }
    }

    fn wear_armor(&mut self, entity: &mut LivingEntity, category: DamageCategory, damage: f32) {
        if !self.config.equipment_damage_enabled {
            return;
        }
        let broken =
            self.item_damage
                .damage_armor(self.enchantments, entity, category, damage, &mut *self.rng);
        for item in broken {
            self.report_broken(item);
        }
    }
}

/// Equipment-derived values of the defender, read before any mutation
struct DefenderSnapshot {
    armor: f32,
    toughness: f32,
    protection: i32,
    knockback_resistance: f32,
    blast_protected_knockback: f64,
}

/// What a raised shield did to the hit
#[derive(Default)]
struct ShieldBlock {
    blocked: bool,
    disabled: bool,
    amount: f32,
    attacker_push: DVec3,
}

/// Resolve one hit against the entities in `entities`.
///
/// A request with a negative or non-finite amount, or whose defender is
/// missing or removed, is rejected before anything is mutated. An attacker
/// that no longer resolves is treated as absent.
pub fn resolve_damage(
    ctx: &mut CombatContext<'_>,
    entities: &mut EntityRegistry,
    request: &DamageRequest,
) -> Result<DamageOutcome, CombatError> {
    if let Err(invalid) = validate(entities, request) {
        warn!(defender = %request.defender, error = %invalid, "Rejected damage request");
        return Err(invalid.into());
    }

    let attacker = request.attacker.and_then(|id| {
        let resolved = entities.resolve(id).cloned();
        if resolved.is_none() {
            debug!(attacker = %id, "Attacker does not resolve, hit is unattributed");
        }
        resolved
    });
    let origin = request
        .source_position
        .or_else(|| attacker.as_ref().map(|a| a.position));
    let category = request.category;
    let ruleset = ctx.ruleset();

    let defender = entities
        .resolve_mut(request.defender)
        .ok_or(InvalidRequest::DefenderMissing(request.defender))?;

    if let Some(reason) = ignore_reason(ctx.config, defender, category, request.follow_up) {
        trace!(defender = %defender.id, reason, "Hit ignored");
        return Ok(DamageOutcome::ignored());
    }

    let snapshot = DefenderSnapshot {
        armor: defender.armor(),
        toughness: defender.armor_toughness(),
        protection: protection_amount(ctx.enchantments, &defender.equipment, category),
        knockback_resistance: defender.knockback_resistance(),
        blast_protected_knockback: explosion_knockback(ctx.enchantments, &defender.equipment, 1.0),
    };

    // Attack side
    let mut amount = request.raw_amount;
    if category == DamageCategory::Melee {
        if let Some(attacker) = &attacker {
            amount = attack_potion_modifiers(amount, attacker, ruleset);
            amount += attack_damage_bonus(
                ctx.enchantments,
                &attacker.equipment.main_hand,
                defender.group,
                ruleset,
            );
        }
    }

    let pre_shield = amount;
    let shield = try_block(ctx, defender, attacker.as_ref(), category, origin, amount);
    let worn_amount = shield.amount;
    amount = shield.amount;

    if ctx.config.armor_enabled {
        if !category.bypasses_armor() {
            amount = apply_armor(amount, snapshot.armor, snapshot.toughness, ruleset);
        }
        amount = apply_protection(amount, snapshot.protection);
    }
    if !category.is_out_of_world() {
        if let Some(amplifier) = defender.effects.amplifier(EffectKind::Resistance) {
            amount = apply_resistance(amount, amplifier);
        }
    }
    let amount = amount.max(0.0);
    let landed = !(shield.blocked && amount <= 0.0);

    // Knockback
    let melee_hit = category == DamageCategory::Melee && landed;
    let sprint_hit = melee_hit && attacker.as_ref().is_some_and(|a| a.sprinting);
    let knockback = match origin.filter(|_| !request.follow_up) {
        Some(origin) => {
            let levels = if melee_hit {
                let enchanted = attacker.as_ref().map_or(0, |a| {
                    equipment_enchantment_level(ctx.enchantments, &a.equipment, EnchantmentKind::Knockback)
                });
                u32::from(enchanted) + u32::from(sprint_hit)
            } else {
                0
            };
            let mut knockback = knockback_vector(KnockbackParams {
                origin,
                target: defender.position,
                levels,
                resistance: snapshot.knockback_resistance,
                legacy: ctx.config.legacy_knockback,
                sneaking: defender.sneaking,
            });
            if category.is_explosion() {
                knockback *= snapshot.blast_protected_knockback;
            }
            knockback
        }
        None => DVec3::ZERO,
    };
    if knockback != DVec3::ZERO {
        defender.velocity =
            apply_knockback(defender.velocity, knockback, ctx.config.legacy_knockback);
    }

    // Post-hit effects on the defender
    if landed {
        if category == DamageCategory::Melee {
            if let Some(attacker) = &attacker {
                let fire_aspect = equipment_enchantment_level(
                    ctx.enchantments,
                    &attacker.equipment,
                    EnchantmentKind::FireAspect,
                );
                if fire_aspect > 0 {
                    defender.ignite(FIRE_ASPECT_TICKS_PER_LEVEL * u32::from(fire_aspect));
                }
            }
        }
        if ctx.config.armor_enabled && !category.bypasses_armor() {
            ctx.wear_armor(defender, category, worn_amount);
        }
    }
    if shield.blocked && pre_shield >= SHIELD_WEAR_THRESHOLD {
        let wear = 1 + pre_shield.floor() as u32;
        if let Some(slot) = defender.equipment.holds(|stack| stack.material() == Material::Shield) {
            ctx.wear_item(defender, slot, wear);
        }
    }
    if ctx.config.exhaustion_enabled && !category.bypasses_armor() && amount > 0.0 {
        defender.add_exhaustion(DEFENDER_EXHAUSTION);
    }

    // Health
    defender.invulnerable_ticks = ctx.config.invulnerability_ticks;
    let was_alive = defender.is_alive();
    let absorbed = defender.take_damage(amount);
    let lethal = was_alive && defender.dead;
    let defender_id = defender.id;
    if landed {
        ctx.cue(Cue::Hurt {
            entity: defender_id,
            category,
        });
    }

    let outcome = DamageOutcome {
        final_amount: amount,
        absorbed,
        knockback,
        lethal,
        blocked: shield.blocked,
        shield_disabled: shield.disabled,
        ignored: false,
    };

    // Attacker side
    if let Some(attacker_id) = attacker.as_ref().map(|a| a.id) {
        if let Some(attacker) = entities.resolve_mut(attacker_id) {
            if shield.attacker_push != DVec3::ZERO {
                attacker.velocity += shield.attacker_push;
            }
            if category == DamageCategory::Melee {
                if ctx.config.exhaustion_enabled {
                    attacker.add_exhaustion(match ruleset {
                        Ruleset::Legacy => LEGACY_ATTACK_EXHAUSTION,
                        Ruleset::Current => ATTACK_EXHAUSTION,
                    });
                }
                if sprint_hit {
                    attacker.sprinting = false;
                }
                if landed {
                    let cost = attacker.equipment.main_hand.material().attack_durability_cost();
                    if cost > 0 {
                        ctx.wear_item(attacker, EquipmentSlot::MainHand, cost);
                    }
                }
            }
        }
    }

    if landed && category.dispatches_reactions() {
        run_reactions(ctx, entities, defender_id, attacker.as_ref().map(|a| a.id));
    }

    if melee_hit {
        if let Some(attacker) = &attacker {
            sweep(ctx, entities, attacker, defender_id, request.raw_amount);
        }
    }

    if lethal {
        info!(entity = %defender_id, cause = category.name(), "Entity died");
        ctx.cue(Cue::Death {
            entity: defender_id,
        });
    }
    Ok(outcome)
}

fn validate(entities: &EntityRegistry, request: &DamageRequest) -> Result<(), InvalidRequest> {
    if !request.raw_amount.is_finite() {
        return Err(InvalidRequest::NonFiniteAmount);
    }
    if request.raw_amount < 0.0 {
        return Err(InvalidRequest::NegativeAmount(request.raw_amount));
    }
    match entities.get(request.defender) {
        None => Err(InvalidRequest::DefenderMissing(request.defender)),
        Some(defender) if defender.removed => Err(InvalidRequest::DefenderRemoved(request.defender)),
        Some(_) => Ok(()),
    }
}

/// Why a hit has no effect at all, if it has none
fn ignore_reason(
    config: &CombatConfig,
    defender: &LivingEntity,
    category: DamageCategory,
    follow_up: bool,
) -> Option<&'static str> {
    if defender.dead {
        return Some("defender is dead");
    }
    if defender.game_mode.is_damage_immune() && !category.is_out_of_world() {
        return Some("defender is immune");
    }
    if category.is_fall() && !config.fall_damage_enabled {
        return Some("fall damage is disabled");
    }
    if defender.invulnerable_ticks > 0 && !category.bypasses_invulnerability() && !follow_up {
        return Some("defender is invulnerable");
    }
    if category.is_fire() && defender.effects.has_effect(EffectKind::FireResistance) {
        return Some("defender resists fire");
    }
    None
}

/// Strength and Weakness on the attacker
fn attack_potion_modifiers(amount: f32, attacker: &LivingEntity, ruleset: Ruleset) -> f32 {
    let level = |kind| attacker.effects.get(kind).map_or(0.0, |e| e.level() as f32);
    let strength = level(EffectKind::Strength);
    let weakness = level(EffectKind::Weakness);
    let modified = match ruleset {
        Ruleset::Current => amount + 3.0 * strength - 4.0 * weakness,
        Ruleset::Legacy => (amount - 0.5 * weakness) * (1.0 + 1.3 * strength),
    };
    modified.max(0.0)
}

fn try_block(
    ctx: &mut CombatContext<'_>,
    defender: &mut LivingEntity,
    attacker: Option<&LivingEntity>,
    category: DamageCategory,
    origin: Option<DVec3>,
    amount: f32,
) -> ShieldBlock {
    let unblocked = ShieldBlock {
        amount,
        ..ShieldBlock::default()
    };
    if !ctx.config.shield_enabled
        || !defender.blocking
        || defender.shield_cooldown > 0
        || !category.is_blockable()
        || amount <= 0.0
    {
        return unblocked;
    }
    if defender
        .equipment
        .holds(|stack| stack.material() == Material::Shield)
        .is_none()
    {
        return unblocked;
    }
    let Some(origin) = origin else {
        return unblocked;
    };
    let to_source = DVec3::new(origin.x - defender.position.x, 0.0, origin.z - defender.position.z);
    if defender.facing.dot(to_source) <= 0.0 {
        return unblocked;
    }

    ctx.cue(Cue::ShieldBlock { entity: defender.id });
    if ctx.config.legacy_shield_mechanics {
        return ShieldBlock {
            blocked: true,
            amount: (1.0 + amount) * 0.5,
            ..ShieldBlock::default()
        };
    }

    let mut block = ShieldBlock {
        blocked: true,
        amount: 0.0,
        ..ShieldBlock::default()
    };
    if let Some(attacker) = attacker.filter(|_| !category.is_projectile()) {
        block.attacker_push = shield_knockback(
            defender.position,
            attacker.position,
            attacker.knockback_resistance(),
        );
        if attacker.equipment.main_hand.material().is_axe() {
            let efficiency = equipment_enchantment_level(
                ctx.enchantments,
                &attacker.equipment,
                EnchantmentKind::Efficiency,
            );
            let mut chance =
                SHIELD_DISABLE_BASE_CHANCE + SHIELD_DISABLE_CHANCE_PER_EFFICIENCY * f32::from(efficiency);
            if attacker.sprinting {
                chance += SHIELD_DISABLE_SPRINT_BONUS;
            }
            if ctx.rng.gen::<f32>() < chance {
                debug!(defender = %defender.id, attacker = %attacker.id, "Shield disabled");
                defender.shield_cooldown = SHIELD_DISABLE_TICKS;
                defender.blocking = false;
                block.disabled = true;
                ctx.cue(Cue::ShieldDisabled { entity: defender.id });
            }
        }
    }
    block
}

/// Dispatch both parties' enchantment reactions and carry them out
fn run_reactions(
    ctx: &mut CombatContext<'_>,
    entities: &mut EntityRegistry,
    defender_id: EntityId,
    attacker_id: Option<EntityId>,
) {
    let ruleset = ctx.ruleset();
    let mut reactions = Vec::new();
    if let Some(defender) = entities.resolve(defender_id) {
        let attacker = attacker_id.and_then(|id| entities.resolve(id));
        reactions.extend(dispatch_user_damaged(
            ctx.enchantments,
            defender,
            attacker,
            ruleset,
            &mut *ctx.rng,
        ));
        if let Some(attacker) = attacker {
            reactions.extend(dispatch_target_damaged(
                ctx.enchantments,
                attacker,
                Some(defender),
                ruleset,
                &mut *ctx.rng,
            ));
        }
    }

    for reaction in reactions {
        match reaction {
            Reaction::DamageEntity {
                target,
                source,
                category,
                amount,
            } => {
                debug!(entity = %target, source = %source, amount, "Reflected damage");
                let request = DamageRequest::new(category, amount, target).with_attacker(source);
                if let Err(error) = resolve_damage(ctx, entities, &request) {
                    debug!(%error, "Reflected damage dropped");
                }
            }
            Reaction::ApplyEffect { target, effect } => {
                deliver_effect(ctx, entities, target, effect, 1.0, attacker_id);
            }
            Reaction::DamageItem {
                owner,
                slot,
                amount,
            } => {
                if let Some(entity) = entities.resolve_mut(owner) {
                    ctx.wear_item(entity, slot, amount);
                }
            }
        }
    }
}

/// Give `target` an effect carried by a hit that already landed, such as an
/// arrow's potion payload or an enchantment reaction.
///
/// Instant harm becomes a follow-up [`DamageCategory::Magic`] hit, credited
/// to `source` while it still resolves. Returns the outcome of that hit.
pub fn deliver_effect(
    ctx: &mut CombatContext<'_>,
    entities: &mut EntityRegistry,
    target: EntityId,
    effect: StatusEffect,
    potency: f64,
    source: Option<EntityId>,
) -> Option<DamageOutcome> {
    let entity = entities.resolve_mut(target).filter(|entity| entity.is_alive())?;
    let harm = entity.instant_harm(&effect, potency);
    entity.add_effect(effect, potency);
    let harm = harm?;

    let mut request = DamageRequest::new(DamageCategory::Magic, harm, target).as_follow_up();
    if let Some(source) = source.filter(|&id| entities.resolve(id).is_some()) {
        request = request.with_attacker(source);
    }
    match resolve_damage(ctx, entities, &request) {
        Ok(outcome) => Some(outcome),
        Err(error) => {
            debug!(%error, "Instant harm dropped");
            None
        }
    }
}

/// Sweeping edge: hit everything next to the defender
fn sweep(
    ctx: &mut CombatContext<'_>,
    entities: &mut EntityRegistry,
    attacker: &LivingEntity,
    defender_id: EntityId,
    base_damage: f32,
) {
    if ctx.config.is_legacy()
        || !ctx.config.sweeping_enabled
        || attacker.sprinting
        || !attacker.on_ground
        || !attacker.equipment.main_hand.material().is_sword()
    {
        return;
    }
    let Some((area_min, area_max)) = entities.resolve(defender_id).map(|defender| {
        let (min, max) = defender.bounding_box();
        let reach = DVec3::new(SWEEP_HORIZONTAL_REACH, SWEEP_VERTICAL_REACH, SWEEP_HORIZONTAL_REACH);
        (min - reach, max + reach)
    }) else {
        return;
    };

    let targets: Vec<EntityId> = entities
        .alive_ids()
        .into_iter()
        .filter(|&id| id != attacker.id && id != defender_id)
        .filter(|&id| {
            entities.resolve(id).is_some_and(|candidate| {
                let (min, max) = candidate.bounding_box();
                boxes_overlap(area_min, area_max, min, max)
                    && candidate.position.distance_squared(attacker.position) < SWEEP_MAX_DISTANCE_SQ
            })
        })
        .collect();

    let level = equipment_enchantment_level(ctx.enchantments, &attacker.equipment, EnchantmentKind::Sweeping);
    let ratio = f32::from(level) / (f32::from(level) + 1.0);
    let amount = 1.0 + ratio * base_damage;

    for target in targets {
        let request =
            DamageRequest::new(DamageCategory::SweepingEdge, amount, target).with_attacker(attacker.id);
        if let Err(error) = resolve_damage(ctx, entities, &request) {
            debug!(%error, "Sweep hit dropped");
        }
    }
    ctx.cue(Cue::SweepParticles {
        attacker: attacker.id,
    });
}

fn boxes_overlap(a_min: DVec3, a_max: DVec3, b_min: DVec3, b_max: DVec3) -> bool {
    a_min.x < b_max.x
        && a_max.x > b_min.x
        && a_min.y < b_max.y
        && a_max.y > b_min.y
        && a_min.z < b_max.z
        && a_max.z > b_min.z
}
