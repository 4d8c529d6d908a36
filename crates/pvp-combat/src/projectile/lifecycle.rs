//! Per-tick projectile state machine
//!
//! ```text
//! Flying ──block──▶ Stuck ──timeout──▶ Removed
//!   │                 │ ▲
//!   │ entity          │ └── lodged trident
//!   ▼                 ▼
//! Removed        PickedUp / Returning (loyalty) ──▶ PickedUp
//! ```

use rand::Rng;
use tracing::{debug, trace};

use pvp_core::{DVec3, EntityId};

use super::arrow::{self, ArrowImpact};
use super::physics::{apply_drag_and_gravity, raycast_blocks, segment_box_entry, HIT_BOX_MARGIN};
use super::{
    trident, PickupPolicy, Projectile, ProjectileEvent, ProjectileKind, ProjectileState,
    ProjectileTickResult, RemovalReason, DESPAWN_STUCK_TICKS,
};
use crate::damage::CombatContext;
use crate::entity::EntityRegistry;
use crate::world::{BlockWorld, Cue};

/// Stuck arrows lose their potion effects after this many ticks
pub const EFFECT_CLEAR_TICKS: u32 = 600;
/// The shooter cannot be hit by its own projectile this early
const SHOOTER_GRACE_TICKS: u32 = 5;
/// Per-axis velocity kept when a projectile loses its supporting block
const DISLODGE_SPEED: f64 = 0.2;

/// Advance a projectile by a wall-clock delta, one step per whole tick
pub fn advance(
    ctx: &mut CombatContext<'_>,
    projectile: &mut Projectile,
    entities: &mut EntityRegistry,
    world: &dyn BlockWorld,
    tick_delta_ms: u64,
) -> ProjectileTickResult {
    let ticks = projectile.clock.advance(tick_delta_ms);
    let mut events = Vec::new();
    for _ in 0..ticks {
        if projectile.state.is_terminal() {
            break;
        }
        step(ctx, projectile, entities, world, &mut events);
    }
    ProjectileTickResult {
        state: projectile.state,
        ticks,
        events,
    }
}

/// Run a single tick
pub fn step(
    ctx: &mut CombatContext<'_>,
    projectile: &mut Projectile,
    entities: &mut EntityRegistry,
    world: &dyn BlockWorld,
    events: &mut Vec<ProjectileEvent>,
) {
    if projectile.state.is_terminal() {
        return;
    }
    projectile.age += 1;

    if projectile.is_trident() && trident::tick_loyalty(ctx, projectile, entities, events) {
        // Homing ignores every collision
        projectile.position += projectile.velocity;
        return;
    }

    match projectile.state {
        ProjectileState::Flying => fly(ctx, projectile, entities, world, events),
        ProjectileState::Stuck => stay_stuck(ctx, projectile, world, events),
        ProjectileState::Returning | ProjectileState::PickedUp | ProjectileState::Removed(_) => {}
    }
}

fn fly(
    ctx: &mut CombatContext<'_>,
    projectile: &mut Projectile,
    entities: &mut EntityRegistry,
    world: &dyn BlockWorld,
    events: &mut Vec<ProjectileEvent>,
) {
    let start = projectile.position;
    let end = start + projectile.velocity;
    let block_hit = raycast_blocks(world, start, end);
    let limit = block_hit.map_or(1.0, |hit| hit.fraction);

    if let Some((target, fraction)) = nearest_target(projectile, entities, start, end, limit) {
        projectile.position = start + (end - start) * fraction;
        let handled = match &projectile.kind {
            ProjectileKind::Arrow(data) => {
                let data = data.clone();
                !matches!(
                    arrow::hit_entity(ctx, projectile, &data, entities, target, start, events),
                    ArrowImpact::Missed
                )
            }
            ProjectileKind::Trident(_) => {
                trident::hit_entity(ctx, projectile, entities, target, start, events)
            }
        };
        if handled {
            return;
        }
        projectile.position = start;
    }

    if let Some(hit) = block_hit {
        trace!(projectile = %projectile.id, block = ?hit.block, "Projectile stuck");
        projectile.position = hit.position;
        projectile.velocity = DVec3::ZERO;
        projectile.stick(Some(hit.block));
        match &mut projectile.kind {
            ProjectileKind::Arrow(data) => {
                data.critical = false;
                ctx.cue(Cue::ArrowHitBlock {
                    position: hit.position,
                });
            }
            ProjectileKind::Trident(_) => ctx.cue(Cue::TridentHitBlock {
                position: hit.position,
            }),
        }
        events.push(ProjectileEvent::HitBlock {
            block: hit.block,
            position: hit.position,
        });
        return;
    }

    projectile.position = end;
    projectile.velocity = apply_drag_and_gravity(projectile.velocity);
    if matches!(&projectile.kind, ProjectileKind::Arrow(data) if data.critical) {
        ctx.cue(Cue::CriticalTrail { position: end });
    }
}

/// Closest living entity the segment enters before `limit`
fn nearest_target(
    projectile: &Projectile,
    entities: &EntityRegistry,
    start: DVec3,
    end: DVec3,
    limit: f64,
) -> Option<(EntityId, f64)> {
    if projectile.is_trident() && projectile.has_dealt_damage {
        return None;
    }
    let margin = DVec3::splat(HIT_BOX_MARGIN);
    entities
        .alive_ids()
        .into_iter()
        .filter(|&id| !(projectile.shooter == Some(id) && projectile.age <= SHOOTER_GRACE_TICKS))
        .filter_map(|id| {
            let entity = entities.resolve(id)?;
            if entity.is_spectator() {
                return None;
            }
            let (min, max) = entity.bounding_box();
            let (min, max) = (min - margin, max + margin);
            // Already inside the box: the hit happened or never will
            if start.cmpge(min).all() && start.cmple(max).all() {
                return None;
            }
            segment_box_entry(start, end, min, max)
                .filter(|&fraction| fraction <= limit)
                .map(|fraction| (id, fraction))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

fn stay_stuck(
    ctx: &mut CombatContext<'_>,
    projectile: &mut Projectile,
    world: &dyn BlockWorld,
    events: &mut Vec<ProjectileEvent>,
) {
    match projectile.stuck_in {
        // Lodged after an entity hit: drop from there
        None => {
            projectile.state = ProjectileState::Flying;
            return;
        }
        Some(block) if !world.is_solid(block) => {
            debug!(projectile = %projectile.id, "Projectile dislodged");
            let rng = &mut *ctx.rng;
            let scale = DVec3::new(
                rng.gen::<f64>() * DISLODGE_SPEED,
                rng.gen::<f64>() * DISLODGE_SPEED,
                rng.gen::<f64>() * DISLODGE_SPEED,
            );
            projectile.velocity *= scale;
            projectile.state = ProjectileState::Flying;
            projectile.stuck_in = None;
            projectile.stuck_ticks = 0;
            events.push(ProjectileEvent::Dislodged);
            return;
        }
        Some(_) => {}
    }

    projectile.stuck_ticks += 1;
    let stuck_ticks = projectile.stuck_ticks;
    if let ProjectileKind::Arrow(data) = &mut projectile.kind {
        // Only custom effects wear off; a plain potion type stays for good
        if stuck_ticks >= EFFECT_CLEAR_TICKS && !data.carrier.custom_effects().is_empty() {
            trace!(projectile = %projectile.id, "Arrow effects wore off");
            data.carrier.clear();
            events.push(ProjectileEvent::EffectsCleared);
        }
    }
    if stuck_ticks >= DESPAWN_STUCK_TICKS && projectile.despawns() {
        trace!(projectile = %projectile.id, "Projectile despawned");
        projectile.remove(RemovalReason::Despawned, events);
    }
}

/// Let `actor` pick the projectile up.
///
/// Stuck projectiles follow their [`PickupPolicy`]; a returning trident can
/// only be caught by its owner. Only [`PickupPolicy::Allowed`] hands an item
/// over. Reach is the caller's concern.
pub fn pickup(
    ctx: &mut CombatContext<'_>,
    projectile: &mut Projectile,
    actor: EntityId,
    entities: &mut EntityRegistry,
) -> bool {
    let Some(entity) = entities.resolve_mut(actor) else {
        return false;
    };
    if !entity.is_alive() || entity.is_spectator() {
        return false;
    }

    let granted = match projectile.state {
        ProjectileState::Stuck => projectile.pickup.permits(entity.game_mode),
        ProjectileState::Returning => projectile.shooter == Some(actor),
        ProjectileState::Flying | ProjectileState::PickedUp | ProjectileState::Removed(_) => false,
    };
    if !granted {
        return false;
    }

    if projectile.pickup == PickupPolicy::Allowed {
        entity.give(projectile.pickup_item());
    }
    projectile.state = ProjectileState::PickedUp;
    debug!(projectile = %projectile.id, actor = %actor, "Projectile picked up");
    ctx.cue(Cue::ItemPickup { actor });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::durability::VanillaItemDamage;
    use crate::enchantment::EnchantmentRegistry;
    use crate::entity::{GameMode, LivingEntity};
    use crate::item::{ItemStack, Material, PotionContents};
    use crate::potion::{EffectDuration, EffectKind, PotionCarrier, PotionType};
    use crate::projectile::ArrowData;
    use crate::world::BlockSet;
    use pvp_core::{CombatConfig, IVec3, Ruleset};
    use rand::rngs::mock::StepRng;

    struct Range {
        config: CombatConfig,
        enchantments: EnchantmentRegistry,
        rng: StepRng,
        cues: Vec<Cue>,
        entities: EntityRegistry,
        world: BlockSet,
    }

    impl Range {
        fn new() -> Self {
            Self {
                config: CombatConfig::default(),
                enchantments: EnchantmentRegistry::vanilla(),
                rng: StepRng::new(0, 0),
                cues: Vec::new(),
                entities: EntityRegistry::new(),
                world: BlockSet::new(),
            }
        }

        fn step(&mut self, projectile: &mut Projectile) -> Vec<ProjectileEvent> {
            let mut events = Vec::new();
            let mut ctx = CombatContext {
                config: &self.config,
                enchantments: &self.enchantments,
                item_damage: &VanillaItemDamage,
                rng: &mut self.rng,
                cues: &mut self.cues,
            };
            step(&mut ctx, projectile, &mut self.entities, &self.world, &mut events);
            events
        }

        fn pickup(&mut self, projectile: &mut Projectile, actor: EntityId) -> bool {
            let mut ctx = CombatContext {
                config: &self.config,
                enchantments: &self.enchantments,
                item_damage: &VanillaItemDamage,
                rng: &mut self.rng,
                cues: &mut self.cues,
            };
            pickup(&mut ctx, projectile, actor, &mut self.entities)
        }
    }

    fn arrow_at(x: f64, velocity: DVec3) -> Projectile {
        Projectile::arrow(ArrowData::default(), None, DVec3::new(x, 1.0, 0.5), velocity)
    }

    /// Arrow stuck in a wall at x = 5
    fn stuck_arrow(range: &mut Range, data: ArrowData) -> Projectile {
        range.world.insert(IVec3::new(5, 1, 0));
        let mut arrow = Projectile::arrow(data, None, DVec3::new(3.5, 1.5, 0.5), DVec3::new(2.0, 0.0, 0.0));
        range.step(&mut arrow);
        assert_eq!(arrow.state(), ProjectileState::Stuck);
        arrow
    }

    #[test]
    fn test_flight_applies_drag_and_gravity() {
        let mut range = Range::new();
        let mut arrow = arrow_at(0.5, DVec3::new(1.0, 0.0, 0.0));
        range.step(&mut arrow);
        assert!((arrow.position.x - 1.5).abs() < 1e-12);
        assert!((arrow.velocity.x - 0.99).abs() < 1e-12);
        assert!((arrow.velocity.y + 0.05).abs() < 1e-12);
        range.step(&mut arrow);
        assert!(arrow.position.y < 1.0);
    }

    #[test]
    fn test_arrow_sticks_in_block() {
        let mut range = Range::new();
        let arrow = stuck_arrow(&mut range, ArrowData::default());
        assert_eq!(arrow.stuck_in(), Some(IVec3::new(5, 1, 0)));
        assert!((arrow.position.x - 5.0).abs() < 1e-9);
        assert_eq!(arrow.velocity, DVec3::ZERO);
        assert!(range.cues.iter().any(|cue| matches!(cue, Cue::ArrowHitBlock { .. })));
    }

    #[test]
    fn test_arrow_hits_entity_in_path() {
        let mut range = Range::new();
        let target = range
            .entities
            .insert(LivingEntity::player().with_position(DVec3::new(3.0, 0.0, 0.5)));
        let mut arrow = arrow_at(0.5, DVec3::new(3.0, 0.0, 0.0));

        let events = range.step(&mut arrow);
        let outcome = events.iter().find_map(|event| match event {
            ProjectileEvent::HitEntity { target: hit, outcome } if *hit == target => Some(*outcome),
            _ => None,
        });
        assert_eq!(outcome.map(|o| o.final_amount), Some(6.0));
        assert_eq!(arrow.state(), ProjectileState::Removed(RemovalReason::HitEntity));
        let entity = range.entities.resolve(target).unwrap();
        assert_eq!(entity.health, 14.0);
        assert_eq!(entity.arrows_in_body, 1);
        assert!(entity.velocity.x > 0.0);
    }

    #[test]
    fn test_tipped_arrow_delivers_an_eighth() {
        let mut range = Range::new();
        let target = range
            .entities
            .insert(LivingEntity::player().with_position(DVec3::new(3.0, 0.0, 0.5)));
        let stack = ItemStack::tipped_arrow(PotionContents::of_type(PotionType::Poison));
        let data = ArrowData {
            carrier: PotionCarrier::from_item(&stack, Ruleset::Current),
            ..ArrowData::default()
        };
        let mut arrow = Projectile::arrow(data, None, DVec3::new(0.5, 1.0, 0.5), DVec3::new(3.0, 0.0, 0.0));

        range.step(&mut arrow);
        let poison = range
            .entities
            .resolve(target)
            .and_then(|entity| entity.effects.get(EffectKind::Poison).copied());
        assert_eq!(poison.map(|e| e.duration()), Some(EffectDuration::Ticks(112)));
    }

    #[test]
    fn test_strong_harming_arrow_kills() {
        let mut range = Range::new();
        let target = range.entities.insert(
            LivingEntity::player()
                .with_position(DVec3::new(3.0, 0.0, 0.5))
                .with_health(8.0),
        );
        let stack = ItemStack::tipped_arrow(PotionContents::of_type(PotionType::StrongHarming));
        let data = ArrowData {
            carrier: PotionCarrier::from_item(&stack, Ruleset::Current),
            ..ArrowData::default()
        };
        let mut arrow = Projectile::arrow(data, None, DVec3::new(0.5, 1.0, 0.5), DVec3::new(3.0, 0.0, 0.0));

        let events = range.step(&mut arrow);
        let outcome = events.iter().find_map(|event| match event {
            ProjectileEvent::HitEntity { outcome, .. } => Some(*outcome),
            _ => None,
        });
        // 6 from the arrow, then 12 of magic
        assert_eq!(outcome.map(|o| o.lethal), Some(true));
        let entity = range.entities.resolve(target).unwrap();
        assert!(entity.dead);
        assert_eq!(entity.health, 0.0);
        assert!(range.cues.contains(&Cue::Death { entity: target }));
    }

    #[test]
    fn test_invulnerable_target_deflects() {
        let mut range = Range::new();
        let mut entity = LivingEntity::player().with_position(DVec3::new(3.0, 0.0, 0.5));
        entity.invulnerable_ticks = 10;
        let target = range.entities.insert(entity);
        let mut arrow = arrow_at(0.5, DVec3::new(3.0, 0.0, 0.0));

        let events = range.step(&mut arrow);
        assert!(events.contains(&ProjectileEvent::Deflected { target }));
        assert_eq!(arrow.state(), ProjectileState::Flying);
        assert!((arrow.velocity.x + 0.3).abs() < 1e-9);
        assert_eq!(range.entities.resolve(target).unwrap().health, 20.0);
    }

    #[test]
    fn test_effects_clear_after_dwelling() {
        let mut range = Range::new();
        let stack = ItemStack::tipped_arrow(PotionContents::default().with_effect(
            crate::potion::StatusEffect::ticks(EffectKind::Slowness, 0, 200),
        ));
        let data = ArrowData {
            carrier: PotionCarrier::from_item(&stack, Ruleset::Current),
            ..ArrowData::default()
        };
        let mut arrow = stuck_arrow(&mut range, data);
        assert!(arrow.carrier().unwrap().color().is_some());

        for _ in 0..EFFECT_CLEAR_TICKS - 1 {
            range.step(&mut arrow);
        }
        assert!(!arrow.carrier().unwrap().is_empty());
        let events = range.step(&mut arrow);
        assert!(events.contains(&ProjectileEvent::EffectsCleared));
        assert!(arrow.carrier().unwrap().is_empty());
        assert_eq!(arrow.carrier().unwrap().color(), None);
        assert_eq!(arrow.pickup_item(), ItemStack::of(Material::Arrow));
    }

    #[test]
    fn test_potion_type_outlasts_dwelling() {
        let mut range = Range::new();
        let stack = ItemStack::tipped_arrow(PotionContents::of_type(PotionType::Poison));
        let data = ArrowData {
            carrier: PotionCarrier::from_item(&stack, Ruleset::Current),
            ..ArrowData::default()
        };
        let mut arrow = stuck_arrow(&mut range, data);

        for _ in 0..EFFECT_CLEAR_TICKS + 100 {
            let events = range.step(&mut arrow);
            assert!(!events.contains(&ProjectileEvent::EffectsCleared));
        }
        assert_eq!(arrow.carrier().unwrap().potion_type(), PotionType::Poison);
        assert_eq!(arrow.pickup_item(), stack);
    }

    #[test]
    fn test_stuck_arrow_despawns() {
        let mut range = Range::new();
        let mut arrow = stuck_arrow(&mut range, ArrowData::default());
        for _ in 0..DESPAWN_STUCK_TICKS {
            range.step(&mut arrow);
        }
        assert_eq!(arrow.state(), ProjectileState::Removed(RemovalReason::Despawned));
    }

    #[test]
    fn test_dislodged_when_block_vanishes() {
        let mut range = Range::new();
        let mut arrow = stuck_arrow(&mut range, ArrowData::default());
        range.step(&mut arrow);
        assert_eq!(arrow.stuck_ticks(), 1);

        range.world.remove(IVec3::new(5, 1, 0));
        let events = range.step(&mut arrow);
        assert!(events.contains(&ProjectileEvent::Dislodged));
        assert_eq!(arrow.state(), ProjectileState::Flying);
        assert_eq!(arrow.stuck_ticks(), 0);
    }

    #[test]
    fn test_arrow_pickup_rules() {
        let mut range = Range::new();
        let picker = range.entities.insert(LivingEntity::player());

        let mut flying = arrow_at(0.5, DVec3::X);
        assert!(!range.pickup(&mut flying, picker));

        let mut arrow = stuck_arrow(&mut range, ArrowData::default());
        arrow.pickup = PickupPolicy::CreativeOnly;
        assert!(!range.pickup(&mut arrow, picker));

        arrow.pickup = PickupPolicy::Allowed;
        assert!(range.pickup(&mut arrow, picker));
        assert_eq!(arrow.state(), ProjectileState::PickedUp);
        assert_eq!(
            range.entities.resolve(picker).unwrap().inventory,
            vec![ItemStack::of(Material::Arrow)]
        );
        assert!(!range.pickup(&mut arrow, picker));
    }

    #[test]
    fn test_creative_pickup_gives_nothing() {
        let mut range = Range::new();
        let picker = range
            .entities
            .insert(LivingEntity::player().with_game_mode(GameMode::Creative));
        let mut arrow = stuck_arrow(&mut range, ArrowData::default());
        arrow.pickup = PickupPolicy::CreativeOnly;

        assert!(range.pickup(&mut arrow, picker));
        assert!(range.entities.resolve(picker).unwrap().inventory.is_empty());
    }

    #[test]
    fn test_trident_lodges_then_falls() {
        let mut range = Range::new();
        let target = range
            .entities
            .insert(LivingEntity::player().with_position(DVec3::new(3.0, 0.0, 0.5)));
        let mut trident = Projectile::trident(
            ItemStack::of(Material::Trident),
            None,
            DVec3::new(0.5, 1.0, 0.5),
            DVec3::new(2.5, 0.0, 0.0),
        );

        range.step(&mut trident);
        assert_eq!(trident.state(), ProjectileState::Stuck);
        assert!(trident.has_dealt_damage());
        assert_eq!(range.entities.resolve(target).unwrap().health, 12.0);

        range.step(&mut trident);
        assert_eq!(trident.state(), ProjectileState::Flying);
        // No second hit once damage is dealt
        range.step(&mut trident);
        assert_eq!(range.entities.resolve(target).unwrap().health, 12.0);
    }

    #[test]
    fn test_loyal_trident_without_owner_is_dropped() {
        let mut range = Range::new();
        let owner = range.entities.insert(LivingEntity::player());
        let item = ItemStack::of(Material::Trident)
            .with_enchantment(crate::enchantment::EnchantmentKind::Loyalty, 2);
        let mut trident = Projectile::trident(item.clone(), Some(owner), DVec3::new(6.5, 1.0, 0.5), DVec3::ZERO);
        trident.has_dealt_damage = true;
        trident.stick(None);

        range.entities.remove(owner);
        let events = range.step(&mut trident);
        assert_eq!(trident.state(), ProjectileState::Removed(RemovalReason::OwnerLost));
        assert!(events.contains(&ProjectileEvent::Removed {
            reason: RemovalReason::OwnerLost,
            dropped: Some(item),
        }));
    }

    #[test]
    fn test_only_owner_catches_returning_trident() {
        let mut range = Range::new();
        let owner = range.entities.insert(LivingEntity::player());
        let other = range.entities.insert(LivingEntity::player());
        let item = ItemStack::of(Material::Trident)
            .with_enchantment(crate::enchantment::EnchantmentKind::Loyalty, 1);
        let mut trident = Projectile::trident(item.clone(), Some(owner), DVec3::new(6.5, 1.0, 0.5), DVec3::ZERO);
        trident.has_dealt_damage = true;

        range.step(&mut trident);
        assert_eq!(trident.state(), ProjectileState::Returning);
        assert!(!range.pickup(&mut trident, other));
        assert!(range.pickup(&mut trident, owner));
        assert_eq!(range.entities.resolve(owner).unwrap().inventory, vec![item]);
    }
}
