//! Trident impacts and loyalty

use tracing::{debug, trace};

use pvp_core::{DVec3, EntityId};

use super::{Projectile, ProjectileEvent, ProjectileKind, ProjectileState, RemovalReason};
use crate::damage::{resolve_damage, CombatContext, DamageCategory, DamageRequest};
use crate::enchantment::attack_damage_bonus;
use crate::entity::EntityRegistry;
use crate::world::Cue;

/// Damage of a thrown trident before enchantments
pub const BASE_DAMAGE: f32 = 8.0;
/// A trident stuck longer than this counts as having dealt damage
const LODGED_TICKS: u32 = 4;
/// Velocity kept per axis after hitting an entity
const REBOUND: DVec3 = DVec3::new(-0.01, -0.1, -0.01);
const HOMING_LIFT_PER_LEVEL: f64 = 0.015;
const HOMING_DAMPING: f64 = 0.95;
const HOMING_PULL_PER_LEVEL: f64 = 0.05;

/// Run the pipeline for a trident hitting `target`. The trident rebounds
/// and lodges whether or not the hit landed.
pub(crate) fn hit_entity(
    ctx: &mut CombatContext<'_>,
    projectile: &mut Projectile,
    entities: &mut EntityRegistry,
    target: EntityId,
    origin: DVec3,
    events: &mut Vec<ProjectileEvent>,
) -> bool {
    let ProjectileKind::Trident(data) = &projectile.kind else {
        return false;
    };
    let Some(group) = entities.resolve(target).map(|entity| entity.group) else {
        return false;
    };
    let damage = BASE_DAMAGE + attack_damage_bonus(ctx.enchantments, &data.item, group, ctx.ruleset());

    let mut request =
        DamageRequest::new(DamageCategory::Trident, damage, target).with_source_position(origin);
    if let Some(shooter) = projectile.shooter.filter(|&id| entities.resolve(id).is_some()) {
        request = request.with_attacker(shooter);
    }
    match resolve_damage(ctx, entities, &request) {
        Ok(outcome) => events.push(ProjectileEvent::HitEntity { target, outcome }),
        Err(error) => {
            debug!(trident = %projectile.id, %error, "Trident hit dropped");
            return false;
        }
    }

    projectile.has_dealt_damage = true;
    projectile.velocity *= REBOUND;
    projectile.stick(None);
    ctx.cue(Cue::TridentHitEntity { target });
    true
}

/// Loyalty: once the trident has hit something, pull it back to a live
/// owner. A trident whose owner is gone is removed instead.
///
/// Returns whether the trident is homing this tick.
pub(crate) fn tick_loyalty(
    ctx: &mut CombatContext<'_>,
    projectile: &mut Projectile,
    entities: &EntityRegistry,
    events: &mut Vec<ProjectileEvent>,
) -> bool {
    if projectile.state == ProjectileState::Stuck && projectile.stuck_ticks > LODGED_TICKS {
        projectile.has_dealt_damage = true;
    }
    let loyalty = projectile.loyalty();
    let returning = projectile.state == ProjectileState::Returning;
    if loyalty == 0 || !(projectile.has_dealt_damage || returning) {
        return false;
    }
    let Some(shooter_id) = projectile.shooter else {
        return false;
    };

    let owner = entities
        .resolve(shooter_id)
        .filter(|owner| owner.is_alive() && !owner.is_spectator());
    let Some(owner) = owner else {
        debug!(trident = %projectile.id, owner = %shooter_id, "Owner gone, trident dropped");
        projectile.remove(RemovalReason::OwnerLost, events);
        return false;
    };

    if !returning {
        trace!(trident = %projectile.id, "Trident returning");
        projectile.state = ProjectileState::Returning;
        projectile.stuck_in = None;
        projectile.stuck_ticks = 0;
    }
    let level = f64::from(loyalty);
    let to_owner = owner.eye_position() - projectile.position;
    projectile.position.y += to_owner.y * HOMING_LIFT_PER_LEVEL * level;
    projectile.velocity = projectile.velocity * HOMING_DAMPING
        + to_owner.normalize_or_zero() * HOMING_PULL_PER_LEVEL * level;

    if let ProjectileKind::Trident(data) = &mut projectile.kind {
        if !data.return_announced {
            data.return_announced = true;
            events.push(ProjectileEvent::ReturnStarted);
            ctx.cue(Cue::TridentReturn {
                position: projectile.position,
            });
        }
    }
    true
}
