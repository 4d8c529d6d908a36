//! Arrow impacts

use rand::{Rng, RngCore};
use tracing::debug;

use pvp_core::{DVec3, EntityId};

use super::{ArrowData, Projectile, ProjectileEvent, RemovalReason};
use crate::damage::{deliver_effect, resolve_damage, CombatContext, DamageCategory, DamageRequest};
use crate::entity::EntityRegistry;
use crate::world::Cue;

/// Damage per unit of speed of a plain arrow
pub const BASE_DAMAGE: f64 = 2.0;
/// Burn time from a Flame bow
const FLAME_TICKS: u32 = 100;
const PUNCH_PER_LEVEL: f64 = 0.6;
const PUNCH_LIFT: f64 = 0.1;
/// Speed kept (reversed) when bouncing off
const DEFLECT_FACTOR: f64 = -0.1;
/// A deflected arrow slower than this is removed
const DEFLECT_MIN_SPEED_SQ: f64 = 1.0e-7;

/// Damage dealt by an arrow moving at `velocity`. Critical arrows add a
/// random bonus of up to half the damage plus one.
pub fn arrow_damage(data: &ArrowData, velocity: DVec3, rng: &mut dyn RngCore) -> f32 {
    let damage = (velocity.length() * data.base_damage).ceil().clamp(0.0, f64::from(i32::MAX)) as i32;
    if data.critical {
        let bonus = rng.gen_range(0..damage / 2 + 2);
        return (damage + bonus) as f32;
    }
    damage as f32
}

/// Horizontal push from a Punch bow, along the arrow's flight
pub fn punch_knockback(level: u8, velocity: DVec3) -> DVec3 {
    if level == 0 {
        return DVec3::ZERO;
    }
    let horizontal = DVec3::new(velocity.x, 0.0, velocity.z);
    match horizontal.try_normalize() {
        Some(direction) => {
            direction * PUNCH_PER_LEVEL * f64::from(level) + DVec3::new(0.0, PUNCH_LIFT, 0.0)
        }
        None => DVec3::ZERO,
    }
}

/// Outcome of an arrow meeting an entity
pub(crate) enum ArrowImpact {
    /// Damage landed; the arrow is gone
    Landed,
    /// Bounced off
    Deflected,
    /// Target vanished; keep flying
    Missed,
}

/// Run the pipeline for an arrow hitting `target`, then deliver Flame,
/// Punch, and the potion payload.
pub(crate) fn hit_entity(
    ctx: &mut CombatContext<'_>,
    projectile: &mut Projectile,
    data: &ArrowData,
    entities: &mut EntityRegistry,
    target: EntityId,
    origin: DVec3,
    events: &mut Vec<ProjectileEvent>,
) -> ArrowImpact {
    let damage = arrow_damage(data, projectile.velocity, &mut *ctx.rng);
    let mut request =
        DamageRequest::new(DamageCategory::Projectile, damage, target).with_source_position(origin);
    let shooter = projectile
        .shooter
        .filter(|&id| entities.resolve(id).is_some());
    if let Some(shooter) = shooter {
        request = request.with_attacker(shooter);
    }

    let mut outcome = match resolve_damage(ctx, entities, &request) {
        Ok(outcome) => outcome,
        Err(error) => {
            debug!(arrow = %projectile.id, %error, "Arrow hit dropped");
            return ArrowImpact::Missed;
        }
    };

    if !outcome.landed() {
        projectile.velocity *= DEFLECT_FACTOR;
        events.push(ProjectileEvent::Deflected { target });
        if projectile.velocity.length_squared() < DEFLECT_MIN_SPEED_SQ {
            projectile.remove(RemovalReason::Deflected, events);
        }
        return ArrowImpact::Deflected;
    }

    let ruleset = ctx.config.ruleset;
    if let Some(entity) = entities.resolve_mut(target) {
        if data.flame {
            entity.ignite(FLAME_TICKS);
        }
        entity.velocity += punch_knockback(data.punch, projectile.velocity);
        entity.arrows_in_body += 1;
    }
    for effect in data.carrier.hit_payload(ruleset) {
        if let Some(harm) = deliver_effect(ctx, entities, target, effect, 1.0, shooter) {
            outcome.lethal |= harm.lethal;
        }
    }
    ctx.cue(Cue::ArrowHitEntity { shooter, target });
    events.push(ProjectileEvent::HitEntity { target, outcome });
    projectile.remove(RemovalReason::HitEntity, events);
    ArrowImpact::Landed
}
