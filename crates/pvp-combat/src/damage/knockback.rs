//! Knockback vectors

use pvp_core::DVec3;

pub const BASE_KNOCKBACK: f64 = 0.4;
/// Horizontal strength added per knockback level
pub const KNOCKBACK_PER_LEVEL: f64 = 0.5;
/// Lift added per knockback level under legacy rules
pub const LEGACY_LIFT_PER_LEVEL: f64 = 0.1;
/// Strength of the push an attacker gets from hitting a raised shield
pub const SHIELD_KNOCKBACK: f64 = 0.5;
const LEGACY_SNEAK_FACTOR: f64 = 0.5;
/// Highest upward speed a hit can leave under current rules
pub const MAX_LIFT: f64 = 0.4;

/// Inputs for one knockback
#[derive(Debug, Clone, Copy)]
pub struct KnockbackParams {
    /// Where the push comes from
    pub origin: DVec3,
    /// Position of the entity being pushed
    pub target: DVec3,
    /// Knockback enchantment levels plus sprint bonus
    pub levels: u32,
    pub resistance: f32,
    pub legacy: bool,
    pub sneaking: bool,
}

/// Velocity change pushing `target` horizontally away from `origin`.
/// Coincident positions produce no knockback.
pub fn knockback_vector(params: KnockbackParams) -> DVec3 {
    let away = DVec3::new(
        params.target.x - params.origin.x,
        0.0,
        params.target.z - params.origin.z,
    );
    let Some(direction) = away.try_normalize() else {
        return DVec3::ZERO;
    };

    let levels = f64::from(params.levels);
    let horizontal = BASE_KNOCKBACK + KNOCKBACK_PER_LEVEL * levels;
    let lift = if params.legacy {
        BASE_KNOCKBACK + LEGACY_LIFT_PER_LEVEL * levels
    } else {
        BASE_KNOCKBACK
    };

    let mut scale = 1.0 - f64::from(params.resistance.clamp(0.0, 1.0));
    if params.legacy && params.sneaking {
        scale *= LEGACY_SNEAK_FACTOR;
    }
    DVec3::new(
        direction.x * horizontal * scale,
        lift * scale,
        direction.z * horizontal * scale,
    )
}

/// Velocity of a defender after taking `knockback`: half its old velocity
/// plus the push. Outside legacy knockback the upward speed is capped at
/// [`MAX_LIFT`].
pub fn apply_knockback(velocity: DVec3, knockback: DVec3, legacy: bool) -> DVec3 {
    let mut result = velocity * 0.5 + knockback;
    if !legacy {
        result.y = result.y.min(MAX_LIFT);
    }
    result
}

/// Push straight back from a shield, no lift
pub fn shield_knockback(defender: DVec3, attacker: DVec3, resistance: f32) -> DVec3 {
    let away = DVec3::new(attacker.x - defender.x, 0.0, attacker.z - defender.z);
    let scale = SHIELD_KNOCKBACK * (1.0 - f64::from(resistance.clamp(0.0, 1.0)));
    away.try_normalize()
        .map(|direction| direction * scale)
        .unwrap_or(DVec3::ZERO)
}
