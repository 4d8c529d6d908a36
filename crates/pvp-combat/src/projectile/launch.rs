//! Firing arrows and throwing tridents

use rand::{Rng, RngCore};

use pvp_core::{DVec3, Ruleset};

use super::{ArrowData, PickupPolicy, Projectile};
use crate::enchantment::EnchantmentKind;
use crate::entity::{GameMode, LivingEntity};
use crate::item::{ItemStack, Material};
use crate::potion::PotionCarrier;

/// Shots weaker than this do not fire
pub const MIN_BOW_POWER: f64 = 0.1;
/// Ticks of drawing for a full-power shot
const FULL_DRAW_TICKS: f64 = 20.0;
const ARROW_SPEED_PER_POWER: f64 = 3.0;
const TRIDENT_SPEED: f64 = 2.5;
/// Spread of the aim jitter
const INACCURACY: f64 = 0.0172275;
/// Projectiles spawn this far below the eyes
const SPAWN_EYE_OFFSET: f64 = 0.1;

/// Shot power for a bow drawn for `charge_ticks`, in `0.0..=1.0`
pub fn bow_power(charge_ticks: u32) -> f64 {
    let f = f64::from(charge_ticks) / FULL_DRAW_TICKS;
    ((f * f + 2.0 * f) / 3.0).min(1.0)
}

/// Symmetric triangular jitter in `-1.0..1.0`
fn triangle(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>() - rng.gen::<f64>()
}

/// Launch velocity along `facing` with a little random spread
fn aim(facing: DVec3, speed: f64, rng: &mut dyn RngCore) -> DVec3 {
    let direction = facing.normalize_or_zero();
    let jitter = DVec3::new(triangle(rng), triangle(rng), triangle(rng)) * INACCURACY;
    (direction + jitter) * speed
}

/// The shooter's own motion carried into the projectile (current ruleset)
fn inherited_velocity(shooter: &LivingEntity, ruleset: Ruleset) -> DVec3 {
    if ruleset.is_legacy() {
        return DVec3::ZERO;
    }
    let vertical = if shooter.on_ground { 0.0 } else { shooter.velocity.y };
    DVec3::new(shooter.velocity.x, vertical, shooter.velocity.z)
}

fn spawn_position(shooter: &LivingEntity) -> DVec3 {
    shooter.eye_position() - DVec3::new(0.0, SPAWN_EYE_OFFSET, 0.0)
}

/// Fire `ammo` from `bow` after drawing for `charge_ticks`. Returns `None`
/// for a shot too weak to fire.
pub fn launch_arrow(
    shooter: &LivingEntity,
    bow: &ItemStack,
    ammo: &ItemStack,
    charge_ticks: u32,
    ruleset: Ruleset,
    rng: &mut dyn RngCore,
) -> Option<Projectile> {
    let power = bow_power(charge_ticks);
    if power < MIN_BOW_POWER {
        return None;
    }

    let mut data = ArrowData {
        carrier: PotionCarrier::from_item(ammo, ruleset),
        critical: power >= 1.0,
        punch: bow.enchantment_level(EnchantmentKind::Punch),
        flame: bow.enchantment_level(EnchantmentKind::Flame) > 0,
        ..ArrowData::default()
    };
    let power_level = bow.enchantment_level(EnchantmentKind::Power);
    if power_level > 0 {
        data.base_damage += 0.5 * f64::from(power_level) + 0.5;
    }

    let infinite = bow.enchantment_level(EnchantmentKind::Infinity) > 0
        && ammo.material() == Material::Arrow;
    let pickup = if infinite || shooter.game_mode == GameMode::Creative {
        PickupPolicy::CreativeOnly
    } else {
        PickupPolicy::Allowed
    };

    let velocity = aim(shooter.facing, power * ARROW_SPEED_PER_POWER, rng)
        + inherited_velocity(shooter, ruleset);
    Some(Projectile::arrow(data, Some(shooter.id), spawn_position(shooter), velocity).with_pickup(pickup))
}

/// Throw a trident
pub fn throw_trident(
    shooter: &LivingEntity,
    trident: &ItemStack,
    ruleset: Ruleset,
    rng: &mut dyn RngCore,
) -> Projectile {
    let pickup = if shooter.game_mode == GameMode::Creative {
        PickupPolicy::CreativeOnly
    } else {
        PickupPolicy::Allowed
    };
    let velocity = aim(shooter.facing, TRIDENT_SPEED, rng) + inherited_velocity(shooter, ruleset);
    Projectile::trident(trident.clone(), Some(shooter.id), spawn_position(shooter), velocity)
        .with_pickup(pickup)
}
