//! Armor, protection and resistance mitigation

use pvp_core::Ruleset;

use crate::enchantment::MAX_PROTECTION;

/// Armor points above this add nothing
pub const MAX_ARMOR: f32 = 20.0;
/// Each armor point (and each protection point) is worth 1/25 of the damage
const POINT_DIVISOR: f32 = 25.0;
/// Share of armor points that always applies, however hard the hit
const MIN_ARMOR_SHARE: f32 = 0.2;
const RESISTANCE_PER_LEVEL: f32 = 0.2;

/// Fraction of `damage` absorbed by armor, in `0.0..0.8`.
///
/// The current formula lets strong hits pierce part of the armor; toughness
/// counters that. The legacy formula is a flat 4% per point.
pub fn armor_reduction(armor: f32, toughness: f32, damage: f32, ruleset: Ruleset) -> f32 {
    let armor = armor.max(0.0);
    match ruleset {
        Ruleset::Legacy => armor.min(MAX_ARMOR) / POINT_DIVISOR,
        Ruleset::Current => {
            let toughness_factor = 2.0 + toughness.max(0.0) / 4.0;
            let effective = (armor - damage.max(0.0) / toughness_factor)
                .max(armor * MIN_ARMOR_SHARE)
                .min(MAX_ARMOR);
            effective / POINT_DIVISOR
        }
    }
}

/// Damage left after armor
pub fn apply_armor(damage: f32, armor: f32, toughness: f32, ruleset: Ruleset) -> f32 {
    damage * (1.0 - armor_reduction(armor, toughness, damage, ruleset))
}

/// Damage left after an already aggregated protection amount
pub fn apply_protection(damage: f32, protection: i32) -> f32 {
    let protection = protection.clamp(0, MAX_PROTECTION);
    damage * (1.0 - protection as f32 / POINT_DIVISOR)
}

/// Damage left after the Resistance effect at `amplifier`
pub fn apply_resistance(damage: f32, amplifier: u8) -> f32 {
    let level = f32::from(amplifier) + 1.0;
    (damage * (1.0 - RESISTANCE_PER_LEVEL * level)).max(0.0)
}
