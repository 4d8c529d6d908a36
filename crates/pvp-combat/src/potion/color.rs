//! Effect color mixing
//!
//! Each effect contributes its base color weighted by `(amplifier + 1)` times
//! its remaining duration. Ticks are used instead of seconds: both scale the
//! weights by the same factor, so the average is identical, and integer ticks
//! keep the sum exact. Exact sums make the result independent of the order the
//! effects are visited in.

use super::effect::{Rgb, StatusEffect};

/// Mix the colors of a set of effects. Returns `None` (no tint, default
/// rendering) for an empty set.
///
/// Infinite durations weigh as much as the longest finite duration in the set,
/// or one tick when every duration is infinite. If every weight comes out as
/// zero the durations are ignored and only amplifiers weigh in.
pub fn mix_colors<'a, I>(effects: I) -> Option<Rgb>
where
    I: IntoIterator<Item = &'a StatusEffect>,
{
    let effects: Vec<&StatusEffect> = effects.into_iter().collect();
    if effects.is_empty() {
        return None;
    }

    let longest_finite = effects
        .iter()
        .filter_map(|effect| effect.duration().ticks())
        .max()
        .unwrap_or(1)
        .max(1);

    let weigh_by_duration = |effect: &StatusEffect| -> u128 {
        let ticks = effect.duration().ticks().unwrap_or(longest_finite);
        u128::from(effect.level()) * u128::from(ticks)
    };

    let mut weighted = weighted_average(&effects, weigh_by_duration);
    if weighted.is_none() {
        weighted = weighted_average(&effects, |effect| u128::from(effect.level()));
    }
    weighted
}

fn weighted_average<F>(effects: &[&StatusEffect], weight: F) -> Option<Rgb>
where
    F: Fn(&StatusEffect) -> u128,
{
    let mut total = 0u128;
    let mut sums = [0u128; 3];
    for effect in effects {
        let w = weight(effect);
        let color = effect.kind().color();
        sums[0] += w * u128::from(color.r());
        sums[1] += w * u128::from(color.g());
        sums[2] += w * u128::from(color.b());
        total += w;
    }
    if total == 0 {
        return None;
    }

    // Round half up: (2s + t) / 2t
    let channel = |sum: u128| ((sum * 2 + total) / (total * 2)).min(255) as u8;
    Some(Rgb::from_channels(
        channel(sums[0]),
        channel(sums[1]),
        channel(sums[2]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potion::effect::{EffectDuration, EffectKind};

    #[test]
    fn test_empty_set_has_no_color() {
        let none: &[StatusEffect] = &[];
        assert_eq!(mix_colors(none), None);
    }

    #[test]
    fn test_single_effect_keeps_its_color() {
        let effect = StatusEffect::ticks(EffectKind::Poison, 0, 200);
        assert_eq!(mix_colors(&[effect]), Some(EffectKind::Poison.color()));
    }

    #[test]
    fn test_mix_is_order_independent() {
        let a = StatusEffect::ticks(EffectKind::Speed, 1, 300);
        let b = StatusEffect::ticks(EffectKind::Poison, 0, 140);
        let c = StatusEffect::ticks(EffectKind::Strength, 2, 35);
        let forward = mix_colors(&[a, b, c]);
        assert_eq!(forward, mix_colors(&[c, a, b]));
        assert_eq!(forward, mix_colors(&[b, c, a]));
    }

    #[test]
    fn test_equal_weights_average_channels() {
        // Both weigh 1 * 100 ticks
        let a = StatusEffect::ticks(EffectKind::Speed, 0, 100);
        let b = StatusEffect::ticks(EffectKind::Slowness, 0, 100);
        let mixed = mix_colors(&[a, b]).unwrap();
        let sa = EffectKind::Speed.color();
        let sb = EffectKind::Slowness.color();
        let avg = |x: u8, y: u8| ((u32::from(x) + u32::from(y) + 1) / 2) as u8;
        assert_eq!(mixed.r(), avg(sa.r(), sb.r()));
        assert_eq!(mixed.g(), avg(sa.g(), sb.g()));
        assert_eq!(mixed.b(), avg(sa.b(), sb.b()));
    }

    #[test]
    fn test_higher_amplifier_dominates() {
        let strong = StatusEffect::ticks(EffectKind::InstantDamage, 9, 100);
        let weak = StatusEffect::ticks(EffectKind::JumpBoost, 0, 100);
        let mixed = mix_colors(&[strong, weak]).unwrap();
        // 10:1 weighting pulls green far towards InstantDamage's 0x0A
        assert!(mixed.g() < 0x30);
    }

    #[test]
    fn test_zero_durations_fall_back_to_amplifier_weights() {
        let a = StatusEffect::ticks(EffectKind::Speed, 0, 0);
        assert_eq!(mix_colors(&[a]), Some(EffectKind::Speed.color()));
    }

    #[test]
    fn test_infinite_weighs_like_longest_finite() {
        let infinite = StatusEffect::new(EffectKind::Speed, 0, EffectDuration::Infinite);
        let finite = StatusEffect::ticks(EffectKind::Slowness, 0, 100);
        let as_finite = StatusEffect::ticks(EffectKind::Speed, 0, 100);
        assert_eq!(
            mix_colors(&[infinite, finite]),
            mix_colors(&[as_finite, finite])
        );
    }
}
