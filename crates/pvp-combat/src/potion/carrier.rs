//! Potion payload carried by an arrow
//!
//! The carrier is derived once from the item the arrow was shot from. Its
//! effect list only changes through [`PotionCarrier::add_effect`] and
//! [`PotionCarrier::clear`]; every change bumps the version so a reader can
//! tell whether the list moved under it.

use pvp_core::Ruleset;

use super::color::mix_colors;
use super::effect::{EffectDuration, Rgb, StatusEffect};
use super::potion_type::PotionType;
use crate::item::{ItemStack, Material, PotionContents};

/// Brewed potion effects on an arrow last an eighth as long
pub const ARROW_EFFECT_DURATION_DIVISOR: u32 = 8;

/// Potion payload of a tipped arrow
#[derive(Debug, Clone, PartialEq)]
pub struct PotionCarrier {
    potion_type: PotionType,
    custom_effects: Vec<StatusEffect>,
    color: Option<Rgb>,
    color_fixed: bool,
    version: u64,
}

impl Default for PotionCarrier {
    fn default() -> Self {
        Self::empty()
    }
}

impl PotionCarrier {
    /// Carrier with no effects and no color
    pub fn empty() -> Self {
        Self {
            potion_type: PotionType::Empty,
            custom_effects: Vec::new(),
            color: None,
            color_fixed: false,
            version: 0,
        }
    }

    /// Inherit the payload of the item an arrow is shot from. Anything other
    /// than a tipped arrow yields an empty carrier.
    pub fn from_item(stack: &ItemStack, ruleset: Ruleset) -> Self {
        if stack.material() != Material::TippedArrow {
            return Self::empty();
        }
        let contents = stack.potion().cloned().unwrap_or_default();
        let mut carrier = Self {
            potion_type: contents.potion_type,
            custom_effects: contents.custom_effects,
            color: None,
            color_fixed: false,
            version: 0,
        };
        match contents.color {
            Some(color) => {
                carrier.color = Some(color);
                carrier.color_fixed = true;
            }
            None => carrier.color = carrier.derived_color(ruleset),
        }
        carrier
    }

    /// Append a custom effect. The color follows the new effect list unless
    /// it was fixed by the source item.
    pub fn add_effect(&mut self, effect: StatusEffect, ruleset: Ruleset) {
        self.custom_effects.push(effect);
        if !self.color_fixed {
            self.color = self.derived_color(ruleset);
        }
        self.version += 1;
    }

    /// Drop every effect and reset the color
    pub fn clear(&mut self) {
        self.potion_type = PotionType::Empty;
        self.custom_effects.clear();
        self.color = None;
        self.color_fixed = false;
        self.version += 1;
    }

    /// Whether neither a potion type nor custom effects are carried
    pub fn is_empty(&self) -> bool {
        self.potion_type == PotionType::Empty && self.custom_effects.is_empty()
    }

    pub fn potion_type(&self) -> PotionType {
        self.potion_type
    }

    pub fn custom_effects(&self) -> &[StatusEffect] {
        &self.custom_effects
    }

    /// Display color; `None` renders as a plain arrow
    pub fn color(&self) -> Option<Rgb> {
        self.color
    }

    pub fn is_color_fixed(&self) -> bool {
        self.color_fixed
    }

    /// Incremented on every mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Potion-type effects followed by custom effects, at full duration
    pub fn all_effects(&self, ruleset: Ruleset) -> Vec<StatusEffect> {
        let mut effects = self.potion_type.effects(ruleset);
        effects.extend(self.custom_effects.iter().copied());
        effects
    }

    /// Effects delivered to an entity struck by the arrow.
    ///
    /// Potion-type effects that are not instant last an eighth of their
    /// duration (at least one tick); custom and instant effects are delivered
    /// unchanged.
    pub fn hit_payload(&self, ruleset: Ruleset) -> Vec<StatusEffect> {
        let mut payload: Vec<StatusEffect> = self
            .potion_type
            .effects(ruleset)
            .into_iter()
            .map(|effect| {
                if effect.is_instant() {
                    return effect;
                }
                match effect.duration() {
                    EffectDuration::Ticks(ticks) => effect.with_duration(EffectDuration::Ticks(
                        (ticks / ARROW_EFFECT_DURATION_DIVISOR).max(1),
                    )),
                    EffectDuration::Infinite => effect,
                }
            })
            .collect();
        payload.extend(self.custom_effects.iter().copied());
        payload
    }

    /// The item handed out when the arrow is picked up
    pub fn to_pickup_item(&self) -> ItemStack {
        if self.is_empty() {
            return ItemStack::of(Material::Arrow);
        }
        let contents = PotionContents {
            potion_type: self.potion_type,
            custom_effects: self.custom_effects.clone(),
            color: if self.color_fixed { self.color } else { None },
        };
        ItemStack::tipped_arrow(contents)
    }

    fn derived_color(&self, ruleset: Ruleset) -> Option<Rgb> {
        if self.is_empty() {
            return None;
        }
        mix_colors(&self.all_effects(ruleset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potion::effect::EffectKind;

    fn poison_arrow() -> ItemStack {
        ItemStack::tipped_arrow(
            PotionContents::of_type(PotionType::Poison)
                .with_effect(StatusEffect::ticks(EffectKind::Glowing, 0, 200)),
        )
    }

    #[test]
    fn test_plain_arrow_has_empty_carrier() {
        let carrier = PotionCarrier::from_item(&ItemStack::of(Material::Arrow), Ruleset::Current);
        assert!(carrier.is_empty());
        assert_eq!(carrier.color(), None);
        assert_eq!(carrier.to_pickup_item().material(), Material::Arrow);
    }

    #[test]
    fn test_tipped_arrow_derives_color() {
        let carrier = PotionCarrier::from_item(&poison_arrow(), Ruleset::Current);
        assert!(!carrier.is_color_fixed());
        let expected = mix_colors(&carrier.all_effects(Ruleset::Current));
        assert_eq!(carrier.color(), expected);
        assert!(carrier.color().is_some());
    }

    #[test]
    fn test_explicit_color_is_fixed() {
        let stack = ItemStack::tipped_arrow(
            PotionContents::of_type(PotionType::Poison).with_color(Rgb(0x123456)),
        );
        let mut carrier = PotionCarrier::from_item(&stack, Ruleset::Current);
        assert!(carrier.is_color_fixed());
        carrier.add_effect(StatusEffect::ticks(EffectKind::Speed, 0, 100), Ruleset::Current);
        assert_eq!(carrier.color(), Some(Rgb(0x123456)));
        let pickup = carrier.to_pickup_item();
        assert_eq!(pickup.potion().unwrap().color, Some(Rgb(0x123456)));
    }

    #[test]
    fn test_pickup_item_round_trip() {
        let source = poison_arrow();
        let carrier = PotionCarrier::from_item(&source, Ruleset::Current);
        assert_eq!(carrier.to_pickup_item(), source);
    }

    #[test]
    fn test_hit_payload_shortens_brewed_effects() {
        let carrier = PotionCarrier::from_item(&poison_arrow(), Ruleset::Current);
        let payload = carrier.hit_payload(Ruleset::Current);
        assert_eq!(payload.len(), 2);
        assert_eq!(payload[0].duration(), EffectDuration::Ticks(900 / 8));
        assert_eq!(payload[1].duration(), EffectDuration::Ticks(200));
    }

    #[test]
    fn test_hit_payload_keeps_instant_effects() {
        let stack = ItemStack::tipped_arrow(PotionContents::of_type(PotionType::Harming));
        let carrier = PotionCarrier::from_item(&stack, Ruleset::Current);
        let payload = carrier.hit_payload(Ruleset::Current);
        assert_eq!(payload[0].kind(), EffectKind::InstantDamage);
        assert_eq!(payload[0].duration(), EffectDuration::Ticks(1));
    }

    #[test]
    fn test_add_and_clear_bump_version() {
        let mut carrier = PotionCarrier::empty();
        carrier.add_effect(StatusEffect::ticks(EffectKind::Speed, 0, 100), Ruleset::Current);
        assert_eq!(carrier.version(), 1);
        assert_eq!(carrier.color(), Some(EffectKind::Speed.color()));
        carrier.clear();
        assert_eq!(carrier.version(), 2);
        assert!(carrier.is_empty());
        assert_eq!(carrier.color(), None);
    }
}
