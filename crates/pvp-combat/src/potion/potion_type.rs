//! Brewed potion types and the effects each one grants
//!
//! The legacy ruleset uses the older duration table and lacks the potion
//! types that were added later; those map to no effects.

use serde::{Deserialize, Serialize};

use pvp_core::Ruleset;

use super::effect::{EffectKind, StatusEffect};

/// (effect, amplifier, duration in ticks)
type EffectRow = (EffectKind, u8, u32);

/// Brewed potion types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PotionType {
    #[default]
    Empty,
    Water,
    Mundane,
    Thick,
    Awkward,
    NightVision,
    LongNightVision,
    Invisibility,
    LongInvisibility,
    Leaping,
    LongLeaping,
    StrongLeaping,
    FireResistance,
    LongFireResistance,
    Swiftness,
    LongSwiftness,
    StrongSwiftness,
    Slowness,
    LongSlowness,
    StrongSlowness,
    TurtleMaster,
    LongTurtleMaster,
    StrongTurtleMaster,
    WaterBreathing,
    LongWaterBreathing,
    Healing,
    StrongHealing,
    Harming,
    StrongHarming,
    Poison,
    LongPoison,
    StrongPoison,
    Regeneration,
    LongRegeneration,
    StrongRegeneration,
    Strength,
    LongStrength,
    StrongStrength,
    Weakness,
    LongWeakness,
    Luck,
    SlowFalling,
    LongSlowFalling,
}

impl PotionType {
    /// Effects granted under the given ruleset
    pub fn effects(self, ruleset: Ruleset) -> Vec<StatusEffect> {
        let table = match ruleset {
            Ruleset::Legacy => self.legacy_table(),
            Ruleset::Current => self.current_table(),
        };
        table
            .iter()
            .map(|&(kind, amplifier, ticks)| StatusEffect::ticks(kind, amplifier, ticks))
            .collect()
    }

    /// Whether the type carries no effect in either ruleset
    pub fn is_effectless(self) -> bool {
        matches!(
            self,
            Self::Empty | Self::Water | Self::Mundane | Self::Thick | Self::Awkward
        )
    }

    fn current_table(self) -> &'static [EffectRow] {
        use EffectKind as E;
        match self {
            Self::Empty | Self::Water | Self::Mundane | Self::Thick | Self::Awkward => &[],
            Self::NightVision => &[(E::NightVision, 0, 3600)],
            Self::LongNightVision => &[(E::NightVision, 0, 9600)],
            Self::Invisibility => &[(E::Invisibility, 0, 3600)],
            Self::LongInvisibility => &[(E::Invisibility, 0, 9600)],
            Self::Leaping => &[(E::JumpBoost, 0, 3600)],
            Self::LongLeaping => &[(E::JumpBoost, 0, 9600)],
            Self::StrongLeaping => &[(E::JumpBoost, 1, 1800)],
            Self::FireResistance => &[(E::FireResistance, 0, 3600)],
            Self::LongFireResistance => &[(E::FireResistance, 0, 9600)],
            Self::Swiftness => &[(E::Speed, 0, 3600)],
            Self::LongSwiftness => &[(E::Speed, 0, 9600)],
            Self::StrongSwiftness => &[(E::Speed, 1, 1800)],
            Self::Slowness => &[(E::Slowness, 0, 1800)],
            Self::LongSlowness => &[(E::Slowness, 0, 4800)],
            Self::StrongSlowness => &[(E::Slowness, 3, 400)],
            Self::TurtleMaster => &[(E::Slowness, 3, 400), (E::Resistance, 2, 400)],
            Self::LongTurtleMaster => &[(E::Slowness, 3, 800), (E::Resistance, 2, 800)],
            Self::StrongTurtleMaster => &[(E::Slowness, 5, 400), (E::Resistance, 3, 400)],
            Self::WaterBreathing => &[(E::WaterBreathing, 0, 3600)],
            Self::LongWaterBreathing => &[(E::WaterBreathing, 0, 9600)],
            Self::Healing => &[(E::InstantHealth, 0, 1)],
            Self::StrongHealing => &[(E::InstantHealth, 1, 1)],
            Self::Harming => &[(E::InstantDamage, 0, 1)],
            Self::StrongHarming => &[(E::InstantDamage, 1, 1)],
            Self::Poison => &[(E::Poison, 0, 900)],
            Self::LongPoison => &[(E::Poison, 0, 1800)],
            Self::StrongPoison => &[(E::Poison, 1, 432)],
            Self::Regeneration => &[(E::Regeneration, 0, 900)],
            Self::LongRegeneration => &[(E::Regeneration, 0, 1800)],
            Self::StrongRegeneration => &[(E::Regeneration, 1, 450)],
            Self::Strength => &[(E::Strength, 0, 3600)],
            Self::LongStrength => &[(E::Strength, 0, 9600)],
            Self::StrongStrength => &[(E::Strength, 1, 1800)],
            Self::Weakness => &[(E::Weakness, 0, 1800)],
            Self::LongWeakness => &[(E::Weakness, 0, 4800)],
            Self::Luck => &[(E::Luck, 0, 6000)],
            Self::SlowFalling => &[(E::SlowFalling, 0, 1800)],
            Self::LongSlowFalling => &[(E::SlowFalling, 0, 4800)],
        }
    }

    fn legacy_table(self) -> &'static [EffectRow] {
        use EffectKind as E;
        match self {
            Self::LongPoison => &[(E::Poison, 0, 2400)],
            Self::StrongPoison => &[(E::Poison, 1, 440)],
            Self::LongRegeneration => &[(E::Regeneration, 0, 2400)],
            Self::StrongRegeneration => &[(E::Regeneration, 1, 440)],
            Self::StrongSlowness
            | Self::TurtleMaster
            | Self::LongTurtleMaster
            | Self::StrongTurtleMaster
            | Self::Luck
            | Self::SlowFalling
            | Self::LongSlowFalling => &[],
            other => other.current_table(),
        }
    }
}
