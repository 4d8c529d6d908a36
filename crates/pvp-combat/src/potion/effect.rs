//! Status effect kinds and effect values

use serde::{Deserialize, Serialize};

use pvp_core::TICKS_PER_SECOND;

/// A packed 0xRRGGBB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u32);

impl Rgb {
    /// Pack three channels
    pub fn from_channels(r: u8, g: u8, b: u8) -> Self {
        Self((u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
    }

    pub fn r(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    pub fn g(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    pub fn b(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

/// Whether an effect helps or hurts the entity carrying it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectCategory {
    Beneficial,
    Harmful,
    Neutral,
}

/// Status effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectKind {
    Speed,
    Slowness,
    Haste,
    MiningFatigue,
    Strength,
    InstantHealth,
    InstantDamage,
    JumpBoost,
    Nausea,
    Regeneration,
    Resistance,
    FireResistance,
    WaterBreathing,
    Invisibility,
    Blindness,
    NightVision,
    Hunger,
    Weakness,
    Poison,
    Wither,
    HealthBoost,
    Absorption,
    Saturation,
    Glowing,
    Levitation,
    Luck,
    Unluck,
    SlowFalling,
}

impl EffectKind {
    /// Base particle/tint color
    pub fn color(self) -> Rgb {
        Rgb(match self {
            Self::Speed => 0x7CAFC6,
            Self::Slowness => 0x5A6C81,
            Self::Haste => 0xD9C043,
            Self::MiningFatigue => 0x4A4217,
            Self::Strength => 0x932423,
            Self::InstantHealth => 0xF82423,
            Self::InstantDamage => 0x430A09,
            Self::JumpBoost => 0x22FF4C,
            Self::Nausea => 0x551D4A,
            Self::Regeneration => 0xCD5CAB,
            Self::Resistance => 0x99453A,
            Self::FireResistance => 0xE49A3A,
            Self::WaterBreathing => 0x2E5299,
            Self::Invisibility => 0x7F8392,
            Self::Blindness => 0x1F1F23,
            Self::NightVision => 0x1F1FA1,
            Self::Hunger => 0x587653,
            Self::Weakness => 0x484D48,
            Self::Poison => 0x4E9331,
            Self::Wither => 0x352A27,
            Self::HealthBoost => 0xF87D23,
            Self::Absorption => 0x2552A5,
            Self::Saturation => 0xF82423,
            Self::Glowing => 0x94A061,
            Self::Levitation => 0xCEFFFF,
            Self::Luck => 0x339900,
            Self::Unluck => 0xC0A44D,
            Self::SlowFalling => 0xFFEFD1,
        })
    }

    /// Instant kinds apply once and are never stored
    pub fn is_instant(self) -> bool {
        matches!(
            self,
            Self::InstantHealth | Self::InstantDamage | Self::Saturation
        )
    }

    pub fn category(self) -> EffectCategory {
        match self {
            Self::Slowness
            | Self::MiningFatigue
            | Self::InstantDamage
            | Self::Nausea
            | Self::Blindness
            | Self::Hunger
            | Self::Weakness
            | Self::Poison
            | Self::Wither
            | Self::Levitation
            | Self::Unluck => EffectCategory::Harmful,
            Self::Glowing => EffectCategory::Neutral,
            _ => EffectCategory::Beneficial,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Speed => "Speed",
            Self::Slowness => "Slowness",
            Self::Haste => "Haste",
            Self::MiningFatigue => "Mining Fatigue",
            Self::Strength => "Strength",
            Self::InstantHealth => "Instant Health",
            Self::InstantDamage => "Instant Damage",
            Self::JumpBoost => "Jump Boost",
            Self::Nausea => "Nausea",
            Self::Regeneration => "Regeneration",
            Self::Resistance => "Resistance",
            Self::FireResistance => "Fire Resistance",
            Self::WaterBreathing => "Water Breathing",
            Self::Invisibility => "Invisibility",
            Self::Blindness => "Blindness",
            Self::NightVision => "Night Vision",
            Self::Hunger => "Hunger",
            Self::Weakness => "Weakness",
            Self::Poison => "Poison",
            Self::Wither => "Wither",
            Self::HealthBoost => "Health Boost",
            Self::Absorption => "Absorption",
            Self::Saturation => "Saturation",
            Self::Glowing => "Glowing",
            Self::Levitation => "Levitation",
            Self::Luck => "Luck",
            Self::Unluck => "Bad Luck",
            Self::SlowFalling => "Slow Falling",
        }
    }
}

/// Remaining lifetime of an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectDuration {
    Ticks(u32),
    Infinite,
}

impl EffectDuration {
    /// Finite tick count, if any
    pub fn ticks(self) -> Option<u32> {
        match self {
            Self::Ticks(ticks) => Some(ticks),
            Self::Infinite => None,
        }
    }

    pub fn is_infinite(self) -> bool {
        matches!(self, Self::Infinite)
    }

    /// Whether no time remains
    pub fn is_expired(self) -> bool {
        matches!(self, Self::Ticks(0))
    }

    /// Whether `self` outlasts `other`
    pub fn is_longer_than(self, other: EffectDuration) -> bool {
        match (self, other) {
            (Self::Infinite, Self::Infinite) => false,
            (Self::Infinite, Self::Ticks(_)) => true,
            (Self::Ticks(_), Self::Infinite) => false,
            (Self::Ticks(a), Self::Ticks(b)) => a > b,
        }
    }

    /// One tick less (infinite stays infinite)
    pub fn tick_down(self) -> Self {
        match self {
            Self::Ticks(ticks) => Self::Ticks(ticks.saturating_sub(1)),
            Self::Infinite => Self::Infinite,
        }
    }

    /// Remaining time in whole seconds
    pub fn seconds(self) -> Option<u32> {
        self.ticks().map(|ticks| ticks / TICKS_PER_SECOND)
    }
}

/// An immutable status effect value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusEffect {
    kind: EffectKind,
    amplifier: u8,
    duration: EffectDuration,
    ambient: bool,
    show_particles: bool,
    show_icon: bool,
}

impl StatusEffect {
    /// Visible, non-ambient effect
    pub fn new(kind: EffectKind, amplifier: u8, duration: EffectDuration) -> Self {
        Self {
            kind,
            amplifier,
            duration,
            ambient: false,
            show_particles: true,
            show_icon: true,
        }
    }

    /// Effect lasting `ticks` ticks
    pub fn ticks(kind: EffectKind, amplifier: u8, ticks: u32) -> Self {
        Self::new(kind, amplifier, EffectDuration::Ticks(ticks))
    }

    /// Build from unchecked external values. Amplifiers are clamped to
    /// `0..=255`; a duration of `-1` means infinite and any other negative
    /// duration becomes zero.
    pub fn from_raw(kind: EffectKind, amplifier: i32, duration: i32) -> Self {
        let amplifier = amplifier.clamp(0, i32::from(u8::MAX)) as u8;
        let duration = match duration {
            -1 => EffectDuration::Infinite,
            d => EffectDuration::Ticks(d.max(0) as u32),
        };
        Self::new(kind, amplifier, duration)
    }

    /// Same effect with different display flags
    pub fn with_flags(mut self, ambient: bool, show_particles: bool, show_icon: bool) -> Self {
        self.ambient = ambient;
        self.show_particles = show_particles;
        self.show_icon = show_icon;
        self
    }

    /// Same effect with a different duration
    pub fn with_duration(mut self, duration: EffectDuration) -> Self {
        self.duration = duration;
        self
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn amplifier(&self) -> u8 {
        self.amplifier
    }

    /// Effect level as shown to players (amplifier + 1)
    pub fn level(&self) -> u32 {
        u32::from(self.amplifier) + 1
    }

    pub fn duration(&self) -> EffectDuration {
        self.duration
    }

    pub fn is_ambient(&self) -> bool {
        self.ambient
    }

    pub fn shows_particles(&self) -> bool {
        self.show_particles
    }

    pub fn shows_icon(&self) -> bool {
        self.show_icon
    }

    pub fn is_instant(&self) -> bool {
        self.kind.is_instant()
    }

    /// The value one tick later
    pub(crate) fn ticked(self) -> Self {
        self.with_duration(self.duration.tick_down())
    }
}
