//! Potion effect model
//!
//! Status effect values, per-entity effect bookkeeping, brewed potion tables,
//! color mixing, and the potion payload carried by tipped arrows.

pub mod carrier;
pub mod color;
pub mod effect;
pub mod manager;
pub mod potion_type;

pub use carrier::{PotionCarrier, ARROW_EFFECT_DURATION_DIVISOR};
pub use color::mix_colors;
pub use effect::{EffectCategory, EffectDuration, EffectKind, Rgb, StatusEffect};
pub use manager::{supersedes, EffectApplication, StatusManager};
pub use potion_type::PotionType;
