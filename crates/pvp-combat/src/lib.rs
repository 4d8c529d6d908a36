//! PvP Combat - Vanilla-accurate combat resolution
//!
//! This crate decides what happens when one entity hurts another:
//! - Potion effects, their precedence, and tipped-arrow payloads
//! - The enchantment registry and equipment aggregation
//! - The damage pipeline (shields, armor, protection, knockback, reactions)
//! - Arrow and trident flight, impact, loyalty, and pickup
//!
//! [`CombatEngine`] is the entry point; the modules below are usable on
//! their own with a hand-built [`CombatContext`].

pub mod damage;
pub mod durability;
pub mod enchantment;
pub mod engine;
pub mod entity;
pub mod error;
pub mod item;
pub mod potion;
pub mod projectile;
pub mod world;

pub use damage::{deliver_effect, CombatContext, DamageCategory, DamageOutcome, DamageRequest};
pub use durability::{BrokenItem, ItemDamage, VanillaItemDamage};
pub use enchantment::{EnchantmentKind, EnchantmentRegistry};
pub use engine::{CombatEngine, DEFAULT_SEED};
pub use entity::{EntityGroup, EntityRegistry, Equipment, EquipmentSlot, GameMode, LivingEntity};
pub use error::{CombatError, InvalidRequest};
pub use item::{ArmorMaterial, ArmorPiece, ItemStack, Material, PotionContents, ToolTier};
pub use potion::{EffectDuration, EffectKind, PotionCarrier, PotionType, Rgb, StatusEffect};
pub use projectile::{
    ArrowData, PickupPolicy, Projectile, ProjectileEvent, ProjectileKind, ProjectileState,
    ProjectileTickResult, RemovalReason,
};
pub use world::{BlockSet, BlockWorld, Cue, NullSink, PresentationSink, RecordingSink};
