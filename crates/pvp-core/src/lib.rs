//! PvP Core - Foundation types for the vanilla PvP combat engine
//!
//! This crate provides the types shared by every combat component:
//! - Vector primitives (re-exported from glam)
//! - Entity identifiers and the legacy/current ruleset switch
//! - The tick clock used to turn wall-clock deltas into discrete ticks
//! - Combat configuration with validation

pub mod config;
pub mod time;
pub mod types;

pub use config::{CombatConfig, CombatConfigBuilder, ConfigError, ConfigurationConflict};
pub use glam::{DVec3, IVec3};
pub use time::{TickClock, MILLIS_PER_TICK, TICKS_PER_SECOND};
pub use types::{EntityId, Ruleset};
