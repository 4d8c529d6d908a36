//! Damage resolution
//!
//! A [`DamageRequest`] goes through the pipeline once and comes back as a
//! [`DamageOutcome`]. Mitigation formulas live in [`armor`] and
//! [`knockback`]; the ordered steps live in [`pipeline`].

pub mod armor;
pub mod category;
pub mod knockback;
pub mod pipeline;

use pvp_core::{DVec3, EntityId};

pub use category::DamageCategory;
pub use pipeline::{deliver_effect, resolve_damage, CombatContext};

/// One hit, consumed by the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct DamageRequest {
    pub category: DamageCategory,
    pub raw_amount: f32,
    pub attacker: Option<EntityId>,
    pub defender: EntityId,
    /// Where the hit came from, when that is not the attacker (projectiles,
    /// explosions)
    pub source_position: Option<DVec3>,
    /// Delivered as part of a hit that already landed: passes the window
    /// that hit opened and adds no knockback of its own
    pub follow_up: bool,
}

impl DamageRequest {
    pub fn new(category: DamageCategory, raw_amount: f32, defender: EntityId) -> Self {
        Self {
            category,
            raw_amount,
            attacker: None,
            defender,
            source_position: None,
            follow_up: false,
        }
    }

    /// A melee hit with the attacker's attack damage
    pub fn melee(attacker: EntityId, defender: EntityId, raw_amount: f32) -> Self {
        Self::new(DamageCategory::Melee, raw_amount, defender).with_attacker(attacker)
    }

    pub fn with_attacker(mut self, attacker: EntityId) -> Self {
        self.attacker = Some(attacker);
        self
    }

    pub fn with_source_position(mut self, position: DVec3) -> Self {
        self.source_position = Some(position);
        self
    }

    pub fn as_follow_up(mut self) -> Self {
        self.follow_up = true;
        self
    }
}

/// Result of one hit
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageOutcome {
    /// Damage dealt after every reduction, absorption hearts included
    pub final_amount: f32,
    /// Part of `final_amount` taken by absorption hearts
    pub absorbed: f32,
    /// Velocity change applied to the defender
    pub knockback: DVec3,
    pub lethal: bool,
    /// A raised shield met the hit
    pub blocked: bool,
    /// The hit disabled the defender's shield
    pub shield_disabled: bool,
    /// Dropped without effect: invulnerability window, immunity, or a dead
    /// defender
    pub ignored: bool,
}

impl DamageOutcome {
    /// A hit that had no effect at all
    pub fn ignored() -> Self {
        Self {
            ignored: true,
            ..Self::default()
        }
    }

    /// Whether the defender took the hit. Fully blocked and ignored hits did
    /// not land.
    pub fn landed(&self) -> bool {
        !self.ignored && !(self.blocked && self.final_amount <= 0.0)
    }
}
