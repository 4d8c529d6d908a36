//! Arrows and tridents
//!
//! A [`Projectile`] is created by [`launch`], advanced one tick at a time by
//! [`lifecycle`], and ends up picked up or removed. The shooter is held by
//! id only and resolved on every use.

pub mod arrow;
pub mod launch;
pub mod lifecycle;
pub mod physics;
pub mod trident;

use pvp_core::{DVec3, EntityId, IVec3, TickClock};

use crate::damage::DamageOutcome;
use crate::entity::GameMode;
use crate::enchantment::EnchantmentKind;
use crate::item::ItemStack;
use crate::potion::PotionCarrier;

pub use launch::{bow_power, launch_arrow, throw_trident, MIN_BOW_POWER};
pub use lifecycle::{advance, pickup, step, EFFECT_CLEAR_TICKS};

/// Stuck projectiles are removed after this many ticks
pub const DESPAWN_STUCK_TICKS: u32 = 1200;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileState {
    Flying,
    /// Embedded in a block, or lodged after hitting an entity
    Stuck,
    /// Loyalty homing; ignores collisions
    Returning,
    PickedUp,
    Removed(RemovalReason),
}

impl ProjectileState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::PickedUp | Self::Removed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// Stuck for too long
    Despawned,
    /// Embedded in the entity it hit
    HitEntity,
    /// Bounced off a hit that did not land and slowed to a stop
    Deflected,
    /// A returning trident's owner is gone
    OwnerLost,
    /// Removed by the host
    Discarded,
}

/// Who may pick a stuck projectile up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupPolicy {
    Disallowed,
    Allowed,
    CreativeOnly,
}

impl PickupPolicy {
    pub fn permits(self, game_mode: GameMode) -> bool {
        match self {
            Self::Disallowed => false,
            Self::Allowed => true,
            Self::CreativeOnly => game_mode == GameMode::Creative,
        }
    }
}

/// Arrow-specific state
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowData {
    pub carrier: PotionCarrier,
    /// Damage per block per tick of speed
    pub base_damage: f64,
    /// Fully charged shot
    pub critical: bool,
    /// Punch level
    pub punch: u8,
    /// Flame sets the target on fire
    pub flame: bool,
}

impl Default for ArrowData {
    fn default() -> Self {
        Self {
            carrier: PotionCarrier::empty(),
            base_damage: arrow::BASE_DAMAGE,
            critical: false,
            punch: 0,
            flame: false,
        }
    }
}

/// Trident-specific state
#[derive(Debug, Clone, PartialEq)]
pub struct TridentData {
    /// The thrown item, handed back on pickup
    pub item: ItemStack,
    pub loyalty: u8,
    /// The return cue has been played
    pub return_announced: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectileKind {
    Arrow(ArrowData),
    Trident(TridentData),
}

/// Something that happened to a projectile during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectileEvent {
    HitBlock {
        block: IVec3,
        position: DVec3,
    },
    HitEntity {
        target: EntityId,
        outcome: DamageOutcome,
    },
    /// The hit did not land and the projectile bounced off
    Deflected {
        target: EntityId,
    },
    /// Carried potion effects wore off
    EffectsCleared,
    /// Lost its supporting block
    Dislodged,
    ReturnStarted,
    Removed {
        reason: RemovalReason,
        /// Item dropped in the world, if pickup was allowed
        dropped: Option<ItemStack>,
    },
}

/// Result of advancing a projectile by a time delta
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileTickResult {
    pub state: ProjectileState,
    /// Ticks simulated for the delta
    pub ticks: u32,
    pub events: Vec<ProjectileEvent>,
}

/// An arrow or trident in the world
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: EntityId,
    pub kind: ProjectileKind,
    pub position: DVec3,
    /// Blocks per tick
    pub velocity: DVec3,
    pub pickup: PickupPolicy,
    pub(crate) shooter: Option<EntityId>,
    pub(crate) state: ProjectileState,
    pub(crate) stuck_ticks: u32,
    pub(crate) age: u32,
    /// Block holding a stuck projectile
    pub(crate) stuck_in: Option<IVec3>,
    pub(crate) has_dealt_damage: bool,
    pub(crate) clock: TickClock,
}

impl Projectile {
    pub fn new(kind: ProjectileKind, shooter: Option<EntityId>, position: DVec3, velocity: DVec3) -> Self {
        Self {
            id: EntityId::new(),
            kind,
            position,
            velocity,
            pickup: PickupPolicy::Allowed,
            shooter,
            state: ProjectileState::Flying,
            stuck_ticks: 0,
            age: 0,
            stuck_in: None,
            has_dealt_damage: false,
            clock: TickClock::new(),
        }
    }

    pub fn arrow(data: ArrowData, shooter: Option<EntityId>, position: DVec3, velocity: DVec3) -> Self {
        Self::new(ProjectileKind::Arrow(data), shooter, position, velocity)
    }

    pub fn trident(item: ItemStack, shooter: Option<EntityId>, position: DVec3, velocity: DVec3) -> Self {
        let loyalty = item.enchantment_level(EnchantmentKind::Loyalty);
        let data = TridentData {
            item,
            loyalty,
            return_announced: false,
        };
        Self::new(ProjectileKind::Trident(data), shooter, position, velocity)
    }

    pub fn with_pickup(mut self, pickup: PickupPolicy) -> Self {
        self.pickup = pickup;
        self
    }

    pub fn state(&self) -> ProjectileState {
        self.state
    }

    /// Id of the entity that fired the projectile. It may no longer exist.
    pub fn shooter(&self) -> Option<EntityId> {
        self.shooter
    }

    pub fn stuck_ticks(&self) -> u32 {
        self.stuck_ticks
    }

    /// Ticks simulated so far
    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn stuck_in(&self) -> Option<IVec3> {
        self.stuck_in
    }

    pub fn has_dealt_damage(&self) -> bool {
        self.has_dealt_damage
    }

    pub fn is_trident(&self) -> bool {
        matches!(self.kind, ProjectileKind::Trident(_))
    }

    pub fn carrier(&self) -> Option<&PotionCarrier> {
        match &self.kind {
            ProjectileKind::Arrow(arrow) => Some(&arrow.carrier),
            ProjectileKind::Trident(_) => None,
        }
    }

    /// Mutable access to an arrow's potion payload
    pub fn carrier_mut(&mut self) -> Option<&mut PotionCarrier> {
        match &mut self.kind {
            ProjectileKind::Arrow(arrow) => Some(&mut arrow.carrier),
            ProjectileKind::Trident(_) => None,
        }
    }

    pub fn loyalty(&self) -> u8 {
        match &self.kind {
            ProjectileKind::Trident(trident) => trident.loyalty,
            ProjectileKind::Arrow(_) => 0,
        }
    }

    /// The item the projectile turns back into
    pub fn pickup_item(&self) -> ItemStack {
        match &self.kind {
            ProjectileKind::Arrow(arrow) => arrow.carrier.to_pickup_item(),
            ProjectileKind::Trident(trident) => trident.item.clone(),
        }
    }

    /// Remove the projectile from outside the tick loop
    pub fn discard(&mut self) {
        if !self.state.is_terminal() {
            self.state = ProjectileState::Removed(RemovalReason::Discarded);
        }
    }

    /// Loyal tridents that can be picked up never despawn
    pub(crate) fn despawns(&self) -> bool {
        !(self.loyalty() > 0 && self.pickup == PickupPolicy::Allowed)
    }

    /// Item dropped when the projectile is removed without pickup
    pub(crate) fn drop_item(&self) -> Option<ItemStack> {
        (self.pickup == PickupPolicy::Allowed).then(|| self.pickup_item())
    }

    pub(crate) fn remove(&mut self, reason: RemovalReason, events: &mut Vec<ProjectileEvent>) {
        let dropped = match reason {
            RemovalReason::Deflected | RemovalReason::OwnerLost => self.drop_item(),
            _ => None,
        };
        self.state = ProjectileState::Removed(reason);
        events.push(ProjectileEvent::Removed { reason, dropped });
    }

    pub(crate) fn stick(&mut self, block: Option<IVec3>) {
        self.state = ProjectileState::Stuck;
        self.stuck_in = block;
        self.stuck_ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Material, PotionContents};
    use crate::potion::PotionType;
    use pvp_core::Ruleset;

    #[test]
    fn test_pickup_policy() {
        assert!(PickupPolicy::Allowed.permits(GameMode::Survival));
        assert!(!PickupPolicy::CreativeOnly.permits(GameMode::Survival));
        assert!(PickupPolicy::CreativeOnly.permits(GameMode::Creative));
        assert!(!PickupPolicy::Disallowed.permits(GameMode::Creative));
    }

    #[test]
    fn test_trident_reads_loyalty() {
        let item = ItemStack::of(Material::Trident).with_enchantment(EnchantmentKind::Loyalty, 3);
        let trident = Projectile::trident(item, None, DVec3::ZERO, DVec3::X);
        assert_eq!(trident.loyalty(), 3);
        assert!(!trident.despawns());
        assert!(trident.with_pickup(PickupPolicy::CreativeOnly).despawns());
    }

    #[test]
    fn test_pickup_item_restores_tipped_arrow() {
        let stack = ItemStack::tipped_arrow(PotionContents::of_type(PotionType::Poison));
        let data = ArrowData {
            carrier: PotionCarrier::from_item(&stack, Ruleset::Current),
            ..ArrowData::default()
        };
        let arrow = Projectile::arrow(data, None, DVec3::ZERO, DVec3::X);
        assert_eq!(arrow.pickup_item(), stack);
    }

    #[test]
    fn test_discard_is_final() {
        let mut arrow = Projectile::arrow(ArrowData::default(), None, DVec3::ZERO, DVec3::X);
        arrow.discard();
        assert_eq!(arrow.state(), ProjectileState::Removed(RemovalReason::Discarded));
        arrow.state = ProjectileState::PickedUp;
        arrow.discard();
        assert_eq!(arrow.state(), ProjectileState::PickedUp);
    }
}
