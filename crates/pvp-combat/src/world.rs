//! Collaborators at the edge of the combat engine: block lookup for
//! projectile collision, and the fire-and-forget presentation sink.

use std::collections::HashSet;

use pvp_core::{DVec3, EntityId, IVec3};

use crate::damage::DamageCategory;
use crate::entity::EquipmentSlot;
use crate::item::Material;

/// Block lookup used by projectile collision
pub trait BlockWorld {
    /// Whether the block at integer coordinates stops projectiles
    fn is_solid(&self, block: IVec3) -> bool;
}

/// A set of solid blocks, optionally above a solid floor
#[derive(Debug, Clone, Default)]
pub struct BlockSet {
    solid: HashSet<IVec3>,
    floor: Option<i32>,
}

impl BlockSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every block at or below `y` is solid
    pub fn with_floor(y: i32) -> Self {
        Self {
            floor: Some(y),
            ..Self::default()
        }
    }

    pub fn insert(&mut self, block: IVec3) {
        self.solid.insert(block);
    }

    /// Remove a placed block. Floor blocks cannot be removed.
    pub fn remove(&mut self, block: IVec3) -> bool {
        self.solid.remove(&block)
    }
}

impl BlockWorld for BlockSet {
    fn is_solid(&self, block: IVec3) -> bool {
        self.floor.is_some_and(|floor| block.y <= floor) || self.solid.contains(&block)
    }
}

/// Presentation cues emitted while resolving combat
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    Hurt {
        entity: EntityId,
        category: DamageCategory,
    },
    Death {
        entity: EntityId,
    },
    ShieldBlock {
        entity: EntityId,
    },
    ShieldDisabled {
        entity: EntityId,
    },
    ItemBroken {
        owner: EntityId,
        slot: EquipmentSlot,
        material: Material,
    },
    /// Sweep particles at the attacker
    SweepParticles {
        attacker: EntityId,
    },
    /// Critical-hit particles trailing an arrow
    CriticalTrail {
        position: DVec3,
    },
    ProjectileLaunched {
        position: DVec3,
        trident: bool,
    },
    ArrowHitBlock {
        position: DVec3,
    },
    /// The ding a shooter hears when an arrow hits a player
    ArrowHitEntity {
        shooter: Option<EntityId>,
        target: EntityId,
    },
    TridentHitBlock {
        position: DVec3,
    },
    TridentHitEntity {
        target: EntityId,
    },
    TridentReturn {
        position: DVec3,
    },
    ItemPickup {
        actor: EntityId,
    },
}

impl Cue {
    /// Whether the cue is a sound (as opposed to particles)
    pub fn is_sound(&self) -> bool {
        !matches!(self, Self::SweepParticles { .. } | Self::CriticalTrail { .. })
    }
}

/// Receives presentation cues. Nothing is ever read back.
pub trait PresentationSink {
    fn emit(&mut self, cue: Cue);
}

/// Discards every cue
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn emit(&mut self, _cue: Cue) {}
}

/// Keeps every cue in order, for inspection
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub cues: Vec<Cue>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the recorded cues, leaving the sink empty
    pub fn drain(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }
}

impl PresentationSink for RecordingSink {
    fn emit(&mut self, cue: Cue) {
        self.cues.push(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_is_solid_below() {
        let world = BlockSet::with_floor(0);
        assert!(world.is_solid(IVec3::new(5, 0, -3)));
        assert!(world.is_solid(IVec3::new(5, -10, -3)));
        assert!(!world.is_solid(IVec3::new(5, 1, -3)));
    }

    #[test]
    fn test_placed_blocks() {
        let mut world = BlockSet::new();
        let block = IVec3::new(1, 2, 3);
        world.insert(block);
        assert!(world.is_solid(block));
        assert!(world.remove(block));
        assert!(!world.is_solid(block));
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let mut sink = RecordingSink::new();
        let entity = EntityId::from_u128(9);
        sink.emit(Cue::ShieldBlock { entity });
        sink.emit(Cue::Death { entity });
        assert_eq!(
            sink.drain(),
            vec![Cue::ShieldBlock { entity }, Cue::Death { entity }]
        );
        assert!(sink.cues.is_empty());
    }

    #[test]
    fn test_particles_are_not_sounds() {
        let cue = Cue::SweepParticles {
            attacker: EntityId::from_u128(1),
        };
        assert!(!cue.is_sound());
        assert!(Cue::Death { entity: EntityId::from_u128(1) }.is_sound());
    }
}
