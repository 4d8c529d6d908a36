//! Living entity state read and mutated by combat resolution

use tracing::trace;

use pvp_core::{DVec3, EntityId};

use super::equipment::Equipment;
use super::{EntityGroup, GameMode};
use crate::item::ItemStack;
use crate::potion::{EffectApplication, EffectKind, StatusEffect, StatusManager};

pub const PLAYER_MAX_HEALTH: f32 = 20.0;
pub const PLAYER_EYE_HEIGHT: f64 = 1.62;
pub const PLAYER_WIDTH: f64 = 0.6;
pub const PLAYER_HEIGHT: f64 = 1.8;

/// Health healed by Instant Health at amplifier 0
const INSTANT_HEAL_BASE: u32 = 4;
/// Damage dealt by Instant Damage at amplifier 0
const INSTANT_DAMAGE_BASE: u32 = 6;
/// Absorption hearts granted per Absorption level
const ABSORPTION_PER_LEVEL: f32 = 4.0;

/// A living entity taking part in combat
#[derive(Debug, Clone)]
pub struct LivingEntity {
    pub id: EntityId,
    pub group: EntityGroup,
    /// Feet position
    pub position: DVec3,
    pub velocity: DVec3,
    /// Unit look direction
    pub facing: DVec3,
    pub eye_height: f64,
    pub width: f64,
    pub height: f64,
    pub health: f32,
    pub max_health: f32,
    pub absorption: f32,
    pub equipment: Equipment,
    pub effects: StatusManager,
    /// Armor points from sources other than equipment
    pub base_armor: f32,
    pub base_toughness: f32,
    pub base_knockback_resistance: f32,
    pub sprinting: bool,
    pub sneaking: bool,
    /// Raising a shield
    pub blocking: bool,
    pub on_ground: bool,
    pub game_mode: GameMode,
    /// Remaining post-hit invulnerability
    pub invulnerable_ticks: u32,
    pub fire_ticks: u32,
    /// Ticks until a disabled shield can block again
    pub shield_cooldown: u32,
    pub dead: bool,
    /// Externally removed from the world
    pub removed: bool,
    pub exhaustion: f32,
    pub inventory: Vec<ItemStack>,
    /// Arrows embedded in the body (cosmetic)
    pub arrows_in_body: u32,
}

impl LivingEntity {
    /// A living entity with player-sized dimensions
    pub fn new(id: EntityId, group: EntityGroup) -> Self {
        Self {
            id,
            group,
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            facing: DVec3::Z,
            eye_height: PLAYER_EYE_HEIGHT,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            absorption: 0.0,
            equipment: Equipment::new(),
            effects: StatusManager::new(),
            base_armor: 0.0,
            base_toughness: 0.0,
            base_knockback_resistance: 0.0,
            sprinting: false,
            sneaking: false,
            blocking: false,
            on_ground: true,
            game_mode: GameMode::Survival,
            invulnerable_ticks: 0,
            fire_ticks: 0,
            shield_cooldown: 0,
            dead: false,
            removed: false,
            exhaustion: 0.0,
            inventory: Vec::new(),
            arrows_in_body: 0,
        }
    }

    /// A survival player with a fresh id
    pub fn player() -> Self {
        Self::new(EntityId::new(), EntityGroup::Default)
    }

    pub fn with_position(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    /// Face a direction; a zero vector keeps the current facing
    pub fn with_facing(mut self, facing: DVec3) -> Self {
        self.facing = facing.try_normalize().unwrap_or(self.facing);
        self
    }

    pub fn with_equipment(mut self, equipment: Equipment) -> Self {
        self.equipment = equipment;
        self
    }

    pub fn with_game_mode(mut self, game_mode: GameMode) -> Self {
        self.game_mode = game_mode;
        self
    }

    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health;
        self.max_health = self.max_health.max(health);
        self
    }

    /// Turn to look at a point
    pub fn look_at(&mut self, target: DVec3) {
        if let Some(direction) = (target - self.eye_position()).try_normalize() {
            self.facing = direction;
        }
    }

    pub fn eye_position(&self) -> DVec3 {
        self.position + DVec3::new(0.0, self.eye_height, 0.0)
    }

    /// Axis-aligned bounding box as (min, max)
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let half = self.width / 2.0;
        (
            self.position - DVec3::new(half, 0.0, half),
            self.position + DVec3::new(half, self.height, half),
        )
    }

    /// Total armor attribute
    pub fn armor(&self) -> f32 {
        self.base_armor + self.equipment.armor_points()
    }

    /// Total armor toughness attribute
    pub fn armor_toughness(&self) -> f32 {
        self.base_toughness + self.equipment.armor_toughness()
    }

    /// Total knockback resistance in `0.0..=1.0`
    pub fn knockback_resistance(&self) -> f32 {
        (self.base_knockback_resistance + self.equipment.knockback_resistance()).clamp(0.0, 1.0)
    }

    pub fn is_alive(&self) -> bool {
        !self.dead && !self.removed
    }

    pub fn is_spectator(&self) -> bool {
        self.game_mode == GameMode::Spectator
    }

    pub fn is_on_fire(&self) -> bool {
        self.fire_ticks > 0
    }

    /// Set on fire for at least `ticks` ticks
    pub fn ignite(&mut self, ticks: u32) {
        self.fire_ticks = self.fire_ticks.max(ticks);
    }

    pub fn heal(&mut self, amount: f32) {
        if self.is_alive() && amount > 0.0 {
            self.health = (self.health + amount).min(self.max_health);
        }
    }

    /// Take damage, absorption hearts first. Returns the amount absorbed.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || amount <= 0.0 {
            return 0.0;
        }
        let absorbed = amount.min(self.absorption);
        self.absorption -= absorbed;
        self.health -= amount - absorbed;
        if self.health <= 0.0 {
            self.health = 0.0;
            self.dead = true;
        }
        absorbed
    }

    pub fn add_exhaustion(&mut self, amount: f32) {
        self.exhaustion += amount;
    }

    /// Hand an item to the entity
    pub fn give(&mut self, stack: ItemStack) {
        if !stack.is_air() {
            self.inventory.push(stack);
        }
    }

    /// Apply a status effect. Other than instant harm, instant kinds take
    /// effect immediately, scaled by `potency`; other kinds are stored by
    /// precedence.
    ///
    /// Instant harm is magic damage and must go through the damage pipeline,
    /// see [`crate::damage::pipeline::deliver_effect`] and
    /// [`LivingEntity::instant_harm`].
    pub fn add_effect(&mut self, effect: StatusEffect, potency: f64) -> EffectApplication {
        let outcome = self.effects.apply(effect);
        match outcome {
            EffectApplication::Instant => self.apply_instant(&effect, potency),
            EffectApplication::Added | EffectApplication::Replaced
                if effect.kind() == EffectKind::Absorption =>
            {
                self.absorption = ABSORPTION_PER_LEVEL * effect.level() as f32;
            }
            _ => {}
        }
        outcome
    }

    /// Advance per-entity timers by one tick
    pub fn tick(&mut self) {
        self.invulnerable_ticks = self.invulnerable_ticks.saturating_sub(1);
        self.fire_ticks = self.fire_ticks.saturating_sub(1);
        self.shield_cooldown = self.shield_cooldown.saturating_sub(1);

        let absorption_level = self.effects.get(EffectKind::Absorption).map(StatusEffect::level);
        for kind in self.effects.tick() {
            trace!(entity = %self.id, effect = kind.name(), "Effect expired");
            if kind == EffectKind::Absorption {
                let granted = ABSORPTION_PER_LEVEL * absorption_level.unwrap_or(0) as f32;
                self.absorption = (self.absorption - granted).max(0.0);
            }
        }
    }

    /// Magic damage an instant effect deals to this entity, or `None` when
    /// it heals or is not instant
    pub fn instant_harm(&self, effect: &StatusEffect, potency: f64) -> Option<f32> {
        let undead = self.group == EntityGroup::Undead;
        let harms = match effect.kind() {
            EffectKind::InstantHealth => undead,
            EffectKind::InstantDamage => !undead,
            _ => false,
        };
        harms.then(|| {
            let amplifier = u32::from(effect.amplifier()).min(31);
            (f64::from(INSTANT_DAMAGE_BASE << amplifier) * potency) as f32
        })
    }

    fn apply_instant(&mut self, effect: &StatusEffect, potency: f64) {
        let amplifier = u32::from(effect.amplifier()).min(31);
        let heal = (f64::from(INSTANT_HEAL_BASE << amplifier) * potency) as f32;
        let undead = self.group == EntityGroup::Undead;
        match effect.kind() {
            EffectKind::InstantHealth if !undead => self.heal(heal),
            EffectKind::InstantDamage if undead => self.heal(heal),
            // Harm is dealt by the pipeline, hunger is not modelled
            _ => {}
        }
    }
}
