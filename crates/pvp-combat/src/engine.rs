//! Combat engine facade
//!
//! [`CombatEngine`] owns the configuration, the enchantment registry, the
//! item-damage rules, and the random source, and forwards presentation cues
//! to a [`PresentationSink`] after every call.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use pvp_core::{CombatConfig, EntityId};

use crate::damage::{self, CombatContext, DamageOutcome, DamageRequest};
use crate::durability::{ItemDamage, VanillaItemDamage};
use crate::enchantment::EnchantmentRegistry;
use crate::entity::EntityRegistry;
use crate::error::CombatError;
use crate::item::{ItemStack, Material};
use crate::projectile::{self, Projectile, ProjectileEvent, ProjectileTickResult};
use crate::world::{BlockWorld, Cue, NullSink, PresentationSink};

/// Seed used by [`CombatEngine::new`]
pub const DEFAULT_SEED: u64 = 0x5eed_c0de_b0b5_1e55;

/// Durability a bow or trident loses per use
const LAUNCH_WEAR: u32 = 1;

pub struct CombatEngine<S: PresentationSink = NullSink> {
    config: CombatConfig,
    enchantments: EnchantmentRegistry,
    item_damage: Box<dyn ItemDamage>,
    rng: StdRng,
    sink: S,
    pending: Vec<Cue>,
}

impl CombatEngine {
    /// Engine with vanilla enchantments and durability, seeded from
    /// [`DEFAULT_SEED`]
    pub fn new(config: CombatConfig) -> Self {
        Self::with_seed(config, DEFAULT_SEED)
    }

    pub fn with_seed(config: CombatConfig, seed: u64) -> Self {
        Self::with_sink(config, seed, NullSink)
    }
}

impl<S: PresentationSink> CombatEngine<S> {
    pub fn with_sink(config: CombatConfig, seed: u64, sink: S) -> Self {
        info!(ruleset = ?config.ruleset, seed, "Combat engine ready");
        Self {
            config,
            enchantments: EnchantmentRegistry::vanilla(),
            item_damage: Box::new(VanillaItemDamage),
            rng: StdRng::seed_from_u64(seed),
            sink,
            pending: Vec::new(),
        }
    }

    /// Replace the enchantment registry
    pub fn with_enchantments(mut self, enchantments: EnchantmentRegistry) -> Self {
        self.enchantments = enchantments;
        self
    }

    /// Replace the durability rules
    pub fn with_item_damage(mut self, item_damage: impl ItemDamage + 'static) -> Self {
        self.item_damage = Box::new(item_damage);
        self
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn enchantments(&self) -> &EnchantmentRegistry {
        &self.enchantments
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Run `f` with a context borrowing the engine, then flush its cues
    fn with_context<T>(&mut self, f: impl FnOnce(&mut CombatContext<'_>) -> T) -> T {
        let result = {
            let mut ctx = CombatContext {
                config: &self.config,
                enchantments: &self.enchantments,
                item_damage: self.item_damage.as_ref(),
                rng: &mut self.rng,
                cues: &mut self.pending,
            };
            f(&mut ctx)
        };
        self.flush();
        result
    }

    fn flush(&mut self) {
        let sounds = self.config.sounds_enabled;
        for cue in self.pending.drain(..) {
            if sounds || !cue.is_sound() {
                self.sink.emit(cue);
            }
        }
    }

    /// Resolve one hit. See [`damage::resolve_damage`].
    pub fn resolve_damage(
        &mut self,
        entities: &mut EntityRegistry,
        request: &DamageRequest,
    ) -> Result<DamageOutcome, CombatError> {
        self.with_context(|ctx| damage::resolve_damage(ctx, entities, request))
    }

    /// Advance a projectile by a wall-clock delta
    pub fn advance_projectile(
        &mut self,
        projectile: &mut Projectile,
        entities: &mut EntityRegistry,
        world: &dyn BlockWorld,
        tick_delta_ms: u64,
    ) -> ProjectileTickResult {
        self.with_context(|ctx| projectile::advance(ctx, projectile, entities, world, tick_delta_ms))
    }

    /// Run exactly one projectile tick
    pub fn step_projectile(
        &mut self,
        projectile: &mut Projectile,
        entities: &mut EntityRegistry,
        world: &dyn BlockWorld,
    ) -> Vec<ProjectileEvent> {
        let mut events = Vec::new();
        self.with_context(|ctx| projectile::step(ctx, projectile, entities, world, &mut events));
        events
    }

    /// Let `actor` pick a projectile up
    pub fn pickup(
        &mut self,
        projectile: &mut Projectile,
        actor: EntityId,
        entities: &mut EntityRegistry,
    ) -> bool {
        self.with_context(|ctx| projectile::pickup(ctx, projectile, actor, entities))
    }

    /// Fire `ammo` from the bow `shooter` holds after drawing for
    /// `charge_ticks`.
    ///
    /// Returns `Ok(None)` when the shooter holds no bow or the shot is too
    /// weak. The bow wears by one point; spending the ammo is the caller's
    /// concern.
    pub fn shoot_arrow(
        &mut self,
        entities: &mut EntityRegistry,
        shooter: EntityId,
        ammo: &ItemStack,
        charge_ticks: u32,
    ) -> Result<Option<Projectile>, CombatError> {
        let entity = entities
            .resolve_mut(shooter)
            .ok_or(CombatError::UnresolvedReference(shooter))?;
        let Some(slot) = entity.equipment.holds(|stack| stack.material() == Material::Bow) else {
            debug!(shooter = %shooter, "No bow in hand");
            return Ok(None);
        };
        let bow = entity.equipment.get(slot).clone();
        let ruleset = self.config.ruleset;
        let Some(arrow) =
            projectile::launch_arrow(entity, &bow, ammo, charge_ticks, ruleset, &mut self.rng)
        else {
            return Ok(None);
        };

        let position = arrow.position;
        self.with_context(|ctx| {
            ctx.wear_item(entity, slot, LAUNCH_WEAR);
            ctx.cue(Cue::ProjectileLaunched {
                position,
                trident: false,
            });
        });
        Ok(Some(arrow))
    }

    /// Throw the trident `shooter` holds. The hand is emptied unless the
    /// shooter is in creative mode.
    pub fn throw_trident(
        &mut self,
        entities: &mut EntityRegistry,
        shooter: EntityId,
    ) -> Result<Option<Projectile>, CombatError> {
        let entity = entities
            .resolve_mut(shooter)
            .ok_or(CombatError::UnresolvedReference(shooter))?;
        let Some(slot) = entity.equipment.holds(|stack| stack.material() == Material::Trident) else {
            debug!(shooter = %shooter, "No trident in hand");
            return Ok(None);
        };

        let ruleset = self.config.ruleset;
        self.with_context(|ctx| ctx.wear_item(entity, slot, LAUNCH_WEAR));
        if entity.equipment.get(slot).is_air() {
            // Broke on release
            return Ok(None);
        }
        let item = entity.equipment.get(slot).clone();
        let trident = projectile::throw_trident(entity, &item, ruleset, &mut self.rng);
        if !entity.game_mode.is_damage_immune() {
            entity.equipment.clear(slot);
        }

        let position = trident.position;
        self.with_context(|ctx| {
            ctx.cue(Cue::ProjectileLaunched {
                position,
                trident: true,
            })
        });
        Ok(Some(trident))
    }
}
