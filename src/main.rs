//! PvP Sandbox - scripted duel for the vanilla combat engine
//!
//! Usage: `pvp-sandbox [config.toml]`. Runs a sword exchange, a bow shot,
//! and a loyal trident throw, then prints a JSON report.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pvp_combat::{
    BlockSet, CombatEngine, DamageOutcome, DamageRequest, EnchantmentKind, EntityRegistry,
    Equipment, EquipmentSlot, ItemStack, LivingEntity, Material, PotionContents, PotionType,
    ProjectileEvent, ProjectileState, RecordingSink, ToolTier,
};
use pvp_core::{CombatConfig, DVec3, EntityId, MILLIS_PER_TICK};

/// Longest a projectile is followed before giving up
const MAX_FLIGHT_TICKS: u32 = 200;

#[derive(Debug, Serialize)]
struct HitReport {
    source: &'static str,
    final_amount: f32,
    absorbed: f32,
    knockback: DVec3,
    blocked: bool,
    ignored: bool,
    lethal: bool,
}

impl HitReport {
    fn new(source: &'static str, outcome: &DamageOutcome) -> Self {
        Self {
            source,
            final_amount: outcome.final_amount,
            absorbed: outcome.absorbed,
            knockback: outcome.knockback,
            blocked: outcome.blocked,
            ignored: outcome.ignored,
            lethal: outcome.lethal,
        }
    }
}

#[derive(Debug, Serialize)]
struct DuelReport {
    ruleset: String,
    hits: Vec<HitReport>,
    defender_health: f32,
    defender_effects: Vec<String>,
    trident_caught: bool,
    cues: usize,
}

fn load_config(path: Option<&Path>) -> Result<CombatConfig> {
    let Some(path) = path else {
        return Ok(CombatConfig::default());
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    CombatConfig::from_toml_str(&source)
        .with_context(|| format!("Invalid config {}", path.display()))
}

fn hits_in(events: &[ProjectileEvent], source: &'static str) -> Vec<HitReport> {
    events
        .iter()
        .filter_map(|event| match event {
            ProjectileEvent::HitEntity { outcome, .. } => Some(HitReport::new(source, outcome)),
            _ => None,
        })
        .collect()
}

fn run_duel(config: CombatConfig) -> Result<DuelReport> {
    let mut engine = CombatEngine::with_sink(config, pvp_combat::DEFAULT_SEED, RecordingSink::new());
    let mut entities = EntityRegistry::new();
    let world = BlockSet::with_floor(-1);

    let sword = ItemStack::of(Material::Sword(ToolTier::Diamond))
        .with_enchantment(EnchantmentKind::Sharpness, 2)
        .with_enchantment(EnchantmentKind::FireAspect, 1);
    let bow = ItemStack::of(Material::Bow).with_enchantment(EnchantmentKind::Power, 1);
    let trident = ItemStack::of(Material::Trident).with_enchantment(EnchantmentKind::Loyalty, 2);

    let attacker = entities.insert(
        LivingEntity::player()
            .with_facing(DVec3::X)
            .with_equipment(Equipment::new().with(EquipmentSlot::MainHand, sword)),
    );
    let defender = entities.insert(
        LivingEntity::player()
            .with_position(DVec3::new(2.5, 0.0, 0.0))
            .with_facing(DVec3::NEG_X)
            .with_equipment(Equipment::new().with(
                EquipmentSlot::Chestplate,
                ItemStack::of(Material::Armor(
                    pvp_combat::ArmorMaterial::Iron,
                    pvp_combat::ArmorPiece::Chestplate,
                )),
            )),
    );

    let mut hits = Vec::new();
    let weapon_damage = Material::Sword(ToolTier::Diamond).attack_damage(engine.config().ruleset);
    for swing in 0..3 {
        let outcome = engine
            .resolve_damage(&mut entities, &DamageRequest::melee(attacker, defender, weapon_damage))
            .context("Sword swing rejected")?;
        info!(swing, damage = outcome.final_amount, "Sword swing");
        hits.push(HitReport::new("sword", &outcome));
        for _ in 0..engine.config().invulnerability_ticks {
            entities.tick_all();
        }
    }

    swap_main_hand(&mut entities, attacker, bow)?;
    let ammo = ItemStack::tipped_arrow(PotionContents::of_type(PotionType::Poison));
    if let Some(mut arrow) = engine.shoot_arrow(&mut entities, attacker, &ammo, 20)? {
        let result = fly(&mut engine, &mut arrow, &mut entities, &world, |state| {
            state != ProjectileState::Flying
        });
        hits.extend(hits_in(&result, "arrow"));
    } else {
        warn!("Bow shot did not fire");
    }
    for _ in 0..engine.config().invulnerability_ticks {
        entities.tick_all();
    }

    swap_main_hand(&mut entities, attacker, trident)?;
    let mut trident_caught = false;
    if let Some(mut thrown) = engine.throw_trident(&mut entities, attacker)? {
        let events = fly(&mut engine, &mut thrown, &mut entities, &world, |state| {
            state == ProjectileState::Returning || state.is_terminal()
        });
        hits.extend(hits_in(&events, "trident"));
        if thrown.state() == ProjectileState::Returning {
            trident_caught = engine.pickup(&mut thrown, attacker, &mut entities);
        }
    }

    let target = entities
        .resolve(defender)
        .context("Defender vanished during the duel")?;
    Ok(DuelReport {
        ruleset: format!("{:?}", engine.config().ruleset),
        hits,
        defender_health: target.health,
        defender_effects: target
            .effects
            .iter()
            .map(|effect| effect.kind().name().to_string())
            .collect(),
        trident_caught,
        cues: engine.sink().cues.len(),
    })
}

/// Follow a projectile one tick at a time until `done` holds
fn fly<S: pvp_combat::PresentationSink>(
    engine: &mut CombatEngine<S>,
    projectile: &mut pvp_combat::Projectile,
    entities: &mut EntityRegistry,
    world: &BlockSet,
    done: impl Fn(ProjectileState) -> bool,
) -> Vec<ProjectileEvent> {
    let mut events = Vec::new();
    for _ in 0..MAX_FLIGHT_TICKS {
        let result = engine.advance_projectile(projectile, entities, world, MILLIS_PER_TICK);
        events.extend(result.events);
        entities.tick_all();
        if done(result.state) {
            break;
        }
    }
    events
}

fn swap_main_hand(entities: &mut EntityRegistry, id: EntityId, stack: ItemStack) -> Result<()> {
    let Some(entity) = entities.resolve_mut(id) else {
        bail!("Entity {id} is gone");
    };
    entity.equipment.set(EquipmentSlot::MainHand, stack);
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(Level::INFO.as_str())),
        )
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    let config_path = std::env::args().nth(1);
    let config = load_config(config_path.as_deref().map(Path::new))?;
    info!(ruleset = ?config.ruleset, "Starting PvP sandbox");

    let report = run_duel(config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
