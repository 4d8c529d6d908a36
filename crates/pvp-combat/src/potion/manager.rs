//! Active status effects on a living entity
//!
//! One instance per effect kind. Re-applying a kind only replaces the stored
//! instance when the newcomer takes precedence (see [`supersedes`]).

use std::collections::BTreeMap;

use super::color::mix_colors;
use super::effect::{EffectKind, Rgb, StatusEffect};

/// What happened to an effect handed to [`StatusManager::apply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectApplication {
    /// No instance of the kind was active
    Added,
    /// The new instance replaced the active one
    Replaced,
    /// The active instance won; the new one was discarded
    Kept,
    /// Instant kinds are never stored
    Instant,
}

/// Whether `new` replaces `existing` of the same kind.
///
/// A strictly higher amplifier wins. At equal amplifier the longer remaining
/// duration wins. An ambient effect at an equal-or-higher amplifier also
/// replaces a non-ambient one.
pub fn supersedes(new: &StatusEffect, existing: &StatusEffect) -> bool {
    if new.amplifier() > existing.amplifier() {
        return true;
    }
    if new.amplifier() == existing.amplifier()
        && new.duration().is_longer_than(existing.duration())
    {
        return true;
    }
    !existing.is_ambient() && new.is_ambient() && new.amplifier() >= existing.amplifier()
}

/// Manages all active status effects on an entity
#[derive(Debug, Clone, Default)]
pub struct StatusManager {
    effects: BTreeMap<EffectKind, StatusEffect>,
}

impl StatusManager {
    /// Create a new empty status manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an effect, honoring precedence against an active instance
    pub fn apply(&mut self, effect: StatusEffect) -> EffectApplication {
        if effect.is_instant() {
            return EffectApplication::Instant;
        }
        match self.effects.get(&effect.kind()) {
            None => {
                self.effects.insert(effect.kind(), effect);
                EffectApplication::Added
            }
            Some(existing) if supersedes(&effect, existing) => {
                self.effects.insert(effect.kind(), effect);
                EffectApplication::Replaced
            }
            Some(_) => EffectApplication::Kept,
        }
    }

    /// Advance every effect by one tick. Returns the kinds that expired.
    pub fn tick(&mut self) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        for effect in self.effects.values_mut() {
            *effect = effect.ticked();
            if effect.duration().is_expired() {
                expired.push(effect.kind());
            }
        }
        for kind in &expired {
            self.effects.remove(kind);
        }
        expired
    }

    /// The active instance of a kind
    pub fn get(&self, kind: EffectKind) -> Option<&StatusEffect> {
        self.effects.get(&kind)
    }

    /// Amplifier of the active instance of a kind
    pub fn amplifier(&self, kind: EffectKind) -> Option<u8> {
        self.get(kind).map(StatusEffect::amplifier)
    }

    /// Check if a specific effect kind is active
    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects.contains_key(&kind)
    }

    /// Remove an effect, returning it
    pub fn remove(&mut self, kind: EffectKind) -> Option<StatusEffect> {
        self.effects.remove(&kind)
    }

    /// Active effects in kind order
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.values()
    }

    /// Combined display color of all active effects
    pub fn color(&self) -> Option<Rgb> {
        mix_colors(self.effects.values())
    }

    /// Remove all effects
    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Number of active effects
    pub fn count(&self) -> usize {
        self.effects.len()
    }
}
