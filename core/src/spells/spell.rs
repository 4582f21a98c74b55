//! Spell definitions and the behaviors that run on each release.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use hashbrown::HashMap;

use crate::caster::CasterId;

/// Animation trigger used when a spell does not name its own.
pub const DEFAULT_CAST_TRIGGER: &str = "CastProjectileRight";

/// What a behavior does to the world on one release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpellImpact {
    Damage { target: CasterId, amount: f32 },
    Heal { target: CasterId, amount: f32 },
    Shield { target: CasterId, duration: Duration },
}

/// Behavior invoked once per release of a queued cast.
pub trait SpellBehavior: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Compute the impacts of one release. `target` is the caster's designated
    /// opponent, absent if none is registered.
    fn release(&self, spell: &Spell, caster: CasterId, target: Option<CasterId>) -> Vec<SpellImpact>;
}

/// Immutable spell definition shared by the spellbook and the cast queues.
#[derive(Debug, Clone)]
pub struct Spell {
    pub name: String,
    pub mana_cost: f32,
    pub damage: f32,
    /// Number of release keyframes per cast. Zero means animation only.
    pub release_count: u32,
    pub lifetime: Duration,
    /// Resolved behavior; `None` if the definition named nothing we know.
    pub behavior: Option<Arc<dyn SpellBehavior>>,
    pub cast_trigger: Option<String>,
}

impl Spell {
    /// Animation trigger to fire when this spell is cast.
    pub fn trigger_name(&self) -> &str {
        match self.cast_trigger.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_CAST_TRIGGER,
        }
    }

    /// Mana deducted on each release.
    pub fn mana_per_release(&self) -> f32 {
        if self.release_count == 0 {
            0.0
        } else {
            self.mana_cost / self.release_count as f32
        }
    }
}

/// Damage dealt straight to the target. Used for projectiles, slashes and
/// ground waves alike.
#[derive(Debug)]
pub struct DirectDamage {
    name: &'static str,
}

impl DirectDamage {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl SpellBehavior for DirectDamage {
    fn name(&self) -> &str {
        self.name
    }

    fn release(&self, spell: &Spell, caster: CasterId, target: Option<CasterId>) -> Vec<SpellImpact> {
        let Some(target) = target else {
            tracing::error!(spell = %spell.name, %caster, "no target registered for damage spell");
            return Vec::new();
        };
        vec![SpellImpact::Damage {
            target,
            amount: spell.damage,
        }]
    }
}

/// Heals the caster by the spell's damage value.
#[derive(Debug)]
pub struct SelfHeal;

impl SpellBehavior for SelfHeal {
    fn name(&self) -> &str {
        "heal"
    }

    fn release(&self, spell: &Spell, caster: CasterId, _target: Option<CasterId>) -> Vec<SpellImpact> {
        vec![SpellImpact::Heal {
            target: caster,
            amount: spell.damage,
        }]
    }
}

/// Raises the caster's shield for the spell's lifetime.
#[derive(Debug)]
pub struct SelfShield;

impl SpellBehavior for SelfShield {
    fn name(&self) -> &str {
        "shield"
    }

    fn release(&self, spell: &Spell, caster: CasterId, _target: Option<CasterId>) -> Vec<SpellImpact> {
        vec![SpellImpact::Shield {
            target: caster,
            duration: spell.lifetime,
        }]
    }
}

/// Name -> behavior lookup used when resolving spell definitions.
#[derive(Debug, Clone, Default)]
pub struct BehaviorRegistry {
    behaviors: HashMap<String, Arc<dyn SpellBehavior>>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `projectile`, `slash`, `ground`, `heal` and `shield`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for name in ["projectile", "slash", "ground"] {
            registry.register(Arc::new(DirectDamage::new(name)));
        }
        registry.register(Arc::new(SelfHeal));
        registry.register(Arc::new(SelfShield));
        registry
    }

    /// Add or replace a behavior under its own name.
    pub fn register(&mut self, behavior: Arc<dyn SpellBehavior>) {
        self.behaviors
            .insert(behavior.name().to_lowercase(), behavior);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SpellBehavior>> {
        self.behaviors.get(&name.to_lowercase()).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.behaviors.keys().map(String::as_str)
    }
}
