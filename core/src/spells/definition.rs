//! Spell definitions as written in spellbook TOML files.

use std::sync::Arc;
use std::time::Duration;

use handspell_types::GesturePair;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::{BehaviorRegistry, Spell};

/// Root of a spellbook file: a list of `[[spell]]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpellBookConfig {
    #[serde(default, rename = "spell")]
    pub spells: Vec<SpellDefinition>,
}

/// One spellbook entry before behavior resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellDefinition {
    pub name: String,
    #[serde(default)]
    pub mana_cost: f32,
    #[serde(default)]
    pub damage: f32,
    #[serde(default = "default_release_count")]
    pub release_count: u32,
    #[serde(default = "default_lifetime_secs")]
    pub lifetime_secs: f32,
    /// Behavior name, resolved against a [`BehaviorRegistry`].
    #[serde(default)]
    pub behavior: Option<String>,
    #[serde(default)]
    pub cast_trigger: Option<String>,
    /// Gesture pairs to confirm, in order.
    pub sequence: Vec<GesturePair>,
}

fn default_release_count() -> u32 {
    1
}

fn default_lifetime_secs() -> f32 {
    5.0
}

impl SpellDefinition {
    /// Reject definitions that could never be cast or would corrupt mana.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidSpell {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if self.sequence.is_empty() {
            return Err(invalid("sequence is empty"));
        }
        if self.sequence.iter().any(GesturePair::has_none) {
            return Err(invalid("sequence contains a 'none' hand"));
        }
        // Confirmed pairs never repeat back to back, so such a sequence is unreachable.
        if self.sequence.windows(2).any(|w| w[0] == w[1]) {
            return Err(invalid("sequence repeats a pair back to back"));
        }
        if !self.mana_cost.is_finite() || self.mana_cost < 0.0 {
            return Err(invalid("mana_cost must be a non-negative number"));
        }
        if !self.damage.is_finite() {
            return Err(invalid("damage must be a number"));
        }
        if !self.lifetime_secs.is_finite() || self.lifetime_secs < 0.0 {
            return Err(invalid("lifetime_secs must be a non-negative number"));
        }
        if Duration::try_from_secs_f32(self.lifetime_secs).is_err() {
            return Err(invalid("lifetime_secs is too large"));
        }
        Ok(())
    }

    /// Validate and build the runtime spell.
    ///
    /// An unknown or missing behavior is not an error here: the spell loads
    /// without one and every cast of it is aborted and logged.
    pub fn resolve(&self, behaviors: &BehaviorRegistry) -> Result<Spell, ConfigError> {
        self.validate()?;

        let behavior = match self.behavior.as_deref() {
            Some(name) => {
                let found = behaviors.get(name);
                if found.is_none() {
                    let mut known: Vec<&str> = behaviors.names().collect();
                    known.sort_unstable();
                    tracing::warn!(spell = %self.name, behavior = name, ?known, "unknown spell behavior");
                }
                found
            }
            None => {
                tracing::warn!(spell = %self.name, "spell has no behavior");
                None
            }
        };

        Ok(Spell {
            name: self.name.clone(),
            mana_cost: self.mana_cost,
            damage: self.damage,
            release_count: self.release_count,
            lifetime: Duration::try_from_secs_f32(self.lifetime_secs).unwrap_or(Duration::MAX),
            behavior,
            cast_trigger: self.cast_trigger.clone(),
        })
    }

    pub fn resolve_arc(&self, behaviors: &BehaviorRegistry) -> Result<Arc<Spell>, ConfigError> {
        self.resolve(behaviors).map(Arc::new)
    }
}
