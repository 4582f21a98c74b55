use std::fmt;
use std::time::Duration;

use handspell_types::CasterConfig;
use serde::{Deserialize, Serialize};

/// Stable identity of a caster within one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CasterId(pub u32);

impl fmt::Display for CasterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "caster#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasterRole {
    /// Driven by the local player's hands.
    Local,
    Opponent,
}

/// Result of a damage application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// The shield absorbed the hit.
    Blocked,
    Applied { health: f32, died: bool },
    /// Target was already dead.
    Ignored,
}

/// Health, mana and shield of one duelist.
///
/// Health and mana are clamped to `[0, max]` on every mutation, and health
/// reaching zero produces exactly one death.
#[derive(Debug, Clone)]
pub struct Caster {
    pub id: CasterId,
    pub name: String,
    pub role: CasterRole,
    health: f32,
    max_health: f32,
    mana: f32,
    max_mana: f32,
    dead: bool,
    shield_until: Option<Duration>,
}

impl Caster {
    pub fn new(id: CasterId, name: impl Into<String>, role: CasterRole, config: &CasterConfig) -> Self {
        let max_health = config.max_health.max(0.0);
        let max_mana = config.max_mana.max(0.0);
        Self {
            id,
            name: name.into(),
            role,
            health: max_health,
            max_health,
            mana: max_mana,
            max_mana,
            dead: false,
            shield_until: None,
        }
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn mana(&self) -> f32 {
        self.mana
    }

    pub fn max_mana(&self) -> f32 {
        self.max_mana
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn mana_is_full(&self) -> bool {
        self.mana >= self.max_mana
    }

    /// Subtract health. The caller is responsible for match gating.
    pub fn apply_damage(&mut self, amount: f32, now: Duration) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::Ignored;
        }
        if self.shield_active(now) {
            return DamageOutcome::Blocked;
        }

        self.health = (self.health - amount.max(0.0)).clamp(0.0, self.max_health);
        let died = self.health <= 0.0;
        if died {
            self.dead = true;
        }
        DamageOutcome::Applied {
            health: self.health,
            died,
        }
    }

    /// Add health, capped at max. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if self.dead {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + amount.max(0.0)).clamp(0.0, self.max_health);
        self.health - before
    }

    /// Remove mana, never going below zero. Returns the amount removed.
    pub fn spend_mana(&mut self, amount: f32) -> f32 {
        let before = self.mana;
        self.mana = (self.mana - amount.max(0.0)).clamp(0.0, self.max_mana);
        before - self.mana
    }

    /// Add mana, capped at max. Returns the amount added.
    pub fn restore_mana(&mut self, amount: f32) -> f32 {
        let before = self.mana;
        self.mana = (self.mana + amount.max(0.0)).clamp(0.0, self.max_mana);
        self.mana - before
    }

    pub fn activate_shield(&mut self, now: Duration, duration: Duration) {
        self.shield_until = Some(now.saturating_add(duration));
    }

    pub fn shield_active(&self, now: Duration) -> bool {
        self.shield_until.is_some_and(|until| now < until)
    }

    /// Clear an elapsed shield. Returns true if one expired.
    pub fn expire_shield(&mut self, now: Duration) -> bool {
        match self.shield_until {
            Some(until) if now >= until => {
                self.shield_until = None;
                true
            }
            _ => false,
        }
    }
}
