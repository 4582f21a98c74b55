//! Delayed, restartable mana recovery.
//!
//! Every spend restarts the regenerator: after `delay` it restores
//! `amount` at once and then again every `interval` until the caster is full.
//! Time is supplied by the tick, nothing here sleeps.

use std::time::Duration;

use handspell_types::ManaConfig;

use super::Caster;

#[derive(Debug, Clone, Copy, PartialEq)]
enum RegenPhase {
    Idle,
    Delayed { until: Duration },
    Restoring { next_at: Duration, remaining: f32 },
}

#[derive(Debug, Clone)]
pub struct ManaRegenerator {
    delay: Duration,
    amount: f32,
    interval: Duration,
    phase: RegenPhase,
}

impl ManaRegenerator {
    pub fn new(config: &ManaConfig) -> Self {
        Self {
            delay: config.restore_delay(),
            amount: config.restore_amount,
            interval: config.restore_interval(),
            phase: RegenPhase::Idle,
        }
    }

    /// Start regeneration, cancelling any run already in flight.
    pub fn start(&mut self, now: Duration) {
        self.phase = RegenPhase::Delayed {
            until: now.saturating_add(self.delay),
        };
    }

    /// Cancel regeneration. Safe to call when idle.
    pub fn stop(&mut self) {
        self.phase = RegenPhase::Idle;
    }

    pub fn is_active(&self) -> bool {
        self.phase != RegenPhase::Idle
    }

    /// Apply every restore step due by `now`. Returns the mana added.
    pub fn tick(&mut self, now: Duration, caster: &mut Caster) -> f32 {
        let mut restored = 0.0;

        loop {
            match self.phase {
                RegenPhase::Idle => break,
                RegenPhase::Delayed { until } => {
                    if now < until {
                        break;
                    }
                    if caster.mana_is_full() || self.amount <= 0.0 {
                        self.phase = RegenPhase::Idle;
                        break;
                    }
                    self.phase = RegenPhase::Restoring {
                        next_at: until,
                        remaining: caster.max_mana() - caster.mana(),
                    };
                }
                RegenPhase::Restoring { next_at, remaining } => {
                    if now < next_at {
                        break;
                    }
                    if remaining <= 0.0 || caster.mana_is_full() {
                        self.phase = RegenPhase::Idle;
                        break;
                    }
                    let step = self
                        .amount
                        .min(remaining)
                        .min(caster.max_mana() - caster.mana());
                    let added = caster.restore_mana(step);
                    restored += added;
                    self.phase = RegenPhase::Restoring {
                        next_at: next_at.saturating_add(self.interval),
                        remaining: remaining - step,
                    };
                }
            }
        }

        restored
    }
}
