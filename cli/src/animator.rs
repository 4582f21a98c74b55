//! Stand-ins for the animation and presentation layers.
//!
//! A real host plays the triggered animation and reports each release
//! keyframe back to the session. [`SimulatedAnimator`] does the same with a
//! fixed keyframe spacing: every queued cast schedules one release per
//! `release_count`, after any animation already playing for that caster.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use handspell_core::signal_processor::{FizzleReason, GameSignal};
use handspell_core::{CasterId, SignalHandler, SpellBook};

/// Gap between consecutive release keyframes of one caster.
pub const DEFAULT_RELEASE_SPACING: Duration = Duration::from_millis(300);

/// Release keyframes waiting to be delivered, shared between the animator
/// (inside the session's signal bus) and the host loop.
#[derive(Debug, Clone, Default)]
pub struct ReleaseSchedule {
    pending: Arc<Mutex<Vec<(Duration, CasterId)>>>,
}

impl ReleaseSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, at: Duration, caster: CasterId) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.push((at, caster));
        }
    }

    /// Remove and return keyframes due at `now`, earliest first.
    ///
    /// Keyframes of one caster keep the order they were scheduled in.
    pub fn due(&self, now: Duration) -> Vec<CasterId> {
        let Ok(mut pending) = self.pending.lock() else {
            return Vec::new();
        };
        let (mut due, rest): (Vec<_>, Vec<_>) = pending.drain(..).partition(|(at, _)| *at <= now);
        *pending = rest;
        due.sort_by_key(|(at, _)| *at);
        due.into_iter().map(|(_, caster)| caster).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().map_or(0, |pending| pending.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct SimulatedAnimator {
    spellbook: Arc<SpellBook>,
    schedule: ReleaseSchedule,
    spacing: Duration,
    busy_until: HashMap<CasterId, Duration>,
}

impl SimulatedAnimator {
    pub fn new(spellbook: Arc<SpellBook>, schedule: ReleaseSchedule, spacing: Duration) -> Self {
        Self {
            spellbook,
            schedule,
            spacing,
            busy_until: HashMap::new(),
        }
    }
}

impl SignalHandler for SimulatedAnimator {
    fn handle_signal(&mut self, signal: &GameSignal) {
        match signal {
            GameSignal::CastTriggered {
                caster,
                spell,
                queued: true,
                at,
                ..
            } => {
                let Some(spell) = self.spellbook.get(spell) else {
                    tracing::warn!(%caster, %spell, "animation for an unknown spell");
                    return;
                };
                let busy = self.busy_until.entry(*caster).or_insert(*at);
                let mut keyframe = (*busy).max(*at);
                for _ in 0..spell.release_count {
                    keyframe += self.spacing;
                    self.schedule.push(keyframe, *caster);
                }
                *busy = keyframe;
                tracing::trace!(%caster, spell = %spell.name, until = ?keyframe, "animation scheduled");
            }
            GameSignal::MatchStateChanged { .. } => {
                // Keyframes delivered outside the fighting state are ignored
                // by the session, so the animator only resets its timeline.
                self.busy_until.clear();
            }
            _ => {}
        }
    }
}

/// Logs the signals a player would see on screen.
#[derive(Debug, Default)]
pub struct PresentationLog {
    names: HashMap<CasterId, String>,
}

impl PresentationLog {
    pub fn new(names: impl IntoIterator<Item = (CasterId, String)>) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }

    fn name(&self, caster: CasterId) -> String {
        self.names
            .get(&caster)
            .cloned()
            .unwrap_or_else(|| caster.to_string())
    }
}

impl SignalHandler for PresentationLog {
    fn handle_signal(&mut self, signal: &GameSignal) {
        let at = signal.at().as_secs_f32();
        match signal {
            GameSignal::CountdownTick { remaining, .. } => tracing::info!(at, remaining, "countdown"),
            GameSignal::Ready { .. } => tracing::info!(at, "ready"),
            GameSignal::MatchStateChanged { from, to, .. } => {
                tracing::info!(at, ?from, ?to, "match state changed")
            }
            GameSignal::SequenceAppended { caster, pair, len, .. } => {
                tracing::info!(at, caster = %self.name(*caster), %pair, len, "sequence")
            }
            GameSignal::CastTriggered { caster, spell, trigger, .. } => {
                tracing::info!(at, caster = %self.name(*caster), %spell, %trigger, "cast")
            }
            GameSignal::Fizzled { caster, spell, reason, .. } => {
                let reason = match reason {
                    FizzleReason::NoMatch => "no matching spell".to_string(),
                    FizzleReason::InsufficientMana { required, available } => {
                        format!("needs {required} mana, has {available}")
                    }
                    FizzleReason::MissingBehavior => "spell has no behavior".to_string(),
                };
                tracing::info!(at, caster = %self.name(*caster), spell = ?spell, %reason, "fizzle")
            }
            GameSignal::SpellReleased { caster, spell, releases_remaining, .. } => {
                tracing::info!(at, caster = %self.name(*caster), %spell, releases_remaining, "release")
            }
            GameSignal::HealthChanged { caster, health, max_health, .. } => {
                tracing::info!(at, caster = %self.name(*caster), health, max_health, "health")
            }
            GameSignal::ShieldRaised { caster, .. } => {
                tracing::info!(at, caster = %self.name(*caster), "shield up")
            }
            GameSignal::ShieldBlocked { caster, amount, .. } => {
                tracing::info!(at, caster = %self.name(*caster), amount, "shield blocked")
            }
            GameSignal::CasterDied { caster, .. } => {
                tracing::info!(at, caster = %self.name(*caster), "died")
            }
            GameSignal::MatchEnded { winner, .. } => {
                let winner = winner.map(|id| self.name(id));
                tracing::info!(at, winner = ?winner, "match ended")
            }
            other => tracing::trace!(?other, "signal"),
        }
    }
}
