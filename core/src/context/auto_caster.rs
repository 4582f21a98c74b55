use std::time::Duration;

use handspell_types::OpponentConfig;

use crate::caster::CasterId;

/// Computer-controlled caster that works through a fixed spell rotation.
///
/// Runs only between [`AutoCaster::start`] and [`AutoCaster::stop`], which the
/// session ties to entering and leaving the fighting state.
#[derive(Debug, Clone)]
pub struct AutoCaster {
    caster: CasterId,
    rotation: Vec<String>,
    interval: Duration,
    next_idx: usize,
    next_at: Option<Duration>,
}

impl AutoCaster {
    pub fn new(caster: CasterId, config: &OpponentConfig) -> Self {
        Self {
            caster,
            rotation: config.rotation.clone(),
            interval: config.cast_interval(),
            next_idx: 0,
            next_at: None,
        }
    }

    pub fn caster(&self) -> CasterId {
        self.caster
    }

    pub fn is_running(&self) -> bool {
        self.next_at.is_some()
    }

    /// First cast fires one interval after `now`.
    pub fn start(&mut self, now: Duration) {
        if self.rotation.is_empty() {
            tracing::warn!(caster = %self.caster, "auto caster has an empty rotation");
            return;
        }
        self.next_at = Some(now.saturating_add(self.interval));
    }

    pub fn stop(&mut self) {
        self.next_at = None;
    }

    /// Name of the spell to cast now, if one is due. At most one per call.
    pub fn poll(&mut self, now: Duration) -> Option<String> {
        let due = self.next_at?;
        if now < due {
            return None;
        }
        let spell = self.rotation.get(self.next_idx)?.clone();
        self.next_idx = (self.next_idx + 1) % self.rotation.len();
        self.next_at = Some(now.saturating_add(self.interval));
        Some(spell)
    }
}
