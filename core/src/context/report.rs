use serde::Serialize;

use crate::caster::{Caster, CasterId, CasterRole};
use crate::signal_processor::MatchState;

/// Running per-caster counters kept by the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CasterStats {
    pub gestures_confirmed: u32,
    pub casts: u32,
    pub fizzles: u32,
    pub releases: u32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub damage_blocked: f32,
    pub healing_done: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CasterReport {
    pub id: CasterId,
    pub name: String,
    pub role: CasterRole,
    pub health: f32,
    pub max_health: f32,
    pub mana: f32,
    pub max_mana: f32,
    pub dead: bool,
    #[serde(flatten)]
    pub stats: CasterStats,
}

impl CasterReport {
    pub fn new(caster: &Caster, stats: CasterStats) -> Self {
        Self {
            id: caster.id,
            name: caster.name.clone(),
            role: caster.role,
            health: caster.health(),
            max_health: caster.max_health(),
            mana: caster.mana(),
            max_mana: caster.max_mana(),
            dead: caster.is_dead(),
            stats,
        }
    }
}

/// Snapshot of a match, serializable for hosts and logs.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub state: MatchState,
    pub winner: Option<CasterId>,
    pub winner_name: Option<String>,
    pub elapsed_secs: f32,
    pub casters: Vec<CasterReport>,
}

impl MatchReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
