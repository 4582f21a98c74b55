//! Duelists and the per-caster machinery that spends and restores their mana.

mod cast_queue;
mod entity;
mod mana;

pub use cast_queue::{CastOutcome, CastQueue, ReleaseStep};
pub use entity::{Caster, CasterId, CasterRole, DamageOutcome};
pub use mana::ManaRegenerator;
