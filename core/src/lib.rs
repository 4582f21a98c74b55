pub mod caster;
pub mod context;
pub mod error;
pub mod gesture;
pub mod ingest;
pub mod signal_processor;
pub mod spells;

// Re-exports for convenience
pub use caster::{Caster, CasterId, CasterRole};
pub use context::{MatchReport, MatchSession};
pub use error::ConfigError;
pub use ingest::{GestureIngestQueue, GestureProducer};
pub use signal_processor::{GameSignal, HandlerId, MatchState, SignalHandler};
pub use spells::{BehaviorRegistry, Spell, SpellBook};

pub use handspell_types::{CastMode, GestureLabel, GesturePair, Hand, HandspellConfig};
