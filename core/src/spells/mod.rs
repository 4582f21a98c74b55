//! Spells, spellbooks and sequence matching.
//!
//! # Architecture
//!
//! ```text
//! spellbook TOML ──► SpellDefinition ──► Spell (+ SpellBehavior) ──► SpellBook
//!                                                                      │
//! confirmed pair ──► SpellMatcher ──► SequenceBuffer ── try_match ─────┘
//! ```
//!
//! Definitions are resolved against a [`BehaviorRegistry`] at load time, so a
//! spell carries its behavior as a trait object and nothing is looked up by
//! name while a match is running.

mod config;
mod definition;
mod sequence;
mod spell;
mod spellbook;

pub use config::{
    BUILTIN_SPELLBOOK, builtin_spellbook, default_custom_dir, load_file, load_spellbook, save_file,
};
pub use definition::{SpellBookConfig, SpellDefinition};
pub use sequence::{MatchOutcome, SequenceBuffer, SpellMatcher};
pub use spell::{
    BehaviorRegistry, DEFAULT_CAST_TRIGGER, DirectDamage, SelfHeal, SelfShield, Spell,
    SpellBehavior, SpellImpact,
};
pub use spellbook::{SpellBook, SpellBookEntry};
