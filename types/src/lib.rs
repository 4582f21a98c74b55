//! Shared types for handspell: gesture labels, gesture pairs and the
//! configuration surface consumed by `handspell-core` and its hosts.

pub mod config;
pub mod gesture;

pub use config::{
    CastMode, CasterConfig, CastingConfig, HandspellConfig, ManaConfig, MatchFlowConfig,
    OpponentConfig, StabilizerConfig,
};
pub use gesture::{GestureLabel, GesturePair, Hand};
