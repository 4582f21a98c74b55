use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or saving spellbook definitions.
///
/// Runtime pipeline operations never fail; they report problems as
/// `GameSignal`s and log lines instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Serialize error for {path:?}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    #[error("Invalid spell '{name}': {reason}")]
    InvalidSpell { name: String, reason: String },
}
