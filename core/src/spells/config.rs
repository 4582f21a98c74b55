//! Spellbook loading.
//!
//! Spell definitions come from TOML files in two places:
//! - **Builtin**: a directory shipped with the host, or the spellbook embedded
//!   in this crate when no directory is given
//! - **Custom**: user spellbooks, which replace builtin spells of the same name
//!
//! A file that fails to load is logged and skipped so one bad file never
//! takes the whole book down.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::{BehaviorRegistry, SpellBook, SpellBookConfig};

/// Default spellbook compiled into the crate.
pub const BUILTIN_SPELLBOOK: &str = include_str!("../../definitions/spellbook.toml");

/// Parse the embedded default spellbook.
pub fn builtin_spellbook() -> Result<SpellBookConfig, ConfigError> {
    toml::from_str(BUILTIN_SPELLBOOK).map_err(|source| ConfigError::Parse {
        path: PathBuf::from("<builtin>"),
        source,
    })
}

/// Load a spellbook from builtin and custom sources.
///
/// Builtin definitions load first, from `builtin_dir` if given or from the
/// embedded book otherwise. Custom definitions override builtins by name.
/// Within one source the first definition of a sequence wins.
pub fn load_spellbook(
    builtin_dir: Option<&Path>,
    custom_dir: Option<&Path>,
    behaviors: &BehaviorRegistry,
) -> Result<SpellBook, ConfigError> {
    let mut book = SpellBook::new();

    match builtin_dir {
        Some(dir) if dir.exists() => load_directory(&mut book, dir, behaviors, "builtin", false)?,
        Some(dir) => {
            tracing::warn!(path = ?dir, "builtin spellbook directory missing, using embedded spellbook");
            add_config(&mut book, builtin_spellbook()?, behaviors, "builtin", false);
        }
        None => add_config(&mut book, builtin_spellbook()?, behaviors, "builtin", false),
    }

    if let Some(dir) = custom_dir
        && dir.exists()
    {
        load_directory(&mut book, dir, behaviors, "custom", true)?;
    }

    for (short, long) in book.shadowed_spells() {
        tracing::warn!(
            %short,
            %long,
            "sequence is a prefix of another spell; the longer spell cannot be cast in auto mode"
        );
    }

    tracing::info!(spells = book.len(), "spellbook loaded");
    Ok(book)
}

fn load_directory(
    book: &mut SpellBook,
    dir: &Path,
    behaviors: &BehaviorRegistry,
    source: &str,
    overwrite: bool,
) -> Result<(), ConfigError> {
    let entries = fs::read_dir(dir).map_err(|e| ConfigError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    // Sorted so that "first definition wins" is stable across platforms.
    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    for path in paths {
        match load_file(&path) {
            Ok(config) => add_config(book, config, behaviors, source, overwrite),
            Err(e) => {
                tracing::error!(source, file = ?path.file_name(), error = %e, "failed to load spellbook");
            }
        }
    }

    Ok(())
}

fn add_config(
    book: &mut SpellBook,
    config: SpellBookConfig,
    behaviors: &BehaviorRegistry,
    source: &str,
    overwrite: bool,
) {
    let (duplicates, errors) = book.add_definitions(&config.spells, behaviors, overwrite);
    if !duplicates.is_empty() {
        if overwrite {
            tracing::info!(source, ?duplicates, "spells replaced");
        } else {
            tracing::warn!(source, ?duplicates, "duplicate spells ignored");
        }
    }
    for e in errors {
        tracing::error!(source, error = %e, "spell skipped");
    }
}

/// Load a single spellbook file.
pub fn load_file(path: &Path) -> Result<SpellBookConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write a spellbook file.
pub fn save_file(path: &Path, config: &SpellBookConfig) -> Result<(), ConfigError> {
    let contents = toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;

    fs::write(path, contents).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Default directory for user spellbooks.
pub fn default_custom_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("handspell").join("spellbooks"))
}
