//! Exact ordered-sequence lookup from confirmed gesture pairs to spells.

use std::sync::Arc;

use handspell_types::GesturePair;
use hashbrown::HashMap;

use crate::error::ConfigError;

use super::{BehaviorRegistry, Spell, SpellDefinition};

#[derive(Debug, Clone)]
pub struct SpellBookEntry {
    pub sequence: Vec<GesturePair>,
    pub spell: Arc<Spell>,
}

/// Spell entries with indexes for O(1) lookup by sequence and by name.
#[derive(Debug, Clone, Default)]
pub struct SpellBook {
    entries: Vec<SpellBookEntry>,
    by_sequence: HashMap<Vec<GesturePair>, usize>,
    by_name: HashMap<String, usize>,
}

impl SpellBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve and add definitions. If `overwrite` is true, an entry with the
    /// same name or the same sequence replaces the existing one; otherwise the
    /// first entry wins.
    ///
    /// Returns the names of duplicates and the definitions that failed to resolve.
    pub fn add_definitions(
        &mut self,
        definitions: &[SpellDefinition],
        behaviors: &BehaviorRegistry,
        overwrite: bool,
    ) -> (Vec<String>, Vec<ConfigError>) {
        let mut duplicates = Vec::new();
        let mut errors = Vec::new();

        for def in definitions {
            match def.resolve_arc(behaviors) {
                Ok(spell) => {
                    let entry = SpellBookEntry {
                        sequence: def.sequence.clone(),
                        spell,
                    };
                    if !self.insert(entry, overwrite) {
                        duplicates.push(def.name.clone());
                    }
                }
                Err(e) => errors.push(e),
            }
        }

        (duplicates, errors)
    }

    /// Add one entry. Returns false if it collided with an existing entry.
    pub fn insert(&mut self, entry: SpellBookEntry, overwrite: bool) -> bool {
        let name_clash = self.by_name.get(&entry.spell.name).copied();
        let sequence_clash = self.by_sequence.get(&entry.sequence).copied();

        if name_clash.is_none() && sequence_clash.is_none() {
            self.entries.push(entry);
            self.rebuild_indexes();
            return true;
        }
        if !overwrite {
            return false;
        }

        let mut clashes: Vec<usize> = name_clash.into_iter().chain(sequence_clash).collect();
        clashes.sort_unstable();
        clashes.dedup();
        // Keep the replaced entry's position so listing order stays stable.
        let slot = clashes[0];
        for &idx in clashes.iter().skip(1).rev() {
            self.entries.remove(idx);
        }
        self.entries[slot] = entry;
        self.rebuild_indexes();
        false
    }

    fn rebuild_indexes(&mut self) {
        self.by_sequence.clear();
        self.by_name.clear();
        for (idx, entry) in self.entries.iter().enumerate() {
            self.by_sequence.insert(entry.sequence.clone(), idx);
            self.by_name.insert(entry.spell.name.clone(), idx);
        }
    }

    /// Exact element-for-element match of `sequence` against every entry.
    pub fn try_match(&self, sequence: &[GesturePair]) -> Option<Arc<Spell>> {
        self.by_sequence
            .get(sequence)
            .map(|&idx| Arc::clone(&self.entries[idx].spell))
    }

    pub fn get(&self, name: &str) -> Option<Arc<Spell>> {
        self.by_name
            .get(name)
            .map(|&idx| Arc::clone(&self.entries[idx].spell))
    }

    pub fn entries(&self) -> &[SpellBookEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs of (shorter, longer) spell names where the shorter sequence is a
    /// strict prefix of the longer one. In auto mode the longer spell can
    /// never be cast.
    pub fn shadowed_spells(&self) -> Vec<(String, String)> {
        let mut shadowed = Vec::new();
        for short in &self.entries {
            for long in &self.entries {
                if short.sequence.len() < long.sequence.len()
                    && long.sequence.starts_with(&short.sequence)
                {
                    shadowed.push((short.spell.name.clone(), long.spell.name.clone()));
                }
            }
        }
        shadowed
    }
}
