//! Per-caster gesture sequence and the rules for when it is matched.

use std::sync::Arc;

use handspell_types::{CastMode, CastingConfig, GesturePair};

use super::{Spell, SpellBook};

/// Ordered confirmed pairs since the last cast, fizzle or reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceBuffer {
    pairs: Vec<GesturePair>,
}

impl SequenceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pair: GesturePair) {
        self.pairs.push(pair);
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    pub fn as_slice(&self) -> &[GesturePair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// What happened to the buffer after a confirmed pair.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    /// The pair was added and nothing matched yet.
    Appended { len: usize },
    /// The buffer matched a spell and was cleared. The caller still has to
    /// validate mana and start the cast.
    Matched(Arc<Spell>),
    /// Manual submit with no matching spell. The buffer was cleared.
    Fizzled { len: usize },
}

/// Decides when the buffer is looked up in the spellbook.
///
/// In auto mode every confirmed pair is appended and then matched, so the
/// shortest matching sequence always wins. In manual mode pairs accumulate
/// until the submit pair arrives; the submit pair is never appended.
#[derive(Debug, Clone)]
pub struct SpellMatcher {
    mode: CastMode,
    submit: GesturePair,
}

impl SpellMatcher {
    pub fn new(config: &CastingConfig) -> Self {
        Self {
            mode: config.mode,
            submit: config.submit,
        }
    }

    pub fn mode(&self) -> CastMode {
        self.mode
    }

    pub fn on_confirmed(
        &self,
        pair: GesturePair,
        buffer: &mut SequenceBuffer,
        book: &SpellBook,
    ) -> MatchOutcome {
        match self.mode {
            CastMode::Auto => {
                buffer.push(pair);
                match book.try_match(buffer.as_slice()) {
                    Some(spell) => {
                        buffer.clear();
                        MatchOutcome::Matched(spell)
                    }
                    None => MatchOutcome::Appended { len: buffer.len() },
                }
            }
            CastMode::Manual if pair == self.submit => {
                let len = buffer.len();
                let matched = book.try_match(buffer.as_slice());
                buffer.clear();
                match matched {
                    Some(spell) => MatchOutcome::Matched(spell),
                    None => MatchOutcome::Fizzled { len },
                }
            }
            CastMode::Manual => {
                buffer.push(pair);
                MatchOutcome::Appended { len: buffer.len() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spells::{BehaviorRegistry, SpellDefinition};
    use handspell_types::GestureLabel::{ClosedFist, ILoveYou, OpenPalm, PointingUp, ThumbsDown, ThumbsUp, Victory};

    const AB: GesturePair = GesturePair::new(OpenPalm, Victory);
    const CD: GesturePair = GesturePair::new(ClosedFist, PointingUp);
    const XY: GesturePair = GesturePair::new(ThumbsDown, ILoveYou);
    const SUBMIT: GesturePair = GesturePair::new(ThumbsUp, ThumbsUp);

    fn book() -> SpellBook {
        let def = |name: &str, sequence: Vec<GesturePair>| SpellDefinition {
            name: name.to_string(),
            mana_cost: 10.0,
            damage: 5.0,
            release_count: 1,
            lifetime_secs: 5.0,
            behavior: Some("projectile".to_string()),
            cast_trigger: None,
            sequence,
        };
        let mut book = SpellBook::new();
        book.add_definitions(
            &[def("Bolt", vec![AB, CD]), def("Jab", vec![XY])],
            &BehaviorRegistry::with_builtins(),
            false,
        );
        book
    }

    fn matcher(mode: CastMode) -> SpellMatcher {
        SpellMatcher::new(&CastingConfig { mode, submit: SUBMIT })
    }

    #[test]
    fn auto_matches_as_soon_as_the_sequence_completes() {
        let book = book();
        let matcher = matcher(CastMode::Auto);
        let mut buffer = SequenceBuffer::new();

        assert!(matches!(
            matcher.on_confirmed(AB, &mut buffer, &book),
            MatchOutcome::Appended { len: 1 }
        ));
        match matcher.on_confirmed(CD, &mut buffer, &book) {
            MatchOutcome::Matched(spell) => assert_eq!(spell.name, "Bolt"),
            other => panic!("expected a match, got {other:?}"),
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn auto_never_fizzles_and_keeps_growing() {
        let book = book();
        let matcher = matcher(CastMode::Auto);
        let mut buffer = SequenceBuffer::new();

        matcher.on_confirmed(CD, &mut buffer, &book);
        matcher.on_confirmed(AB, &mut buffer, &book);
        // [CD, AB, CD] is not a spell; the stale prefix blocks Bolt until a reset.
        assert!(matches!(
            matcher.on_confirmed(CD, &mut buffer, &book),
            MatchOutcome::Appended { len: 3 }
        ));
        assert_eq!(buffer.as_slice(), &[CD, AB, CD]);
    }

    #[test]
    fn manual_waits_for_submit() {
        let book = book();
        let matcher = matcher(CastMode::Manual);
        let mut buffer = SequenceBuffer::new();

        matcher.on_confirmed(XY, &mut buffer, &book);
        assert_eq!(buffer.len(), 1);
        match matcher.on_confirmed(SUBMIT, &mut buffer, &book) {
            MatchOutcome::Matched(spell) => assert_eq!(spell.name, "Jab"),
            other => panic!("expected a match, got {other:?}"),
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn manual_submit_without_match_fizzles_and_clears() {
        let book = book();
        let matcher = matcher(CastMode::Manual);
        let mut buffer = SequenceBuffer::new();

        matcher.on_confirmed(AB, &mut buffer, &book);
        matcher.on_confirmed(XY, &mut buffer, &book);
        assert!(matches!(
            matcher.on_confirmed(SUBMIT, &mut buffer, &book),
            MatchOutcome::Fizzled { len: 2 }
        ));
        assert!(buffer.is_empty());

        assert!(matches!(
            matcher.on_confirmed(SUBMIT, &mut buffer, &book),
            MatchOutcome::Fizzled { len: 0 }
        ));
    }
}
