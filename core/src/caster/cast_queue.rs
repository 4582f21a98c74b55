//! Per-caster FIFO of in-flight casts, advanced by animation release keyframes.
//!
//! A successful cast only fires the animation trigger. Mana is spent one
//! slice per release, and the head cast is popped after its last release,
//! so overlapping casts resolve strictly in order.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::spells::Spell;

use super::Caster;

/// A cast waiting for its remaining release keyframes.
#[derive(Debug, Clone)]
pub struct QueuedCast {
    pub spell: Arc<Spell>,
    pub releases_remaining: u32,
}

/// Result of [`CastQueue::cast`].
#[derive(Debug, Clone, PartialEq)]
pub enum CastOutcome {
    /// Animation should play. `queued` is false for animation-only spells.
    Triggered { trigger: String, queued: bool },
    /// Not enough mana; nothing was queued.
    InsufficientMana { required: f32, available: f32 },
    /// The spell has no behavior to run; configuration error.
    MissingBehavior,
}

/// One release applied to the head cast.
#[derive(Debug, Clone)]
pub struct ReleaseStep {
    pub spell: Arc<Spell>,
    pub mana_spent: f32,
    pub releases_remaining: u32,
}

impl ReleaseStep {
    /// True if this release finished the cast and it left the queue.
    pub fn completed(&self) -> bool {
        self.releases_remaining == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct CastQueue {
    queue: VecDeque<QueuedCast>,
}

impl CastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and start a cast.
    pub fn cast(&mut self, caster: &Caster, spell: &Arc<Spell>) -> CastOutcome {
        if spell.behavior.is_none() {
            tracing::error!(spell = %spell.name, caster = %caster.id, "spell has no behavior, cast aborted");
            return CastOutcome::MissingBehavior;
        }

        if caster.mana() < spell.mana_cost {
            tracing::info!(
                spell = %spell.name,
                caster = %caster.id,
                mana = caster.mana(),
                cost = spell.mana_cost,
                "not enough mana"
            );
            return CastOutcome::InsufficientMana {
                required: spell.mana_cost,
                available: caster.mana(),
            };
        }

        let queued = spell.release_count > 0;
        if queued {
            self.queue.push_back(QueuedCast {
                spell: Arc::clone(spell),
                releases_remaining: spell.release_count,
            });
        }

        tracing::debug!(spell = %spell.name, caster = %caster.id, queued, depth = self.queue.len(), "cast triggered");
        CastOutcome::Triggered {
            trigger: spell.trigger_name().to_string(),
            queued,
        }
    }

    /// Advance the head cast by one release, spending its mana slice.
    ///
    /// Returns `None` (and logs a warning) if nothing is queued.
    pub fn on_release(&mut self, caster: &mut Caster) -> Option<ReleaseStep> {
        let Some(head) = self.queue.front_mut() else {
            tracing::warn!(caster = %caster.id, "release keyframe with an empty cast queue");
            return None;
        };

        let mana_spent = caster.spend_mana(head.spell.mana_per_release());
        head.releases_remaining = head.releases_remaining.saturating_sub(1);

        let step = ReleaseStep {
            spell: Arc::clone(&head.spell),
            mana_spent,
            releases_remaining: head.releases_remaining,
        };
        if head.releases_remaining == 0 {
            self.queue.pop_front();
        }
        Some(step)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caster::{CasterId, CasterRole};
    use crate::spells::BehaviorRegistry;
    use handspell_types::CasterConfig;
    use std::time::Duration;

    fn caster() -> Caster {
        Caster::new(CasterId(0), "Ada", CasterRole::Local, &CasterConfig::default())
    }

    fn spell(name: &str, mana_cost: f32, release_count: u32) -> Arc<Spell> {
        Arc::new(Spell {
            name: name.to_string(),
            mana_cost,
            damage: 5.0,
            release_count,
            lifetime: Duration::from_secs(5),
            behavior: BehaviorRegistry::with_builtins().get("projectile"),
            cast_trigger: None,
        })
    }

    #[test]
    fn multi_release_spends_mana_incrementally() {
        let mut c = caster();
        let mut queue = CastQueue::new();
        let combo = spell("Air Combo", 30.0, 3);

        assert!(matches!(queue.cast(&c, &combo), CastOutcome::Triggered { queued: true, .. }));
        assert_eq!(c.mana(), 100.0);

        let mut mana = vec![c.mana()];
        let mut releases = 0;
        while let Some(step) = queue.on_release(&mut c) {
            releases += 1;
            mana.push(c.mana());
            assert_eq!(step.completed(), releases == 3);
        }
        assert_eq!(mana, vec![100.0, 90.0, 80.0, 70.0]);
        assert_eq!(releases, 3);
        assert!(queue.is_empty());
    }

    #[test]
    fn insufficient_mana_changes_nothing() {
        let mut c = caster();
        c.spend_mana(80.0);
        let mut queue = CastQueue::new();

        let outcome = queue.cast(&c, &spell("Meteor", 50.0, 1));
        assert_eq!(
            outcome,
            CastOutcome::InsufficientMana { required: 50.0, available: 20.0 }
        );
        assert!(queue.is_empty());
        assert_eq!(c.mana(), 20.0);
    }

    #[test]
    fn animation_only_spells_never_enqueue() {
        let c = caster();
        let mut queue = CastQueue::new();
        let taunt = spell("Taunt", 0.0, 0);
        assert_eq!(
            queue.cast(&c, &taunt),
            CastOutcome::Triggered { trigger: "CastProjectileRight".to_string(), queued: false }
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn missing_behavior_aborts() {
        let c = caster();
        let mut queue = CastQueue::new();
        let mut broken = (*spell("Broken", 10.0, 1)).clone();
        broken.behavior = None;
        assert_eq!(queue.cast(&c, &Arc::new(broken)), CastOutcome::MissingBehavior);
        assert!(queue.is_empty());
    }

    #[test]
    fn release_on_empty_queue_is_a_no_op() {
        let mut c = caster();
        let mut queue = CastQueue::new();
        assert!(queue.on_release(&mut c).is_none());
        assert_eq!(c.mana(), 100.0);
    }

    #[test]
    fn overlapping_casts_release_in_order() {
        let mut c = caster();
        let mut queue = CastQueue::new();
        queue.cast(&c, &spell("First", 10.0, 2));
        queue.cast(&c, &spell("Second", 10.0, 1));

        let names: Vec<_> = std::iter::from_fn(|| queue.on_release(&mut c))
            .map(|step| step.spell.name.clone())
            .collect();
        assert_eq!(names, vec!["First", "First", "Second"]);
        assert_eq!(c.mana(), 80.0);
    }
}
