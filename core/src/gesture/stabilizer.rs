//! Debounce for raw per-tick recognizer output.
//!
//! A pair is confirmed once it has been seen continuously for the configured
//! hold time, and only if it differs from the last confirmed pair. Holding a
//! gesture therefore yields one confirmation per change, never one per tick.
//!
//! Each hand is also tracked for absence independently so the host can hide
//! that hand's aura once it has been missing long enough.

use std::time::Duration;

use handspell_types::{GesturePair, Hand, StabilizerConfig};

/// Visibility transition for one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandPresence {
    Present,
    Absent,
}

/// Result of feeding one raw pair through the stabilizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StabilizerOutput {
    /// Hand visibility changes, left before right.
    pub presence: Vec<(Hand, HandPresence)>,
    /// Newly confirmed stable pair, if this sample committed one.
    pub confirmed: Option<GesturePair>,
}

#[derive(Debug, Clone, Default)]
struct HandTracker {
    absent_since: Option<Duration>,
    visible: bool,
}

impl HandTracker {
    /// Returns the visibility transition caused by this sample, if any.
    fn observe(&mut self, detected: bool, now: Duration, required: Duration) -> Option<HandPresence> {
        if detected {
            self.absent_since = None;
            if !self.visible {
                self.visible = true;
                return Some(HandPresence::Present);
            }
            return None;
        }

        let since = *self.absent_since.get_or_insert(now);
        if self.visible && now.saturating_sub(since) >= required {
            self.visible = false;
            return Some(HandPresence::Absent);
        }
        None
    }
}

/// Per-caster debounce state. Owned by the consumer thread.
#[derive(Debug, Clone)]
pub struct GestureStabilizer {
    required_stable: Duration,
    required_no_hand: Duration,
    pending: GesturePair,
    pending_since: Option<Duration>,
    stable: GesturePair,
    left: HandTracker,
    right: HandTracker,
}

impl GestureStabilizer {
    pub fn new(config: &StabilizerConfig) -> Self {
        Self::with_timing(config.required_stable(), config.required_no_hand())
    }

    pub fn with_timing(required_stable: Duration, required_no_hand: Duration) -> Self {
        Self {
            required_stable,
            required_no_hand,
            pending: GesturePair::default(),
            pending_since: None,
            stable: GesturePair::default(),
            left: HandTracker::default(),
            right: HandTracker::default(),
        }
    }

    /// Feed one raw pair observed at `now`.
    pub fn process(&mut self, pair: GesturePair, now: Duration) -> StabilizerOutput {
        let mut output = StabilizerOutput::default();

        if let Some(change) = self.left.observe(!pair.left.is_none(), now, self.required_no_hand) {
            output.presence.push((Hand::Left, change));
        }
        if let Some(change) = self.right.observe(!pair.right.is_none(), now, self.required_no_hand)
        {
            output.presence.push((Hand::Right, change));
        }

        // Half-detected samples only feed absence tracking.
        if pair.has_none() {
            return output;
        }

        if pair != self.pending {
            self.pending = pair;
            self.pending_since = Some(now);
            return output;
        }

        let since = *self.pending_since.get_or_insert(now);
        if now.saturating_sub(since) >= self.required_stable && pair != self.stable {
            self.stable = pair;
            output.confirmed = Some(pair);
        }

        output
    }

    /// Last confirmed pair (both `None` before the first confirmation).
    pub fn stable_pair(&self) -> GesturePair {
        self.stable
    }

    pub fn pending_pair(&self) -> GesturePair {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handspell_types::GestureLabel;

    const STABLE: Duration = Duration::from_millis(100);
    const NO_HAND: Duration = Duration::from_millis(100);

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn pair(left: GestureLabel, right: GestureLabel) -> GesturePair {
        GesturePair::new(left, right)
    }

    fn stabilizer() -> GestureStabilizer {
        GestureStabilizer::with_timing(STABLE, NO_HAND)
    }

    /// Feed `p` every `step` ms over [start, end] and collect confirmations.
    fn hold(s: &mut GestureStabilizer, p: GesturePair, start: u64, end: u64, step: u64) -> Vec<GesturePair> {
        (start..=end)
            .step_by(step as usize)
            .filter_map(|t| s.process(p, ms(t)).confirmed)
            .collect()
    }

    #[test]
    fn confirms_once_after_required_hold() {
        let mut s = stabilizer();
        let p = pair(GestureLabel::OpenPalm, GestureLabel::Victory);

        assert_eq!(s.process(p, ms(0)).confirmed, None);
        assert_eq!(s.process(p, ms(50)).confirmed, None);
        assert_eq!(s.process(p, ms(100)).confirmed, Some(p));
        assert_eq!(s.process(p, ms(150)).confirmed, None);
        assert_eq!(s.stable_pair(), p);
    }

    #[test]
    fn holding_commits_at_most_once_regardless_of_tick_rate() {
        for step in [1, 7, 16, 33, 99] {
            let mut s = stabilizer();
            let p = pair(GestureLabel::ClosedFist, GestureLabel::ClosedFist);
            let confirmed = hold(&mut s, p, 0, 2_000, step);
            assert_eq!(confirmed, vec![p], "step {step}ms");
        }
    }

    #[test]
    fn repeated_hold_of_same_pair_needs_an_intervening_change() {
        let mut s = stabilizer();
        let a = pair(GestureLabel::ThumbsUp, GestureLabel::ThumbsUp);
        let b = pair(GestureLabel::Victory, GestureLabel::OpenPalm);

        assert_eq!(hold(&mut s, a, 0, 300, 10), vec![a]);
        // Brief flicker to B that never stabilizes, then back to A.
        assert!(s.process(b, ms(310)).confirmed.is_none());
        assert!(hold(&mut s, a, 320, 800, 10).is_empty());

        // A real change to B is confirmed, after which A confirms again.
        assert_eq!(hold(&mut s, b, 810, 1_000, 10), vec![b]);
        assert_eq!(hold(&mut s, a, 1_010, 1_200, 10), vec![a]);
    }

    #[test]
    fn changing_pair_restarts_the_hold_timer() {
        let mut s = stabilizer();
        let a = pair(GestureLabel::PointingUp, GestureLabel::OpenPalm);
        let b = pair(GestureLabel::PointingUp, GestureLabel::ClosedFist);

        s.process(a, ms(0));
        s.process(a, ms(90));
        s.process(b, ms(95));
        assert_eq!(s.process(a, ms(100)).confirmed, None);
        assert_eq!(s.process(a, ms(150)).confirmed, None);
        assert_eq!(s.process(a, ms(200)).confirmed, Some(a));
    }

    #[test]
    fn half_detected_samples_do_not_touch_pending_state() {
        let mut s = stabilizer();
        let a = pair(GestureLabel::Victory, GestureLabel::Victory);
        let half = pair(GestureLabel::Victory, GestureLabel::None);

        s.process(a, ms(0));
        assert_eq!(s.process(half, ms(50)).confirmed, None);
        assert_eq!(s.pending_pair(), a);
        // The hold started at 0 is still running.
        assert_eq!(s.process(a, ms(100)).confirmed, Some(a));
    }

    #[test]
    fn absence_is_reported_per_hand_after_threshold() {
        let mut s = stabilizer();
        let both = pair(GestureLabel::OpenPalm, GestureLabel::OpenPalm);
        let no_left = pair(GestureLabel::None, GestureLabel::OpenPalm);

        let first = s.process(both, ms(0));
        assert_eq!(
            first.presence,
            vec![(Hand::Left, HandPresence::Present), (Hand::Right, HandPresence::Present)]
        );

        assert!(s.process(no_left, ms(10)).presence.is_empty());
        assert!(s.process(no_left, ms(100)).presence.is_empty());
        assert_eq!(
            s.process(no_left, ms(110)).presence,
            vec![(Hand::Left, HandPresence::Absent)]
        );
        // Reported once per absence.
        assert!(s.process(no_left, ms(200)).presence.is_empty());

        // Any detection clears the timer and reports presence immediately.
        assert_eq!(
            s.process(both, ms(210)).presence,
            vec![(Hand::Left, HandPresence::Present)]
        );
    }

    #[test]
    fn short_dropout_does_not_hide_the_hand() {
        let mut s = stabilizer();
        let both = pair(GestureLabel::ILoveYou, GestureLabel::ThumbsDown);
        let no_right = pair(GestureLabel::ILoveYou, GestureLabel::None);

        s.process(both, ms(0));
        assert!(s.process(no_right, ms(10)).presence.is_empty());
        assert!(s.process(no_right, ms(60)).presence.is_empty());
        assert!(s.process(both, ms(70)).presence.is_empty());
        // The absence timer restarted, so another 90ms gap is still too short.
        assert!(s.process(no_right, ms(80)).presence.is_empty());
        assert!(s.process(no_right, ms(170)).presence.is_empty());
    }
}
