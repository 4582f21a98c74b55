//! Tick-driven replacement for "wait, then do, then wait" scripts.

use std::collections::VecDeque;
use std::time::Duration;

/// Ordered steps, each due a fixed delay after the previous one fired.
///
/// Deadlines chain off the previous deadline rather than the poll time, so a
/// coarse tick rate delays a step's delivery but never the steps after it.
#[derive(Debug, Clone)]
pub struct TimedSequence<S> {
    steps: VecDeque<(Duration, S)>,
    base: Duration,
}

impl<S> Default for TimedSequence<S> {
    fn default() -> Self {
        Self {
            steps: VecDeque::new(),
            base: Duration::ZERO,
        }
    }
}

impl<S> TimedSequence<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new sequence at `now`, dropping whatever was still pending.
    pub fn start(&mut self, now: Duration, steps: impl IntoIterator<Item = (Duration, S)>) {
        self.steps = steps.into_iter().collect();
        self.base = now;
    }

    /// Deadline of the next pending step.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.steps.front().map(|(delay, _)| self.base.saturating_add(*delay))
    }

    /// Pop every step due by `now`, in order.
    pub fn poll(&mut self, now: Duration) -> Vec<S> {
        let mut due = Vec::new();
        while let Some(deadline) = self.next_deadline() {
            if now < deadline {
                break;
            }
            if let Some((_, step)) = self.steps.pop_front() {
                self.base = deadline;
                due.push(step);
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn steps_fire_in_order_relative_to_each_other() {
        let mut seq = TimedSequence::new();
        seq.start(ms(100), [(ms(0), 'a'), (ms(1000), 'b'), (ms(500), 'c')]);

        assert_eq!(seq.poll(ms(100)), vec!['a']);
        assert!(seq.poll(ms(1099)).is_empty());
        assert_eq!(seq.poll(ms(1100)), vec!['b']);
        assert_eq!(seq.next_deadline(), Some(ms(1600)));
        assert_eq!(seq.poll(ms(1600)), vec!['c']);
        assert_eq!(seq.next_deadline(), None);
    }

    #[test]
    fn late_poll_delivers_everything_due() {
        let mut seq = TimedSequence::new();
        seq.start(ms(0), [(ms(1000), 1), (ms(1000), 2), (ms(1000), 3)]);
        assert_eq!(seq.poll(ms(2500)), vec![1, 2]);
        assert_eq!(seq.poll(ms(3000)), vec![3]);
    }

    #[test]
    fn restart_replaces_pending_steps() {
        let mut seq = TimedSequence::new();
        seq.start(ms(0), [(ms(1000), "old")]);
        seq.start(ms(500), [(ms(1000), "new")]);
        assert!(seq.poll(ms(1000)).is_empty());
        assert_eq!(seq.poll(ms(1500)), vec!["new"]);
    }

    #[test]
    fn unbounded_delay_parks_the_sequence() {
        let mut seq = TimedSequence::new();
        seq.start(ms(500), [(Duration::MAX, "never"), (ms(10), "after")]);
        assert_eq!(seq.next_deadline(), Some(Duration::MAX));
        assert!(seq.poll(ms(u64::MAX)).is_empty());
    }
}
