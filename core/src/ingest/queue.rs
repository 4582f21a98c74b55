//! Thread-safe hand-off from recognition producers to the game-logic consumer.
//!
//! Producers may live on any thread and never block; the single consumer
//! drains everything that arrived since the previous tick, in send order.

use handspell_types::{GestureLabel, GesturePair};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};

use crate::caster::CasterId;

/// One recognizer result, already mapped to labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognizedGesture {
    pub caster: CasterId,
    pub pair: GesturePair,
}

/// Unbounded multi-producer, single-consumer gesture queue.
///
/// There is no backpressure: a producer that outpaces the consumer grows
/// memory rather than losing events.
#[derive(Debug)]
pub struct GestureIngestQueue {
    tx: UnboundedSender<RecognizedGesture>,
    rx: UnboundedReceiver<RecognizedGesture>,
}

impl Default for GestureIngestQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureIngestQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Create a producer handle bound to one caster. Handles are cheap to clone
    /// and can be moved to recognition threads.
    pub fn producer(&self, caster: CasterId) -> GestureProducer {
        GestureProducer {
            caster,
            tx: self.tx.clone(),
        }
    }

    /// Enqueue a pair from the consumer side (tests, scripted input).
    pub fn push(&self, caster: CasterId, left: GestureLabel, right: GestureLabel) {
        // The receiver lives in `self`, so this cannot fail.
        let _ = self.tx.send(RecognizedGesture {
            caster,
            pair: GesturePair::new(left, right),
        });
    }

    /// Remove and return everything queued so far, oldest first.
    ///
    /// Call once per consumer tick.
    pub fn drain_all(&mut self) -> Vec<RecognizedGesture> {
        let mut drained = Vec::with_capacity(self.rx.len());
        loop {
            match self.rx.try_recv() {
                Ok(gesture) => drained.push(gesture),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        drained
    }

    /// Number of gestures waiting to be drained.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

/// Producer side of the queue, invoked from the recognition callback.
#[derive(Debug, Clone)]
pub struct GestureProducer {
    caster: CasterId,
    tx: UnboundedSender<RecognizedGesture>,
}

impl GestureProducer {
    pub fn caster(&self) -> CasterId {
        self.caster
    }

    /// Recognition callback: map the raw per-hand strings and enqueue them.
    ///
    /// Never blocks and never fails. If the match has been torn down the
    /// gesture is dropped.
    pub fn on_gesture_recognized(&self, left: &str, right: &str) {
        self.push(GestureLabel::from_raw(left), GestureLabel::from_raw(right));
    }

    pub fn push(&self, left: GestureLabel, right: GestureLabel) {
        let gesture = RecognizedGesture {
            caster: self.caster,
            pair: GesturePair::new(left, right),
        };
        if self.tx.send(gesture).is_err() {
            tracing::trace!(caster = %self.caster, "gesture dropped, consumer is gone");
        }
    }
}
