use super::GameSignal;

/// Receiver of game signals.
///
/// Handlers are called on the consumer thread, in registration order, once
/// per batch of signals produced by a tick or an external call.
pub trait SignalHandler {
    fn handle_signal(&mut self, signal: &GameSignal);

    fn handle_signals(&mut self, signals: &[GameSignal]) {
        for signal in signals {
            self.handle_signal(signal);
        }
    }
}

/// Token returned on registration, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Ordered subscriber list.
#[derive(Default)]
pub struct SignalBus {
    handlers: Vec<(HandlerId, Box<dyn SignalHandler + Send + Sync>)>,
    next_id: u64,
}

impl std::fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalBus")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: Box<dyn SignalHandler + Send + Sync>) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, handler));
        id
    }

    /// Remove a handler. Unknown or already removed ids are ignored.
    pub fn unsubscribe(&mut self, id: HandlerId) -> Option<Box<dyn SignalHandler + Send + Sync>> {
        let idx = self.handlers.iter().position(|(h, _)| *h == id)?;
        Some(self.handlers.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn dispatch(&mut self, signals: &[GameSignal]) {
        if signals.is_empty() {
            return;
        }
        for (_, handler) in &mut self.handlers {
            handler.handle_signals(signals);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct Tagged {
        tag: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    impl SignalHandler for Tagged {
        fn handle_signal(&mut self, _signal: &GameSignal) {
            self.seen.lock().unwrap().push(self.tag);
        }
    }

    fn ready() -> GameSignal {
        GameSignal::Ready { at: Duration::ZERO }
    }

    #[test]
    fn delivers_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = SignalBus::new();
        for tag in ["first", "second", "third"] {
            bus.subscribe(Box::new(Tagged { tag, seen: Arc::clone(&seen) }));
        }

        bus.dispatch(&[ready()]);
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = SignalBus::new();
        let a = bus.subscribe(Box::new(Tagged { tag: "a", seen: Arc::clone(&seen) }));
        bus.subscribe(Box::new(Tagged { tag: "b", seen: Arc::clone(&seen) }));

        assert!(bus.unsubscribe(a).is_some());
        assert!(bus.unsubscribe(a).is_none());
        assert_eq!(bus.len(), 1);

        bus.dispatch(&[ready()]);
        assert_eq!(*seen.lock().unwrap(), vec!["b"]);
    }
}
