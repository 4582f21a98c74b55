//! Signals, their subscribers, and the match lifecycle that emits most of them.

mod handler;
mod match_state;
mod signal;
mod timer;

pub use handler::{HandlerId, SignalBus, SignalHandler};
pub use match_state::MatchStateMachine;
pub use signal::{ClearReason, FizzleReason, GameSignal, MatchState};
pub use timer::TimedSequence;
