//! Turning noisy per-tick recognizer output into confirmed gesture pairs.

mod stabilizer;

pub use stabilizer::{GestureStabilizer, HandPresence, StabilizerOutput};
