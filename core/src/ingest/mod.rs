mod queue;

pub use queue::{GestureIngestQueue, GestureProducer, RecognizedGesture};
