pub mod accumulator;

pub use accumulator::{AccumulatorState, StreamingAccumulator};
