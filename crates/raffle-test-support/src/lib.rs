//! Shared test mocks and utilities for the secret friend raffle.

mod clock;
mod feedback;
mod rng;
mod store;

pub use clock::FixedClock;
pub use feedback::RecordingFeedbackSink;
pub use rng::{MockRng, SequenceRng};
pub use store::{FailingStore, RecordingStore};
