//! Raffle core: shared abstractions.
//!
//! Defines the error types, the name normalizer and the collaborator traits
//! (randomness, time, persistence, feedback) that the session engine is
//! built against. It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod feedback;
pub mod name;
pub mod rng;
pub mod store;
