//! Secret friend raffle session bounded context.
//!
//! The domain layer holds the session aggregate: the participant registry,
//! the draw state machine and the session controller. The application layer
//! runs that aggregate inside a single engine task that owns the draw timers
//! and writes every change through to the persistence adapter.

pub mod application;
pub mod domain;
