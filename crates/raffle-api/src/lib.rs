//! Secret friend raffle HTTP API.
//!
//! Exposes the single raffle session to a presentation layer: JSON commands
//! and queries under `/api/v1/raffle`, plus a server-sent-events stream of
//! feedback cues.

pub mod config;
pub mod error;
pub mod feedback;
pub mod routes;
pub mod state;
