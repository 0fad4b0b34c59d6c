//! Persistence adapters for the secret friend raffle.

pub mod memory_store;
pub mod schema;
pub mod sqlite_store;
