//! Domain layer for the raffle session.

pub mod aggregates;
pub mod controller;
pub mod draw;
pub mod registry;
