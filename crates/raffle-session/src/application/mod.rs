//! Application layer: engine task, persistence glue and read views.

pub mod engine;
pub mod persistence;
pub mod views;
