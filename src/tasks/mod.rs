//! Background Tasks Module
//!
//! Maintenance tasks that run alongside the cache engine.

mod sweep;

pub use sweep::spawn_sweep_task;
