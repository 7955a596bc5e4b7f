//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: deletes entries that outlived the TTL but were never read

mod sweep;

pub use sweep::spawn_sweep_task;
