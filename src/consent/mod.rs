//! Consent Module
//!
//! Tracks whether the user has opted in to client-side caching. Every cache
//! read and write is gated on the recorded decision being `accepted`.

mod manager;
mod state;

pub use manager::ConsentManager;
pub use state::ConsentState;

// == Public Constants ==
/// Flat store slot holding the consent decision
pub const PERMISSION_KEY: &str = "cache_permission";

/// Flat store slot holding when the decision was recorded (Unix milliseconds)
pub const PERMISSION_TIMESTAMP_KEY: &str = "cache_permission_timestamp";
