//! Product Cache - consent-gated caching for storefront product lists
//!
//! Caches product list responses in a structured store, falls back to a
//! flat key-value store when that is unavailable, and expires entries after
//! one hour.

pub mod api;
pub mod cache;
pub mod config;
pub mod consent;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::ProductCache;
pub use config::Config;
pub use consent::ConsentState;
pub use tasks::spawn_sweep_task;
