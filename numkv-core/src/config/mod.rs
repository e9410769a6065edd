//! Configuration types
//!
//! Adapter settings. Optionally serde-serializable so firmware can embed
//! or persist them alongside its own configuration.

pub mod types;

pub use types::*;
