//! numkv Value-Store Abstraction
//!
//! This crate defines the contract between the numkv adapter and the
//! persistent value store it delegates to. Chip-specific crates implement
//! [`ValueStore`] on top of their flash; the adapter in `numkv-core` only
//! ever talks to the trait.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application firmware                   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  numkv-core (KvStore adapter)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  numkv-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  numkv-hal-rp2040 (sequential-storage)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Items
//!
//! - [`Key`] - Validated 14-bit record key
//! - [`VsError`] - Backend status codes
//! - [`ValueStore`] - Persistent key-value backend

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod key;
pub mod value_store;

// Re-export key items at crate root for convenience
pub use key::{Key, MAX_KEY};
pub use value_store::{partition_range, ValueStore, VsError, DEFAULT_MEM_SIZE};
