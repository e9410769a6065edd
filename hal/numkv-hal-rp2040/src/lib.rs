//! RP2040 value store for the numkv adapter
//!
//! This crate provides an RP2040-specific implementation of the shared
//! `numkv-hal` [`ValueStore`](numkv_hal::ValueStore) trait:
//!
//! - Flash partition layout (last 64KB of a 2MB part)
//! - Wear-leveled records via sequential-storage

#![no_std]

pub mod flash;

pub use flash::Rp2040ValueStore;
// Re-export shared traits from numkv-hal for convenience
pub use numkv_hal::{Key, ValueStore, VsError};
