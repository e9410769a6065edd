//! Numeric-key value storage adapter
//!
//! This crate sits between application firmware and a persistent value
//! store implementing [`numkv_hal::ValueStore`]:
//!
//! - Key validation (14-bit keys in `1..=0x3FFE`)
//! - Lock-guarded access with a bounded wait
//! - Unlocked size queries and existence checks
//! - Translation of value-store statuses into [`KvStoreError`]
//! - Postcard-encoded typed values (`serde` feature)
//!
//! No record format, wear levelling or recovery lives here; that is the
//! value store's job.
//!
//! # Example
//!
//! ```ignore
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use numkv_core::{KvStore, KvStoreConfig, MutexLock};
//!
//! let store: KvStore<_, MutexLock<CriticalSectionRawMutex>> =
//!     KvStore::init(backend, KvStoreConfig::default())?;
//!
//! store.write(0x10, b"hello", true).await?;
//! let len = store.value_size(0x10).await?;
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod lock;
pub mod store;
#[cfg(feature = "serde")]
pub mod typed;

#[cfg(test)]
mod testing;

pub use config::{KvStoreConfig, DEFAULT_LOCK_TIMEOUT_MS};
pub use error::{KvStoreError, LockError};
pub use lock::{MutexLock, NoLock, StoreLock};
pub use numkv_hal::{Key, ValueStore, VsError, MAX_KEY};
pub use store::KvStore;
