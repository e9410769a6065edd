//! Configuration type definitions

use embassy_time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default bounded wait for the adapter lock
pub const DEFAULT_LOCK_TIMEOUT_MS: u32 = 50;

/// Adapter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KvStoreConfig {
    /// Bounded wait for the lock on write/read/delete/reset (ms)
    ///
    /// Zero makes every locked operation a try-lock.
    pub lock_timeout_ms: u32,
}

impl Default for KvStoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }
}

impl KvStoreConfig {
    /// Create a config with the given lock timeout
    pub const fn with_lock_timeout_ms(lock_timeout_ms: u32) -> Self {
        Self { lock_timeout_ms }
    }

    /// Bounded wait as an embassy duration
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms as u64)
    }
}
