//! Adapter error codes
//!
//! Thirteen result kinds are shared with the wider key-value interface
//! family. Only a subset is produced by backend translation; the rest are
//! kept so codes stay stable across implementations.

use numkv_hal::VsError;

/// Failure to acquire or manage the adapter lock
///
/// Distinguishes "the operation was never attempted" from a backend
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LockError {
    /// Bounded wait expired before the lock was acquired
    Timeout,
    /// The lock primitive could not be created
    Create,
}

/// Errors returned by [`KvStore`](crate::KvStore) operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KvStoreError {
    /// An invalid parameter value was passed in
    BadParam,
    /// Storage area not aligned to an erase sector boundary
    Alignment,
    /// Memory allocation failed
    MemAlloc,
    /// Invalid data detected, the record may be corrupted
    InvalidData,
    /// Erased data detected, the record may be corrupted
    ErasedData,
    /// Item was not found in storage
    ItemNotFound,
    /// Storage is full
    StorageFull,
    /// Buffer provided is too small for the value
    BufferTooSmall,
    /// Key exists and overwrite was not allowed
    Overwrite,
    /// Write failure
    Write,
    /// Unsupported operation
    Unsupported,
    /// Memory access error
    MemAccess,
    /// Unknown error from the value store
    Unknown,
    /// Lock could not be acquired or created; the backend was not called
    Lock(LockError),
}

impl KvStoreError {
    /// Stable numeric code within the interface family
    ///
    /// Lock failures come from the concurrency layer rather than the
    /// store and have no code.
    pub fn code(&self) -> Option<u8> {
        let code = match self {
            KvStoreError::BadParam => 0,
            KvStoreError::Alignment => 1,
            KvStoreError::MemAlloc => 2,
            KvStoreError::InvalidData => 3,
            KvStoreError::ErasedData => 4,
            KvStoreError::ItemNotFound => 5,
            KvStoreError::StorageFull => 6,
            KvStoreError::BufferTooSmall => 7,
            KvStoreError::Overwrite => 8,
            KvStoreError::Write => 9,
            KvStoreError::Unsupported => 10,
            KvStoreError::MemAccess => 11,
            KvStoreError::Unknown => 12,
            KvStoreError::Lock(_) => return None,
        };
        Some(code)
    }

    /// Check if the operation failed before reaching the value store
    pub fn is_lock_failure(&self) -> bool {
        matches!(self, KvStoreError::Lock(_))
    }
}

impl From<LockError> for KvStoreError {
    fn from(e: LockError) -> Self {
        KvStoreError::Lock(e)
    }
}

impl From<VsError> for KvStoreError {
    fn from(e: VsError) -> Self {
        match e {
            VsError::Overwrite => KvStoreError::Overwrite,
            VsError::MemAccess => KvStoreError::MemAccess,
            VsError::InsufficientStorage => KvStoreError::StorageFull,
            VsError::RecordNotFound => KvStoreError::ItemNotFound,
            VsError::Other(code) => {
                error!("unrecognised value-store status {}", code);
                debug_assert!(false, "unrecognised value-store status {}", code);
                KvStoreError::Unknown
            }
        }
    }
}
