//! Value-store backend abstraction
//!
//! The value store is the persistent engine underneath the adapter. It owns
//! the record format, wear levelling and recovery; the adapter only forwards
//! calls to it and translates its status codes.

use core::ops::Range;

use crate::key::Key;

/// Default size of the non-volatile region reserved for the value store
///
/// Backends use this unless the board overrides it.
pub const DEFAULT_MEM_SIZE: u32 = 0x10000;

/// Flash range for a value-store region of `mem_size` bytes at the top of
/// a `flash_size` part
///
/// Returns `None` unless `mem_size` is a non-zero multiple of `erase_size`
/// that fits in the part.
pub const fn partition_range(flash_size: u32, mem_size: u32, erase_size: u32) -> Option<Range<u32>> {
    if mem_size == 0 || erase_size == 0 || mem_size > flash_size || mem_size % erase_size != 0 {
        return None;
    }
    Some((flash_size - mem_size)..flash_size)
}

/// Failure statuses reported by a value store
///
/// A backend that speaks raw status bytes converts with
/// [`VsError::from_code`]; a code outside the known set is carried as
/// [`VsError::Other`] rather than being guessed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VsError {
    /// Key exists and overwrite was not allowed
    Overwrite,
    /// Underlying memory could not be accessed
    MemAccess,
    /// Not enough free space for the record
    InsufficientStorage,
    /// No record stored under the key
    RecordNotFound,
    /// Status code outside the known set
    Other(u8),
}

impl VsError {
    /// Raw status byte for success
    pub const CODE_OK: u8 = 0;
    /// Raw status byte for [`VsError::Overwrite`]
    pub const CODE_OVERWRITE: u8 = 1;
    /// Raw status byte for [`VsError::MemAccess`]
    pub const CODE_MEM_ACCESS: u8 = 2;
    /// Raw status byte for [`VsError::InsufficientStorage`]
    pub const CODE_INSUFFICIENT_STORAGE: u8 = 3;
    /// Raw status byte for [`VsError::RecordNotFound`]
    pub const CODE_RECORD_NOT_FOUND: u8 = 4;

    /// Convert a raw status byte into a result
    pub fn from_code(code: u8) -> Result<(), VsError> {
        match code {
            Self::CODE_OK => Ok(()),
            Self::CODE_OVERWRITE => Err(VsError::Overwrite),
            Self::CODE_MEM_ACCESS => Err(VsError::MemAccess),
            Self::CODE_INSUFFICIENT_STORAGE => Err(VsError::InsufficientStorage),
            Self::CODE_RECORD_NOT_FOUND => Err(VsError::RecordNotFound),
            other => Err(VsError::Other(other)),
        }
    }

    /// Get the raw status byte
    pub fn code(self) -> u8 {
        match self {
            VsError::Overwrite => Self::CODE_OVERWRITE,
            VsError::MemAccess => Self::CODE_MEM_ACCESS,
            VsError::InsufficientStorage => Self::CODE_INSUFFICIENT_STORAGE,
            VsError::RecordNotFound => Self::CODE_RECORD_NOT_FOUND,
            VsError::Other(code) => code,
        }
    }
}

/// Persistent key-value backend
///
/// Methods take `&self`: a value store is internally synchronised and may
/// be called while the adapter's own lock is not held (size queries and
/// existence checks do exactly that). Calls are expected to complete
/// without being re-entered for the same key.
pub trait ValueStore {
    /// Store `data` under `key`
    ///
    /// # Arguments
    /// * `key` - The record key
    /// * `data` - Value bytes
    /// * `overwrite` - Replace an existing record instead of failing with
    ///   [`VsError::Overwrite`]
    fn write(
        &self,
        key: Key,
        data: &[u8],
        overwrite: bool,
    ) -> impl core::future::Future<Output = Result<(), VsError>>;

    /// Read the value stored under `key` into `buffer`
    ///
    /// # Returns
    /// The number of bytes read, or an error.
    fn read(
        &self,
        key: Key,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, VsError>>;

    /// Get the length of the value stored under `key`
    fn value_size(&self, key: Key) -> impl core::future::Future<Output = Result<usize, VsError>>;

    /// Remove the record stored under `key`
    fn delete(&self, key: Key) -> impl core::future::Future<Output = Result<(), VsError>>;

    /// Erase every record
    ///
    /// This erases the entire storage region. Use with caution!
    fn erase(&self) -> impl core::future::Future<Output = Result<(), VsError>>;
}
