//! Flash value store for RP2040
//!
//! Uses sequential-storage for wear-leveled key-value storage at the top
//! of flash, 64KB unless the board picks another size.
//!
//! Implements the `ValueStore` trait from `numkv-hal`.

use core::ops::Range;

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

// Re-export shared types from numkv-hal
pub use numkv_hal::value_store::{partition_range, VsError, DEFAULT_MEM_SIZE};
pub use numkv_hal::Key;

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on Pico-class boards
pub const STORE_PARTITION_SIZE: usize = DEFAULT_MEM_SIZE as usize; // 64KB for records
pub const STORE_PARTITION_START: usize = FLASH_SIZE - STORE_PARTITION_SIZE;

/// Flash erase size for RP2040
pub const FLASH_ERASE_SIZE: usize = ERASE_SIZE;

/// Flash range for the default store partition
pub const STORE_RANGE: Range<u32> = (STORE_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch buffer size; bounds key + value of a single record
pub const DATA_BUFFER_SIZE: usize = 2048;

struct Inner<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
    buffer: [u8; DATA_BUFFER_SIZE],
}

/// RP2040 flash value store
///
/// Flash access is serialised internally, so the adapter may issue size
/// queries without holding its own lock.
pub struct Rp2040ValueStore<'d> {
    inner: Mutex<CriticalSectionRawMutex, Inner<'d>>,
    range: Range<u32>,
}

impl<'d> Rp2040ValueStore<'d> {
    /// Create a value store over the default partition
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self::with_range(flash, dma, STORE_RANGE)
    }

    /// Create a value store over the top `mem_size` bytes of flash
    ///
    /// Returns `None` unless `mem_size` is a non-zero multiple of the erase
    /// size that fits in flash. The linker script must leave the same
    /// region free.
    pub fn with_mem_size(
        flash: Peri<'d, FLASH>,
        dma: Peri<'d, impl Channel>,
        mem_size: u32,
    ) -> Option<Self> {
        let range = partition_range(FLASH_SIZE as u32, mem_size, FLASH_ERASE_SIZE as u32)?;
        Some(Self::with_range(flash, dma, range))
    }

    fn with_range(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>, range: Range<u32>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                flash: Flash::new(flash, dma),
                buffer: [0u8; DATA_BUFFER_SIZE],
            }),
            range,
        }
    }

    /// Flash range holding the records
    pub fn range(&self) -> Range<u32> {
        self.range.clone()
    }
}

/// Map a sequential-storage failure onto the value-store statuses
fn vs_error<E>(error: sequential_storage::Error<E>) -> VsError {
    match error {
        sequential_storage::Error::FullStorage => VsError::InsufficientStorage,
        _ => VsError::MemAccess,
    }
}

impl<'d> numkv_hal::ValueStore for Rp2040ValueStore<'d> {
    async fn write(&self, key: Key, data: &[u8], overwrite: bool) -> Result<(), VsError> {
        let mut inner = self.inner.lock().await;
        let Inner { flash, buffer } = &mut *inner;

        if !overwrite {
            let existing = map::fetch_item::<Key, &[u8], _>(
                flash,
                self.range(),
                &mut NoCache::new(),
                buffer,
                &key,
            )
            .await
            .map_err(vs_error)?;

            if existing.is_some() {
                return Err(VsError::Overwrite);
            }
        }

        map::store_item(
            flash,
            self.range(),
            &mut NoCache::new(),
            buffer,
            &key,
            &data,
        )
        .await
        .map_err(vs_error)
    }

    async fn read(&self, key: Key, out: &mut [u8]) -> Result<usize, VsError> {
        let mut inner = self.inner.lock().await;
        let Inner { flash, buffer } = &mut *inner;

        let data = map::fetch_item::<Key, &[u8], _>(
            flash,
            self.range(),
            &mut NoCache::new(),
            buffer,
            &key,
        )
        .await
        .map_err(vs_error)?
        .ok_or(VsError::RecordNotFound)?;

        let len = data.len();
        if out.len() < len {
            return Err(VsError::MemAccess);
        }
        out[..len].copy_from_slice(data);
        Ok(len)
    }

    async fn value_size(&self, key: Key) -> Result<usize, VsError> {
        let mut inner = self.inner.lock().await;
        let Inner { flash, buffer } = &mut *inner;

        map::fetch_item::<Key, &[u8], _>(flash, self.range(), &mut NoCache::new(), buffer, &key)
            .await
            .map_err(vs_error)?
            .map(|data| data.len())
            .ok_or(VsError::RecordNotFound)
    }

    async fn delete(&self, key: Key) -> Result<(), VsError> {
        let mut inner = self.inner.lock().await;
        let Inner { flash, buffer } = &mut *inner;

        let existing =
            map::fetch_item::<Key, &[u8], _>(flash, self.range(), &mut NoCache::new(), buffer, &key)
                .await
                .map_err(vs_error)?;
        if existing.is_none() {
            return Err(VsError::RecordNotFound);
        }

        map::remove_item(flash, self.range(), &mut NoCache::new(), buffer, &key)
            .await
            .map_err(vs_error)
    }

    async fn erase(&self) -> Result<(), VsError> {
        let mut inner = self.inner.lock().await;

        // Erase the store partition sector by sector
        inner
            .flash
            .erase(self.range.start, self.range.end)
            .await
            .map_err(|_| VsError::MemAccess)
    }
}
