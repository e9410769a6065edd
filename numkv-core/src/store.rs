//! Key-value store adapter
//!
//! Every operation follows the same shape: validate the arguments, take the
//! lock with a bounded wait, call the value store, translate its status and
//! release the lock. Size queries and existence checks skip the lock.

use heapless::Vec;
use numkv_hal::{Key, ValueStore};

use crate::config::KvStoreConfig;
use crate::error::KvStoreError;
use crate::lock::StoreLock;

/// Validate a raw key
fn validate_key(raw: u16) -> Result<Key, KvStoreError> {
    Key::new(raw).ok_or(KvStoreError::BadParam)
}

/// Check a payload length fits the 32-bit size the value store works in
fn payload_len(len: usize) -> Result<u32, KvStoreError> {
    u32::try_from(len).map_err(|_| KvStoreError::BadParam)
}

/// Numeric-key store handle
///
/// Owns the value-store backend `B` and the lock `L` that serialises calls
/// to it. Independent handles may coexist if the backend allows it.
pub struct KvStore<B: ValueStore, L: StoreLock> {
    backend: B,
    lock: L,
    config: KvStoreConfig,
}

impl<B: ValueStore, L: StoreLock> KvStore<B, L> {
    /// Initialise a store over `backend`
    ///
    /// Creates the lock primitive. Fails with `Lock(Create)` if the
    /// primitive cannot be created.
    pub fn init(backend: B, config: KvStoreConfig) -> Result<Self, KvStoreError> {
        let lock = L::create().inspect_err(|_| error!("failed to create store lock"))?;

        info!("kv store initialised, lock timeout {} ms", config.lock_timeout_ms);
        Ok(Self {
            backend,
            lock,
            config,
        })
    }

    /// Get the active configuration
    pub fn config(&self) -> &KvStoreConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    /// Store `data` under `key`
    ///
    /// With `overwrite` false an existing record is left untouched and
    /// `Overwrite` is returned.
    pub async fn write(&self, key: u16, data: &[u8], overwrite: bool) -> Result<(), KvStoreError> {
        let key = validate_key(key)?;
        payload_len(data.len())?;

        let _guard = self.acquire().await?;
        trace!("write key {} ({} bytes)", key.get(), data.len());
        self.backend
            .write(key, data, overwrite)
            .await
            .inspect_err(|e| debug!("write key {} failed: {}", key.get(), e))?;
        Ok(())
    }

    /// Read, size query or existence check, depending on which outputs are given
    ///
    /// | `data` | `size`    | Behaviour                                          |
    /// |--------|-----------|----------------------------------------------------|
    /// | `None` | `Some`    | Size query: `*size` = stored length, unlocked      |
    /// | `None` | `None`    | Existence check, unlocked                          |
    /// | `Some` | `Some(n)` | Locked read into `data[..n]`, `*size` = bytes read |
    ///
    /// A buffer with no size, a size of zero, or a size larger than the
    /// buffer is `BadParam`. The unlocked modes may observe a value in the
    /// middle of a concurrent write; use the locked read for a consistent
    /// view.
    pub async fn read(
        &self,
        key: u16,
        data: Option<&mut [u8]>,
        size: Option<&mut usize>,
    ) -> Result<(), KvStoreError> {
        let key = validate_key(key)?;

        match (data, size) {
            (Some(_), None) | (Some(_), Some(&mut 0)) => Err(KvStoreError::BadParam),
            (None, Some(size)) => {
                *size = self.backend.value_size(key).await?;
                Ok(())
            }
            (None, None) => {
                self.backend.value_size(key).await?;
                Ok(())
            }
            (Some(data), Some(size)) => {
                let buffer = data.get_mut(..*size).ok_or(KvStoreError::BadParam)?;

                let _guard = self.acquire().await?;
                trace!("read key {} (up to {} bytes)", key.get(), buffer.len());
                *size = self
                    .backend
                    .read(key, buffer)
                    .await
                    .inspect_err(|e| debug!("read key {} failed: {}", key.get(), e))?;
                Ok(())
            }
        }
    }

    /// Read the value under `key` into `buffer`
    ///
    /// # Returns
    /// The number of bytes read.
    pub async fn read_into(&self, key: u16, buffer: &mut [u8]) -> Result<usize, KvStoreError> {
        let mut size = buffer.len();
        self.read(key, Some(buffer), Some(&mut size)).await?;
        Ok(size)
    }

    /// Get the stored length of the value under `key` (unlocked)
    pub async fn value_size(&self, key: u16) -> Result<usize, KvStoreError> {
        let mut size = 0;
        self.read(key, None, Some(&mut size)).await?;
        Ok(size)
    }

    /// Check that a record exists under `key` (unlocked)
    ///
    /// Returns `ItemNotFound` if it does not.
    pub async fn contains(&self, key: u16) -> Result<(), KvStoreError> {
        self.read(key, None, None).await
    }

    /// Read the value under `key` into a fixed-capacity vector
    pub async fn read_to_vec<const N: usize>(&self, key: u16) -> Result<Vec<u8, N>, KvStoreError> {
        let mut buffer: Vec<u8, N> = Vec::new();
        buffer
            .resize_default(N)
            .map_err(|_| KvStoreError::BufferTooSmall)?;
        let len = self.read_into(key, &mut buffer).await?;
        buffer.truncate(len);
        Ok(buffer)
    }

    /// Remove the record under `key`
    ///
    /// A key with no record yields `ItemNotFound`.
    pub async fn delete(&self, key: u16) -> Result<(), KvStoreError> {
        let key = validate_key(key)?;

        let _guard = self.acquire().await?;
        trace!("delete key {}", key.get());
        self.backend.delete(key).await?;
        Ok(())
    }

    /// Erase every record in the store
    pub async fn reset(&self) -> Result<(), KvStoreError> {
        let _guard = self.acquire().await?;
        info!("erasing kv store");
        self.backend
            .erase()
            .await
            .inspect_err(|e| warn!("erase failed: {}", e))?;
        Ok(())
    }

    /// Tear the store down and hand the backend back
    ///
    /// Waits without a timeout for the lock so an in-flight operation is
    /// never cut short, releases it, and only then destroys the primitive.
    pub async fn deinit(self) -> B {
        let Self { backend, lock, .. } = self;

        let guard = lock.acquire_forever().await;
        drop(guard);

        let result = lock.destroy();
        debug_assert!(result.is_ok(), "failed to destroy store lock");
        if result.is_err() {
            error!("failed to destroy store lock");
        }

        info!("kv store deinitialised");
        backend
    }

    /// Take the lock with the configured bounded wait
    async fn acquire(&self) -> Result<L::Guard<'_>, KvStoreError> {
        self.lock
            .acquire(self.config.lock_timeout())
            .await
            .inspect_err(|_| warn!("kv store lock timed out after {} ms", self.config.lock_timeout_ms))
            .map_err(KvStoreError::from)
    }
}
