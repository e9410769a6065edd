//! Typed values
//!
//! Postcard encoding layered on top of the raw byte API. The adapter still
//! stores opaque bytes; these helpers only save callers the encode/decode
//! step.

use numkv_hal::ValueStore;
use postcard::Error as PostcardError;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::KvStoreError;
use crate::lock::StoreLock;
use crate::store::KvStore;

impl<B: ValueStore, L: StoreLock> KvStore<B, L> {
    /// Encode `value` with postcard and store it under `key`
    ///
    /// # Arguments
    /// * `scratch` - Buffer the encoding is built in; must fit the encoded value
    pub async fn write_value<T: Serialize>(
        &self,
        key: u16,
        value: &T,
        scratch: &mut [u8],
        overwrite: bool,
    ) -> Result<(), KvStoreError> {
        let bytes = postcard::to_slice(value, scratch).map_err(|e| match e {
            PostcardError::SerializeBufferFull => KvStoreError::BufferTooSmall,
            _ => KvStoreError::InvalidData,
        })?;
        self.write(key, bytes, overwrite).await
    }

    /// Read the value under `key` and decode it with postcard
    ///
    /// A record that does not decode as `T` is `InvalidData`.
    pub async fn read_value<T: DeserializeOwned>(
        &self,
        key: u16,
        scratch: &mut [u8],
    ) -> Result<T, KvStoreError> {
        let len = self.read_into(key, scratch).await?;
        postcard::from_bytes(&scratch[..len]).map_err(|_| {
            debug!("record under key {} failed to decode", key);
            KvStoreError::InvalidData
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KvStoreConfig;
    use crate::lock::NoLock;
    use crate::testing::MemoryStore;
    use embassy_futures::block_on;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Calibration {
        channel: u8,
        offset: i16,
        gain: u32,
    }

    fn store() -> KvStore<MemoryStore, NoLock> {
        KvStore::init(MemoryStore::new(), KvStoreConfig::default()).unwrap()
    }

    #[test]
    fn test_typed_roundtrip() {
        let store = store();
        let calibration = Calibration {
            channel: 3,
            offset: -120,
            gain: 40_000,
        };
        block_on(async {
            let mut scratch = [0u8; 16];
            store
                .write_value(0x30, &calibration, &mut scratch, true)
                .await
                .unwrap();

            let mut scratch = [0u8; 16];
            let read: Calibration = store.read_value(0x30, &mut scratch).await.unwrap();
            assert_eq!(read, calibration);
        });
    }

    #[test]
    fn test_scratch_too_small() {
        let store = store();
        let calibration = Calibration {
            channel: 1,
            offset: 0,
            gain: u32::MAX,
        };
        let mut scratch = [0u8; 2];
        assert_eq!(
            block_on(store.write_value(0x31, &calibration, &mut scratch, true)),
            Err(KvStoreError::BufferTooSmall)
        );
        // Nothing reached the backend
        assert_eq!(store.backend().calls(), 0);
    }

    #[test]
    fn test_undecodable_record() {
        let store = store();
        block_on(async {
            // A lone continuation byte is never a complete varint
            store.write(0x32, &[0x80], true).await.unwrap();
            let mut scratch = [0u8; 16];
            let read: Result<u32, _> = store.read_value(0x32, &mut scratch).await;
            assert_eq!(read, Err(KvStoreError::InvalidData));
        });
    }

    #[test]
    fn test_missing_record() {
        let store = store();
        let mut scratch = [0u8; 16];
        let read: Result<u32, _> = block_on(store.read_value(0x33, &mut scratch));
        assert_eq!(read, Err(KvStoreError::ItemNotFound));
    }
}
