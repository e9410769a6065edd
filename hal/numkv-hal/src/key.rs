//! Record keys
//!
//! Keys are 14-bit identifiers. The two upper bits are reserved for the
//! value store's internal use, and `0` / `0x3FFF` are never valid.

/// Largest key an application may use
pub const MAX_KEY: u16 = 0x3FFE;

/// A validated record key in `1..=MAX_KEY`
///
/// Backends receive this type rather than a raw `u16`, so they never
/// observe an out-of-range key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Key(u16);

impl Key {
    /// Create a key from a raw value, or `None` if it is out of range
    pub const fn new(raw: u16) -> Option<Self> {
        if Self::is_valid(raw) {
            Some(Key(raw))
        } else {
            None
        }
    }

    /// Check whether a raw value is a usable key
    pub const fn is_valid(raw: u16) -> bool {
        raw > 0 && raw <= MAX_KEY
    }

    /// Get the raw key value
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl From<Key> for u16 {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl TryFrom<u16> for Key {
    type Error = u16;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        Key::new(raw).ok_or(raw)
    }
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for Key {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.len() < 2 {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[..2].copy_from_slice(&self.0.to_le_bytes());
        Ok(2)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.len() < 2 {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        let raw = u16::from_le_bytes([buffer[0], buffer[1]]);
        match Key::new(raw) {
            Some(key) => Ok((key, 2)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}
