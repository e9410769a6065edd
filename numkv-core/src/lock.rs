//! Lock strategies
//!
//! The adapter serialises backend calls through a [`StoreLock`] chosen when
//! the store is created. [`MutexLock`] is used when several tasks (or
//! cores) share a store; [`NoLock`] is for single-task firmware where
//! locking would only cost time.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embassy_time::{with_timeout, Duration};

use crate::error::LockError;

/// Mutual exclusion around value-store calls
///
/// The returned guard releases the lock when dropped.
pub trait StoreLock {
    /// Held-lock token
    type Guard<'a>
    where
        Self: 'a;

    /// Create the lock primitive
    fn create() -> Result<Self, LockError>
    where
        Self: Sized;

    /// Acquire the lock, giving up after `timeout`
    fn acquire(
        &self,
        timeout: Duration,
    ) -> impl core::future::Future<Output = Result<Self::Guard<'_>, LockError>>;

    /// Acquire the lock, waiting as long as it takes
    fn acquire_forever(&self) -> impl core::future::Future<Output = Self::Guard<'_>>;

    /// Destroy the lock primitive
    ///
    /// Only called once the lock is known to be free.
    fn destroy(self) -> Result<(), LockError>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// No-op lock for single-task use
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoLock;

impl StoreLock for NoLock {
    type Guard<'a> = ();

    fn create() -> Result<Self, LockError> {
        Ok(NoLock)
    }

    async fn acquire(&self, _timeout: Duration) -> Result<(), LockError> {
        Ok(())
    }

    async fn acquire_forever(&self) {}
}

/// Lock backed by an embassy-sync async mutex
///
/// `M` selects the raw mutex: `CriticalSectionRawMutex` when the store is
/// shared across interrupt priorities or cores, `NoopRawMutex` when all
/// users run on one executor.
pub struct MutexLock<M: RawMutex> {
    mutex: Mutex<M, ()>,
}

impl<M: RawMutex> MutexLock<M> {
    /// Create a new, unlocked mutex lock
    pub const fn new() -> Self {
        Self {
            mutex: Mutex::new(()),
        }
    }
}

impl<M: RawMutex> Default for MutexLock<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> StoreLock for MutexLock<M> {
    type Guard<'a>
        = MutexGuard<'a, M, ()>
    where
        Self: 'a;

    fn create() -> Result<Self, LockError> {
        Ok(Self::new())
    }

    async fn acquire(&self, timeout: Duration) -> Result<MutexGuard<'_, M, ()>, LockError> {
        with_timeout(timeout, self.mutex.lock())
            .await
            .map_err(|_| LockError::Timeout)
    }

    async fn acquire_forever(&self) -> MutexGuard<'_, M, ()> {
        self.mutex.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    #[test]
    fn test_no_lock_never_blocks() {
        let lock = NoLock::create().unwrap();
        block_on(async {
            // Overlapping acquisitions are fine, there is nothing to hold
            let first = lock.acquire(Duration::from_millis(1)).await;
            let second = lock.acquire(Duration::from_millis(1)).await;
            assert_eq!(first, Ok(()));
            assert_eq!(second, Ok(()));
            lock.acquire_forever().await;
        });
        assert_eq!(lock.destroy(), Ok(()));
    }

    #[test]
    fn test_mutex_lock_times_out_while_held() {
        let lock = MutexLock::<CriticalSectionRawMutex>::create().unwrap();
        block_on(async {
            let guard = lock.acquire(Duration::from_millis(10)).await.unwrap();
            let contended = lock.acquire(Duration::from_millis(5)).await;
            assert!(matches!(contended, Err(LockError::Timeout)));

            drop(guard);
            assert!(lock.acquire(Duration::from_millis(5)).await.is_ok());
        });
    }

    #[test]
    fn test_mutex_lock_forever_after_release() {
        let lock = MutexLock::<CriticalSectionRawMutex>::new();
        block_on(async {
            drop(lock.acquire_forever().await);
            drop(lock.acquire_forever().await);
        });
        assert_eq!(lock.destroy(), Ok(()));
    }
}
