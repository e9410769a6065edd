//! Test doubles for the adapter
//!
//! `MemoryStore` stands in for the value store; the lock doubles count or
//! record what the adapter does with its lock.

use core::cell::RefCell;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex as StdMutex};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Duration;
use numkv_hal::{Key, ValueStore, VsError};

use crate::error::LockError;
use crate::lock::StoreLock;

/// In-memory value store with failure injection
pub struct MemoryStore {
    records: Mutex<CriticalSectionRawMutex, RefCell<BTreeMap<u16, Vec<u8>>>>,
    injected: Mutex<CriticalSectionRawMutex, RefCell<Option<VsError>>>,
    calls: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(RefCell::new(BTreeMap::new())),
            injected: Mutex::new(RefCell::new(None)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Make the next backend call fail with `error`
    pub fn fail_next(&self, error: VsError) {
        self.injected.lock(|injected| *injected.borrow_mut() = Some(error));
    }

    /// Number of backend calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.lock(|records| records.borrow().len())
    }

    fn enter(&self) -> Result<(), VsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.injected.lock(|injected| injected.borrow_mut().take()) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn with_records<R>(&self, f: impl FnOnce(&mut BTreeMap<u16, Vec<u8>>) -> R) -> R {
        self.records.lock(|records| f(&mut records.borrow_mut()))
    }
}

impl ValueStore for MemoryStore {
    async fn write(&self, key: Key, data: &[u8], overwrite: bool) -> Result<(), VsError> {
        self.enter()?;
        self.with_records(|records| {
            if !overwrite && records.contains_key(&key.get()) {
                return Err(VsError::Overwrite);
            }
            records.insert(key.get(), data.to_vec());
            Ok(())
        })
    }

    async fn read(&self, key: Key, buffer: &mut [u8]) -> Result<usize, VsError> {
        self.enter()?;
        self.with_records(|records| {
            let value = records.get(&key.get()).ok_or(VsError::RecordNotFound)?;
            let target = buffer.get_mut(..value.len()).ok_or(VsError::MemAccess)?;
            target.copy_from_slice(value);
            Ok(value.len())
        })
    }

    async fn value_size(&self, key: Key) -> Result<usize, VsError> {
        self.enter()?;
        self.with_records(|records| {
            records
                .get(&key.get())
                .map(Vec::len)
                .ok_or(VsError::RecordNotFound)
        })
    }

    async fn delete(&self, key: Key) -> Result<(), VsError> {
        self.enter()?;
        self.with_records(|records| {
            records
                .remove(&key.get())
                .map(drop)
                .ok_or(VsError::RecordNotFound)
        })
    }

    async fn erase(&self) -> Result<(), VsError> {
        self.enter()?;
        self.with_records(|records| records.clear());
        Ok(())
    }
}

/// Lock that counts acquisitions and releases without blocking
pub struct CountingLock {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl CountingLock {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

pub struct CountingGuard<'a> {
    lock: &'a CountingLock,
}

impl Drop for CountingGuard<'_> {
    fn drop(&mut self) {
        self.lock.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl StoreLock for CountingLock {
    type Guard<'a> = CountingGuard<'a>;

    fn create() -> Result<Self, LockError> {
        Ok(Self {
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        })
    }

    async fn acquire(&self, _timeout: Duration) -> Result<CountingGuard<'_>, LockError> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(CountingGuard { lock: self })
    }

    async fn acquire_forever(&self) -> CountingGuard<'_> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        CountingGuard { lock: self }
    }
}

/// Lock whose primitive can never be created
pub struct FailingLock;

impl StoreLock for FailingLock {
    type Guard<'a> = ();

    fn create() -> Result<Self, LockError> {
        Err(LockError::Create)
    }

    async fn acquire(&self, _timeout: Duration) -> Result<(), LockError> {
        Err(LockError::Timeout)
    }

    async fn acquire_forever(&self) {}
}

/// Lock lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockEvent {
    Create,
    Acquire,
    AcquireForever,
    Release,
    Destroy,
}

/// Shared event log that outlives the lock
#[derive(Clone, Default)]
pub struct LockLog(Arc<StdMutex<Vec<LockEvent>>>);

impl LockLog {
    fn push(&self, event: LockEvent) {
        if let Ok(mut events) = self.0.lock() {
            events.push(event);
        }
    }

    pub fn events(&self) -> Vec<LockEvent> {
        self.0.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

/// Lock that records every lifecycle event
pub struct RecordingLock {
    log: LockLog,
}

impl RecordingLock {
    pub fn log(&self) -> LockLog {
        self.log.clone()
    }
}

pub struct RecordingGuard<'a> {
    log: &'a LockLog,
}

impl Drop for RecordingGuard<'_> {
    fn drop(&mut self) {
        self.log.push(LockEvent::Release);
    }
}

impl StoreLock for RecordingLock {
    type Guard<'a> = RecordingGuard<'a>;

    fn create() -> Result<Self, LockError> {
        let log = LockLog::default();
        log.push(LockEvent::Create);
        Ok(Self { log })
    }

    async fn acquire(&self, _timeout: Duration) -> Result<RecordingGuard<'_>, LockError> {
        self.log.push(LockEvent::Acquire);
        Ok(RecordingGuard { log: &self.log })
    }

    async fn acquire_forever(&self) -> RecordingGuard<'_> {
        self.log.push(LockEvent::AcquireForever);
        RecordingGuard { log: &self.log }
    }

    fn destroy(self) -> Result<(), LockError> {
        self.log.push(LockEvent::Destroy);
        Ok(())
    }
}
