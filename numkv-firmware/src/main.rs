//! numkv demo firmware
//!
//! Keeps a boot record in RP2040 flash through the numkv adapter and
//! periodically refreshes an uptime record from a second task, so both
//! tasks contend for the store lock.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Instant, Timer};
use serde::{Deserialize, Serialize};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use numkv_core::{KvStore, KvStoreConfig, KvStoreError, MutexLock};
use numkv_hal_rp2040::Rp2040ValueStore;

/// Boot counter record
const KEY_BOOT: u16 = 0x0001;

/// Uptime record, refreshed by the heartbeat task
const KEY_UPTIME: u16 = 0x0002;

/// Store partition size; must match the region `memory.x` leaves free
const STORE_SIZE: u32 = 64 * 1024;

/// Interval between uptime refreshes
const UPTIME_PERIOD: Duration = Duration::from_secs(60);

type Store = KvStore<Rp2040ValueStore<'static>, MutexLock<CriticalSectionRawMutex>>;

// Store must live forever for task references
static STORE: StaticCell<Store> = StaticCell::new();

/// Persisted boot information
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, Format)]
struct BootRecord {
    /// Number of boots including this one
    boots: u32,
    /// Uptime recorded by the previous run (seconds)
    last_uptime_s: u32,
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("numkv demo starting...");

    let p = embassy_rp::init(Default::default());
    let Some(backend) = Rp2040ValueStore::with_mem_size(p.FLASH, p.DMA_CH0, STORE_SIZE) else {
        error!("Invalid store size {}", STORE_SIZE);
        return;
    };

    let store = match Store::init(backend, KvStoreConfig::default()) {
        Ok(store) => STORE.init(store),
        Err(e) => {
            error!("Failed to initialise store: {:?}", e);
            return;
        }
    };

    let record = update_boot_record(store).await;
    info!(
        "Boot #{} (previous run was up {} s)",
        record.boots, record.last_uptime_s
    );

    unwrap!(spawner.spawn(uptime_task(store)));
}

/// Load the boot record, bump the counter and write it back
async fn update_boot_record(store: &Store) -> BootRecord {
    let mut scratch = [0u8; 16];

    let mut record = match store.read_value::<BootRecord>(KEY_BOOT, &mut scratch).await {
        Ok(record) => record,
        Err(KvStoreError::ItemNotFound) => {
            info!("No boot record found, starting fresh");
            BootRecord::default()
        }
        Err(e) => {
            warn!("Boot record unreadable ({:?}), starting fresh", e);
            BootRecord::default()
        }
    };

    // Carry the last uptime over from the previous run
    let mut uptime = [0u8; 4];
    match store.read_into(KEY_UPTIME, &mut uptime).await {
        Ok(4) => record.last_uptime_s = u32::from_le_bytes(uptime),
        Ok(len) => warn!("Uptime record has unexpected length {}", len),
        Err(KvStoreError::ItemNotFound) => {}
        Err(e) => warn!("Failed to read uptime: {:?}", e),
    }

    record.boots = record.boots.wrapping_add(1);
    if let Err(e) = store
        .write_value(KEY_BOOT, &record, &mut scratch, true)
        .await
    {
        error!("Failed to store boot record: {:?}", e);
    }

    record
}

/// Periodically persist the current uptime
#[embassy_executor::task]
async fn uptime_task(store: &'static Store) {
    loop {
        Timer::after(UPTIME_PERIOD).await;

        let uptime_s = Instant::now().as_secs() as u32;
        match store.write(KEY_UPTIME, &uptime_s.to_le_bytes(), true).await {
            Ok(()) => debug!("Uptime {} s stored", uptime_s),
            Err(KvStoreError::Lock(e)) => warn!("Store busy, skipping uptime: {:?}", e),
            Err(e) => error!("Failed to store uptime: {:?}", e),
        }
    }
}
