use std::sync::{Arc, Once};

use redis_connection::{CacheStore, Memory, config::MemoryConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::clock::ManualClock;

static TRACING: Once = Once::new();

/// Install a fmt subscriber once per test binary. Honors `RUST_LOG`.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::new(
                std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
            ))
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

/// A memory store driven by a manual clock, plus the clock itself
pub fn memory_store_with_clock() -> (Arc<Memory>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let store =
        Arc::new(Memory::with_clock(MemoryConfig::default(), clock.clone()));
    (store, clock)
}

/// A memory store on the wall clock, erased to `dyn CacheStore`
pub fn memory_store() -> Arc<dyn CacheStore> {
    Arc::new(Memory::new(MemoryConfig::default()))
}
