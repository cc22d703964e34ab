use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DRIVER_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

/// Returns a process-unique driver id. Ids are small so namespaced emitter ids stay readable.
pub fn next_driver_id() -> u64 {
    NEXT_DRIVER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Returns a process-unique connection id for correlating logs before a driver exists.
pub fn next_conn_id() -> u64 {
    NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed)
}
