//! Process-wide counters for the synchronizer.
//! Read with [`snapshot`]; the binary logs one on shutdown.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

static FRAMES_RECEIVED: AtomicU64 = AtomicU64::new(0);
static FRAMES_DROPPED: AtomicU64 = AtomicU64::new(0);
static ITEMS_APPLIED: AtomicU64 = AtomicU64::new(0);
static UNKNOWN_ITEMS: AtomicU64 = AtomicU64::new(0);
static LOCATIONS_SENT: AtomicU64 = AtomicU64::new(0);
static RESYNC_PASSES: AtomicU64 = AtomicU64::new(0);
static UNMATCHED_OBJECTS: AtomicU64 = AtomicU64::new(0);

static BLOCKED_TRANSITIONS: OnceLock<Mutex<HashMap<String, u64>>> = OnceLock::new();

pub fn inc_frames_received() {
    FRAMES_RECEIVED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_frames_dropped() {
    FRAMES_DROPPED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_items_applied() {
    ITEMS_APPLIED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_unknown_items() {
    UNKNOWN_ITEMS.fetch_add(1, Ordering::Relaxed);
}
pub fn add_locations_sent(count: usize) {
    LOCATIONS_SENT.fetch_add(count as u64, Ordering::Relaxed);
}
pub fn inc_resync_passes() {
    RESYNC_PASSES.fetch_add(1, Ordering::Relaxed);
}
pub fn add_unmatched_objects(count: usize) {
    UNMATCHED_OBJECTS.fetch_add(count as u64, Ordering::Relaxed);
}

fn blocked_lock() -> &'static Mutex<HashMap<String, u64>> {
    BLOCKED_TRANSITIONS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Count a blocked region transition. Returns the new count for that region.
pub fn record_blocked_transition(region: &str) -> u64 {
    match blocked_lock().lock() {
        Ok(mut guard) => {
            let counter = guard.entry(region.to_string()).or_default();
            *counter = counter.saturating_add(1);
            *counter
        }
        Err(_) => 0,
    }
}

pub fn blocked_transitions_snapshot() -> HashMap<String, u64> {
    blocked_lock()
        .lock()
        .map(|guard| guard.clone())
        .unwrap_or_default()
}

#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    pub frames_received: u64,
    pub frames_dropped: u64,
    pub items_applied: u64,
    pub unknown_items: u64,
    pub locations_sent: u64,
    pub resync_passes: u64,
    pub unmatched_objects: u64,
    pub blocked_transitions: u64,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        frames_received: FRAMES_RECEIVED.load(Ordering::Relaxed),
        frames_dropped: FRAMES_DROPPED.load(Ordering::Relaxed),
        items_applied: ITEMS_APPLIED.load(Ordering::Relaxed),
        unknown_items: UNKNOWN_ITEMS.load(Ordering::Relaxed),
        locations_sent: LOCATIONS_SENT.load(Ordering::Relaxed),
        resync_passes: RESYNC_PASSES.load(Ordering::Relaxed),
        unmatched_objects: UNMATCHED_OBJECTS.load(Ordering::Relaxed),
        blocked_transitions: blocked_transitions_snapshot().values().sum(),
    }
}
