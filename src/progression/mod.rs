//! # Progression State
//!
//! The authoritative record of what the slot has received and reported:
//! capability flags, bounded counters, the set of location ids already sent,
//! and the remote item stream high-water mark.
//!
//! All mutation happens on the update tick. [`ProgressionState::apply`] is the
//! idempotence boundary: it returns `true` only on the first off -> on
//! transition, and every world-side effect is keyed off that return value.
//!
//! ## Persistence layout
//!
//! Flat keys under the `gb.` namespace of a [`KvStore`]:
//!
//! | key                     | value                          |
//! |-------------------------|--------------------------------|
//! | `gb.identity.server`    | normalized `host:port`         |
//! | `gb.identity.slot`      | slot name                      |
//! | `gb.flag.<capability>`  | `1`                            |
//! | `gb.counter.<capability>` | counter value                |
//! | `gb.locations.sent`     | comma-joined location ids      |
//! | `gb.items.applied`      | next unseen item stream index  |
//! | `gb.options.npc_souls`  | `1` / `0`                      |
//! | `gb.options.prop_souls` | `1` / `0`                      |
//! | `gb.saved_at`           | RFC 3339 timestamp             |

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::{debug, info};

use crate::storage::{KvStore, StorageError};
use crate::validation::{split_server_address, validate_slot_name, IdentityError};

pub const NAMESPACE: &str = "gb.";
const KEY_SERVER: &str = "gb.identity.server";
const KEY_SLOT: &str = "gb.identity.slot";
const FLAG_PREFIX: &str = "gb.flag.";
const COUNTER_PREFIX: &str = "gb.counter.";
const KEY_LOCATIONS: &str = "gb.locations.sent";
const KEY_ITEMS_APPLIED: &str = "gb.items.applied";
const KEY_OPT_NPC: &str = "gb.options.npc_souls";
const KEY_OPT_PROP: &str = "gb.options.prop_souls";
const KEY_SAVED_AT: &str = "gb.saved_at";

/// (server, slot) pair that keys persisted progression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub server: String,
    pub slot: String,
}

impl SessionIdentity {
    pub fn new(address: &str, port: u16, slot: &str) -> Result<Self, IdentityError> {
        let (host, port) = split_server_address(address, port)?;
        Ok(Self {
            server: format!("{}:{}", host, port),
            slot: validate_slot_name(slot)?,
        })
    }

    /// The last persisted identity, if any.
    pub fn load<S: KvStore + ?Sized>(store: &S) -> Option<Self> {
        let server = store.get_string(KEY_SERVER, "");
        let slot = store.get_string(KEY_SLOT, "");
        if server.is_empty() || slot.is_empty() {
            return None;
        }
        Some(Self { server, slot })
    }

    pub fn save<S: KvStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        store.set_string(KEY_SERVER, &self.server)?;
        store.set_string(KEY_SLOT, &self.slot)?;
        Ok(())
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.slot, self.server)
    }
}

/// Per-slot generation options announced by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotOptions {
    pub npc_souls: bool,
    pub prop_souls: bool,
}

impl Default for SlotOptions {
    fn default() -> Self {
        Self {
            npc_souls: true,
            prop_souls: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressionState {
    flags: BTreeSet<String>,
    counters: BTreeMap<String, u32>,
    locations_sent: BTreeSet<i64>,
    items_applied: u64,
    options: SlotOptions,
    dirty: bool,
}

impl ProgressionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag. Returns `true` only when it was previously unset.
    pub fn apply(&mut self, capability: &str) -> bool {
        let transitioned = self.flags.insert(capability.to_string());
        if transitioned {
            self.dirty = true;
            debug!("capability {} set", capability);
        }
        transitioned
    }

    pub fn is_set(&self, capability: &str) -> bool {
        self.flags.contains(capability)
    }

    /// Increment a counter up to `max`. Returns the new value, or `None` if
    /// the counter was already at its cap.
    pub fn increment_counter(&mut self, capability: &str, max: u32) -> Option<u32> {
        let value = self.counters.entry(capability.to_string()).or_insert(0);
        if *value >= max {
            return None;
        }
        *value += 1;
        self.dirty = true;
        Some(*value)
    }

    pub fn counter(&self, capability: &str) -> u32 {
        self.counters.get(capability).copied().unwrap_or(0)
    }

    pub fn has_location(&self, location: i64) -> bool {
        self.locations_sent.contains(&location)
    }

    /// Record a location as reported. Returns `false` if it already was.
    pub fn mark_location_sent(&mut self, location: i64) -> bool {
        let inserted = self.locations_sent.insert(location);
        if inserted {
            self.dirty = true;
        }
        inserted
    }

    pub fn locations_sent(&self) -> impl Iterator<Item = i64> + '_ {
        self.locations_sent.iter().copied()
    }

    pub fn flags(&self) -> impl Iterator<Item = &str> + '_ {
        self.flags.iter().map(String::as_str)
    }

    pub fn counters(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.counters.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn items_applied(&self) -> u64 {
        self.items_applied
    }

    /// Whether the item at stream `position` was already applied in an earlier session.
    pub fn is_replay(&self, position: u64) -> bool {
        position < self.items_applied
    }

    pub fn advance_items_applied(&mut self, position: u64) {
        if position >= self.items_applied {
            self.items_applied = position.saturating_add(1);
            self.dirty = true;
        }
    }

    pub fn options(&self) -> SlotOptions {
        self.options
    }

    pub fn set_options(&mut self, options: SlotOptions) {
        if self.options != options {
            self.options = options;
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Drop everything in memory.
    pub fn clear(&mut self) {
        *self = Self {
            dirty: true,
            ..Self::default()
        };
    }

    pub fn load<S: KvStore + ?Sized>(store: &S) -> Self {
        let mut state = Self::default();
        for key in store.keys_with_prefix(FLAG_PREFIX) {
            if store.get_string(&key, "") == "1" {
                if let Some(id) = key.strip_prefix(FLAG_PREFIX) {
                    state.flags.insert(id.to_string());
                }
            }
        }
        for key in store.keys_with_prefix(COUNTER_PREFIX) {
            let value = store.get_int(&key, 0);
            if value <= 0 {
                continue;
            }
            if let Some(id) = key.strip_prefix(COUNTER_PREFIX) {
                state.counters.insert(id.to_string(), value.min(u32::MAX as i64) as u32);
            }
        }
        state.locations_sent = store
            .get_string(KEY_LOCATIONS, "")
            .split(',')
            .filter_map(|s| s.trim().parse::<i64>().ok())
            .collect();
        state.items_applied = store.get_int(KEY_ITEMS_APPLIED, 0).max(0) as u64;
        state.options = SlotOptions {
            npc_souls: store.get_int(KEY_OPT_NPC, 1) != 0,
            prop_souls: store.get_int(KEY_OPT_PROP, 1) != 0,
        };
        info!(
            "loaded progression: {} flags, {} counters, {} locations, items applied {}",
            state.flags.len(),
            state.counters.len(),
            state.locations_sent.len(),
            state.items_applied
        );
        state
    }

    /// Write the full state and flush. Clears the dirty mark on success.
    pub fn save<S: KvStore + ?Sized>(&mut self, store: &mut S) -> Result<(), StorageError> {
        for flag in &self.flags {
            store.set_string(&format!("{}{}", FLAG_PREFIX, flag), "1")?;
        }
        for (id, value) in &self.counters {
            store.set_int(&format!("{}{}", COUNTER_PREFIX, id), *value as i64)?;
        }
        // stale keys go only after the current set is written
        for key in store.keys_with_prefix(FLAG_PREFIX) {
            if key.strip_prefix(FLAG_PREFIX).is_some_and(|id| !self.flags.contains(id)) {
                store.delete_key(&key)?;
            }
        }
        for key in store.keys_with_prefix(COUNTER_PREFIX) {
            if key.strip_prefix(COUNTER_PREFIX).is_some_and(|id| !self.counters.contains_key(id)) {
                store.delete_key(&key)?;
            }
        }
        let joined = self
            .locations_sent
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join(",");
        store.set_string(KEY_LOCATIONS, &joined)?;
        store.set_int(KEY_ITEMS_APPLIED, self.items_applied as i64)?;
        store.set_int(KEY_OPT_NPC, self.options.npc_souls as i64)?;
        store.set_int(KEY_OPT_PROP, self.options.prop_souls as i64)?;
        store.set_string(KEY_SAVED_AT, &chrono::Utc::now().to_rfc3339())?;
        store.save()?;
        self.dirty = false;
        Ok(())
    }

    /// Remove every persisted key this crate owns, identity included.
    pub fn wipe_persisted<S: KvStore + ?Sized>(store: &mut S) -> Result<usize, StorageError> {
        let removed = store.delete_prefix(NAMESPACE)?;
        store.save()?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKvStore;

    /// Memory store whose writes fail once `fail_writes` is set. Deletes still succeed.
    struct FlakyStore {
        inner: MemoryKvStore,
        fail_writes: bool,
    }

    impl KvStore for FlakyStore {
        fn get_string(&self, key: &str, default: &str) -> String {
            self.inner.get_string(key, default)
        }
        fn set_string(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.inner.set_string(key, value)
        }
        fn delete_key(&mut self, key: &str) -> Result<(), StorageError> {
            self.inner.delete_key(key)
        }
        fn save(&mut self) -> Result<(), StorageError> {
            self.inner.save()
        }
        fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
            self.inner.keys_with_prefix(prefix)
        }
    }

    #[test]
    fn failed_save_keeps_previous_flags() {
        let mut store = FlakyStore {
            inner: MemoryKvStore::new(),
            fail_writes: false,
        };
        let mut state = ProgressionState::new();
        state.apply("Garden Access");
        state.apply("Pub Access");
        state.increment_counter("Mega Honk", 3);
        state.save(&mut store).unwrap();

        state.apply("Carrot Soul");
        store.fail_writes = true;
        assert!(state.save(&mut store).is_err());
        assert!(state.is_dirty());

        let reloaded = ProgressionState::load(&store);
        assert!(reloaded.is_set("Garden Access"));
        assert!(reloaded.is_set("Pub Access"));
        assert_eq!(reloaded.counter("Mega Honk"), 1);
    }

    #[test]
    fn apply_transitions_once() {
        let mut state = ProgressionState::new();
        assert!(state.apply("Pub Access"));
        assert!(!state.apply("Pub Access"));
        assert!(state.is_set("Pub Access"));
    }

    #[test]
    fn counters_cap_at_max() {
        let mut state = ProgressionState::new();
        assert_eq!(state.increment_counter("Mega Honk", 2), Some(1));
        assert_eq!(state.increment_counter("Mega Honk", 2), Some(2));
        assert_eq!(state.increment_counter("Mega Honk", 2), None);
        assert_eq!(state.counter("Mega Honk"), 2);
    }

    #[test]
    fn locations_are_at_most_once() {
        let mut state = ProgressionState::new();
        assert!(state.mark_location_sent(119_000_001));
        assert!(!state.mark_location_sent(119_000_001));
        assert!(state.has_location(119_000_001));
    }

    #[test]
    fn replay_positions() {
        let mut state = ProgressionState::new();
        state.advance_items_applied(0);
        state.advance_items_applied(4);
        assert_eq!(state.items_applied(), 5);
        state.advance_items_applied(2);
        assert_eq!(state.items_applied(), 5);
        assert!(state.is_replay(4));
        assert!(!state.is_replay(5));
    }

    #[test]
    fn save_then_load_restores_everything() {
        let mut store = MemoryKvStore::new();
        let mut state = ProgressionState::new();
        state.apply("High Street Access");
        state.apply("Boy's Glasses Soul");
        state.increment_counter("Speedy Feet", 10);
        state.mark_location_sent(119_000_010);
        state.mark_location_sent(119_001_001);
        state.advance_items_applied(6);
        state.set_options(SlotOptions {
            npc_souls: false,
            prop_souls: true,
        });
        state.save(&mut store).unwrap();
        assert!(!state.is_dirty());

        let loaded = ProgressionState::load(&store);
        assert_eq!(loaded, state);
        assert!(!store.get_string(KEY_SAVED_AT, "").is_empty());
    }

    #[test]
    fn identity_normalizes_and_roundtrips() {
        let mut store = MemoryKvStore::new();
        assert!(SessionIdentity::load(&store).is_none());
        let id = SessionIdentity::new("WS://Archipelago.gg/", 38281, " Goose ").unwrap();
        assert_eq!(id.server, "archipelago.gg:38281");
        assert_eq!(id.slot, "Goose");
        id.save(&mut store).unwrap();
        assert_eq!(SessionIdentity::load(&store), Some(id.clone()));
        assert_eq!(id.to_string(), "Goose@archipelago.gg:38281");
    }

    #[test]
    fn identity_port_suffix_matches_explicit_port() {
        let suffixed = SessionIdentity::new("wss://archipelago.gg:51234", 38281, "Goose").unwrap();
        let explicit = SessionIdentity::new("archipelago.gg", 51234, "Goose").unwrap();
        assert_eq!(suffixed, explicit);
        assert_eq!(suffixed.server, "archipelago.gg:51234");
    }

    #[test]
    fn wipe_removes_namespace() {
        let mut store = MemoryKvStore::new();
        let mut state = ProgressionState::new();
        state.apply("Garden Access");
        state.save(&mut store).unwrap();
        SessionIdentity::new("localhost", 38281, "Goose")
            .unwrap()
            .save(&mut store)
            .unwrap();
        store.set_string("unrelated", "keep").unwrap();
        assert!(ProgressionState::wipe_persisted(&mut store).unwrap() > 0);
        assert!(store.keys_with_prefix(NAMESPACE).is_empty());
        assert_eq!(store.get_string("unrelated", ""), "keep");
    }
}
