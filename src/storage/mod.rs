//! # Progression Storage
//!
//! A flat, namespaced key-value contract ([`KvStore`]) and two backends:
//!
//! - [`SledKvStore`] - embedded sled database used by the binary
//! - [`MemoryKvStore`] - in-process map used by tests and dry runs
//!
//! Values are strings; integer accessors parse on read. Reads never fail: a
//! missing or unreadable key yields the caller's default and a warning.

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;
use thiserror::Error;

const TREE_PROGRESSION: &str = "progression";

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flat key-value persistence used for progression state.
pub trait KvStore {
    fn get_string(&self, key: &str, default: &str) -> String;
    fn set_string(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn delete_key(&mut self, key: &str) -> Result<(), StorageError>;
    /// Make previous writes durable.
    fn save(&mut self) -> Result<(), StorageError>;
    fn keys_with_prefix(&self, prefix: &str) -> Vec<String>;

    fn get_int(&self, key: &str, default: i64) -> i64 {
        let raw = self.get_string(key, "");
        if raw.is_empty() {
            return default;
        }
        match raw.trim().parse::<i64>() {
            Ok(v) => v,
            Err(_) => {
                warn!("storage key {} holds non-integer value; using default", key);
                default
            }
        }
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), StorageError> {
        self.set_string(key, &value.to_string())
    }

    /// Delete every key under `prefix`. Returns the number removed.
    fn delete_prefix(&mut self, prefix: &str) -> Result<usize, StorageError> {
        let keys = self.keys_with_prefix(prefix);
        for key in &keys {
            self.delete_key(key)?;
        }
        Ok(keys.len())
    }
}

/// Sled-backed store rooted at a data directory.
pub struct SledKvStore {
    _db: sled::Db,
    tree: sled::Tree,
}

impl SledKvStore {
    /// Open (or create) the store under `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let tree = db.open_tree(TREE_PROGRESSION)?;
        Ok(Self { _db: db, tree })
    }
}

impl KvStore for SledKvStore {
    fn get_string(&self, key: &str, default: &str) -> String {
        match self.tree.get(key.as_bytes()) {
            Ok(Some(bytes)) => match String::from_utf8(bytes.to_vec()) {
                Ok(s) => s,
                Err(_) => {
                    warn!("storage key {} is not valid utf-8; using default", key);
                    default.to_string()
                }
            },
            Ok(None) => default.to_string(),
            Err(e) => {
                warn!("storage read of {} failed: {}", key, e);
                default.to_string()
            }
        }
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.tree.insert(key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    fn delete_key(&mut self, key: &str) -> Result<(), StorageError> {
        self.tree.remove(key.as_bytes())?;
        Ok(())
    }

    fn save(&mut self) -> Result<(), StorageError> {
        self.tree.flush()?;
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.tree
            .scan_prefix(prefix.as_bytes())
            .keys()
            .filter_map(|k| k.ok())
            .filter_map(|k| String::from_utf8(k.to_vec()).ok())
            .collect()
    }
}

/// In-memory store. `save_count` lets tests observe persistence writes.
#[derive(Debug, Default, Clone)]
pub struct MemoryKvStore {
    entries: BTreeMap<String, String>,
    save_count: usize,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.save_count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryKvStore {
    fn get_string(&self, key: &str, default: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete_key(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn save(&mut self) -> Result<(), StorageError> {
        self.save_count += 1;
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect()
    }
}

impl<T: KvStore + ?Sized> KvStore for Box<T> {
    fn get_string(&self, key: &str, default: &str) -> String {
        (**self).get_string(key, default)
    }
    fn set_string(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_string(key, value)
    }
    fn delete_key(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).delete_key(key)
    }
    fn save(&mut self) -> Result<(), StorageError> {
        (**self).save()
    }
    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        (**self).keys_with_prefix(prefix)
    }
}
