//! String-keyed map holding values of unrelated types.
//!
//! Every entry remembers the concrete type it was stored with. Typed reads
//! succeed only for exactly that type; anything else is a `TypeMismatch`.

mod entry;

use std::any::{type_name, Any};
use std::collections::BTreeMap;

use log::{debug, warn};

use crate::error::{ErrorCode, RelayError, Result};
pub use entry::Entry;

/// Type-erased registry.
///
/// Keys are kept in sorted order, which is also the scan order of
/// [`AnyMap::remove_by_value`].
#[derive(Debug, Default)]
pub struct AnyMap {
    data: BTreeMap<String, Entry>,
}

impl AnyMap {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
        }
    }

    /// Stores `value` under `key`, replacing whatever was there before
    pub fn set<V: Any + Send + Sync>(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        debug!("Storing {} under key {:?}", type_name::<V>(), key);

        if let Some(previous) = self.data.insert(key, Entry::new(value)) {
            debug!("Replaced previous {} entry", previous.type_name());
        }
    }

    /// Returns a reference to the value under `key` if it was stored as a `V`
    pub fn get_ref<V: Any>(&self, key: &str) -> Result<&V> {
        let entry = self.data.get(key).ok_or_else(|| {
            RelayError::new(ErrorCode::KeyNotFound, format!("Key not found: {}", key))
        })?;

        entry.downcast_ref::<V>().ok_or_else(|| {
            warn!(
                "Type mismatch for key {:?}: requested {}, stored {}",
                key,
                type_name::<V>(),
                entry.type_name()
            );
            RelayError::new(
                ErrorCode::TypeMismatch,
                format!(
                    "Key {} holds {}, not {}",
                    key,
                    entry.type_name(),
                    type_name::<V>()
                ),
            )
        })
    }

    /// Returns a copy of the value under `key` if it was stored as a `V`
    pub fn get<V: Any + Clone>(&self, key: &str) -> Result<V> {
        self.get_ref::<V>(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Removes the entry under `key`. Returns whether something was removed.
    pub fn remove_by_key(&mut self, key: &str) -> bool {
        let removed = self.data.remove(key).is_some();
        debug!("Remove by key {:?}: {}", key, removed);
        removed
    }

    /// Removes the first entry (in key order) that holds a `V` equal to `value`.
    ///
    /// Entries of any other type are skipped.
    pub fn remove_by_value<V: Any + PartialEq>(&mut self, value: &V) -> bool {
        let key = self
            .data
            .iter()
            .find(|(_, entry)| entry.downcast_ref::<V>().is_some_and(|stored| stored == value))
            .map(|(key, _)| key.clone());

        match key {
            Some(key) => {
                debug!("Removing {} entry under key {:?}", type_name::<V>(), key);
                self.data.remove(&key);
                true
            }
            None => {
                debug!("No {} entry matched for removal", type_name::<V>());
                false
            }
        }
    }

    /// Name of the concrete type stored under `key`
    pub fn type_name_of(&self, key: &str) -> Option<&'static str> {
        self.data.get(key).map(Entry::type_name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
