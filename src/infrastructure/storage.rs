//! Key-value persistence. The browser adapter wraps `localStorage`; the
//! in-memory store backs native tests and can simulate quota failures.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use gloo::storage::{LocalStorage, Storage};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::errors::StorageError;

pub trait KeyValueStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    /// Drops every entry, not only this crate's keys.
    fn clear(&self) -> Result<(), StorageError>;

    /// `Ok(None)` when absent; [`StorageError::Corrupt`] when unparsable.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get_raw(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, &raw)
    }
}

/// `window.localStorage`. Every call checks that storage is reachable, so a
/// browser with storage disabled yields errors instead of panics.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    fn ensure_available() -> Result<(), StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        match window.local_storage() {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(StorageError::Unavailable("localStorage is absent".to_string())),
            Err(e) => Err(StorageError::Unavailable(format!("{e:?}"))),
        }
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::ensure_available()?;
        LocalStorage::raw()
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::ensure_available()?;
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| StorageError::QuotaExceeded(format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Self::ensure_available()?;
        LocalStorage::delete(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        Self::ensure_available()?;
        LocalStorage::clear();
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
    unavailable: bool,
}

/// Shared in-memory store. Clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes fail once keys plus values would exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        let store = Self::new();
        store.state.borrow_mut().quota = Some(bytes);
        store
    }

    /// Every call fails, like a browser with storage disabled.
    pub fn unavailable() -> Self {
        let store = Self::new();
        store.state.borrow_mut().unavailable = true;
        store
    }

    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        self.state.borrow().entries.keys().cloned().collect()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.state.borrow().unavailable {
            return Err(StorageError::Unavailable("storage disabled".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.state.borrow().entries.get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        let mut state = self.state.borrow_mut();
        if let Some(quota) = state.quota {
            let used: usize = state
                .entries
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded(format!(
                    "{} bytes requested, {} in use of {quota}",
                    key.len() + value.len(),
                    used
                )));
            }
        }
        state.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.state.borrow_mut().entries.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.check_available()?;
        self.state.borrow_mut().entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set_raw("a", "1").unwrap();
        assert_eq!(other.get_raw("a").unwrap(), Some("1".to_string()));
    }

    #[test]
    fn quota_counts_replaced_entries_once() {
        let store = MemoryStore::with_quota(4);
        store.set_raw("k", "abc").unwrap();
        store.set_raw("k", "xyz").unwrap();
        assert!(matches!(
            store.set_raw("j", "1"),
            Err(StorageError::QuotaExceeded(_))
        ));
    }

    #[test]
    fn unparsable_record_is_corrupt() {
        let store = MemoryStore::new();
        store.set_raw("k", "{not json").unwrap();
        assert!(matches!(
            store.get_json::<u32>("k"),
            Err(StorageError::Corrupt(_))
        ));
        assert_eq!(store.get_json::<u32>("missing").unwrap(), None);
    }
}
