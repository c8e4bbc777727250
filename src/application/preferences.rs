use serde::{Deserialize, Serialize};

use crate::domain::chart::PanelAssignment;
use crate::domain::errors::StorageError;
use crate::infrastructure::storage::KeyValueStore;

/// What survives a page reload. Never expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub last_stock_code: Option<String>,
    pub panel_count: usize,
    pub selections: PanelAssignment,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            last_stock_code: None,
            panel_count: 1,
            selections: PanelAssignment::default(),
        }
    }
}

/// Best-effort persistence. Callers log failures and carry on.
pub trait PreferenceStore {
    fn try_load(&self) -> Result<Option<UserPreferences>, StorageError>;
    fn try_save(&self, preferences: &UserPreferences) -> Result<(), StorageError>;

    /// Load, modify, save. An unreadable record starts over from defaults.
    fn try_update(&self, change: impl FnOnce(&mut UserPreferences)) -> Result<(), StorageError>
    where
        Self: Sized,
    {
        let mut preferences = self.try_load().ok().flatten().unwrap_or_default();
        change(&mut preferences);
        self.try_save(&preferences)
    }
}

/// Preferences as one JSON record in a [`KeyValueStore`]
#[derive(Debug, Clone)]
pub struct StoredPreferences<K> {
    store: K,
    key: String,
}

impl<K: KeyValueStore> StoredPreferences<K> {
    pub fn new(store: K, prefix: &str) -> Self {
        Self {
            store,
            key: format!("{prefix}preferences"),
        }
    }
}

impl<K: KeyValueStore> PreferenceStore for StoredPreferences<K> {
    fn try_load(&self) -> Result<Option<UserPreferences>, StorageError> {
        self.store.get_json(&self.key)
    }

    fn try_save(&self, preferences: &UserPreferences) -> Result<(), StorageError> {
        self.store.set_json(&self.key, preferences)
    }
}
