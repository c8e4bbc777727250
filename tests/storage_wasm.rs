#![cfg(target_arch = "wasm32")]

use stock_chart_wasm::application::{PreferenceStore, StoredPreferences};
use stock_chart_wasm::infrastructure::storage::{KeyValueStore, LocalStorageStore};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn local_storage_round_trips_raw_values() {
    let store = LocalStorageStore::new();

    store.set_raw("wasm-test:key", "value").unwrap();
    assert_eq!(store.get_raw("wasm-test:key").unwrap().as_deref(), Some("value"));

    store.remove("wasm-test:key").unwrap();
    assert_eq!(store.get_raw("wasm-test:key").unwrap(), None);
}

#[wasm_bindgen_test]
fn preferences_survive_a_new_store_handle() {
    StoredPreferences::new(LocalStorageStore::new(), "wasm-test:")
        .try_update(|preferences| {
            preferences.last_stock_code = Some("000001.SZ".to_string());
            preferences.panel_count = 3;
        })
        .unwrap();

    let loaded = StoredPreferences::new(LocalStorageStore::new(), "wasm-test:")
        .try_load()
        .unwrap()
        .unwrap();
    assert_eq!(loaded.last_stock_code.as_deref(), Some("000001.SZ"));
    assert_eq!(loaded.panel_count, 3);

    LocalStorageStore::new().remove("wasm-test:preferences").unwrap();
}
