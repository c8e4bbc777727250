mod common;

use std::cell::{Cell, RefCell};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::executor::block_on;
use stock_chart_wasm::application::{
    DAY_MS, DataAcquisitionService, DatasetCache, PreferenceStore, StockDataSource,
    StoredPreferences,
};
use stock_chart_wasm::domain::errors::AppError;
use stock_chart_wasm::domain::logging::TimeProvider;
use stock_chart_wasm::domain::market_data::StockCode;
use stock_chart_wasm::infrastructure::http::dto::StockDataResponse;
use stock_chart_wasm::infrastructure::storage::{KeyValueStore, MemoryStore};

struct FakeSource {
    reply: Result<StockDataResponse, AppError>,
    calls: Cell<usize>,
    last_code: RefCell<Option<String>>,
}

impl FakeSource {
    fn replying(reply: Result<StockDataResponse, AppError>) -> Self {
        Self {
            reply,
            calls: Cell::new(0),
            last_code: RefCell::new(None),
        }
    }
}

impl StockDataSource for &FakeSource {
    async fn fetch(&self, code: &StockCode) -> Result<StockDataResponse, AppError> {
        self.calls.set(self.calls.get() + 1);
        *self.last_code.borrow_mut() = Some(code.to_string());
        self.reply.clone()
    }
}

#[derive(Default)]
struct ManualClock(AtomicU64);

impl ManualClock {
    fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl TimeProvider for ManualClock {
    fn current_timestamp(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        timestamp.to_string()
    }
}

struct Harness<'a> {
    store: MemoryStore,
    clock: Arc<ManualClock>,
    service: DataAcquisitionService<&'a FakeSource, MemoryStore, StoredPreferences<MemoryStore>>,
}

fn harness(source: &FakeSource, store: MemoryStore) -> Harness<'_> {
    let clock = Arc::new(ManualClock::default());
    clock.advance(1_700_000_000_000);
    let service = DataAcquisitionService::new(
        source,
        DatasetCache::new(store.clone(), "t:", DAY_MS),
        StoredPreferences::new(store.clone(), "t:"),
        clock.clone(),
    );
    Harness {
        store,
        clock,
        service,
    }
}

fn last_code(store: &MemoryStore) -> Option<String> {
    StoredPreferences::new(store.clone(), "t:")
        .try_load()
        .unwrap()
        .and_then(|preferences| preferences.last_stock_code)
}

#[test]
fn blank_input_touches_nothing() {
    let source = FakeSource::replying(Ok(common::sample_response()));
    let h = harness(&source, MemoryStore::new());

    let result = block_on(h.service.resolve("   "));

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
    assert_eq!(source.calls.get(), 0);
    assert!(h.store.is_empty());
}

#[test]
fn code_is_trimmed_before_fetching() {
    let source = FakeSource::replying(Ok(common::sample_response()));
    let h = harness(&source, MemoryStore::new());

    block_on(h.service.resolve("  000001.SZ ")).unwrap();

    assert_eq!(source.last_code.borrow().as_deref(), Some("000001.SZ"));
    assert_eq!(last_code(&h.store).as_deref(), Some("000001.SZ"));
    assert!(h.store.keys().contains(&"t:cache:000001.SZ".to_string()));
}

#[test]
fn second_lookup_within_a_day_is_served_from_cache() {
    let source = FakeSource::replying(Ok(common::sample_response()));
    let h = harness(&source, MemoryStore::new());

    let first = block_on(h.service.resolve("000001.SZ")).unwrap();
    h.clock.advance(DAY_MS - 1);
    let second = block_on(h.service.resolve("000001.SZ")).unwrap();

    assert_eq!(source.calls.get(), 1);
    assert_eq!(first, second);
    assert_eq!(first, common::sample_dataset());
}

#[test]
fn another_code_within_a_day_is_fetched() {
    let source = FakeSource::replying(Ok(common::sample_response()));
    let h = harness(&source, MemoryStore::new());

    block_on(h.service.resolve("000001.SZ")).unwrap();
    h.clock.advance(1_000);
    block_on(h.service.resolve("600519.SH")).unwrap();

    assert_eq!(source.calls.get(), 2);
    assert_eq!(source.last_code.borrow().as_deref(), Some("600519.SH"));
    assert_eq!(last_code(&h.store).as_deref(), Some("600519.SH"));
}

#[test]
fn entry_expires_after_a_day() {
    let source = FakeSource::replying(Ok(common::sample_response()));
    let h = harness(&source, MemoryStore::new());

    block_on(h.service.resolve("000001.SZ")).unwrap();
    h.clock.advance(DAY_MS);
    block_on(h.service.resolve("000001.SZ")).unwrap();

    assert_eq!(source.calls.get(), 2);
}

#[test]
fn upstream_error_is_not_cached_but_code_is_remembered() {
    let error: StockDataResponse =
        serde_json::from_value(serde_json::json!({ "error": "No data found for XYZ" })).unwrap();
    let source = FakeSource::replying(Ok(error));
    let h = harness(&source, MemoryStore::new());

    let result = block_on(h.service.resolve("XYZ"));

    assert_eq!(
        result,
        Err(AppError::UpstreamData("No data found for XYZ".to_string()))
    );
    assert_eq!(h.store.keys(), vec!["t:preferences".to_string()]);
    assert_eq!(last_code(&h.store).as_deref(), Some("XYZ"));

    block_on(h.service.resolve("XYZ")).unwrap_err();
    assert_eq!(source.calls.get(), 2);
}

#[test]
fn transport_failure_propagates() {
    let source = FakeSource::replying(Err(AppError::Transport("HTTP error: 502".to_string())));
    let h = harness(&source, MemoryStore::new());

    let result = block_on(h.service.resolve("000001.SZ"));

    let error = result.unwrap_err();
    assert_eq!(error.user_message(), "Error retrieving stock data");
    assert!(!h.store.keys().iter().any(|key| key.contains("cache:")));
}

#[test]
fn full_storage_is_cleared_and_the_write_retried() {
    let store = MemoryStore::with_quota(8_000);
    store.set_raw("other-app:blob", &"x".repeat(7_000)).unwrap();
    let source = FakeSource::replying(Ok(common::sample_response()));
    let h = harness(&source, store);

    block_on(h.service.resolve("000001.SZ")).unwrap();

    let keys = h.store.keys();
    assert!(!keys.contains(&"other-app:blob".to_string()));
    assert!(keys.contains(&"t:cache:000001.SZ".to_string()));
    assert!(keys.contains(&"t:preferences".to_string()));
}

#[test]
fn oversized_payload_still_resolves_uncached() {
    let source = FakeSource::replying(Ok(common::sample_response()));
    let h = harness(&source, MemoryStore::with_quota(200));

    let dataset = block_on(h.service.resolve("000001.SZ")).unwrap();

    assert_eq!(dataset.main.len(), 5);
    assert!(!h.store.keys().iter().any(|key| key.contains("cache:")));
    assert_eq!(last_code(&h.store).as_deref(), Some("000001.SZ"));
}

#[test]
fn unavailable_storage_still_resolves() {
    let source = FakeSource::replying(Ok(common::sample_response()));
    let h = harness(&source, MemoryStore::unavailable());

    block_on(h.service.resolve("000001.SZ")).unwrap();
    block_on(h.service.resolve("000001.SZ")).unwrap();

    assert_eq!(source.calls.get(), 2);
}

#[test]
fn corrupt_cache_entry_is_refetched() {
    let store = MemoryStore::new();
    store.set_raw("t:cache:000001.SZ", "{not json").unwrap();
    let source = FakeSource::replying(Ok(common::sample_response()));
    let h = harness(&source, store);

    block_on(h.service.resolve("000001.SZ")).unwrap();

    assert_eq!(source.calls.get(), 1);
    let cached = h.store.get_raw("t:cache:000001.SZ").unwrap().unwrap();
    assert!(cached.starts_with('{') && cached.contains("fetched_at"));
}
