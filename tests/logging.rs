mod common;

use std::sync::OnceLock;

use futures::executor::block_on;
use stock_chart_wasm::application::{
    DAY_MS, DataAcquisitionService, DatasetCache, StockDataSource, StoredPreferences,
};
use stock_chart_wasm::domain::chart::{ChartLayoutEngine, PanelAssignment};
use stock_chart_wasm::domain::errors::AppError;
use stock_chart_wasm::domain::logging::{self, LogLevel, TimeProvider};
use stock_chart_wasm::domain::market_data::StockCode;
use stock_chart_wasm::infrastructure::http::dto::StockDataResponse;
use stock_chart_wasm::infrastructure::services::MemoryLogger;
use stock_chart_wasm::infrastructure::storage::MemoryStore;

fn logger() -> &'static MemoryLogger {
    static LOGGER: OnceLock<MemoryLogger> = OnceLock::new();
    LOGGER.get_or_init(|| {
        let logger = MemoryLogger::new(1_000);
        logging::init_logger(Box::new(logger.clone()));
        logger
    })
}

struct StaticSource;

impl StockDataSource for StaticSource {
    async fn fetch(&self, _code: &StockCode) -> Result<StockDataResponse, AppError> {
        Ok(common::sample_response())
    }
}

struct FixedClock;

impl TimeProvider for FixedClock {
    fn current_timestamp(&self) -> u64 {
        42
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        timestamp.to_string()
    }
}

#[test]
fn failed_cache_write_is_logged_as_warning() {
    let logger = logger();
    let store = MemoryStore::with_quota(150);
    let service = DataAcquisitionService::new(
        StaticSource,
        DatasetCache::new(store.clone(), "log:", DAY_MS),
        StoredPreferences::new(store, "log:"),
        std::sync::Arc::new(FixedClock),
    );

    block_on(service.resolve("000001.SZ")).unwrap();

    let warnings: Vec<String> = logger
        .entries()
        .into_iter()
        .filter(|entry| entry.level == LogLevel::Warn)
        .map(|entry| entry.message)
        .collect();
    assert!(
        warnings
            .iter()
            .any(|message| message.contains("dataset for 000001.SZ not cached")),
        "{warnings:?}"
    );
}

#[cfg(debug_assertions)]
#[test]
fn skipped_panel_is_logged_at_debug_level() {
    let logger = logger();
    let assignment: PanelAssignment = [(1, "broken")].into_iter().collect();

    ChartLayoutEngine::default().layout(1, &common::sample_dataset(), &assignment);

    assert!(logger.entries().iter().any(|entry| {
        entry.level == LogLevel::Debug
            && entry.message.starts_with("panel 1 skipped (broken)")
    }));
}

#[test]
fn formatted_lines_carry_level_and_component() {
    let logger = logger();
    block_on(async {
        let service = DataAcquisitionService::new(
            StaticSource,
            DatasetCache::new(MemoryStore::new(), "fmt:", DAY_MS),
            StoredPreferences::new(MemoryStore::new(), "fmt:"),
            std::sync::Arc::new(FixedClock),
        );
        service.resolve("600519.SH").await.unwrap();
    });

    assert!(
        logger
            .lines()
            .iter()
            .any(|line| line.contains(" INFO APP:DataAcquisition | 600519.SH: 5 bars"))
    );
}
