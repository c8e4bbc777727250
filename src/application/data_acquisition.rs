use std::sync::Arc;

use crate::application::dataset_cache::DatasetCache;
use crate::application::preferences::PreferenceStore;
use crate::domain::errors::{AppError, AppResult};
use crate::domain::logging::{LogComponent, TimeProvider, get_logger};
use crate::domain::market_data::{Dataset, StockCode};
use crate::infrastructure::http::dto::StockDataResponse;
use crate::infrastructure::storage::KeyValueStore;

/// Where datasets come from on a cache miss
#[allow(async_fn_in_trait)]
pub trait StockDataSource {
    async fn fetch(&self, code: &StockCode) -> Result<StockDataResponse, AppError>;
}

/// Resolves a typed stock code to a dataset, cache first
pub struct DataAcquisitionService<S, K, P> {
    source: S,
    cache: DatasetCache<K>,
    preferences: P,
    clock: Arc<dyn TimeProvider>,
}

impl<S, K, P> DataAcquisitionService<S, K, P>
where
    S: StockDataSource,
    K: KeyValueStore,
    P: PreferenceStore,
{
    pub fn new(
        source: S,
        cache: DatasetCache<K>,
        preferences: P,
        clock: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            source,
            cache,
            preferences,
            clock,
        }
    }

    /// Blank input fails before the cache, the network or the preferences
    /// are touched. Any valid code is remembered, whatever the outcome.
    pub async fn resolve(&self, raw: &str) -> AppResult<Dataset> {
        let code = StockCode::parse(raw)?;
        let result = self.resolve_code(&code).await;
        self.remember(&code);
        match &result {
            Ok(dataset) => get_logger().info(
                LogComponent::Application("DataAcquisition"),
                &format!(
                    "{}: {} bars, {} indicators",
                    code,
                    dataset.main.len(),
                    dataset.indicators.len()
                ),
            ),
            Err(e) => get_logger().info(
                LogComponent::Application("DataAcquisition"),
                &format!("{}: {}", code, e),
            ),
        }
        result
    }

    async fn resolve_code(&self, code: &StockCode) -> AppResult<Dataset> {
        if let Some(payload) = self.cache.get(code, self.clock.current_timestamp()) {
            match payload.to_dataset() {
                Ok(dataset) => {
                    get_logger().debug(
                        LogComponent::Application("DataAcquisition"),
                        &format!("cache hit for {}", code),
                    );
                    return Ok(dataset);
                }
                Err(e) => {
                    get_logger().warn(
                        LogComponent::Application("DataAcquisition"),
                        &format!("cached payload for {} unusable: {}", code, e),
                    );
                    self.cache.evict(code);
                }
            }
        }

        let payload = self.source.fetch(code).await?;
        let dataset = payload.to_dataset()?;
        if let Err(e) = self
            .cache
            .put(code, &payload, self.clock.current_timestamp())
        {
            get_logger().warn(
                LogComponent::Application("DataAcquisition"),
                &format!("dataset for {} not cached: {}", code, e),
            );
        }
        Ok(dataset)
    }

    fn remember(&self, code: &StockCode) {
        let saved = self
            .preferences
            .try_update(|preferences| preferences.last_stock_code = Some(code.to_string()));
        if let Err(e) = saved {
            get_logger().warn(
                LogComponent::Application("DataAcquisition"),
                &format!("last stock code not saved: {}", e),
            );
        }
    }
}
