pub mod dto;

use gloo::net::http::Request;

use crate::application::data_acquisition::StockDataSource;
use crate::domain::errors::AppError;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::StockCode;
use dto::StockDataResponse;

/// Stock data endpoint client
#[derive(Debug, Clone)]
pub struct HttpStockDataSource {
    endpoint: String,
    query_param: String,
}

impl HttpStockDataSource {
    pub fn new(endpoint: impl Into<String>, query_param: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            query_param: query_param.into(),
        }
    }
}

impl StockDataSource for HttpStockDataSource {
    async fn fetch(&self, code: &StockCode) -> Result<StockDataResponse, AppError> {
        get_logger().info(
            LogComponent::Infrastructure("StockDataHttp"),
            &format!("📡 GET {}?{}={}", self.endpoint, self.query_param, code),
        );

        let response = Request::get(&self.endpoint)
            .query([(self.query_param.as_str(), code.value())])
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("request failed: {e:?}")))?;

        if !response.ok() {
            return Err(AppError::Transport(format!("HTTP error: {}", response.status())));
        }

        let payload: StockDataResponse = response
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("failed to parse JSON: {e:?}")))?;

        get_logger().debug(
            LogComponent::Infrastructure("StockDataHttp"),
            &format!("✅ {} indicators received for {}", payload.strategies.len(), code),
        );
        Ok(payload)
    }
}
