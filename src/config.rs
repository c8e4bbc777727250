use serde::{Deserialize, Serialize};

use crate::application::dataset_cache::DAY_MS;
use crate::domain::chart::LayoutConfig;
use crate::domain::logging::{LogComponent, get_logger};

/// Id of the `<script type="application/json">` element holding overrides.
pub const CONFIG_ELEMENT_ID: &str = "stock-chart-config";

/// Page configuration. Every field has a default, so a partial JSON object
/// only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: String,
    pub query_param: String,
    pub cache_ttl_ms: u64,
    pub storage_prefix: String,
    pub container_id: String,
    pub max_panels: usize,
    pub title: String,
    pub layout: LayoutConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: "/stock_data".to_string(),
            query_param: "ts_code".to_string(),
            cache_ttl_ms: DAY_MS,
            storage_prefix: "stock-chart:".to_string(),
            container_id: "chart-container".to_string(),
            max_panels: 8,
            title: "Stock Chart".to_string(),
            layout: LayoutConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Reads the config element, falling back to defaults when it is
    /// missing or invalid.
    pub fn from_page() -> Self {
        let raw = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|element| element.text_content());
        let Some(raw) = raw else {
            return Self::default();
        };
        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(e) => {
                get_logger().warn(
                    LogComponent::Presentation("Config"),
                    &format!("invalid #{} ({}), using defaults", CONFIG_ELEMENT_ID, e),
                );
                Self::default()
            }
        }
    }
}
