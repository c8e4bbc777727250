use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::errors::AppError;
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{
    Candle, Color, ColorSource, Dataset, DisplayConfig, IndicatorOutput, IndicatorSeries,
    IndicatorSet, IndicatorValues, MainSeries, MovingAverage, RenderKind,
};
use crate::log_debug;

/// Body of `GET /stock_data`. Also the cached payload, so it round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockDataResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<MainSeriesDto>,
    /// Kept raw so that one malformed indicator cannot sink the others.
    #[serde(default)]
    pub strategies: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainSeriesDto {
    pub x_data: Vec<Value>,
    pub candle_data: Vec<Candle>,
    /// `ma5`, `ma10`, `ma20` and whatever else the backend adds.
    #[serde(flatten)]
    pub series: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct StrategyDto {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<StrategyDataDto>,
    #[serde(default)]
    config: StrategyConfigDto,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StrategyDataDto {
    Flat(Vec<Option<f64>>),
    Named(Map<String, Value>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StrategyConfigDto {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    color: Option<String>,
    order: Option<f64>,
    use_color_from: Option<String>,
    chart_name: Option<String>,
    outputs: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OutputConfigDto {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    color: Option<String>,
    order: Option<f64>,
    use_color_from: Option<String>,
}

impl StockDataResponse {
    /// Converts the payload to a [`Dataset`].
    ///
    /// A reported `error` becomes [`AppError::UpstreamData`]; a missing or
    /// inconsistent main series is a malformed payload and becomes
    /// [`AppError::Transport`]. Indicator problems stay on the indicator.
    pub fn to_dataset(&self) -> Result<Dataset, AppError> {
        if let Some(message) = &self.error {
            return Err(AppError::UpstreamData(message.clone()));
        }
        let main = self
            .main
            .as_ref()
            .ok_or_else(|| AppError::Transport("payload has no main series".to_string()))?
            .to_domain()?;

        let indicators = self
            .strategies
            .iter()
            .map(|(key, raw)| indicator_from_value(key, raw))
            .collect();

        Ok(Dataset {
            main,
            indicators: IndicatorSet::new(indicators),
        })
    }
}

impl MainSeriesDto {
    pub fn to_domain(&self) -> Result<MainSeries, AppError> {
        let x_labels: Vec<String> = self.x_data.iter().map(label_text).collect();
        let expected = x_labels.len();
        if self.candle_data.len() != expected {
            return Err(AppError::Transport(format!(
                "candle_data has {} entries, x_data has {}",
                self.candle_data.len(),
                expected
            )));
        }

        let mut moving_averages = Vec::new();
        for (key, raw) in &self.series {
            let Some(window) = moving_average_window(key) else {
                continue;
            };
            let values: Vec<Option<f64>> = serde_json::from_value(raw.clone())
                .map_err(|e| AppError::Transport(format!("{key} is malformed: {e}")))?;
            if values.len() != expected {
                return Err(AppError::Transport(format!(
                    "{key} has {} entries, x_data has {expected}",
                    values.len()
                )));
            }
            moving_averages.push(MovingAverage { window, values });
        }
        moving_averages.sort_by_key(|average| average.window);

        Ok(MainSeries {
            x_labels,
            candles: self.candle_data.clone().into(),
            moving_averages,
        })
    }
}

fn label_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// `ma20` -> 20
fn moving_average_window(key: &str) -> Option<u32> {
    let digits = key.strip_prefix("ma")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn indicator_from_value(key: &str, raw: &Value) -> IndicatorSeries {
    match serde_json::from_value::<StrategyDto>(raw.clone()) {
        Ok(dto) => dto.to_domain(key),
        Err(e) => {
            log_debug!(
                LogComponent::Infrastructure("StockDataDto"),
                "indicator {} is malformed: {}",
                key,
                e
            );
            IndicatorSeries {
                name: key.to_string(),
                display: DisplayConfig::fallback(key),
                values: IndicatorValues::Flat(Vec::new()),
                error: Some(format!("malformed indicator: {e}")),
            }
        }
    }
}

impl StrategyDto {
    fn to_domain(&self, key: &str) -> IndicatorSeries {
        let config = &self.config;
        let display = DisplayConfig {
            name: config
                .name
                .clone()
                .or_else(|| config.chart_name.clone())
                .unwrap_or_else(|| key.to_string()),
            kind: render_kind(config.kind.as_deref()),
            color: config.color.as_deref().map(Color::from),
            order: config.order.unwrap_or(1.0),
            color_source: color_source(config.use_color_from.as_deref()),
        };

        let mut error = self.error.clone();
        let values = match &self.data {
            Some(StrategyDataDto::Flat(values)) => IndicatorValues::Flat(values.clone()),
            Some(StrategyDataDto::Named(outputs)) => {
                let mut parsed = Vec::with_capacity(outputs.len());
                for (output_key, raw) in outputs {
                    match serde_json::from_value::<Vec<Option<f64>>>(raw.clone()) {
                        Ok(values) => parsed.push(IndicatorOutput {
                            key: output_key.clone(),
                            values,
                            display: config.output_display(output_key),
                        }),
                        Err(e) => {
                            error.get_or_insert_with(|| format!("output {output_key} is malformed: {e}"));
                        }
                    }
                }
                IndicatorValues::Named(parsed)
            }
            None => {
                error.get_or_insert_with(|| "indicator has no data".to_string());
                IndicatorValues::Flat(Vec::new())
            }
        };

        IndicatorSeries {
            name: key.to_string(),
            display,
            values,
            error,
        }
    }
}

impl StrategyConfigDto {
    /// Backend default for an output without its own config.
    fn output_display(&self, output_key: &str) -> DisplayConfig {
        let Some(raw) = self.outputs.get(output_key) else {
            return DisplayConfig::fallback(output_key);
        };
        let output: OutputConfigDto = serde_json::from_value(raw.clone()).unwrap_or_default();
        DisplayConfig {
            name: output.name.unwrap_or_else(|| output_key.to_string()),
            kind: render_kind(output.kind.as_deref()),
            color: output.color.as_deref().map(Color::from),
            order: output.order.unwrap_or(1.0),
            color_source: color_source(output.use_color_from.as_deref()),
        }
    }
}

fn render_kind(raw: Option<&str>) -> RenderKind {
    raw.and_then(|kind| kind.parse().ok()).unwrap_or_default()
}

fn color_source(raw: Option<&str>) -> Option<ColorSource> {
    raw.and_then(|source| source.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> StockDataResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn moving_average_keys_are_recognised() {
        assert_eq!(moving_average_window("ma5"), Some(5));
        assert_eq!(moving_average_window("ma20"), Some(20));
        assert_eq!(moving_average_window("ma"), None);
        assert_eq!(moving_average_window("macd"), None);
        assert_eq!(moving_average_window("vol"), None);
    }

    #[test]
    fn error_field_wins_over_everything() {
        let payload = response(json!({ "error": "No data found for XYZ" }));
        assert_eq!(
            payload.to_dataset(),
            Err(AppError::UpstreamData("No data found for XYZ".to_string()))
        );
    }

    #[test]
    fn short_moving_average_is_malformed() {
        let payload = response(json!({
            "main": {
                "x_data": ["a", "b"],
                "candle_data": [[1, 2, 0.5, 3], [2, 1, 0.5, 3]],
                "ma5": [null]
            },
            "strategies": {}
        }));
        assert!(matches!(payload.to_dataset(), Err(AppError::Transport(_))));
    }

    #[test]
    fn indicator_name_falls_back_to_chart_name_then_key() {
        let payload = response(json!({
            "main": { "x_data": ["a"], "candle_data": [[1, 2, 0.5, 3]] },
            "strategies": {
                "vol": { "data": [1.0], "config": { "chart_name": "Volume Analysis" } },
                "rsi": { "data": [50.0] }
            }
        }));
        let dataset = payload.to_dataset().unwrap();
        assert_eq!(dataset.indicators.get("vol").unwrap().display.name, "Volume Analysis");
        assert_eq!(dataset.indicators.get("rsi").unwrap().display.name, "rsi");
        assert_eq!(dataset.indicators.names(), vec!["vol", "rsi"]);
    }

    #[test]
    fn unconfigured_output_gets_backend_default() {
        let payload = response(json!({
            "main": { "x_data": ["a"], "candle_data": [[1, 2, 0.5, 3]] },
            "strategies": {
                "macd": {
                    "data": { "macd": [0.1], "extra": [0.2] },
                    "config": { "outputs": { "macd": { "name": "MACD Line", "color": "#FF6B6B" } } }
                }
            }
        }));
        let dataset = payload.to_dataset().unwrap();
        let macd = dataset.indicators.get("macd").unwrap();
        let IndicatorValues::Named(outputs) = &macd.values else {
            panic!("expected named outputs");
        };
        assert_eq!(outputs[0].display.name, "MACD Line");
        assert_eq!(outputs[1].display, DisplayConfig::fallback("extra"));
    }

    #[test]
    fn malformed_indicator_is_isolated() {
        let payload = response(json!({
            "main": { "x_data": ["a"], "candle_data": [[1, 2, 0.5, 3]] },
            "strategies": {
                "broken": { "data": "oops" },
                "rsi": { "data": [50.0] }
            }
        }));
        let dataset = payload.to_dataset().unwrap();
        assert!(dataset.indicators.get("broken").unwrap().error.is_some());
        assert!(dataset.indicators.get("rsi").unwrap().error.is_none());
    }
}
