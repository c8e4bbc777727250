use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::domain::errors::AppError;

/// Value Object - stock code as typed by the user, trimmed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, Display, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
pub struct StockCode(String);

impl StockCode {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::InvalidInput("stock code is empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Value Object - one candle. The wire order is `[open, close, low, high]`,
/// which is also the order the candlestick series expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Candle {
    pub open: f64,
    pub close: f64,
    pub low: f64,
    pub high: f64,
}

impl Candle {
    pub fn new(open: f64, close: f64, low: f64, high: f64) -> Self {
        Self { open, close, low, high }
    }

    /// Flat candles count as rising.
    pub fn is_rising(&self) -> bool {
        self.close >= self.open
    }
}

impl From<[f64; 4]> for Candle {
    fn from([open, close, low, high]: [f64; 4]) -> Self {
        Self { open, close, low, high }
    }
}

impl From<Candle> for [f64; 4] {
    fn from(candle: Candle) -> Self {
        [candle.open, candle.close, candle.low, candle.high]
    }
}

/// Value Object - CSS color string, e.g. `#00da3c` or `yellow`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
#[display(fmt = "{}", _0)]
pub struct Color(String);

impl Color {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// How an indicator output is drawn
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum RenderKind {
    #[default]
    #[strum(serialize = "line")]
    Line,
    #[strum(serialize = "bar")]
    Bar,
}

/// Where a bar's per-point color comes from (`use_color_from` on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum ColorSource {
    /// Positive values rise-colored, negative values fall-colored.
    #[strum(serialize = "histogram", serialize = "sign")]
    Sign,
    /// Same-index candle direction decides.
    #[strum(serialize = "candle", serialize = "candlestick", serialize = "volume")]
    CandleDirection,
}
