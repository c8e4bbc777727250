use std::cmp::Ordering;
use std::sync::Arc;

use derive_more::Display;

use super::value_objects::{Candle, Color, ColorSource, RenderKind};

/// Moving average line shipped with the main series (`ma5`, `ma10`, ...).
/// Warm-up points are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverage {
    pub window: u32,
    pub values: Vec<Option<f64>>,
}

/// Position and value of one extreme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtremePoint {
    pub index: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MainSeries {
    pub x_labels: Vec<String>,
    pub candles: Arc<[Candle]>,
    pub moving_averages: Vec<MovingAverage>,
}

impl MainSeries {
    pub fn len(&self) -> usize {
        self.x_labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_labels.is_empty()
    }

    /// Index of the highest `high`; the first one wins ties.
    pub fn highest_high(&self) -> Option<ExtremePoint> {
        self.extreme(|c| c.high, Ordering::Greater)
    }

    /// Index of the lowest `low`; the first one wins ties.
    pub fn lowest_low(&self) -> Option<ExtremePoint> {
        self.extreme(|c| c.low, Ordering::Less)
    }

    fn extreme(&self, field: impl Fn(&Candle) -> f64, wins: Ordering) -> Option<ExtremePoint> {
        let mut best: Option<ExtremePoint> = None;
        for (index, candle) in self.candles.iter().enumerate() {
            let value = field(candle);
            if !value.is_finite() {
                continue;
            }
            match best {
                Some(current) if value.total_cmp(&current.value) != wins => {}
                _ => best = Some(ExtremePoint { index, value }),
            }
        }
        best
    }
}

/// Render hints for one drawable output
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    pub name: String,
    pub kind: RenderKind,
    pub color: Option<Color>,
    pub order: f64,
    pub color_source: Option<ColorSource>,
}

impl DisplayConfig {
    /// What the backend assumes for an output it has no config for.
    pub fn fallback(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: RenderKind::Line,
            color: Some(Color::from("#FFA500")),
            order: 1.0,
            color_source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorOutput {
    pub key: String,
    pub values: Vec<Option<f64>>,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValues {
    Flat(Vec<Option<f64>>),
    /// Declaration order preserved.
    Named(Vec<IndicatorOutput>),
}

/// Why an indicator cannot be drawn
#[derive(Debug, Clone, PartialEq, Display)]
pub enum IndicatorFault {
    #[display(fmt = "backend reported: {}", _0)]
    Reported(String),
    #[display(fmt = "{} has {} values, expected {}", output, actual, expected)]
    LengthMismatch {
        output: String,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub name: String,
    pub display: DisplayConfig,
    pub values: IndicatorValues,
    pub error: Option<String>,
}

impl IndicatorSeries {
    /// Checks the embedded error and that every sequence matches `expected_len`.
    pub fn validate(&self, expected_len: usize) -> Result<(), IndicatorFault> {
        if let Some(error) = &self.error {
            return Err(IndicatorFault::Reported(error.clone()));
        }
        let check = |output: &str, values: &[Option<f64>]| {
            if values.len() == expected_len {
                Ok(())
            } else {
                Err(IndicatorFault::LengthMismatch {
                    output: output.to_string(),
                    expected: expected_len,
                    actual: values.len(),
                })
            }
        };
        match &self.values {
            IndicatorValues::Flat(values) => check(&self.name, values),
            IndicatorValues::Named(outputs) => outputs
                .iter()
                .try_for_each(|output| check(&output.key, &output.values)),
        }
    }

    /// Outputs sorted by ascending draw order. Stable, so equal orders keep
    /// declaration order.
    pub fn outputs_in_draw_order(&self) -> Vec<&IndicatorOutput> {
        match &self.values {
            IndicatorValues::Flat(_) => Vec::new(),
            IndicatorValues::Named(outputs) => {
                let mut sorted: Vec<&IndicatorOutput> = outputs.iter().collect();
                sorted.sort_by(|a, b| a.display.order.total_cmp(&b.display.order));
                sorted
            }
        }
    }
}

/// Indicators in the order the backend declared them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSet(Vec<IndicatorSeries>);

impl IndicatorSet {
    pub fn new(series: Vec<IndicatorSeries>) -> Self {
        Self(series)
    }

    pub fn get(&self, name: &str) -> Option<&IndicatorSeries> {
        self.0.iter().find(|series| series.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|series| series.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndicatorSeries> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything one search returns. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub main: MainSeries,
    pub indicators: IndicatorSet,
}
