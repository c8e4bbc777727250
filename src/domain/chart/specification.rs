//! Declarative chart option. Serializes to the object the rendering library
//! consumes; the non-serialized fields are for the page and for diagnostics.

use derive_more::Display;
use serde::Serialize;

use super::value_objects::ColorRule;
use crate::domain::market_data::{Candle, Color, IndicatorFault};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpecification {
    pub animation: bool,
    pub title: Title,
    pub tooltip: Tooltip,
    pub axis_pointer: AxisPointerLink,
    pub legend: Legend,
    /// One per panel, top to bottom. Index-aligned with the axes.
    pub grid: Vec<GridSpec>,
    pub x_axis: Vec<XAxis>,
    pub y_axis: Vec<YAxis>,
    pub data_zoom: Vec<DataZoom>,
    pub series: Vec<SeriesSpec>,
    #[serde(skip)]
    pub container_height: u32,
    #[serde(skip)]
    pub skipped_panels: Vec<SkippedPanel>,
}

impl ChartSpecification {
    pub fn panel_count(&self) -> usize {
        self.grid.len().saturating_sub(1)
    }

    pub fn series_on_axis(&self, axis_index: usize) -> impl Iterator<Item = &SeriesSpec> {
        self.series
            .iter()
            .filter(move |series| series.x_axis_index == axis_index)
    }

    pub fn series_named(&self, name: &str) -> Option<&SeriesSpec> {
        self.series.iter().find(|series| series.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    pub left: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub trigger: String,
    pub axis_pointer: PointerStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointerStyle {
    #[serde(rename = "type")]
    pub kind: String,
    pub snap: bool,
}

/// Moves the crosshair on every x axis at once
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisPointerLink {
    pub link: Vec<AxisLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisLink {
    pub x_axis_index: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub data: Vec<String>,
    pub top: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridSpec {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Toggle {
    pub show: bool,
}

impl Toggle {
    pub const SHOWN: Toggle = Toggle { show: true };
    pub const HIDDEN: Toggle = Toggle { show: false };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisLine {
    pub on_zero: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XAxis {
    #[serde(rename = "type")]
    pub kind: String,
    pub grid_index: usize,
    pub data: Vec<String>,
    pub boundary_gap: bool,
    pub axis_line: AxisLine,
    pub axis_tick: Toggle,
    pub axis_label: Toggle,
    pub split_line: Toggle,
    pub min: String,
    pub max: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YAxis {
    pub scale: bool,
    pub grid_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_area: Option<Toggle>,
    pub axis_label: Toggle,
    pub axis_line: Toggle,
    pub axis_tick: Toggle,
    pub split_line: Toggle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DataZoom {
    Slider(SliderZoom),
    Inside(InsideZoom),
}

impl DataZoom {
    pub fn x_axis_index(&self) -> &[usize] {
        match self {
            DataZoom::Slider(zoom) => &zoom.x_axis_index,
            DataZoom::Inside(zoom) => &zoom.x_axis_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderZoom {
    pub x_axis_index: Vec<usize>,
    pub filter_mode: String,
    pub top: u32,
    pub height: u32,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsideZoom {
    pub x_axis_index: Vec<usize>,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Candlestick,
    Line,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesData {
    Candles(Vec<Candle>),
    Values(Vec<Option<f64>>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Candles(candles) => candles.len(),
            SeriesData::Values(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value_at(&self, index: usize) -> Option<f64> {
        match self {
            SeriesData::Candles(_) => None,
            SeriesData::Values(values) => values.get(index).copied().flatten(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineStyle {
    pub width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

/// `color0`/`borderColor0` are the falling-candle colors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color0: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color0: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPoint {
    pub symbol: String,
    pub symbol_size: u32,
    pub data: Vec<MarkPointDatum>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPointDatum {
    pub name: String,
    /// `[x label, y value]`
    pub coord: (String, f64),
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_rotate: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<MarkLabel>,
    pub item_style: ItemStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkLabel {
    pub offset: [i32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    pub data: SeriesData,
    pub x_axis_index: usize,
    pub y_axis_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smooth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_symbol: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_style: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_style: Option<ItemStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_point: Option<MarkPoint>,
    /// Installed by the renderer as a per-point callback.
    #[serde(skip)]
    pub color_rule: Option<ColorRule>,
}

impl SeriesSpec {
    /// Static color, if any. Per-point rules are not reflected here.
    pub fn color(&self) -> Option<&Color> {
        self.item_style
            .as_ref()
            .and_then(|style| style.color.as_ref())
    }
}

/// A sub-panel that got no series
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPanel {
    pub panel_index: usize,
    pub indicator: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum SkipReason {
    #[display(fmt = "not in dataset")]
    Missing,
    #[display(fmt = "{}", _0)]
    Fault(IndicatorFault),
}
