//! Chart layout engine.
//!
//! Turns a panel count, a dataset and the per-panel indicator choices into a
//! complete [`ChartSpecification`]. The pass is pure: the same inputs always
//! produce the same specification, and every call builds it from scratch.

use super::assignment::PanelAssignment;
use super::specification::*;
use super::value_objects::{ColorRule, LayoutConfig};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{
    Color, ColorSource, Dataset, DisplayConfig, IndicatorValues, MainSeries, RenderKind,
};
use crate::log_debug;

pub const CANDLESTICK_SERIES: &str = "Candlestick";

pub struct ChartLayoutEngine {
    config: LayoutConfig,
    title: String,
}

impl ChartLayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            title: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn layout(
        &self,
        panel_count: usize,
        dataset: &Dataset,
        assignment: &PanelAssignment,
    ) -> ChartSpecification {
        let labels = &dataset.main.x_labels;

        let grid = (0..=panel_count).map(|panel| self.grid(panel)).collect();
        let x_axis = (0..=panel_count)
            .map(|panel| self.x_axis(panel, labels))
            .collect();
        let y_axis = (0..=panel_count).map(|panel| self.y_axis(panel)).collect();

        let mut series = self.main_series(&dataset.main);
        let mut skipped_panels = Vec::new();
        for panel in 1..=panel_count {
            let Some(name) = assignment.get(panel) else {
                continue;
            };
            match self.panel_series(panel, name, dataset) {
                Ok(panel_series) => series.extend(panel_series),
                Err(reason) => {
                    log_debug!(
                        LogComponent::Domain("Layout"),
                        "panel {} skipped ({}): {}",
                        panel,
                        name,
                        reason
                    );
                    skipped_panels.push(SkippedPanel {
                        panel_index: panel,
                        indicator: name.to_string(),
                        reason,
                    });
                }
            }
        }

        ChartSpecification {
            animation: false,
            title: Title {
                text: self.title.clone(),
                left: "left".to_string(),
            },
            tooltip: Tooltip {
                trigger: "axis".to_string(),
                axis_pointer: PointerStyle {
                    kind: "cross".to_string(),
                    snap: true,
                },
            },
            axis_pointer: AxisPointerLink {
                link: vec![AxisLink {
                    x_axis_index: "all".to_string(),
                }],
            },
            legend: Legend {
                data: legend_entries(&series),
                top: 20,
            },
            grid,
            x_axis,
            y_axis,
            data_zoom: self.zooms(panel_count),
            series,
            container_height: self.config.container_height(panel_count),
            skipped_panels,
        }
    }

    fn grid(&self, panel: usize) -> GridSpec {
        let geometry = self.config.panel_geometry(panel);
        GridSpec {
            left: self.config.side_margin,
            right: self.config.side_margin,
            top: geometry.top,
            height: geometry.height,
        }
    }

    fn x_axis(&self, panel: usize, labels: &[String]) -> XAxis {
        let labelled = panel == 0;
        XAxis {
            kind: "category".to_string(),
            grid_index: panel,
            data: labels.to_vec(),
            boundary_gap: false,
            axis_line: AxisLine { on_zero: false },
            axis_tick: Toggle { show: labelled },
            axis_label: Toggle { show: labelled },
            split_line: Toggle::HIDDEN,
            min: "dataMin".to_string(),
            max: "dataMax".to_string(),
        }
    }

    fn y_axis(&self, panel: usize) -> YAxis {
        if panel == 0 {
            return YAxis {
                scale: true,
                grid_index: 0,
                split_number: None,
                split_area: Some(Toggle::SHOWN),
                axis_label: Toggle::SHOWN,
                axis_line: Toggle::SHOWN,
                axis_tick: Toggle::SHOWN,
                split_line: Toggle::SHOWN,
            };
        }
        YAxis {
            scale: true,
            grid_index: panel,
            split_number: Some(2),
            split_area: None,
            axis_label: Toggle::HIDDEN,
            axis_line: Toggle::HIDDEN,
            axis_tick: Toggle::HIDDEN,
            split_line: Toggle::SHOWN,
        }
    }

    fn zooms(&self, panel_count: usize) -> Vec<DataZoom> {
        vec![
            DataZoom::Slider(SliderZoom {
                x_axis_index: vec![0],
                filter_mode: "filter".to_string(),
                top: self.config.zoom_top(panel_count),
                height: self.config.zoom_height,
                start: self.config.zoom_start,
                end: self.config.zoom_end,
            }),
            DataZoom::Inside(InsideZoom {
                x_axis_index: (0..=panel_count).collect(),
                start: self.config.zoom_start,
                end: self.config.zoom_end,
            }),
        ]
    }

    fn main_series(&self, main: &MainSeries) -> Vec<SeriesSpec> {
        let mut series = Vec::with_capacity(1 + main.moving_averages.len());
        series.push(SeriesSpec {
            name: CANDLESTICK_SERIES.to_string(),
            kind: SeriesKind::Candlestick,
            data: SeriesData::Candles(main.candles.to_vec()),
            x_axis_index: 0,
            y_axis_index: 0,
            smooth: None,
            show_symbol: None,
            line_style: None,
            item_style: Some(ItemStyle {
                color: Some(self.config.rising_color.clone()),
                color0: Some(self.config.falling_color.clone()),
                border_color: Some(self.config.rising_color.clone()),
                border_color0: Some(self.config.falling_color.clone()),
            }),
            mark_point: self.extreme_markers(main),
            color_rule: None,
        });

        for average in &main.moving_averages {
            let color = self.config.moving_average_color(average.window);
            series.push(line_series(
                format!("MA{}", average.window),
                average.values.clone(),
                0,
                color,
            ));
        }
        series
    }

    /// Pins on the highest high and the lowest low. Open and close never count.
    fn extreme_markers(&self, main: &MainSeries) -> Option<MarkPoint> {
        let marker_style = || ItemStyle {
            color: Some(self.config.marker_color.clone()),
            ..ItemStyle::default()
        };
        let mut data = Vec::with_capacity(2);
        if let Some(high) = main.highest_high() {
            data.push(MarkPointDatum {
                name: "highest".to_string(),
                coord: (label_at(main, high.index), high.value),
                value: high.value,
                symbol_rotate: None,
                label: None,
                item_style: marker_style(),
            });
        }
        if let Some(low) = main.lowest_low() {
            data.push(MarkPointDatum {
                name: "lowest".to_string(),
                coord: (label_at(main, low.index), low.value),
                value: low.value,
                symbol_rotate: Some(180),
                label: Some(MarkLabel { offset: [0, 10] }),
                item_style: marker_style(),
            });
        }
        if data.is_empty() {
            return None;
        }
        Some(MarkPoint {
            symbol: "pin".to_string(),
            symbol_size: 40,
            data,
        })
    }

    fn panel_series(
        &self,
        panel: usize,
        name: &str,
        dataset: &Dataset,
    ) -> Result<Vec<SeriesSpec>, SkipReason> {
        let indicator = dataset.indicators.get(name).ok_or(SkipReason::Missing)?;
        indicator
            .validate(dataset.main.len())
            .map_err(SkipReason::Fault)?;

        let series = match &indicator.values {
            IndicatorValues::Flat(values) => {
                vec![self.indicator_series(panel, &indicator.display, values, dataset)]
            }
            IndicatorValues::Named(_) => indicator
                .outputs_in_draw_order()
                .into_iter()
                .map(|output| self.indicator_series(panel, &output.display, &output.values, dataset))
                .collect(),
        };
        Ok(series)
    }

    fn indicator_series(
        &self,
        panel: usize,
        display: &DisplayConfig,
        values: &[Option<f64>],
        dataset: &Dataset,
    ) -> SeriesSpec {
        let color = display
            .color
            .clone()
            .unwrap_or_else(|| self.config.indicator_color.clone());
        match display.kind {
            RenderKind::Line => line_series(display.name.clone(), values.to_vec(), panel, color),
            RenderKind::Bar => SeriesSpec {
                name: display.name.clone(),
                kind: SeriesKind::Bar,
                data: SeriesData::Values(values.to_vec()),
                x_axis_index: panel,
                y_axis_index: panel,
                smooth: None,
                show_symbol: None,
                line_style: None,
                item_style: Some(ItemStyle {
                    color: Some(color),
                    ..ItemStyle::default()
                }),
                mark_point: None,
                color_rule: display
                    .color_source
                    .map(|source| self.color_rule(source, dataset)),
            },
        }
    }

    fn color_rule(&self, source: ColorSource, dataset: &Dataset) -> ColorRule {
        match source {
            ColorSource::Sign => ColorRule::Sign {
                positive: self.config.rising_color.clone(),
                negative: self.config.falling_color.clone(),
            },
            ColorSource::CandleDirection => ColorRule::CandleDirection {
                rising: self.config.rising_color.clone(),
                falling: self.config.falling_color.clone(),
                candles: dataset.main.candles.clone(),
            },
        }
    }
}

impl Default for ChartLayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

fn line_series(name: String, values: Vec<Option<f64>>, panel: usize, color: Color) -> SeriesSpec {
    SeriesSpec {
        name,
        kind: SeriesKind::Line,
        data: SeriesData::Values(values),
        x_axis_index: panel,
        y_axis_index: panel,
        smooth: Some(true),
        show_symbol: Some(false),
        line_style: Some(LineStyle {
            width: 1,
            color: Some(color.clone()),
        }),
        item_style: Some(ItemStyle {
            color: Some(color),
            ..ItemStyle::default()
        }),
        mark_point: None,
        color_rule: None,
    }
}

fn label_at(main: &MainSeries, index: usize) -> String {
    main.x_labels.get(index).cloned().unwrap_or_default()
}

/// Series names in draw order, first occurrence only.
fn legend_entries(series: &[SeriesSpec]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(series.len());
    for spec in series {
        if !names.contains(&spec.name) {
            names.push(spec.name.clone());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::{Candle, IndicatorSet};

    fn dataset(len: usize) -> Dataset {
        Dataset {
            main: MainSeries {
                x_labels: (0..len).map(|i| format!("2024-01-{:02}", i + 1)).collect(),
                candles: (0..len)
                    .map(|i| Candle::new(10.0, 11.0, 9.0 - i as f64, 12.0 + i as f64))
                    .collect::<Vec<_>>()
                    .into(),
                moving_averages: Vec::new(),
            },
            indicators: IndicatorSet::default(),
        }
    }

    #[test]
    fn no_sub_panels_keeps_only_main() {
        let spec = ChartLayoutEngine::default().layout(0, &dataset(3), &PanelAssignment::new());
        assert_eq!(spec.grid.len(), 1);
        assert_eq!(spec.x_axis.len(), 1);
        assert_eq!(spec.y_axis.len(), 1);
        assert_eq!(spec.data_zoom[1].x_axis_index(), &[0]);
        assert_eq!(spec.series.len(), 1);
    }

    #[test]
    fn markers_point_at_extremes() {
        let spec = ChartLayoutEngine::default().layout(0, &dataset(4), &PanelAssignment::new());
        let markers = spec.series[0].mark_point.as_ref().unwrap();
        assert_eq!(markers.data[0].coord, ("2024-01-04".to_string(), 15.0));
        assert_eq!(markers.data[1].coord, ("2024-01-04".to_string(), 6.0));
        assert_eq!(markers.data[1].symbol_rotate, Some(180));
    }

    #[test]
    fn empty_dataset_has_no_markers() {
        let spec = ChartLayoutEngine::default().layout(1, &dataset(0), &PanelAssignment::new());
        assert!(spec.series[0].mark_point.is_none());
        assert_eq!(spec.grid.len(), 2);
    }
}
