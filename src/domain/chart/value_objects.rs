use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::market_data::{Candle, Color};

/// Fixed geometry and styling for the stacked panels. All sizes in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Top of the main panel, leaves room for title and legend.
    pub top: u32,
    pub main_height: u32,
    pub sub_height: u32,
    /// Extra offset between the main panel and the first sub panel.
    pub sub_margin_top: u32,
    pub panel_gap: u32,
    pub side_margin: u32,
    pub zoom_clearance: u32,
    pub zoom_height: u32,
    pub bottom_padding: u32,
    /// Initial visible window, percent of the series.
    pub zoom_start: f64,
    pub zoom_end: f64,
    pub rising_color: Color,
    pub falling_color: Color,
    pub marker_color: Color,
    pub indicator_color: Color,
    pub moving_average_colors: BTreeMap<u32, Color>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let moving_average_colors = [(5, "#ff4500"), (10, "#06a7a0"), (20, "#3c763d")]
            .into_iter()
            .map(|(window, color)| (window, Color::from(color)))
            .collect();
        Self {
            top: 50,
            main_height: 500,
            sub_height: 150,
            sub_margin_top: 10,
            panel_gap: 10,
            side_margin: 50,
            zoom_clearance: 80,
            zoom_height: 30,
            bottom_padding: 20,
            zoom_start: 90.0,
            zoom_end: 100.0,
            rising_color: Color::from("#00da3c"),
            falling_color: Color::from("#ec0000"),
            marker_color: Color::from("yellow"),
            indicator_color: Color::from("#FFA500"),
            moving_average_colors,
        }
    }
}

impl LayoutConfig {
    /// Panel 0 is the main panel, panels 1.. are stacked below it.
    pub fn panel_geometry(&self, panel_index: usize) -> PanelGeometry {
        if panel_index == 0 {
            return PanelGeometry {
                top: self.top,
                height: self.main_height,
            };
        }
        let stacked = self.sub_height.saturating_mul(to_u32(panel_index - 1));
        PanelGeometry {
            top: self
                .top
                .saturating_add(self.main_height)
                .saturating_add(self.sub_margin_top)
                .saturating_add(stacked)
                .saturating_add(self.panel_gap),
            height: self.sub_height,
        }
    }

    /// `H_main + n * (H_sub + gap)`
    pub fn content_height(&self, panel_count: usize) -> u32 {
        let per_panel = self.sub_height.saturating_add(self.panel_gap);
        self.main_height
            .saturating_add(per_panel.saturating_mul(to_u32(panel_count)))
    }

    /// Top of the zoom slider. Never above the bottom of the last panel.
    pub fn zoom_top(&self, panel_count: usize) -> u32 {
        let last_bottom = self.panel_geometry(panel_count).bottom();
        self.content_height(panel_count)
            .saturating_add(self.zoom_clearance)
            .max(last_bottom.saturating_add(self.panel_gap))
    }

    /// Height the chart container needs to show every panel and the slider.
    pub fn container_height(&self, panel_count: usize) -> u32 {
        self.zoom_top(panel_count)
            .saturating_add(self.zoom_height)
            .saturating_add(self.bottom_padding)
    }

    pub fn moving_average_color(&self, window: u32) -> Color {
        self.moving_average_colors
            .get(&window)
            .cloned()
            .unwrap_or_else(|| self.indicator_color.clone())
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Vertical extent of one panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelGeometry {
    pub top: u32,
    pub height: u32,
}

impl PanelGeometry {
    pub fn bottom(&self) -> u32 {
        self.top.saturating_add(self.height)
    }
}

/// Per-point bar color. Resolved by the renderer for each data index as it
/// draws, never baked into a color array.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorRule {
    Sign {
        positive: Color,
        negative: Color,
    },
    CandleDirection {
        rising: Color,
        falling: Color,
        candles: Arc<[Candle]>,
    },
}

impl ColorRule {
    pub fn resolve(&self, index: usize, value: Option<f64>) -> &Color {
        match self {
            ColorRule::Sign { positive, negative } => match value {
                Some(v) if v < 0.0 => negative,
                _ => positive,
            },
            ColorRule::CandleDirection {
                rising,
                falling,
                candles,
            } => match candles.get(index) {
                Some(candle) if !candle.is_rising() => falling,
                _ => rising,
            },
        }
    }

    /// Used when the renderer cannot install a per-point callback.
    pub fn fallback(&self) -> &Color {
        match self {
            ColorRule::Sign { positive, .. } => positive,
            ColorRule::CandleDirection { rising, .. } => rising,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_panel_sits_at_the_top() {
        let config = LayoutConfig::default();
        assert_eq!(config.panel_geometry(0), PanelGeometry { top: 50, height: 500 });
    }

    #[test]
    fn first_sub_panel_follows_the_formula() {
        let config = LayoutConfig::default();
        // 50 + 500 + 10 + 0 * 150 + 10
        assert_eq!(config.panel_geometry(1).top, 570);
        assert_eq!(config.panel_geometry(2).top, 720);
    }

    #[test]
    fn zoom_slider_clears_the_panels() {
        let config = LayoutConfig::default();
        assert_eq!(config.zoom_top(0), 580);
        assert_eq!(config.zoom_top(2), 500 + 2 * 160 + 80);
        assert!(config.zoom_top(2) > config.panel_geometry(2).bottom());
    }

    #[test]
    fn sign_rule_checks_each_value() {
        let rule = ColorRule::Sign {
            positive: Color::from("green"),
            negative: Color::from("red"),
        };
        assert_eq!(rule.resolve(0, Some(-0.5)).as_str(), "red");
        assert_eq!(rule.resolve(1, Some(0.0)).as_str(), "green");
        assert_eq!(rule.resolve(2, None).as_str(), "green");
    }

    #[test]
    fn candle_rule_reads_the_same_index() {
        let rule = ColorRule::CandleDirection {
            rising: Color::from("green"),
            falling: Color::from("red"),
            candles: vec![Candle::new(1.0, 2.0, 0.5, 2.5), Candle::new(2.0, 1.0, 0.5, 2.5)].into(),
        };
        assert_eq!(rule.resolve(0, Some(-100.0)).as_str(), "green");
        assert_eq!(rule.resolve(1, Some(100.0)).as_str(), "red");
        assert_eq!(rule.resolve(7, None).as_str(), "green");
    }
}
