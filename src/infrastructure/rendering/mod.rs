pub mod echarts;

pub use echarts::{EChartsHandle, EChartsSurface};
