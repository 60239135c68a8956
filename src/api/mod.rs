mod chart;
pub mod config;
mod delta;
mod state;

pub use chart::Chart;
pub use config::{
    AxisConfig, ChartConfig, GridlinePosition, Gridlines, XAxisConfig, XAxisMargin,
};
pub use delta::{
    AxisDelta, ChartConfigDelta, DatasetDelta, FormatDelta, GridlinesDelta, MarginDelta,
    XAxisDelta, XAxisMarginDelta,
};
pub use state::{ChartState, step};
