use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::charts::ChartKind;
use crate::core::{AxisBound, Dataset, FormatSpec, Margin, TickFilter};
use crate::core::format::AUTO_FORMAT;

/// Default inner/outer padding of band x axes.
pub const DEFAULT_BAND_PADDING: f64 = 0.1;

/// Where band-axis gridlines are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridlinePosition {
    /// On the tick, through the band center.
    #[default]
    Center,
    /// Halfway between two neighbouring bands.
    Between,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Gridlines {
    pub hidden: bool,
    pub position: GridlinePosition,
}

impl Gridlines {
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            hidden: true,
            position: GridlinePosition::default(),
        }
    }
}

/// Value axis (`leftYAxis`, `rightYAxis`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisConfig {
    pub min: AxisBound,
    pub max: AxisBound,
    pub format: FormatSpec,
    pub gridlines: Gridlines,
}

/// Horizontal inset of the x range inside the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct XAxisMargin {
    pub left: f64,
    pub right: f64,
}

/// Category / time axis (`bottomXAxis`).
#[derive(Debug, Clone, Default)]
pub struct XAxisConfig {
    pub padding: f64,
    pub min: AxisBound,
    pub max: AxisBound,
    pub format: FormatSpec,
    pub margin: XAxisMargin,
    pub filter: Option<TickFilter>,
    pub gridlines: Gridlines,
}

impl XAxisConfig {
    /// Pixel range of the x scale inside a plot area `width` wide.
    #[must_use]
    pub fn range(&self, width: f64) -> (f64, f64) {
        let start = self.margin.left;
        let end = (width - self.margin.right).max(start);
        (start, end)
    }
}

/// Fully resolved chart configuration.
///
/// Created once from [`ChartConfig::for_kind`] and then changed only by
/// merging typed deltas into it.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub margin: Margin,
    pub datasets: IndexMap<String, Dataset>,
    pub is_smooth: bool,
    pub is_percent: bool,
    pub left_y_axis: AxisConfig,
    pub right_y_axis: AxisConfig,
    pub bottom_x_axis: XAxisConfig,
}

impl ChartConfig {
    #[must_use]
    pub fn for_kind(kind: ChartKind) -> Self {
        let mut config = Self {
            margin: Margin::default(),
            datasets: IndexMap::new(),
            is_smooth: false,
            is_percent: false,
            left_y_axis: AxisConfig::default(),
            right_y_axis: AxisConfig {
                gridlines: Gridlines::hidden(),
                ..AxisConfig::default()
            },
            bottom_x_axis: XAxisConfig {
                padding: DEFAULT_BAND_PADDING,
                gridlines: Gridlines::hidden(),
                ..XAxisConfig::default()
            },
        };

        if kind.is_spark() {
            config.margin = Margin::ZERO;
            config.left_y_axis.format = FormatSpec::number(AUTO_FORMAT);
            config.bottom_x_axis.format = FormatSpec::number(AUTO_FORMAT);
        }
        config
    }

    /// Datasets in insertion order.
    pub fn datasets(&self) -> impl Iterator<Item = &Dataset> + Clone {
        self.datasets.values()
    }
}
