use serde::{Deserialize, Serialize};

use crate::core::Point;
use crate::render::Color;

/// Value axis a dataset is plotted against on dual-axis charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesAxis {
    #[default]
    Left,
    Right,
}

/// Mark used for a dataset on combination charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    Line,
    #[default]
    Column,
}

/// A named series plus its rendering hints.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub values: Vec<Point>,
    pub color: Color,
    pub radius: f64,
    pub border_radius: f64,
    pub line_width: f64,
    pub has_best_fit: bool,
    /// Overrides the chart-level smoothing flag when set.
    pub is_smooth: Option<bool>,
    pub axis: SeriesAxis,
    pub series_type: SeriesType,
}

impl Dataset {
    #[must_use]
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            color,
            radius: 0.0,
            border_radius: 0.0,
            line_width: 2.0,
            has_best_fit: false,
            is_smooth: None,
            axis: SeriesAxis::default(),
            series_type: SeriesType::default(),
        }
    }

    #[must_use]
    pub fn with_values(mut self, values: Vec<Point>) -> Self {
        self.values = values;
        self
    }

    #[must_use]
    pub fn smooth(&self, chart_default: bool) -> bool {
        self.is_smooth.unwrap_or(chart_default)
    }

    /// Finite y values of the dataset.
    pub fn defined_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values
            .iter()
            .filter_map(|point| point.y)
            .filter(|value| value.is_finite())
    }
}
