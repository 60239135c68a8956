use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Pixel size of the host container the chart is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Space reserved around the plot area for axes and labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::new(36.0, 36.0, 36.0, 50.0)
    }
}

/// Inner drawing rectangle: the viewport minus the margins.
///
/// Width and height never go negative; a container smaller than its margins
/// yields an empty plot area instead of inverted ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotArea {
    pub margin: Margin,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    #[must_use]
    pub fn new(viewport: Viewport, margin: Margin) -> Self {
        let width = f64::from(viewport.width) - margin.left - margin.right;
        let height = f64::from(viewport.height) - margin.top - margin.bottom;
        Self {
            margin,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && y >= 0.0 && x <= self.width && y <= self.height
    }
}

/// An x-axis value: a category label, a number or a UTC date.
///
/// The derived ordering sorts numbers before dates before labels, and within
/// each variant ascending, which is the order used for the category union.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum XValue {
    Number(OrderedFloat<f64>),
    Date(DateTime<Utc>),
    Category(String),
}

impl XValue {
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::Number(OrderedFloat(value))
    }

    #[must_use]
    pub fn category(label: impl Into<String>) -> Self {
        Self::Category(label.into())
    }

    /// Continuous position of the value; dates map to unix milliseconds.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(value.0),
            Self::Date(date) => Some(date.timestamp_millis() as f64),
            Self::Category(_) => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(date) => Some(*date),
            Self::Number(value) => millis_to_date(value.0),
            Self::Category(_) => None,
        }
    }
}

impl fmt::Display for XValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value.0),
            Self::Date(date) => f.write_str(&date.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Self::Category(label) => f.write_str(label),
        }
    }
}

impl From<&str> for XValue {
    fn from(value: &str) -> Self {
        Self::Category(value.to_owned())
    }
}

impl From<String> for XValue {
    fn from(value: String) -> Self {
        Self::Category(value)
    }
}

impl From<f64> for XValue {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<DateTime<Utc>> for XValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

/// One sample of a dataset. `y == None` means "no data at this x".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: XValue,
    #[serde(default)]
    pub y: Option<f64>,
}

impl Point {
    #[must_use]
    pub fn new(x: impl Into<XValue>, y: f64) -> Self {
        Self {
            x: x.into(),
            y: Some(y),
        }
    }

    #[must_use]
    pub fn gap(x: impl Into<XValue>) -> Self {
        Self {
            x: x.into(),
            y: None,
        }
    }
}

#[must_use]
pub fn millis_to_date(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(millis.round() as i64)
}
