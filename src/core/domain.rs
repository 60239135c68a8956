use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::scale::normalize_domain;
use crate::core::types::millis_to_date;
use crate::error::ChartError;

/// Axis `min`/`max`: a literal bound or `"auto"` (derive from data).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawAxisBound", into = "RawAxisBound")]
pub enum AxisBound {
    #[default]
    Auto,
    Value(f64),
    Date(DateTime<Utc>),
}

impl AxisBound {
    #[must_use]
    pub fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Numeric form of a literal bound; dates map to unix milliseconds.
    #[must_use]
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Auto => None,
            Self::Value(value) => Some(value),
            Self::Date(date) => Some(date.timestamp_millis() as f64),
        }
    }

    #[must_use]
    pub fn as_date(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Auto => None,
            Self::Value(value) => millis_to_date(value),
            Self::Date(date) => Some(date),
        }
    }
}

impl From<f64> for AxisBound {
    fn from(value: f64) -> Self {
        Self::Value(value)
    }
}

impl From<DateTime<Utc>> for AxisBound {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawAxisBound {
    Number(f64),
    Text(String),
}

impl TryFrom<RawAxisBound> for AxisBound {
    type Error = ChartError;

    fn try_from(raw: RawAxisBound) -> Result<Self, Self::Error> {
        match raw {
            RawAxisBound::Number(value) if value.is_finite() => Ok(Self::Value(value)),
            RawAxisBound::Number(_) => Err(ChartError::InvalidConfig(
                "axis bound must be finite".to_owned(),
            )),
            RawAxisBound::Text(text) if text == "auto" => Ok(Self::Auto),
            RawAxisBound::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|date| Self::Date(date.with_timezone(&Utc)))
                .map_err(|_| {
                    ChartError::InvalidConfig(format!(
                        "axis bound `{text}` is neither \"auto\", a number nor an RFC 3339 date"
                    ))
                }),
        }
    }
}

impl From<AxisBound> for RawAxisBound {
    fn from(bound: AxisBound) -> Self {
        match bound {
            AxisBound::Auto => Self::Text("auto".to_owned()),
            AxisBound::Value(value) => Self::Number(value),
            AxisBound::Date(date) => Self::Text(date.to_rfc3339()),
        }
    }
}

/// How an `auto` bound is derived from the data extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DomainPolicy {
    /// Stretch the extent so that zero lies inside the domain.
    IncludeZero,
    /// Pad both ends by the given fraction of the extent.
    Pad(f64),
}

/// Min and max over the finite values; `None` when there are none.
#[must_use]
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|value| value.is_finite())
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
}

/// Resolves an axis domain from configured bounds and the data extent.
///
/// Empty data resolves to `[0, 0]` before the degenerate guard widens it,
/// so the result is always a usable, finite domain.
#[must_use]
pub fn resolve_domain(
    min: AxisBound,
    max: AxisBound,
    data_extent: Option<(f64, f64)>,
    policy: DomainPolicy,
) -> (f64, f64) {
    let (data_min, data_max) = data_extent.unwrap_or((0.0, 0.0));
    let (auto_min, auto_max) = match policy {
        DomainPolicy::IncludeZero => (data_min.min(0.0), data_max.max(0.0)),
        DomainPolicy::Pad(ratio) => {
            let span = data_max - data_min;
            let pad = if span == 0.0 {
                if data_max == 0.0 { 1.0 } else { data_max.abs() * ratio }
            } else {
                span * ratio
            };
            (data_min - pad, data_max + pad)
        }
    };

    let resolved_min = min.as_f64().unwrap_or(auto_min);
    let resolved_max = max.as_f64().unwrap_or(auto_max);
    normalize_domain(resolved_min, resolved_max)
}

/// Resolves a time domain; `auto` bounds use the earliest and latest sample.
#[must_use]
pub fn resolve_time_domain(
    min: AxisBound,
    max: AxisBound,
    data_extent: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let fallback = DateTime::<Utc>::default();
    let (data_min, data_max) = data_extent.unwrap_or((fallback, fallback));
    (
        min.as_date().unwrap_or(data_min),
        max.as_date().unwrap_or(data_max),
    )
}

#[cfg(test)]
mod tests {
    use super::{AxisBound, DomainPolicy, extent, resolve_domain};

    #[test]
    fn auto_domain_includes_zero() {
        let domain = resolve_domain(
            AxisBound::Auto,
            AxisBound::Auto,
            extent([5.0, 10.0, 15.0]),
            DomainPolicy::IncludeZero,
        );
        assert_eq!(domain, (0.0, 15.0));
    }

    #[test]
    fn negative_data_keeps_zero_as_max() {
        let domain = resolve_domain(
            AxisBound::Auto,
            AxisBound::Auto,
            extent([-4.0, -2.0]),
            DomainPolicy::IncludeZero,
        );
        assert_eq!(domain, (-4.0, 0.0));
    }

    #[test]
    fn literal_bounds_override_data() {
        let domain = resolve_domain(
            AxisBound::Value(-10.0),
            AxisBound::Value(100.0),
            extent([5.0, 10.0]),
            DomainPolicy::IncludeZero,
        );
        assert_eq!(domain, (-10.0, 100.0));
    }

    #[test]
    fn empty_data_yields_usable_domain() {
        let domain = resolve_domain(
            AxisBound::Auto,
            AxisBound::Auto,
            None,
            DomainPolicy::IncludeZero,
        );
        assert_eq!(domain, (0.0, 1.0));
    }

    #[test]
    fn padding_adds_quarter_of_span() {
        let domain = resolve_domain(
            AxisBound::Auto,
            AxisBound::Auto,
            extent([10.0, 30.0]),
            DomainPolicy::Pad(0.25),
        );
        assert_eq!(domain, (5.0, 35.0));
    }

    #[test]
    fn auto_bound_parses_from_json() {
        let bound: AxisBound = serde_json::from_str("\"auto\"").expect("auto");
        assert!(bound.is_auto());
        let bound: AxisBound = serde_json::from_str("42").expect("number");
        assert_eq!(bound, AxisBound::Value(42.0));
        assert!(serde_json::from_str::<AxisBound>("\"nope\"").is_err());
    }
}
