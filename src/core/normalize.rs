//! Dataset normalization and stacking.
//!
//! Every series is reshaped to carry exactly one point per category of the
//! chart, in ascending category order, so geometry code never has to look
//! for missing samples.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{Dataset, Point, XValue};

/// Substitute used for categories a dataset has no sample for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPolicy {
    /// `y = 0` for every missing sample, absent or explicit.
    Zero,
    /// `y = None`; used by path kinds so missing samples break the line.
    Gap,
    /// `y = 0` for absent categories while explicit gaps stay `None`; used by
    /// stacked areas, which accumulate gaps as zero but do not draw them.
    ZeroAbsent,
}

/// Normalized view of all datasets of one chart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedSet {
    pub categories: Vec<XValue>,
    pub series: IndexMap<String, Vec<Point>>,
}

impl NormalizedSet {
    /// Y values of every series at category `index`, in dataset order.
    pub fn values_at(&self, index: usize) -> impl Iterator<Item = Option<f64>> + '_ {
        self.series
            .values()
            .map(move |points| points.get(index).and_then(|point| point.y))
    }
}

/// Sorted, de-duplicated union of the x values of all datasets.
#[must_use]
pub fn category_union<'a>(datasets: impl IntoIterator<Item = &'a Dataset>) -> Vec<XValue> {
    datasets
        .into_iter()
        .flat_map(|dataset| dataset.values.iter().map(|point| point.x.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Reshapes `values` to one point per category.
///
/// When a dataset repeats an x value the later sample wins. Non-finite y
/// values count as missing.
#[must_use]
pub fn normalize_values(values: &[Point], categories: &[XValue], fill: FillPolicy) -> Vec<Point> {
    let mut by_x: IndexMap<&XValue, Option<f64>> = IndexMap::with_capacity(values.len());
    for point in values {
        by_x.insert(&point.x, point.y.filter(|value| value.is_finite()));
    }

    categories
        .iter()
        .map(|category| {
            let y = match (by_x.get(category).copied(), fill) {
                (Some(Some(y)), _) => Some(y),
                (Some(None), FillPolicy::Zero) => Some(0.0),
                (Some(None), FillPolicy::Gap | FillPolicy::ZeroAbsent) => None,
                (None, FillPolicy::Zero | FillPolicy::ZeroAbsent) => Some(0.0),
                (None, FillPolicy::Gap) => None,
            };
            Point {
                x: category.clone(),
                y,
            }
        })
        .collect()
}

/// Normalizes every dataset against the category union of all of them.
#[must_use]
pub fn normalize_datasets<'a>(
    datasets: impl IntoIterator<Item = &'a Dataset> + Clone,
    fill: FillPolicy,
) -> NormalizedSet {
    let categories = category_union(datasets.clone());
    let series = datasets
        .into_iter()
        .map(|dataset| {
            (
                dataset.name.clone(),
                normalize_values(&dataset.values, &categories, fill),
            )
        })
        .collect();
    NormalizedSet { categories, series }
}

/// One stacked sample. The visual extent is `[y0, y1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedPoint {
    pub x: XValue,
    pub y: Option<f64>,
    pub y0: f64,
    pub y1: f64,
}

/// Stacked series plus the per-category totals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StackedSet {
    pub categories: Vec<XValue>,
    pub series: IndexMap<String, Vec<StackedPoint>>,
    pub totals: Vec<f64>,
}

/// Accumulates `y0`/`y1` per category walking series in insertion order.
///
/// The first series starts at zero; each following series starts where the
/// previous one ended. Missing samples contribute zero height.
#[must_use]
pub fn stack(normalized: &NormalizedSet) -> StackedSet {
    let mut running = vec![0.0; normalized.categories.len()];
    let mut series = IndexMap::with_capacity(normalized.series.len());

    for (name, points) in &normalized.series {
        let stacked: Vec<StackedPoint> = points
            .iter()
            .zip(running.iter_mut())
            .map(|(point, total)| {
                let y0 = *total;
                let y1 = y0 + point.y.unwrap_or(0.0);
                *total = y1;
                StackedPoint {
                    x: point.x.clone(),
                    y: point.y,
                    y0,
                    y1,
                }
            })
            .collect();
        series.insert(name.clone(), stacked);
    }

    StackedSet {
        categories: normalized.categories.clone(),
        series,
        totals: running,
    }
}

/// Rescales stacked values to fractions of their category total.
///
/// A category whose total is zero maps every value to `0.0`, so it renders
/// with zero height instead of propagating `NaN`.
#[must_use]
pub fn to_percent(stacked: &StackedSet) -> StackedSet {
    let ratio = |value: f64, total: f64| if total == 0.0 { 0.0 } else { value / total };

    let series = stacked
        .series
        .iter()
        .map(|(name, points)| {
            let scaled = points
                .iter()
                .zip(&stacked.totals)
                .map(|(point, &total)| StackedPoint {
                    x: point.x.clone(),
                    y: point.y.map(|value| ratio(value, total)),
                    y0: ratio(point.y0, total),
                    y1: ratio(point.y1, total),
                })
                .collect();
            (name.clone(), scaled)
        })
        .collect();

    StackedSet {
        categories: stacked.categories.clone(),
        series,
        totals: stacked
            .totals
            .iter()
            .map(|&total| if total == 0.0 { 0.0 } else { 1.0 })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{FillPolicy, normalize_values};
    use crate::core::{Point, XValue};

    #[test]
    fn later_duplicate_sample_wins() {
        let categories = vec![XValue::category("a")];
        let values = vec![Point::new("a", 1.0), Point::new("a", 2.0)];
        let normalized = normalize_values(&values, &categories, FillPolicy::Gap);
        assert_eq!(normalized, vec![Point::new("a", 2.0)]);
    }

    #[test]
    fn non_finite_sample_counts_as_missing() {
        let categories = vec![XValue::category("a")];
        let values = vec![Point::new("a", f64::NAN)];
        assert_eq!(
            normalize_values(&values, &categories, FillPolicy::Zero),
            vec![Point::new("a", 0.0)]
        );
    }

    #[test]
    fn zero_absent_fills_only_absent_categories() {
        let categories = vec![XValue::category("a"), XValue::category("b"), XValue::category("c")];
        let values = vec![Point::new("a", 1.0), Point::gap("b")];
        assert_eq!(
            normalize_values(&values, &categories, FillPolicy::ZeroAbsent),
            vec![Point::new("a", 1.0), Point::gap("b"), Point::new("c", 0.0)]
        );
    }
}
