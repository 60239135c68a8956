use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::core::XValue;

/// Continuous linear mapping from a value domain onto a pixel range.
///
/// Degenerate domains never fail: a non-finite domain becomes `[0, 1]` and
/// `min == max` is widened to `[min, min + 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    #[must_use]
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let (domain_start, domain_end) = normalize_domain(domain.0, domain.1);
        Self {
            domain_start,
            domain_end,
            range_start: range.0,
            range_end: range.1,
        }
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    /// Position of `value` inside the domain, `0.0` at the start and `1.0` at the end.
    #[must_use]
    pub fn fraction(self, value: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        if span.is_finite() {
            (value - self.domain_start) / span
        } else {
            // Domains wider than f64::MAX are measured in halves.
            (value * 0.5 - self.domain_start * 0.5)
                / (self.domain_end * 0.5 - self.domain_start * 0.5)
        }
    }

    /// Pixel position of `value`; always finite.
    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let fraction = self.fraction(value);
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(-FRACTION_LIMIT, FRACTION_LIMIT)
        };
        self.range_start + fraction * (self.range_end - self.range_start)
    }

    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let span = self.range_end - self.range_start;
        if span == 0.0 {
            return self.domain_start;
        }
        self.value_at_fraction((pixel - self.range_start) / span)
    }

    /// Domain value found at the given fraction of the domain.
    #[must_use]
    pub fn value_at_fraction(self, fraction: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        if span.is_finite() {
            self.domain_start + fraction * span
        } else {
            self.domain_start * (1.0 - fraction) + self.domain_end * fraction
        }
    }

    /// Round-number tick values inside the domain, roughly `count` of them.
    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<f64> {
        nice_ticks(self.domain_start, self.domain_end, count)
    }
}

/// Out-of-domain values are clamped to this many domain spans before mapping.
const FRACTION_LIMIT: f64 = 1.0e6;

/// Guards against empty and non-finite domains.
///
/// NaN bounds fall back to `[0, 1]`, infinite bounds are clamped to the
/// largest finite values.
#[must_use]
pub fn normalize_domain(start: f64, end: f64) -> (f64, f64) {
    if start.is_nan() || end.is_nan() {
        return (0.0, 1.0);
    }
    let start = start.clamp(f64::MIN, f64::MAX);
    let end = end.clamp(f64::MIN, f64::MAX);
    if start == end {
        return (start, start + 1.0);
    }
    (start, end)
}

/// Returns evenly spaced round values covering `[start, end]`.
///
/// Steps below one are applied as divisions by an integer so the produced
/// values do not accumulate binary rounding noise (`0.30000000000000004`).
#[must_use]
pub fn nice_ticks(start: f64, end: f64, count: usize) -> Vec<f64> {
    if !start.is_finite() || !end.is_finite() || count == 0 {
        return Vec::new();
    }
    if start == end {
        return vec![start];
    }

    let reverse = end < start;
    let (min, max) = if reverse { (end, start) } else { (start, end) };
    let increment = tick_increment(min, max, count);
    if increment == 0.0 || !increment.is_finite() {
        return Vec::new();
    }

    let mut ticks = Vec::new();
    if increment > 0.0 {
        let first = (min / increment).ceil() as i64;
        let last = (max / increment).floor() as i64;
        for i in first..=last {
            ticks.push(i as f64 * increment);
        }
    } else {
        let inverse = -increment;
        let first = (min * inverse).ceil() as i64;
        let last = (max * inverse).floor() as i64;
        for i in first..=last {
            ticks.push(i as f64 / inverse);
        }
    }

    if reverse {
        ticks.reverse();
    }
    ticks
}

/// Step between ticks; negative values encode `1 / -step` for sub-unit steps.
fn tick_increment(min: f64, max: f64, count: usize) -> f64 {
    const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
    const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
    const E2: f64 = 1.414_213_562_373_095_1; // sqrt(2)

    let step = match (max - min) / count as f64 {
        step if step.is_finite() => step,
        _ => max / count as f64 - min / count as f64,
    };
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

/// Discrete ordered domain mapped onto equal-width slots.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: IndexSet<XValue>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    /// Builds a band scale with the same inner and outer padding fraction.
    #[must_use]
    pub fn new(domain: impl IntoIterator<Item = XValue>, range: (f64, f64), padding: f64) -> Self {
        Self::with_padding(domain, range, padding, padding)
    }

    #[must_use]
    pub fn with_padding(
        domain: impl IntoIterator<Item = XValue>,
        range: (f64, f64),
        padding_inner: f64,
        padding_outer: f64,
    ) -> Self {
        let domain: IndexSet<XValue> = domain.into_iter().collect();
        let padding_inner = sanitize_fraction(padding_inner);
        let padding_outer = if padding_outer.is_finite() {
            padding_outer.max(0.0)
        } else {
            0.0
        };

        let n = domain.len() as f64;
        let span = range.1 - range.0;
        let slots = (n - padding_inner + 2.0 * padding_outer).max(1.0);
        let step = if domain.is_empty() { 0.0 } else { span / slots };
        let start = range.0 + (span - step * (n - padding_inner)) * 0.5;

        Self {
            domain,
            start,
            step,
            bandwidth: step * (1.0 - padding_inner),
        }
    }

    #[must_use]
    pub fn domain(&self) -> impl ExactSizeIterator<Item = &XValue> {
        self.domain.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.domain.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Left edge of the band for `value`.
    #[must_use]
    pub fn position(&self, value: &XValue) -> Option<f64> {
        self.domain
            .get_index_of(value)
            .map(|index| self.start + self.step * index as f64)
    }

    #[must_use]
    pub fn center(&self, value: &XValue) -> Option<f64> {
        self.position(value).map(|left| left + self.bandwidth * 0.5)
    }
}

/// Discrete ordered domain mapped onto single pixel positions.
///
/// With no padding the first value sits on the range start and the last one
/// on the range end, so line vertices land exactly on the ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct PointScale {
    domain: IndexSet<XValue>,
    start: f64,
    step: f64,
}

impl PointScale {
    #[must_use]
    pub fn new(domain: impl IntoIterator<Item = XValue>, range: (f64, f64), padding: f64) -> Self {
        let domain: IndexSet<XValue> = domain.into_iter().collect();
        let padding = if padding.is_finite() {
            padding.max(0.0)
        } else {
            0.0
        };
        let n = domain.len() as f64;
        let span = range.1 - range.0;
        let slots = (n - 1.0 + 2.0 * padding).max(1.0);
        let step = if domain.is_empty() { 0.0 } else { span / slots };
        let start = range.0 + (span - step * (n - 1.0).max(0.0)) * 0.5;
        Self {
            domain,
            start,
            step,
        }
    }

    #[must_use]
    pub fn domain(&self) -> impl ExactSizeIterator<Item = &XValue> {
        self.domain.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.domain.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[must_use]
    pub fn position(&self, value: &XValue) -> Option<f64> {
        self.domain
            .get_index_of(value)
            .map(|index| self.start + self.step * index as f64)
    }
}

fn sanitize_fraction(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{BandScale, LinearScale, PointScale, nice_ticks};
    use crate::core::XValue;

    #[test]
    fn sub_unit_ticks_stay_exact() {
        assert_eq!(nice_ticks(0.0, 1.0, 10)[3], 0.3);
    }

    #[test]
    fn degenerate_domain_is_widened() {
        let scale = LinearScale::new((5.0, 5.0), (100.0, 0.0));
        assert_eq!(scale.domain(), (5.0, 6.0));
        assert!(scale.map(5.0).is_finite());
    }

    #[test]
    fn domain_wider_than_f64_max_maps_finitely() {
        let scale = LinearScale::new((-1e308, 1e308), (328.0, 0.0));
        assert_eq!(scale.map(-1e308), 328.0);
        assert_eq!(scale.map(1e308), 0.0);
        assert_eq!(scale.map(0.0), 164.0);
        assert_eq!(scale.invert(164.0), 0.0);

        let ticks = scale.ticks(10);
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|tick| tick.is_finite() && scale.map(*tick).is_finite()));
    }

    #[test]
    fn infinite_bounds_are_clamped_and_outliers_stay_finite() {
        let scale = LinearScale::new((0.0, f64::INFINITY), (0.0, 100.0));
        assert_eq!(scale.domain(), (0.0, f64::MAX));

        let narrow = LinearScale::new((0.0, 1.0), (0.0, 100.0));
        assert!(narrow.map(1e308).is_finite());
        assert!(narrow.map(f64::NAN).is_finite());
    }

    #[test]
    fn single_point_sits_in_the_middle() {
        let scale = PointScale::new([XValue::category("a")], (0.0, 100.0), 0.0);
        assert_eq!(scale.position(&XValue::category("a")), Some(50.0));
    }

    #[test]
    fn empty_band_scale_has_zero_width() {
        let scale = BandScale::new(Vec::new(), (0.0, 100.0), 0.1);
        assert_eq!(scale.bandwidth(), 0.0);
        assert_eq!(scale.position(&XValue::category("missing")), None);
    }
}
