use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Months, NaiveDate, Timelike, Utc};

use crate::core::LinearScale;
use crate::core::types::millis_to_date;

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;
const WEEK_MS: i64 = 7 * DAY_MS;
const MONTH_MS: i64 = 30 * DAY_MS;
const YEAR_MS: i64 = 365 * DAY_MS;

/// Default minimum horizontal distance between two time-axis ticks.
pub const DEFAULT_MIN_TICK_SPACING_PX: f64 = 60.0;

/// Candidate tick intervals, shortest first.
const TICK_INTERVALS: [TickInterval; 18] = [
    TickInterval::Fixed(SECOND_MS),
    TickInterval::Fixed(5 * SECOND_MS),
    TickInterval::Fixed(15 * SECOND_MS),
    TickInterval::Fixed(30 * SECOND_MS),
    TickInterval::Fixed(MINUTE_MS),
    TickInterval::Fixed(5 * MINUTE_MS),
    TickInterval::Fixed(15 * MINUTE_MS),
    TickInterval::Fixed(30 * MINUTE_MS),
    TickInterval::Fixed(HOUR_MS),
    TickInterval::Fixed(3 * HOUR_MS),
    TickInterval::Fixed(6 * HOUR_MS),
    TickInterval::Fixed(12 * HOUR_MS),
    TickInterval::Fixed(DAY_MS),
    TickInterval::Fixed(2 * DAY_MS),
    TickInterval::Week,
    TickInterval::Months(1),
    TickInterval::Months(3),
    TickInterval::Years(1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickInterval {
    /// Fixed duration aligned on the unix epoch (UTC).
    Fixed(i64),
    /// Seven days starting on Sundays.
    Week,
    Months(u32),
    Years(i32),
}

impl TickInterval {
    fn approx_millis(self) -> i64 {
        match self {
            Self::Fixed(millis) => millis,
            Self::Week => WEEK_MS,
            Self::Months(count) => MONTH_MS * i64::from(count),
            Self::Years(count) => YEAR_MS * i64::from(count),
        }
    }
}

/// Caller-supplied predicate thinning time-axis tick candidates.
#[derive(Clone)]
pub struct TickFilter(Arc<dyn Fn(&DateTime<Utc>) -> bool + Send + Sync>);

impl TickFilter {
    pub fn new(predicate: impl Fn(&DateTime<Utc>) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Keeps only ticks falling exactly on midnight UTC.
    #[must_use]
    pub fn midnight() -> Self {
        Self::new(|time| {
            time.hour() == 0 && time.minute() == 0 && time.second() == 0 && time.nanosecond() == 0
        })
    }

    #[must_use]
    pub fn keep(&self, time: &DateTime<Utc>) -> bool {
        (self.0)(time)
    }
}

impl fmt::Debug for TickFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TickFilter(..)")
    }
}

/// Continuous date domain mapped onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    linear: LinearScale,
}

impl TimeScale {
    /// Builds a time scale. Equal endpoints are widened by one millisecond.
    #[must_use]
    pub fn new(domain: (DateTime<Utc>, DateTime<Utc>), range: (f64, f64)) -> Self {
        let linear = LinearScale::new(
            (
                domain.0.timestamp_millis() as f64,
                domain.1.timestamp_millis() as f64,
            ),
            range,
        );
        let (start_ms, end_ms) = linear.domain();
        Self {
            start: millis_to_date(start_ms).unwrap_or(domain.0),
            end: millis_to_date(end_ms).unwrap_or(domain.1),
            linear,
        }
    }

    #[must_use]
    pub fn domain(self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.start, self.end)
    }

    #[must_use]
    pub fn map(self, time: DateTime<Utc>) -> f64 {
        self.linear.map(time.timestamp_millis() as f64)
    }

    #[must_use]
    pub fn invert(self, pixel: f64) -> Option<DateTime<Utc>> {
        millis_to_date(self.linear.invert(pixel))
    }

    /// Automatic tick candidates: aligned calendar boundaries, about `count` of them.
    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<DateTime<Utc>> {
        let (start, end) = if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        let span = (end - start).num_milliseconds();
        if span <= 0 || count == 0 {
            return vec![start];
        }

        let target = span / count as i64;
        let interval = TICK_INTERVALS
            .iter()
            .copied()
            .min_by_key(|interval| (interval.approx_millis() - target).abs())
            .unwrap_or(TickInterval::Fixed(DAY_MS));

        match interval {
            TickInterval::Years(_) if span / YEAR_MS > count as i64 => {
                let years = super::scale::nice_ticks(
                    f64::from(start.year()),
                    f64::from(end.year()),
                    count,
                );
                let step = years
                    .windows(2)
                    .map(|pair| (pair[1] - pair[0]).round() as i32)
                    .next()
                    .unwrap_or(1)
                    .max(1);
                calendar_ticks(start, end, TickInterval::Years(step))
            }
            other => calendar_ticks(start, end, other),
        }
    }

    /// Axis ticks: automatic candidates, then the optional filter, then
    /// decimation so no two kept ticks are closer than `min_spacing_px`.
    #[must_use]
    pub fn axis_ticks(
        self,
        count: usize,
        filter: Option<&TickFilter>,
        min_spacing_px: f64,
    ) -> Vec<DateTime<Utc>> {
        let candidates: Vec<DateTime<Utc>> = self
            .ticks(count)
            .into_iter()
            .filter(|tick| filter.is_none_or(|filter| filter.keep(tick)))
            .collect();
        let positions: Vec<f64> = candidates.iter().map(|tick| self.map(*tick)).collect();
        let every = decimation_stride(&positions, min_spacing_px);
        candidates.into_iter().step_by(every).collect()
    }
}

/// How many ticks to skip so the kept ones are at least `min_spacing_px` apart.
#[must_use]
pub fn decimation_stride(positions: &[f64], min_spacing_px: f64) -> usize {
    if positions.len() < 2 || !min_spacing_px.is_finite() || min_spacing_px <= 0.0 {
        return 1;
    }
    let first = positions[0];
    let last = positions[positions.len() - 1];
    let spacing = ((last - first) / (positions.len() - 1) as f64).abs();
    if spacing >= min_spacing_px {
        return 1;
    }
    if spacing == 0.0 {
        return positions.len();
    }
    (min_spacing_px / spacing).ceil() as usize
}

fn calendar_ticks(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: TickInterval,
) -> Vec<DateTime<Utc>> {
    match interval {
        TickInterval::Fixed(step) => {
            let start_ms = start.timestamp_millis();
            let end_ms = end.timestamp_millis();
            let mut cursor = start_ms.div_euclid(step) * step;
            if cursor < start_ms {
                cursor += step;
            }
            let mut ticks = Vec::new();
            while cursor <= end_ms {
                if let Some(tick) = DateTime::<Utc>::from_timestamp_millis(cursor) {
                    ticks.push(tick);
                }
                cursor += step;
            }
            ticks
        }
        TickInterval::Week => {
            let first_day = start.date_naive();
            let offset = i64::from(first_day.weekday().num_days_from_sunday());
            let mut cursor = midnight(first_day) - chrono::Duration::days(offset);
            if cursor < start {
                cursor += chrono::Duration::days(7);
            }
            let mut ticks = Vec::new();
            while cursor <= end {
                ticks.push(cursor);
                cursor += chrono::Duration::days(7);
            }
            ticks
        }
        TickInterval::Months(step) => {
            let Some(first) = NaiveDate::from_ymd_opt(start.year(), start.month(), 1) else {
                return Vec::new();
            };
            let mut ticks = Vec::new();
            let mut index = 0u32;
            while let Some(day) = first.checked_add_months(Months::new(index * step)) {
                let tick = midnight(day);
                if tick > end {
                    break;
                }
                if tick >= start {
                    ticks.push(tick);
                }
                index += 1;
            }
            ticks
        }
        TickInterval::Years(step) => {
            let first_year = start.year() - start.year().rem_euclid(step);
            let mut ticks = Vec::new();
            let mut year = first_year;
            while let Some(day) = NaiveDate::from_ymd_opt(year, 1, 1) {
                let tick = midnight(day);
                if tick > end {
                    break;
                }
                if tick >= start {
                    ticks.push(tick);
                }
                year += step;
            }
            ticks
        }
    }
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}
