//! Axis and tooltip label formatting.
//!
//! A [`FormatSpec`] carries a pattern string plus optional prefix/suffix.
//! Numeric patterns follow a subset of the d3-format mini language
//! (`[sign][$][,][.precision][~][type]`), date patterns are strftime-style.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::core::XValue;

/// Pattern value meaning "draw no label".
pub const AUTO_FORMAT: &str = "auto";

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatSpec {
    pub string: String,
    pub prefix: String,
    pub suffix: String,
    pub is_date: bool,
}

impl FormatSpec {
    #[must_use]
    pub fn number(pattern: impl Into<String>) -> Self {
        Self {
            string: pattern.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn date(pattern: impl Into<String>) -> Self {
        Self {
            string: pattern.into(),
            is_date: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.string == AUTO_FORMAT
    }
}

/// Formats a value for display. Returns `None` when the label is suppressed.
#[must_use]
pub fn format_value(value: &XValue, spec: &FormatSpec) -> Option<String> {
    if spec.is_suppressed() {
        return None;
    }

    let body = if spec.string.is_empty() {
        value.to_string()
    } else if spec.is_date {
        match value.as_date() {
            Some(date) => format_date(date, &spec.string),
            None => value.to_string(),
        }
    } else {
        match value.as_f64() {
            Some(number) => format_number(number, &spec.string),
            None => value.to_string(),
        }
    };

    Some(wrap_affixes(&spec.prefix, body, &spec.suffix))
}

/// Convenience wrapper for continuous axis ticks.
#[must_use]
pub fn format_tick(value: f64, spec: &FormatSpec) -> Option<String> {
    format_value(&XValue::number(value), spec)
}

fn wrap_affixes(prefix: &str, body: String, suffix: &str) -> String {
    if prefix.is_empty() && suffix.is_empty() {
        return body;
    }
    let mut text = String::with_capacity(prefix.len() + body.len() + suffix.len() + 2);
    if !prefix.is_empty() {
        text.push_str(prefix);
        text.push(' ');
    }
    text.push_str(&body);
    if !suffix.is_empty() {
        text.push(' ');
        text.push_str(suffix);
    }
    text
}

/// Formats a date with a strftime-style pattern.
///
/// Patterns chrono cannot parse fall back to an RFC 3339 rendering instead of
/// panicking inside `Display`.
#[must_use]
pub fn format_date(date: DateTime<Utc>, pattern: &str) -> String {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return XValue::Date(date).to_string();
    }
    let mut out = String::new();
    if write!(out, "{}", date.format_with_items(items.into_iter())).is_err() {
        return XValue::Date(date).to_string();
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberKind {
    Fixed,
    Integer,
    Percent,
    Exponent,
    Si,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NumberPattern {
    always_sign: bool,
    currency: bool,
    grouping: bool,
    precision: Option<usize>,
    trim: bool,
    kind: NumberKind,
}

fn parse_number_pattern(pattern: &str) -> NumberPattern {
    let mut parsed = NumberPattern {
        always_sign: false,
        currency: false,
        grouping: false,
        precision: None,
        trim: false,
        kind: NumberKind::General,
    };

    let mut chars = pattern.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '+' => parsed.always_sign = true,
            '$' => parsed.currency = true,
            ',' => parsed.grouping = true,
            '~' => parsed.trim = true,
            '.' => {
                let mut digits = String::new();
                while let Some(digit) = chars.peek().copied().filter(char::is_ascii_digit) {
                    digits.push(digit);
                    chars.next();
                }
                parsed.precision = digits.parse().ok();
            }
            'f' => parsed.kind = NumberKind::Fixed,
            'd' => parsed.kind = NumberKind::Integer,
            '%' => parsed.kind = NumberKind::Percent,
            'e' => parsed.kind = NumberKind::Exponent,
            's' => parsed.kind = NumberKind::Si,
            // Fill, alignment and width are not supported and are ignored.
            _ => {}
        }
    }
    parsed
}

/// Formats a number with a d3-format style pattern.
#[must_use]
pub fn format_number(value: f64, pattern: &str) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let parsed = parse_number_pattern(pattern);
    let negative = value < 0.0;
    let magnitude = value.abs();

    let (mut digits, unit) = match parsed.kind {
        NumberKind::Fixed => (fixed(magnitude, parsed.precision.unwrap_or(6)), ""),
        NumberKind::Integer => (fixed(magnitude, 0), ""),
        NumberKind::Percent => (fixed(magnitude * 100.0, parsed.precision.unwrap_or(6)), "%"),
        NumberKind::Exponent => (exponent(magnitude, parsed.precision.unwrap_or(6)), ""),
        NumberKind::Si => si(magnitude, parsed.precision.unwrap_or(6)),
        NumberKind::General => match parsed.precision {
            Some(precision) => (significant(magnitude, precision.max(1)), ""),
            None => (magnitude.to_string(), ""),
        },
    };

    if parsed.trim {
        digits = trim_fraction_zeros(digits);
    }
    if parsed.grouping {
        digits = group_thousands(&digits);
    }

    let is_zero = digits.chars().all(|ch| matches!(ch, '0' | '.' | ','));
    let sign = if negative && !is_zero {
        "-"
    } else if parsed.always_sign {
        "+"
    } else {
        ""
    };

    let mut out = String::with_capacity(digits.len() + 4);
    out.push_str(sign);
    if parsed.currency {
        out.push('$');
    }
    out.push_str(&digits);
    out.push_str(unit);
    out
}

fn fixed(value: f64, precision: usize) -> String {
    match Decimal::from_f64(value) {
        Some(decimal) => {
            let rounded = decimal.round_dp_with_strategy(
                u32::try_from(precision).unwrap_or(u32::MAX),
                RoundingStrategy::MidpointAwayFromZero,
            );
            format!("{rounded:.precision$}")
        }
        None => format!("{value:.precision$}"),
    }
}

fn exponent(value: f64, precision: usize) -> String {
    let raw = format!("{value:.precision$e}");
    match raw.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => raw,
    }
}

fn significant(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return fixed(0.0, precision.saturating_sub(1));
    }
    let magnitude = value.log10().floor() as i64;
    let decimals = (precision as i64 - 1 - magnitude).max(0) as usize;
    fixed(value, decimals)
}

fn si(value: f64, precision: usize) -> (String, &'static str) {
    if value == 0.0 {
        return (significant(0.0, precision), "");
    }
    let exponent = ((value.log10() / 3.0).floor() as i64).clamp(-8, 8);
    let scaled = value / 1000f64.powi(exponent as i32);
    let index = (exponent + 8) as usize;
    (significant(scaled, precision.max(1)), SI_PREFIXES[index])
}

fn trim_fraction_zeros(digits: String) -> String {
    if !digits.contains('.') || digits.contains('e') {
        return digits;
    }
    digits
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_owned()
}

fn group_thousands(digits: &str) -> String {
    let (integer, fraction) = match digits.find(['.', 'e']) {
        Some(index) => digits.split_at(index),
        None => (digits, ""),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 + fraction.len());
    for (index, ch) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push_str(fraction);
    grouped
}

#[cfg(test)]
mod tests {
    use super::{format_date, format_number, group_thousands};
    use chrono::{TimeZone, Utc};

    #[test]
    fn fixed_rounds_half_away_from_zero() {
        assert_eq!(format_number(2.345, ".2f"), "2.35");
        assert_eq!(format_number(-2.345, ".2f"), "-2.35");
    }

    #[test]
    fn grouping_skips_fraction_digits() {
        assert_eq!(group_thousands("1234567.891"), "1,234,567.891");
        assert_eq!(group_thousands("999"), "999");
    }

    #[test]
    fn negative_zero_has_no_sign() {
        assert_eq!(format_number(-0.0001, ".0f"), "0");
    }

    #[test]
    fn unknown_strftime_directive_falls_back() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).single().expect("date");
        assert_eq!(format_date(date, "%Q"), "2024-03-01T00:00:00Z");
    }
}
