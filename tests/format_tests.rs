use chart_delta::core::format::{format_date, format_number, format_tick};
use chart_delta::core::{FormatSpec, XValue, format_value};
use chrono::{TimeZone, Utc};

#[test]
fn auto_pattern_suppresses_the_label() {
    assert_eq!(format_value(&XValue::number(3.0), &FormatSpec::number("auto")), None);
    assert_eq!(format_tick(3.0, &FormatSpec::number("auto")), None);
}

#[test]
fn empty_pattern_shows_the_raw_value() {
    let spec = FormatSpec::default();
    assert_eq!(format_value(&XValue::category("q1"), &spec).as_deref(), Some("q1"));
    assert_eq!(format_value(&XValue::number(2.5), &spec).as_deref(), Some("2.5"));
}

#[test]
fn prefix_and_suffix_wrap_with_single_spaces() {
    let spec = FormatSpec::number(",.0f").with_prefix("$").with_suffix("USD");
    assert_eq!(format_tick(1234.0, &spec).as_deref(), Some("$ 1,234 USD"));

    let suffix_only = FormatSpec::number(".1f").with_suffix("ms");
    assert_eq!(format_tick(0.25, &suffix_only).as_deref(), Some("0.3 ms"));
}

#[test]
fn empty_affixes_add_no_padding() {
    let prefix_only = FormatSpec::number(",.0f").with_prefix("$");
    assert_eq!(format_tick(1234.0, &prefix_only).as_deref(), Some("$ 1,234"));

    let bare = FormatSpec::number(",.0f");
    assert_eq!(format_tick(1234.0, &bare).as_deref(), Some("1,234"));

    let explicit_empty = FormatSpec::number("d").with_prefix("").with_suffix("");
    assert_eq!(format_tick(7.0, &explicit_empty).as_deref(), Some("7"));
}

#[test]
fn number_patterns_follow_d3_conventions() {
    assert_eq!(format_number(1234.5, ",.2f"), "1,234.50");
    assert_eq!(format_number(0.256, ".0%"), "26%");
    assert_eq!(format_number(1500.0, ".2s"), "1.5k");
    assert_eq!(format_number(12345.0, ".2e"), "1.23e+4");
    assert_eq!(format_number(42.4, "d"), "42");
    assert_eq!(format_number(3.0, "+.1f"), "+3.0");
    assert_eq!(format_number(-1250.0, "$,.0f"), "-$1,250");
    assert_eq!(format_number(2.5, ".3~f"), "2.5");
}

#[test]
fn date_patterns_use_strftime() {
    let date = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).single().expect("date");
    assert_eq!(format_date(date, "%Y-%m-%d"), "2024-03-05");
    assert_eq!(format_date(date, "%H:%M"), "14:30");

    let spec = FormatSpec::date("%b %d");
    assert_eq!(format_value(&XValue::Date(date), &spec).as_deref(), Some("Mar 05"));
}

#[test]
fn category_under_number_pattern_stays_raw() {
    let spec = FormatSpec::number(".2f");
    assert_eq!(format_value(&XValue::category("north"), &spec).as_deref(), Some("north"));
}
