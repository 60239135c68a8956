use approx::assert_relative_eq;
use chart_delta::api::{Chart, ChartConfigDelta, DatasetDelta, XAxisDelta};
use chart_delta::charts::ChartKind;
use chart_delta::core::{Point, TickFilter, Viewport, XValue};
use chart_delta::render::{ElementKey, Layer, PathCommand, RecordingSurface};
use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).single().expect("date")
}

fn series(count: i64, step: Duration) -> Vec<Point> {
    (0..count)
        .map(|index| Point::new(start() + step * index as i32, (index % 7) as f64 + 1.0))
        .collect()
}

fn draw(width: u32, delta: ChartConfigDelta) -> Chart<RecordingSurface> {
    let surface = RecordingSurface::new().with_container("#chart", Viewport::new(width, 300));
    let mut chart = Chart::create(ChartKind::TimeLine, surface, "#chart", &delta).expect("create");
    chart.update(&ChartConfigDelta::new()).expect("update");
    chart
}

/// `(date, x)` of every bottom-axis tick, in axis order.
fn bottom_ticks(chart: &Chart<RecordingSurface>) -> Vec<(DateTime<Utc>, f64)> {
    chart
        .surface()
        .node(&[ElementKey::Layer(Layer::BottomAxis)])
        .expect("bottom axis")
        .children
        .iter()
        .filter_map(|(key, tick)| match key {
            ElementKey::Tick(XValue::Date(date)) => {
                Some((*date, tick.element.as_group()?.translate_x))
            }
            _ => None,
        })
        .collect()
}

#[test]
fn crowded_ticks_are_decimated() {
    let chart = draw(
        400,
        ChartConfigDelta::new().with_dataset("daily", DatasetDelta::values(series(30, Duration::days(1)))),
    );
    let ticks = bottom_ticks(&chart);
    assert!(ticks.len() >= 2);
    assert!(ticks.len() < 10);
    for pair in ticks.windows(2) {
        assert!(pair[1].1 - pair[0].1 >= 60.0 - 1e-9);
    }
}

#[test]
fn midnight_filter_keeps_only_day_boundaries() {
    let chart = draw(
        1200,
        ChartConfigDelta::new()
            .with_bottom_x_axis(XAxisDelta::default().with_filter(TickFilter::midnight()))
            .with_dataset("hourly", DatasetDelta::values(series(72, Duration::hours(1)))),
    );
    let ticks = bottom_ticks(&chart);
    assert_eq!(ticks.len(), 3);
    for (date, _) in &ticks {
        assert_eq!((date.hour(), date.minute()), (0, 0));
    }
}

#[test]
fn clearing_the_filter_restores_sub_day_ticks() {
    let mut chart = draw(
        1200,
        ChartConfigDelta::new()
            .with_bottom_x_axis(XAxisDelta::default().with_filter(TickFilter::midnight()))
            .with_dataset("hourly", DatasetDelta::values(series(72, Duration::hours(1)))),
    );
    chart
        .update(&ChartConfigDelta::new().with_bottom_x_axis(XAxisDelta::default().without_filter()))
        .expect("clear filter");
    let ticks = bottom_ticks(&chart);
    assert!(ticks.len() > 3);
    assert!(ticks.iter().any(|(date, _)| date.hour() != 0));
}

#[test]
fn line_spans_earliest_to_latest_sample() {
    let mut values = series(10, Duration::days(1));
    values.reverse();
    let chart = draw(
        600,
        ChartConfigDelta::new().with_dataset("daily", DatasetDelta::values(values)),
    );
    let line = chart
        .surface()
        .element(&[ElementKey::Layer(Layer::Lines), ElementKey::Series("daily".to_owned())])
        .and_then(|element| element.as_path())
        .expect("line");

    let xs: Vec<f64> = line
        .commands
        .iter()
        .filter_map(|command| match command {
            PathCommand::MoveTo { x, .. } | PathCommand::LineTo { x, .. } => Some(*x),
            _ => None,
        })
        .collect();
    assert_eq!(xs.len(), 10);
    assert_relative_eq!(xs[0], 0.0, epsilon = 1e-9);
    assert_relative_eq!(xs[9], 514.0, epsilon = 1e-9);
    assert!(xs.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn hover_reports_the_nearest_date() {
    let mut chart = draw(
        600,
        ChartConfigDelta::new().with_dataset("daily", DatasetDelta::values(series(10, Duration::days(1)))),
    );
    // Nine daily steps over 514px; day 3 sits at 3 * 514 / 9.
    let day_three = 3.0 * 514.0 / 9.0;
    let info = chart.pointer_move(50.0 + day_three + 5.0, 80.0).expect("hover");
    assert_eq!(info.name, XValue::Date(start() + Duration::days(3)));
    assert_relative_eq!(info.left, 50.0 + day_three, epsilon = 1e-6);
    assert_eq!(info.y.get("daily"), Some(&Some(4.0)));
}
