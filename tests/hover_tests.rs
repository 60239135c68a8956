use std::cell::RefCell;
use std::rc::Rc;

use chart_delta::api::{Chart, ChartConfigDelta, DatasetDelta};
use chart_delta::charts::ChartKind;
use chart_delta::core::{BandScale, Point, Viewport, XValue};
use chart_delta::interaction::nearest_index;
use chart_delta::render::RecordingSurface;

const WIDTH: f64 = 600.0 - 50.0 - 36.0;

fn quarterly_chart() -> Chart<RecordingSurface> {
    let surface = RecordingSurface::new().with_container("#chart", Viewport::new(600, 400));
    let initial = ChartConfigDelta::new()
        .with_dataset(
            "a",
            DatasetDelta::values(vec![
                Point::new("q1", 1.0),
                Point::new("q2", 2.0),
                Point::new("q3", 3.0),
            ]),
        )
        .with_dataset("b", DatasetDelta::values(vec![Point::new("q1", 4.0)]));
    let mut chart = Chart::create(ChartKind::Column, surface, "#chart", &initial).expect("create");
    chart.update(&ChartConfigDelta::new()).expect("update");
    chart
}

fn band() -> BandScale {
    BandScale::new(
        ["q1", "q2", "q3"].map(XValue::category),
        (0.0, WIDTH),
        0.1,
    )
}

#[test]
fn nearest_position_wins() {
    assert_eq!(nearest_index(&[10.0, 50.0, 90.0], 45.0), Some(1));
    assert_eq!(nearest_index(&[10.0, 50.0, 90.0], 30.0), Some(0));
    assert_eq!(nearest_index(&[], 30.0), None);
}

#[test]
fn hover_reports_band_center_and_values() {
    let mut chart = quarterly_chart();
    let center = band().center(&XValue::category("q2")).expect("q2");

    let info = chart.pointer_move(center + 50.0 + 3.0, 100.0).expect("hover");
    assert_eq!(info.name, XValue::category("q2"));
    assert!((info.left - (center + 50.0)).abs() < 1e-9);
    assert_eq!(info.top, 100.0);
    assert_eq!(info.y.get("a"), Some(&Some(2.0)));
    assert_eq!(info.y.get("b"), Some(&None));
}

#[test]
fn callbacks_fire_in_pointer_order() {
    let mut chart = quarterly_chart();
    let events = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&events);
    chart.mouse_over(move || log.borrow_mut().push("over".to_owned()));
    let log = Rc::clone(&events);
    chart.mouse_out(move || log.borrow_mut().push("out".to_owned()));
    let log = Rc::clone(&events);
    chart.mouse_move(move |info| log.borrow_mut().push(format!("move {}", info.name)));

    let q1 = band().center(&XValue::category("q1")).expect("q1") + 50.0;
    let q3 = band().center(&XValue::category("q3")).expect("q3") + 50.0;
    chart.pointer_move(q1, 120.0);
    chart.pointer_move(q3, 120.0);
    assert!(chart.is_pointer_inside());

    // Inside the left margin: outside the plot area.
    assert!(chart.pointer_move(10.0, 120.0).is_none());
    assert!(!chart.is_pointer_inside());
    chart.pointer_leave();

    assert_eq!(
        *events.borrow(),
        vec!["over", "move q1", "move q3", "out"]
    );
}

#[test]
fn pointer_before_first_update_yields_nothing() {
    let surface = RecordingSurface::new().with_container("#chart", Viewport::new(600, 400));
    let mut chart =
        Chart::create(ChartKind::Line, surface, "#chart", &ChartConfigDelta::new()).expect("create");
    assert!(chart.pointer_move(200.0, 100.0).is_none());
}
