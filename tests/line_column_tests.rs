use approx::assert_relative_eq;
use chart_delta::api::{Chart, ChartConfigDelta, DatasetDelta};
use chart_delta::charts::ChartKind;
use chart_delta::core::{BandScale, Point, SeriesAxis, SeriesType, Viewport, XValue};
use chart_delta::render::{ElementKey, Layer, PathCommand, RecordingSurface};

const PLOT_WIDTH: f64 = 514.0;

fn draw(delta: ChartConfigDelta) -> Chart<RecordingSurface> {
    let surface = RecordingSurface::new().with_container("#chart", Viewport::new(600, 400));
    let mut chart = Chart::create(ChartKind::LineColumn, surface, "#chart", &delta).expect("create");
    chart.update(&ChartConfigDelta::new()).expect("update");
    chart
}

fn revenue() -> DatasetDelta {
    DatasetDelta::values(vec![
        Point::new("jan", 40.0),
        Point::new("feb", 100.0),
        Point::new("mar", 70.0),
    ])
}

fn visitors() -> DatasetDelta {
    DatasetDelta::values(vec![
        Point::new("jan", 1200.0),
        Point::new("feb", 2000.0),
        Point::new("mar", 900.0),
    ])
    .with_type(SeriesType::Line)
    .with_axis(SeriesAxis::Right)
}

fn tick_rows(chart: &Chart<RecordingSurface>, layer: Layer) -> Vec<f64> {
    chart
        .surface()
        .node(&[ElementKey::Layer(layer)])
        .expect("axis layer")
        .children
        .values()
        .filter_map(|tick| tick.element.as_group())
        .map(|group| group.translate_y)
        .collect()
}

#[test]
fn right_axis_ticks_line_up_with_left_axis_ticks() {
    let chart = draw(
        ChartConfigDelta::new()
            .with_dataset("revenue", revenue())
            .with_dataset("visitors", visitors()),
    );

    let left = tick_rows(&chart, Layer::LeftAxis);
    let right = tick_rows(&chart, Layer::RightAxis);
    assert_eq!(left.len(), 11);
    assert_eq!(left.len(), right.len());
    for (l, r) in left.iter().zip(&right) {
        assert_relative_eq!(*l, *r, epsilon = 1e-6);
    }

    let right_layer = chart
        .surface()
        .element(&[ElementKey::Layer(Layer::RightAxis)])
        .and_then(|element| element.as_group())
        .expect("right axis group");
    assert_relative_eq!(right_layer.translate_x, 50.0 + PLOT_WIDTH, epsilon = 1e-9);
}

#[test]
fn right_only_data_uses_native_ticks_and_hides_left_axis() {
    let chart = draw(ChartConfigDelta::new().with_dataset("visitors", visitors()));

    let left = chart
        .surface()
        .node(&[ElementKey::Layer(Layer::LeftAxis)])
        .expect("left axis layer");
    assert!(left.children.is_empty());

    let right = chart
        .surface()
        .node(&[ElementKey::Layer(Layer::RightAxis)])
        .expect("right axis layer");
    assert_eq!(right.children.len(), 11);
    assert!(right.children.contains_key(&ElementKey::Tick(XValue::number(200.0))));
    assert!(right.children.contains_key(&ElementKey::Tick(XValue::number(2000.0))));
}

#[test]
fn columns_and_lines_share_the_band_axis() {
    let chart = draw(
        ChartConfigDelta::new()
            .with_dataset("revenue", revenue())
            .with_dataset("visitors", visitors()),
    );
    let band = BandScale::new(
        ["jan", "feb", "mar"].map(XValue::category),
        (0.0, PLOT_WIDTH),
        0.1,
    );

    let column = chart
        .surface()
        .element(&[
            ElementKey::Layer(Layer::Columns),
            ElementKey::Category(XValue::category("feb")),
            ElementKey::Series("revenue".to_owned()),
        ])
        .and_then(|element| element.as_rect())
        .expect("revenue column");
    assert!(column.width <= band.bandwidth());
    assert_relative_eq!(column.y, 0.0, epsilon = 1e-9);

    let line = chart
        .surface()
        .element(&[
            ElementKey::Layer(Layer::Lines),
            ElementKey::Series("visitors".to_owned()),
        ])
        .and_then(|element| element.as_path())
        .expect("visitors line");
    let Some(PathCommand::MoveTo { x, .. }) = line.commands.first().copied() else {
        panic!("line should start with a move");
    };
    assert_relative_eq!(x, band.center(&XValue::category("jan")).expect("jan"), epsilon = 1e-9);

    // Line datasets never produce columns.
    assert!(chart
        .surface()
        .element(&[
            ElementKey::Layer(Layer::Columns),
            ElementKey::Category(XValue::category("feb")),
            ElementKey::Series("visitors".to_owned()),
        ])
        .is_none());
}

#[test]
fn moving_a_dataset_to_the_other_axis_rescales_it() {
    let mut chart = draw(
        ChartConfigDelta::new()
            .with_dataset("revenue", revenue())
            .with_dataset("visitors", visitors()),
    );
    chart
        .update(&ChartConfigDelta::new().with_dataset(
            "visitors",
            DatasetDelta::default().with_axis(SeriesAxis::Left),
        ))
        .expect("move to left axis");

    let right = chart
        .surface()
        .node(&[ElementKey::Layer(Layer::RightAxis)])
        .expect("right axis layer");
    assert!(right.children.is_empty());
    assert!(chart
        .surface()
        .element(&[
            ElementKey::Layer(Layer::LeftAxis),
            ElementKey::Tick(XValue::number(2000.0)),
        ])
        .is_some());
}
