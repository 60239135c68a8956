use chrono::{DateTime, Utc};

use crate::core::curve::line_commands;
use crate::core::domain::resolve_time_domain;
use crate::core::normalize::normalize_datasets;
use crate::core::time_scale::DEFAULT_MIN_TICK_SPACING_PX;
use crate::core::{Curve, FillPolicy, TimeScale, XValue};
use crate::interaction::HoverIndex;
use crate::render::{ElementKey, Layer, SceneNode};

use super::axes::{ValueSide, bottom_axis, value_axis};
use super::{AXIS_TICK_COUNT, SceneBuilder, SceneContext, line_markers, stroke_path};

/// Time-series line chart over a continuous time x axis.
///
/// The x domain spans the earliest to the latest sample of all datasets;
/// each dataset is drawn in time order. Samples whose x is not a date are
/// ignored.
pub(crate) fn build(ctx: &SceneContext<'_>, builder: &mut SceneBuilder) -> HoverIndex {
    let config = ctx.config;
    let axis = &config.bottom_x_axis;

    let dates = config
        .datasets()
        .flat_map(|dataset| dataset.values.iter().filter_map(|point| point.x.as_date()));
    let data_extent = dates.fold(None, |acc: Option<(DateTime<Utc>, DateTime<Utc>)>, date| {
        Some(match acc {
            None => (date, date),
            Some((min, max)) => (min.min(date), max.max(date)),
        })
    });
    let time = TimeScale::new(
        resolve_time_domain(axis.min, axis.max, data_extent),
        ctx.x_range(),
    );
    let y = ctx.value_scale(
        &config.left_y_axis,
        config.datasets().flat_map(|dataset| dataset.defined_values()),
    );

    for dataset in config.datasets() {
        let mut samples: Vec<(DateTime<Utc>, Option<f64>)> = dataset
            .values
            .iter()
            .filter_map(|point| Some((point.x.as_date()?, point.y)))
            .collect();
        samples.sort_by_key(|(date, _)| *date);

        let vertices: Vec<Option<(f64, f64)>> = samples
            .iter()
            .map(|&(date, value)| value.map(|value| (time.map(date), y.map(value))))
            .collect();
        let curve = Curve::from_smooth(dataset.smooth(config.is_smooth));
        builder.insert(
            Layer::Lines,
            ElementKey::Series(dataset.name.clone()),
            SceneNode::leaf(stroke_path(line_commands(&vertices, curve), dataset)),
        );

        let markers = samples
            .iter()
            .zip(vertices.iter().copied())
            .filter_map(|(&(date, _), vertex)| vertex.map(|(px, py)| (XValue::Date(date), px, py)));
        if let Some(node) = line_markers(dataset, markers) {
            builder.insert(Layer::Markers, ElementKey::Series(dataset.name.clone()), node);
        }
    }

    value_axis(builder, ValueSide::Left, &config.left_y_axis, y, &ctx.value_ticks(y));
    let ticks = time.axis_ticks(AXIS_TICK_COUNT, axis.filter.as_ref(), DEFAULT_MIN_TICK_SPACING_PX);
    bottom_axis(
        builder,
        axis,
        ticks.into_iter().map(|tick| (XValue::Date(tick), time.map(tick))),
        None,
    );

    let normalized = normalize_datasets(config.datasets(), FillPolicy::Gap);
    let mut hover = HoverIndex::new(config.margin, ctx.series_names());
    for (index, category) in normalized.categories.iter().enumerate() {
        if let Some(date) = category.as_date() {
            hover.push(category.clone(), time.map(date), normalized.values_at(index).collect());
        }
    }
    hover
}
