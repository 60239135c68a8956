use std::collections::HashMap;

use indexmap::IndexMap;

use crate::core::curve::line_commands;
use crate::core::domain::{extent, resolve_domain};
use crate::core::normalize::normalize_datasets;
use crate::core::{Curve, Dataset, DomainPolicy, FillPolicy, LinearScale, XValue};
use crate::interaction::HoverIndex;
use crate::render::{CircleElement, Element, ElementKey, Layer, SceneNode};

use super::axes::{ValueSide, bottom_axis, value_axis};
use super::{AXIS_TICK_COUNT, SceneBuilder, SceneContext, stroke_path};

/// Marker radius used when a dataset does not set one.
const DEFAULT_MARKER_RADIUS: f64 = 3.0;

/// Scatterplot over a continuous linear x axis, with optional best-fit
/// curves from the regression collaborator.
pub(crate) fn build(ctx: &SceneContext<'_>, builder: &mut SceneBuilder) -> HoverIndex {
    let config = ctx.config;
    let axis = &config.bottom_x_axis;

    let x_domain = resolve_domain(
        axis.min,
        axis.max,
        extent(
            config
                .datasets()
                .flat_map(|dataset| dataset.values.iter().filter_map(|point| point.x.as_f64())),
        ),
        DomainPolicy::Pad(0.0),
    );
    let x = LinearScale::new(x_domain, ctx.x_range());
    let y = ctx.value_scale(
        &config.left_y_axis,
        config.datasets().flat_map(|dataset| dataset.defined_values()),
    );

    for dataset in config.datasets() {
        builder.insert(
            Layer::Markers,
            ElementKey::Series(dataset.name.clone()),
            scatter_markers(dataset, x, y),
        );

        let fitted = dataset
            .has_best_fit
            .then(|| best_fit(ctx, dataset, x, y))
            .flatten();
        if let Some(node) = fitted {
            builder.insert(Layer::BestFit, ElementKey::Series(dataset.name.clone()), node);
        }
    }

    value_axis(builder, ValueSide::Left, &config.left_y_axis, y, &ctx.value_ticks(y));
    bottom_axis(
        builder,
        axis,
        x.ticks(AXIS_TICK_COUNT)
            .into_iter()
            .map(|tick| (XValue::number(tick), x.map(tick))),
        None,
    );

    let normalized = normalize_datasets(config.datasets(), FillPolicy::Gap);
    let mut hover = HoverIndex::new(config.margin, ctx.series_names());
    for (index, category) in normalized.categories.iter().enumerate() {
        if let Some(value) = category.as_f64() {
            hover.push(category.clone(), x.map(value), normalized.values_at(index).collect());
        }
    }
    hover
}

/// One circle per defined sample. Repeated x values are told apart by
/// their occurrence count so every sample keeps a stable key.
fn scatter_markers(dataset: &Dataset, x: LinearScale, y: LinearScale) -> SceneNode {
    let radius = if dataset.radius > 0.0 {
        dataset.radius
    } else {
        DEFAULT_MARKER_RADIUS
    };

    let mut seen: HashMap<&XValue, usize> = HashMap::new();
    let mut circles = IndexMap::new();
    for point in &dataset.values {
        let (Some(px), Some(value)) = (point.x.as_f64(), point.y) else {
            continue;
        };
        let occurrence = seen.entry(&point.x).or_insert(0);
        circles.insert(
            ElementKey::Sample {
                series: dataset.name.clone(),
                x: point.x.clone(),
                occurrence: *occurrence,
            },
            SceneNode::leaf(Element::Circle(CircleElement {
                cx: x.map(px),
                cy: y.map(value),
                radius,
                fill: dataset.color,
            })),
        );
        *occurrence += 1;
    }
    SceneNode::with_children(Element::group(0.0, 0.0), circles)
}

/// Fitted curve sampled at the dataset's distinct x values, in order.
fn best_fit(ctx: &SceneContext<'_>, dataset: &Dataset, x: LinearScale, y: LinearScale) -> Option<SceneNode> {
    let pairs: Vec<(f64, f64)> = dataset
        .values
        .iter()
        .filter_map(|point| Some((point.x.as_f64()?, point.y?)))
        .collect();
    let fit = ctx.regression.best_fit(&pairs)?;

    let mut xs: Vec<f64> = pairs.iter().map(|&(px, _)| px).collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup();
    if xs.len() < 2 {
        return None;
    }

    let vertices: Vec<Option<(f64, f64)>> = xs
        .into_iter()
        .map(|value| {
            let predicted = fit.predict(value);
            predicted
                .is_finite()
                .then(|| (x.map(value), y.map(predicted)))
        })
        .collect();
    Some(SceneNode::leaf(stroke_path(
        line_commands(&vertices, Curve::Linear),
        dataset,
    )))
}
