use crate::core::curve::{area_commands, line_commands};
use crate::core::normalize::{normalize_datasets, stack, to_percent};
use crate::core::{AreaSample, Curve, FillPolicy, PointScale};
use crate::interaction::HoverIndex;
use crate::render::{ElementKey, Layer, SceneNode};

use super::axes::{ValueSide, bottom_axis, value_axis};
use super::{ChartKind, SceneBuilder, SceneContext, fill_path, line_markers, stroke_path};

/// Line, area, stacked area and spark line charts over a point x scale.
pub(crate) fn build(ctx: &SceneContext<'_>, builder: &mut SceneBuilder) -> HoverIndex {
    let config = ctx.config;
    let stacked_kind = ctx.kind == ChartKind::StackedArea;
    let filled = matches!(ctx.kind, ChartKind::Area | ChartKind::StackedArea);

    let fill = if stacked_kind {
        FillPolicy::ZeroAbsent
    } else {
        FillPolicy::Gap
    };
    let normalized = normalize_datasets(config.datasets(), fill);
    let x = PointScale::new(normalized.categories.iter().cloned(), ctx.x_range(), 0.0);
    let xs: Vec<f64> = normalized
        .categories
        .iter()
        .map(|category| x.position(category).unwrap_or(0.0))
        .collect();

    let stacked = stacked_kind.then(|| {
        let stacked = stack(&normalized);
        if config.is_percent {
            to_percent(&stacked)
        } else {
            stacked
        }
    });

    let y = match &stacked {
        Some(stacked) => ctx.value_scale(
            &config.left_y_axis,
            stacked
                .series
                .values()
                .flatten()
                .flat_map(|point| [point.y0, point.y1]),
        ),
        None => ctx.value_scale(
            &config.left_y_axis,
            normalized.series.values().flatten().filter_map(|point| point.y),
        ),
    };
    let baseline = y.map(0.0).clamp(0.0, ctx.plot.height);

    for (name, points) in &normalized.series {
        let Some(dataset) = ctx.dataset(name) else {
            continue;
        };
        let curve = Curve::from_smooth(dataset.smooth(config.is_smooth));

        // (top, base) value pixels per category; `None` breaks the path.
        let extents: Vec<Option<(f64, f64)>> = match stacked.as_ref().and_then(|s| s.series.get(name)) {
            Some(stacked_points) => stacked_points
                .iter()
                .map(|point| point.y.map(|_| (y.map(point.y1), y.map(point.y0))))
                .collect(),
            None => points
                .iter()
                .map(|point| point.y.map(|value| (y.map(value), baseline)))
                .collect(),
        };

        let line: Vec<Option<(f64, f64)>> = extents
            .iter()
            .zip(&xs)
            .map(|(extent, &px)| extent.map(|(top, _)| (px, top)))
            .collect();
        builder.insert(
            Layer::Lines,
            ElementKey::Series(name.clone()),
            SceneNode::leaf(stroke_path(line_commands(&line, curve), dataset)),
        );

        if filled {
            let area: Vec<Option<AreaSample>> = extents
                .iter()
                .zip(&xs)
                .map(|(extent, &px)| extent.map(|(top, base)| AreaSample { x: px, top, base }))
                .collect();
            builder.insert(
                Layer::Areas,
                ElementKey::Series(name.clone()),
                SceneNode::leaf(fill_path(area_commands(&area, curve), dataset)),
            );
        }

        let markers = normalized
            .categories
            .iter()
            .zip(line.iter().copied())
            .filter_map(|(category, vertex)| vertex.map(|(px, py)| (category.clone(), px, py)));
        if let Some(node) = line_markers(dataset, markers) {
            builder.insert(Layer::Markers, ElementKey::Series(name.clone()), node);
        }
    }

    value_axis(builder, ValueSide::Left, &config.left_y_axis, y, &ctx.value_ticks(y));
    if !ctx.kind.is_spark() {
        bottom_axis(
            builder,
            &config.bottom_x_axis,
            normalized.categories.iter().cloned().zip(xs.iter().copied()),
            None,
        );
    }

    let mut hover = HoverIndex::new(config.margin, ctx.series_names());
    for (index, category) in normalized.categories.iter().enumerate() {
        hover.push(category.clone(), xs[index], normalized.values_at(index).collect());
    }
    hover
}
