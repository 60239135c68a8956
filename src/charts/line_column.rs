use indexmap::IndexMap;

use crate::core::curve::line_commands;
use crate::core::normalize::normalize_datasets;
use crate::core::{BandScale, Curve, FillPolicy, LinearScale, SeriesAxis, SeriesType, XValue};
use crate::interaction::HoverIndex;
use crate::render::{Element, ElementKey, Layer, SceneNode};

use super::axes::{ValueSide, bottom_axis, value_axis};
use super::{GROUP_PADDING, SceneBuilder, SceneContext, column_rect, line_markers, stroke_path};

/// Right-axis tick values aligned with the left-axis ticks.
///
/// Each left tick's fraction of the left domain is mapped onto the right
/// domain, so both axes share the same gridline rows.
#[must_use]
pub(crate) fn aligned_ticks(left: LinearScale, right: LinearScale, left_ticks: &[f64]) -> Vec<f64> {
    left_ticks
        .iter()
        .map(|&tick| right.value_at_fraction(left.fraction(tick)))
        .collect()
}

/// Combination chart: columns and lines over one band x axis, each dataset
/// plotted against the left or right value axis.
pub(crate) fn build(ctx: &SceneContext<'_>, builder: &mut SceneBuilder) -> HoverIndex {
    let config = ctx.config;
    let normalized = normalize_datasets(config.datasets(), FillPolicy::Gap);
    let band = BandScale::new(
        normalized.categories.iter().cloned(),
        ctx.x_range(),
        config.bottom_x_axis.padding,
    );

    let on_axis = |axis: SeriesAxis| {
        config
            .datasets()
            .filter(move |dataset| dataset.axis == axis)
    };
    let has_left = on_axis(SeriesAxis::Left).next().is_some();
    let has_right = on_axis(SeriesAxis::Right).next().is_some();
    let left = ctx.value_scale(
        &config.left_y_axis,
        on_axis(SeriesAxis::Left).flat_map(|dataset| dataset.defined_values()),
    );
    let right = ctx.value_scale(
        &config.right_y_axis,
        on_axis(SeriesAxis::Right).flat_map(|dataset| dataset.defined_values()),
    );
    let scale_for = |axis: SeriesAxis| match axis {
        SeriesAxis::Left => left,
        SeriesAxis::Right => right,
    };

    let inner = BandScale::new(
        config
            .datasets()
            .filter(|dataset| dataset.series_type == SeriesType::Column)
            .map(|dataset| XValue::category(&dataset.name)),
        (0.0, band.bandwidth()),
        GROUP_PADDING,
    );

    for (index, category) in normalized.categories.iter().enumerate() {
        let Some(band_left) = band.position(category) else {
            continue;
        };
        let mut columns = IndexMap::new();
        for (name, points) in &normalized.series {
            let Some(dataset) = ctx.dataset(name) else {
                continue;
            };
            if dataset.series_type != SeriesType::Column {
                continue;
            }
            let y = scale_for(dataset.axis);
            let value = points.get(index).and_then(|point| point.y).unwrap_or(0.0);
            let x = inner.position(&XValue::category(name)).unwrap_or(0.0);
            columns.insert(
                ElementKey::Series(name.clone()),
                SceneNode::leaf(column_rect(
                    x,
                    inner.bandwidth(),
                    y.map(0.0),
                    y.map(value),
                    ctx.plot,
                    dataset,
                )),
            );
        }
        if !columns.is_empty() {
            builder.insert(
                Layer::Columns,
                ElementKey::Category(category.clone()),
                SceneNode::with_children(Element::group(band_left, 0.0), columns),
            );
        }
    }

    for (name, points) in &normalized.series {
        let Some(dataset) = ctx.dataset(name) else {
            continue;
        };
        if dataset.series_type != SeriesType::Line {
            continue;
        }
        let y = scale_for(dataset.axis);
        let vertices: Vec<Option<(f64, f64)>> = points
            .iter()
            .map(|point| Some((band.center(&point.x)?, y.map(point.y?))))
            .collect();
        let curve = Curve::from_smooth(dataset.smooth(config.is_smooth));
        builder.insert(
            Layer::Lines,
            ElementKey::Series(name.clone()),
            SceneNode::leaf(stroke_path(line_commands(&vertices, curve), dataset)),
        );

        let markers = points
            .iter()
            .zip(vertices.iter().copied())
            .filter_map(|(point, vertex)| vertex.map(|(px, py)| (point.x.clone(), px, py)));
        if let Some(node) = line_markers(dataset, markers) {
            builder.insert(Layer::Markers, ElementKey::Series(name.clone()), node);
        }
    }

    let left_ticks = ctx.value_ticks(left);
    if has_left || !has_right {
        value_axis(builder, ValueSide::Left, &config.left_y_axis, left, &left_ticks);
    }
    if has_right {
        let right_ticks = if has_left {
            aligned_ticks(left, right, &left_ticks)
        } else {
            ctx.value_ticks(right)
        };
        value_axis(builder, ValueSide::Right, &config.right_y_axis, right, &right_ticks);
    }
    bottom_axis(
        builder,
        &config.bottom_x_axis,
        normalized
            .categories
            .iter()
            .filter_map(|category| Some((category.clone(), band.center(category)?))),
        Some(band.step()),
    );

    let mut hover = HoverIndex::new(config.margin, ctx.series_names());
    for (index, category) in normalized.categories.iter().enumerate() {
        if let Some(center) = band.center(category) {
            hover.push(category.clone(), center, normalized.values_at(index).collect());
        }
    }
    hover
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::aligned_ticks;
    use crate::core::LinearScale;

    #[test]
    fn right_ticks_share_left_fractions() {
        let left = LinearScale::new((0.0, 100.0), (200.0, 0.0));
        let right = LinearScale::new((0.0, 2000.0), (200.0, 0.0));
        let ticks = aligned_ticks(left, right, &[0.0, 50.0, 100.0]);
        assert_eq!(ticks, vec![0.0, 1000.0, 2000.0]);
        for (l, r) in [0.0, 50.0, 100.0].iter().zip(&ticks) {
            assert_relative_eq!(left.map(*l), right.map(*r));
        }
    }
}
