use indexmap::IndexMap;

use crate::core::normalize::{normalize_datasets, stack, to_percent};
use crate::core::{BandScale, FillPolicy, XValue};
use crate::interaction::HoverIndex;
use crate::render::{Element, ElementKey, Layer, SceneNode};

use super::axes::{ValueSide, bottom_axis, value_axis};
use super::{ChartKind, GROUP_PADDING, SceneBuilder, SceneContext, column_rect};

/// Column, grouped column, stacked column and spark column charts.
///
/// Columns are reconciled on two levels: one group per category, then one
/// rectangle per dataset inside it.
pub(crate) fn build(ctx: &SceneContext<'_>, builder: &mut SceneBuilder) -> HoverIndex {
    let config = ctx.config;
    let normalized = normalize_datasets(config.datasets(), FillPolicy::Gap);
    let band = BandScale::new(
        normalized.categories.iter().cloned(),
        ctx.x_range(),
        config.bottom_x_axis.padding,
    );

    let stacked = (ctx.kind == ChartKind::StackedColumn).then(|| {
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

    let inner = (ctx.kind == ChartKind::GroupedColumn).then(|| {
        BandScale::new(
            config.datasets.keys().map(XValue::category),
            (0.0, band.bandwidth()),
            GROUP_PADDING,
        )
    });

    for (index, category) in normalized.categories.iter().enumerate() {
        let Some(left) = band.position(category) else {
            continue;
        };

        let mut columns = IndexMap::new();
        for (name, points) in &normalized.series {
            let Some(dataset) = ctx.dataset(name) else {
                continue;
            };
            let (x, width) = match &inner {
                Some(inner) => (
                    inner.position(&XValue::category(name)).unwrap_or(0.0),
                    inner.bandwidth(),
                ),
                None => (0.0, band.bandwidth()),
            };
            let (low, high) = match stacked
                .as_ref()
                .and_then(|stacked| stacked.series.get(name))
                .and_then(|points| points.get(index))
            {
                Some(point) => (point.y0, point.y1),
                None => (0.0, points.get(index).and_then(|point| point.y).unwrap_or(0.0)),
            };
            columns.insert(
                ElementKey::Series(name.clone()),
                SceneNode::leaf(column_rect(x, width, y.map(low), y.map(high), ctx.plot, dataset)),
            );
        }

        builder.insert(
            Layer::Columns,
            ElementKey::Category(category.clone()),
            SceneNode::with_children(Element::group(left, 0.0), columns),
        );
    }

    value_axis(builder, ValueSide::Left, &config.left_y_axis, y, &ctx.value_ticks(y));
    if !ctx.kind.is_spark() {
        bottom_axis(
            builder,
            &config.bottom_x_axis,
            normalized
                .categories
                .iter()
                .filter_map(|category| Some((category.clone(), band.center(category)?))),
            Some(band.step()),
        );
    }

    let mut hover = HoverIndex::new(config.margin, ctx.series_names());
    for (index, category) in normalized.categories.iter().enumerate() {
        if let Some(center) = band.center(category) {
            hover.push(category.clone(), center, normalized.values_at(index).collect());
        }
    }
    hover
}
