use indexmap::IndexMap;

use crate::api::config::{AxisConfig, GridlinePosition, XAxisConfig};
use crate::core::format::{format_tick, format_value};
use crate::core::{LinearScale, XValue};
use crate::render::{Color, Element, ElementKey, Layer, LineElement, SceneNode, TextElement, TextHAlign};

use super::SceneBuilder;

const LABEL_FONT_SIZE_PX: f64 = 11.0;
const LABEL_OFFSET_PX: f64 = 6.0;
const GRIDLINE_WIDTH_PX: f64 = 1.0;

/// Which side of the plot a value axis sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueSide {
    Left,
    Right,
}

/// Draws a value axis. Ticks are keyed by value; each tick carries an
/// optional gridline across the plot and an optional label.
pub(crate) fn value_axis(
    builder: &mut SceneBuilder,
    side: ValueSide,
    axis: &AxisConfig,
    scale: LinearScale,
    ticks: &[f64],
) {
    let width = builder.plot.width;
    let (layer, grid_from, grid_to, label_x, h_align) = match side {
        ValueSide::Left => (Layer::LeftAxis, 0.0, width, -LABEL_OFFSET_PX, TextHAlign::Right),
        ValueSide::Right => (Layer::RightAxis, -width, 0.0, LABEL_OFFSET_PX, TextHAlign::Left),
    };

    for &value in ticks {
        let mut children = IndexMap::new();
        if !axis.gridlines.hidden {
            children.insert(
                ElementKey::Gridline,
                gridline(grid_from, 0.0, grid_to, 0.0),
            );
        }
        if let Some(text) = format_tick(value, &axis.format) {
            children.insert(
                ElementKey::Label,
                label(label_x, LABEL_FONT_SIZE_PX * 0.32, text, h_align),
            );
        }
        builder.insert(
            layer,
            ElementKey::Tick(XValue::number(value)),
            SceneNode::with_children(Element::group(0.0, scale.map(value)), children),
        );
    }
}

/// Draws the bottom axis from `(value, x)` pairs in plot coordinates.
///
/// `band_step` is the distance between neighbouring bands on band axes; it
/// positions `between` gridlines. Continuous axes pass `None`.
pub(crate) fn bottom_axis(
    builder: &mut SceneBuilder,
    axis: &XAxisConfig,
    ticks: impl IntoIterator<Item = (XValue, f64)>,
    band_step: Option<f64>,
) {
    let height = builder.plot.height;
    let grid_x = match (axis.gridlines.position, band_step) {
        (GridlinePosition::Between, Some(step)) => -step * 0.5,
        _ => 0.0,
    };

    for (value, x) in ticks {
        let mut children = IndexMap::new();
        if !axis.gridlines.hidden {
            children.insert(ElementKey::Gridline, gridline(grid_x, 0.0, grid_x, -height));
        }
        if let Some(text) = format_value(&value, &axis.format) {
            children.insert(
                ElementKey::Label,
                label(0.0, LABEL_FONT_SIZE_PX + LABEL_OFFSET_PX, text, TextHAlign::Center),
            );
        }
        builder.insert(
            Layer::BottomAxis,
            ElementKey::Tick(value),
            SceneNode::with_children(Element::group(x, 0.0), children),
        );
    }
}

fn gridline(x1: f64, y1: f64, x2: f64, y2: f64) -> SceneNode {
    SceneNode::leaf(Element::Line(LineElement {
        x1,
        y1,
        x2,
        y2,
        stroke: Color::GRIDLINE,
        stroke_width: GRIDLINE_WIDTH_PX,
    }))
}

fn label(x: f64, y: f64, text: String, h_align: TextHAlign) -> SceneNode {
    SceneNode::leaf(Element::Text(TextElement {
        x,
        y,
        text,
        h_align,
        font_size_px: LABEL_FONT_SIZE_PX,
        color: Color::AXIS,
    }))
}
