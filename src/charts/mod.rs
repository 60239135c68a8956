//! Chart kinds.
//!
//! Every kind turns a resolved [`ChartConfig`] plus the container size into
//! a keyed [`Scene`]: the element tree to reconcile against what is drawn and
//! the hover candidates for pointer tracking. Scene building is pure.

mod axes;
mod column;
mod line;
mod line_column;
mod scatterplot;
mod time_line;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::ChartConfig;
use crate::api::config::AxisConfig;
use crate::core::domain::{extent, resolve_domain};
use crate::core::{
    Dataset, DomainPolicy, LinearScale, Margin, PlotArea, Regression, Viewport, XValue,
};
use crate::interaction::HoverIndex;
use crate::render::{
    CircleElement, ClipRect, Color, Element, ElementKey, GroupElement, Layer, PathCommand,
    PathElement, RectElement, SceneNode, SceneTree,
};

/// Tick count requested from continuous axes.
const AXIS_TICK_COUNT: usize = 10;
/// Auto padding of spark value domains, as a fraction of the data span.
const SPARK_DOMAIN_PADDING: f64 = 0.25;
/// Fixed gridline positions of spark charts, as fractions of the domain.
const SPARK_GRIDLINE_FRACTIONS: [f64; 3] = [0.25, 0.5, 0.75];
/// Padding between the columns of one category.
const GROUP_PADDING: f64 = 0.05;
const AREA_FILL_OPACITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Column,
    GroupedColumn,
    StackedColumn,
    Line,
    Area,
    StackedArea,
    LineColumn,
    TimeLine,
    SparkLine,
    SparkColumn,
    Scatterplot,
}

impl ChartKind {
    #[must_use]
    pub fn is_spark(self) -> bool {
        matches!(self, Self::SparkLine | Self::SparkColumn)
    }

    #[must_use]
    pub fn is_stacked(self) -> bool {
        matches!(self, Self::StackedColumn | Self::StackedArea)
    }

    /// How `auto` value-axis bounds are derived.
    #[must_use]
    pub fn value_domain_policy(self) -> DomainPolicy {
        if self.is_spark() {
            DomainPolicy::Pad(SPARK_DOMAIN_PADDING)
        } else {
            DomainPolicy::IncludeZero
        }
    }
}

/// Output of one scene build.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub tree: SceneTree,
    pub hover: HoverIndex,
}

/// Builds the full scene of `kind` for the given configuration and size.
#[must_use]
pub fn build_scene(
    kind: ChartKind,
    config: &ChartConfig,
    viewport: Viewport,
    regression: &dyn Regression,
) -> Scene {
    let ctx = SceneContext {
        kind,
        config,
        plot: PlotArea::new(viewport, config.margin),
        regression,
    };
    let mut builder = SceneBuilder::new(ctx.plot);

    let hover = match kind {
        ChartKind::Column
        | ChartKind::GroupedColumn
        | ChartKind::StackedColumn
        | ChartKind::SparkColumn => column::build(&ctx, &mut builder),
        ChartKind::Line | ChartKind::Area | ChartKind::StackedArea | ChartKind::SparkLine => {
            line::build(&ctx, &mut builder)
        }
        ChartKind::LineColumn => line_column::build(&ctx, &mut builder),
        ChartKind::TimeLine => time_line::build(&ctx, &mut builder),
        ChartKind::Scatterplot => scatterplot::build(&ctx, &mut builder),
    };

    let tree = builder.finish();
    debug!(
        ?kind,
        datasets = config.datasets.len(),
        hover_candidates = hover.positions().len(),
        elements = tree.values().map(SceneNode::node_count).sum::<usize>(),
        "built scene"
    );
    Scene { tree, hover }
}

pub(crate) struct SceneContext<'a> {
    pub kind: ChartKind,
    pub config: &'a ChartConfig,
    pub plot: PlotArea,
    pub regression: &'a dyn Regression,
}

impl SceneContext<'_> {
    /// Value scale of one y axis over `values`, pixel range bottom to top.
    pub fn value_scale(&self, axis: &AxisConfig, values: impl IntoIterator<Item = f64>) -> LinearScale {
        let domain = resolve_domain(
            axis.min,
            axis.max,
            extent(values),
            self.kind.value_domain_policy(),
        );
        LinearScale::new(domain, (self.plot.height, 0.0))
    }

    /// Tick values of a value axis: three fixed gridlines on spark kinds.
    pub fn value_ticks(&self, scale: LinearScale) -> Vec<f64> {
        if self.kind.is_spark() {
            SPARK_GRIDLINE_FRACTIONS
                .iter()
                .map(|&fraction| scale.value_at_fraction(fraction))
                .collect()
        } else {
            scale.ticks(AXIS_TICK_COUNT)
        }
    }

    pub fn x_range(&self) -> (f64, f64) {
        self.config.bottom_x_axis.range(self.plot.width)
    }

    pub fn series_names(&self) -> Vec<String> {
        self.config.datasets.keys().cloned().collect()
    }

    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.config.datasets.get(name)
    }
}

/// Collects keyed nodes per layer and wraps them into layer groups.
pub(crate) struct SceneBuilder {
    plot: PlotArea,
    layers: IndexMap<Layer, IndexMap<ElementKey, SceneNode>>,
}

impl SceneBuilder {
    fn new(plot: PlotArea) -> Self {
        Self {
            plot,
            layers: Layer::ALL
                .into_iter()
                .map(|layer| (layer, IndexMap::new()))
                .collect(),
        }
    }

    /// Binds `node` under `key`; a later node with the same key wins.
    pub fn insert(&mut self, layer: Layer, key: ElementKey, node: SceneNode) {
        self.layers.entry(layer).or_default().insert(key, node);
    }

    fn finish(mut self) -> SceneTree {
        let PlotArea {
            margin,
            width,
            height,
        } = self.plot;
        self.insert(
            Layer::Overlay,
            ElementKey::Overlay,
            SceneNode::leaf(Element::Rect(RectElement {
                x: 0.0,
                y: 0.0,
                width,
                height,
                fill: Color::TRANSPARENT,
                corner_radius: 0.0,
            })),
        );

        self.layers
            .into_iter()
            .map(|(layer, children)| {
                let group = layer_group(layer, margin, width, height);
                (
                    ElementKey::Layer(layer),
                    SceneNode::with_children(group, children),
                )
            })
            .collect()
    }
}

fn layer_group(layer: Layer, margin: Margin, width: f64, height: f64) -> Element {
    let (translate_x, translate_y) = match layer {
        Layer::RightAxis => (margin.left + width, margin.top),
        Layer::BottomAxis => (margin.left, margin.top + height),
        _ => (margin.left, margin.top),
    };
    Element::Group(GroupElement {
        translate_x,
        translate_y,
        clip: layer.is_clipped().then_some(ClipRect { width, height }),
    })
}

/// Rectangle spanning two value pixels; clamped to the plot height.
pub(crate) fn column_rect(x: f64, width: f64, y_a: f64, y_b: f64, plot: PlotArea, dataset: &Dataset) -> Element {
    let top = y_a.min(y_b).clamp(0.0, plot.height);
    let bottom = y_a.max(y_b).clamp(0.0, plot.height);
    Element::Rect(RectElement {
        x,
        y: top,
        width: width.max(0.0),
        height: bottom - top,
        fill: dataset.color,
        corner_radius: dataset.border_radius,
    })
}

pub(crate) fn stroke_path(commands: Vec<PathCommand>, dataset: &Dataset) -> Element {
    Element::Path(PathElement {
        commands,
        stroke: Some(dataset.color),
        fill: None,
        stroke_width: dataset.line_width,
    })
}

pub(crate) fn fill_path(commands: Vec<PathCommand>, dataset: &Dataset) -> Element {
    Element::Path(PathElement {
        commands,
        stroke: None,
        fill: Some(Color {
            alpha: dataset.color.alpha * AREA_FILL_OPACITY,
            ..dataset.color
        }),
        stroke_width: 0.0,
    })
}

/// Circle markers of one dataset keyed by x, grouped under the series key.
///
/// Returns `None` when the dataset has no marker radius.
pub(crate) fn line_markers(
    dataset: &Dataset,
    points: impl IntoIterator<Item = (XValue, f64, f64)>,
) -> Option<SceneNode> {
    if dataset.radius <= 0.0 {
        return None;
    }
    let children = points
        .into_iter()
        .map(|(x, cx, cy)| {
            (
                ElementKey::Category(x),
                SceneNode::leaf(Element::Circle(CircleElement {
                    cx,
                    cy,
                    radius: dataset.radius,
                    fill: dataset.color,
                })),
            )
        })
        .collect();
    Some(SceneNode::with_children(Element::group(0.0, 0.0), children))
}
