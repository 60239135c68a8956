mod element;
mod primitives;
mod recording_surface;
mod svg;

pub use element::{
    CircleElement, ClipRect, Element, GroupElement, LineElement, PathCommand, PathElement,
    RectElement, TextElement,
};
pub use primitives::{Color, TextHAlign};
pub use recording_surface::RecordingSurface;
pub use svg::render_svg;

use serde::{Deserialize, Serialize};

use crate::core::reconcile::{BoundNode, BoundTree, Mutation, NodePath};
use crate::core::{Viewport, XValue};
use crate::error::ChartResult;

/// Top-level drawing layers, in paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    LeftAxis,
    RightAxis,
    BottomAxis,
    Areas,
    Columns,
    Lines,
    Markers,
    BestFit,
    Overlay,
}

impl Layer {
    pub const ALL: [Self; 9] = [
        Self::LeftAxis,
        Self::RightAxis,
        Self::BottomAxis,
        Self::Areas,
        Self::Columns,
        Self::Lines,
        Self::Markers,
        Self::BestFit,
        Self::Overlay,
    ];

    /// Series layers are clipped to the plot area.
    #[must_use]
    pub fn is_clipped(self) -> bool {
        matches!(
            self,
            Self::Areas | Self::Columns | Self::Lines | Self::Markers | Self::BestFit
        )
    }
}

/// Stable identity of a scene node among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKey {
    Layer(Layer),
    /// One x category (column groups).
    Category(XValue),
    /// One dataset (paths, rects inside a category group).
    Series(String),
    /// One sample of one dataset. `occurrence` separates repeated x values.
    Sample {
        series: String,
        x: XValue,
        occurrence: usize,
    },
    /// One axis tick, keyed by its value.
    Tick(XValue),
    Gridline,
    Label,
    Overlay,
}

pub type SceneNode = BoundNode<ElementKey, Element>;
pub type SceneTree = BoundTree<ElementKey, Element>;
pub type ElementPath = NodePath<ElementKey>;
pub type SceneMutation = Mutation<ElementKey, Element>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Insert,
    Update,
    Remove,
}

/// Ordered list of mutations produced by one update cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Patch {
    pub mutations: Vec<SceneMutation>,
}

impl Patch {
    #[must_use]
    pub fn new(mutations: Vec<SceneMutation>) -> Self {
        Self { mutations }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Counts mutations of `kind` below the root node of `layer`.
    #[must_use]
    pub fn count(&self, layer: Layer, kind: MutationKind) -> usize {
        self.mutations
            .iter()
            .filter(|mutation| mutation_kind(mutation) == kind)
            .filter(|mutation| {
                let path = mutation.path();
                path.len() > 1 && path[0] == ElementKey::Layer(layer)
            })
            .count()
    }

    /// Checks every inserted or updated element before anything is applied.
    pub fn validate(&self) -> ChartResult<()> {
        self.mutations.iter().try_for_each(|mutation| match mutation {
            Mutation::Insert { element, .. } | Mutation::Update { element, .. } => element.validate(),
            Mutation::Remove { .. } => Ok(()),
        })
    }

    /// Counts mutations of `kind` anywhere in the scene.
    #[must_use]
    pub fn total(&self, kind: MutationKind) -> usize {
        self.mutations
            .iter()
            .filter(|mutation| mutation_kind(mutation) == kind)
            .count()
    }
}

fn mutation_kind(mutation: &SceneMutation) -> MutationKind {
    match mutation {
        Mutation::Insert { .. } => MutationKind::Insert,
        Mutation::Update { .. } => MutationKind::Update,
        Mutation::Remove { .. } => MutationKind::Remove,
    }
}

/// Contract implemented by any drawing backend.
///
/// A surface owns a retained element tree. The chart never redraws from
/// scratch: it sends keyed insert/update/remove mutations, in order.
pub trait Surface {
    /// Attaches to the container matched by `selector` and returns its size.
    fn mount(&mut self, selector: &str) -> ChartResult<Viewport>;

    /// Current size of the mounted container.
    fn container_size(&self) -> ChartResult<Viewport>;

    fn apply(&mut self, mutation: &SceneMutation) -> ChartResult<()>;

    /// Releases every element created by the chart.
    fn unmount(&mut self) -> ChartResult<()>;
}
