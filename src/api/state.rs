use tracing::debug;

use crate::api::{ChartConfig, ChartConfigDelta};
use crate::charts::{ChartKind, Scene, build_scene};
use crate::core::reconcile::reconcile_tree;
use crate::core::{Regression, Viewport};
use crate::error::ChartResult;
use crate::render::{MutationKind, Patch};

/// Everything one chart instance knows between two updates.
#[derive(Debug, Clone)]
pub struct ChartState {
    kind: ChartKind,
    config: ChartConfig,
    viewport: Viewport,
    scene: Scene,
    initialized: bool,
}

impl ChartState {
    /// Uninitialized state: configuration resolved, nothing drawn yet.
    #[must_use]
    pub fn new(kind: ChartKind, config: ChartConfig, viewport: Viewport) -> Self {
        Self {
            kind,
            config,
            viewport,
            scene: Scene::default(),
            initialized: false,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// `true` once at least one update has been applied.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Pure update: merges `delta`, rebuilds the scene for `viewport` and
/// reconciles it against the previous one.
///
/// Returns the next state plus the ordered mutations that turn the previous
/// scene into the new one. An invalid delta fails before anything is
/// recomputed and `prev` stays usable.
pub fn step(
    prev: &ChartState,
    delta: &ChartConfigDelta,
    viewport: Viewport,
    regression: &dyn Regression,
) -> ChartResult<(ChartState, Patch)> {
    let mut config = prev.config.clone();
    delta.merge_into(&mut config)?;

    let scene = build_scene(prev.kind, &config, viewport, regression);
    let patch = Patch::new(reconcile_tree(&prev.scene.tree, &scene.tree));
    debug!(
        kind = ?prev.kind,
        width = viewport.width,
        height = viewport.height,
        inserted = patch.total(MutationKind::Insert),
        updated = patch.total(MutationKind::Update),
        removed = patch.total(MutationKind::Remove),
        "chart step"
    );

    Ok((
        ChartState {
            kind: prev.kind,
            config,
            viewport,
            scene,
            initialized: true,
        },
        patch,
    ))
}
