use tracing::{debug, trace, warn};

use crate::api::{ChartConfig, ChartConfigDelta, ChartState, step};
use crate::charts::ChartKind;
use crate::core::reconcile::revert;
use crate::core::{LeastSquares, PlotArea, Regression};
use crate::error::ChartResult;
use crate::interaction::{HoverInfo, PointerCallbacks, PointerState};
use crate::render::{Patch, SceneMutation, Surface};

/// Handle to one chart drawn on a [`Surface`].
///
/// The handle owns the surface for its whole lifetime. `delete` consumes the
/// handle, so a deleted chart can no longer be updated.
pub struct Chart<S: Surface> {
    surface: S,
    state: ChartState,
    regression: Box<dyn Regression>,
    callbacks: PointerCallbacks,
    pointer: PointerState,
    last_patch: Patch,
}

impl<S: Surface> Chart<S> {
    /// Mounts `surface` on the container matched by `selector` and stores the
    /// initial configuration. Nothing is drawn before the first `update`.
    ///
    /// Fails with `ContainerNotFound` when the selector matches nothing and
    /// with a config/data error when `initial` is invalid.
    pub fn create(
        kind: ChartKind,
        mut surface: S,
        selector: &str,
        initial: &ChartConfigDelta,
    ) -> ChartResult<Self> {
        let mut config = ChartConfig::for_kind(kind);
        initial.merge_into(&mut config)?;
        let viewport = surface.mount(selector)?;
        debug!(
            ?kind,
            selector,
            width = viewport.width,
            height = viewport.height,
            "create chart"
        );

        Ok(Self {
            surface,
            state: ChartState::new(kind, config, viewport),
            regression: Box::new(LeastSquares),
            callbacks: PointerCallbacks::default(),
            pointer: PointerState::default(),
            last_patch: Patch::default(),
        })
    }

    /// Replaces the best-fit collaborator used by scatterplots.
    #[must_use]
    pub fn with_regression(mut self, regression: impl Regression + 'static) -> Self {
        self.regression = Box::new(regression);
        self
    }

    /// Merges `delta`, recomputes the scene at the current container size and
    /// applies the resulting insert/update/remove mutations to the surface.
    ///
    /// An update either lands completely or not at all: the patch is
    /// validated up front, and when the surface still rejects a mutation the
    /// ones already applied are reverted before the error is returned.
    pub fn update(&mut self, delta: &ChartConfigDelta) -> ChartResult<&Patch> {
        let viewport = self.surface.container_size()?;
        let (next, patch) = step(&self.state, delta, viewport, self.regression.as_ref())?;
        patch.validate()?;

        for (applied, mutation) in patch.mutations.iter().enumerate() {
            if let Err(err) = self.surface.apply(mutation) {
                warn!(error = %err, path = ?mutation.path(), applied, "surface rejected mutation");
                self.roll_back(&patch.mutations[..applied]);
                return Err(err);
            }
        }

        self.state = next;
        self.last_patch = patch;
        Ok(&self.last_patch)
    }

    /// Parses a JSON delta and applies it like [`Chart::update`].
    pub fn update_json(&mut self, json: &str) -> ChartResult<&Patch> {
        let delta = ChartConfigDelta::from_json(json)?;
        self.update(&delta)
    }

    pub fn mouse_over(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.set_over(Box::new(callback));
    }

    pub fn mouse_out(&mut self, callback: impl FnMut() + 'static) {
        self.callbacks.set_out(Box::new(callback));
    }

    pub fn mouse_move(&mut self, callback: impl FnMut(&HoverInfo) + 'static) {
        self.callbacks.set_hover(Box::new(callback));
    }

    /// Feeds a pointer position in container coordinates.
    ///
    /// Returns the hover payload when the pointer is inside the plot area and
    /// a candidate x exists.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<HoverInfo> {
        let plot = self.plot_area();
        let plot_x = x - plot.margin.left;
        let plot_y = y - plot.margin.top;
        self.pointer.on_pointer_move(
            plot.contains(plot_x, plot_y),
            plot_x,
            plot_y,
            &self.state.scene().hover,
            &mut self.callbacks,
        )
    }

    /// Pointer left the container.
    pub fn pointer_leave(&mut self) {
        self.pointer.on_pointer_leave(&mut self.callbacks);
    }

    /// Removes every element from the surface and hands the surface back.
    pub fn delete(mut self) -> ChartResult<S> {
        trace!(kind = ?self.state.kind(), "delete chart");
        self.surface.unmount()?;
        Ok(self.surface)
    }

    #[must_use]
    pub fn kind(&self) -> ChartKind {
        self.state.kind()
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        self.state.config()
    }

    #[must_use]
    pub fn state(&self) -> &ChartState {
        &self.state
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Mutations applied by the most recent successful update.
    #[must_use]
    pub fn last_patch(&self) -> &Patch {
        &self.last_patch
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    #[must_use]
    pub fn is_pointer_inside(&self) -> bool {
        self.pointer.is_inside()
    }

    fn roll_back(&mut self, applied: &[SceneMutation]) {
        for mutation in revert(&self.state.scene().tree, applied) {
            if let Err(err) = self.surface.apply(&mutation) {
                warn!(error = %err, path = ?mutation.path(), "surface rejected rollback");
                return;
            }
        }
        debug!(reverted = applied.len(), "rolled back partial update");
    }

    fn plot_area(&self) -> PlotArea {
        PlotArea::new(self.state.viewport(), self.state.config().margin)
    }
}
