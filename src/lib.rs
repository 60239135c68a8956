//! chart-delta: declarative charts with incremental, keyed updates.
//!
//! A [`Chart`] stores a typed configuration, merges partial deltas into it and
//! redraws by reconciliation: every visual element carries a stable key, so an
//! update inserts entering elements, mutates persisting ones in place and
//! removes exiting ones instead of redrawing from scratch. Drawing goes
//! through the [`render::Surface`] trait; [`render::RecordingSurface`] is the
//! headless implementation.

pub mod api;
pub mod charts;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{Chart, ChartConfig, ChartConfigDelta, DatasetDelta};
pub use charts::ChartKind;
pub use error::{ChartError, ChartResult};
