pub mod curve;
pub mod dataset;
pub mod domain;
pub mod format;
pub mod normalize;
pub mod reconcile;
pub mod regression;
pub mod scale;
pub mod time_scale;
pub mod types;

pub use curve::{AreaSample, Curve};
pub use dataset::{Dataset, SeriesAxis, SeriesType};
pub use domain::{AxisBound, DomainPolicy};
pub use format::{FormatSpec, format_value};
pub use normalize::{FillPolicy, NormalizedSet, StackedPoint, StackedSet};
pub use reconcile::{KeyedDiff, Mutation, diff};
pub use regression::{Fit, FitModel, LeastSquares, Regression};
pub use scale::{BandScale, LinearScale, PointScale};
pub use time_scale::{TickFilter, TimeScale};
pub use types::{Margin, PlotArea, Point, Viewport, XValue};
