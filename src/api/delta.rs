//! Typed partial configuration updates.
//!
//! Every field is optional; merging a delta overwrites exactly the fields it
//! carries and leaves everything else as it was. The JSON form uses the
//! camelCase keys of the configuration schema and rejects unknown keys.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::api::config::{AxisConfig, ChartConfig, GridlinePosition, Gridlines, XAxisConfig};
use crate::core::{AxisBound, Dataset, FormatSpec, Margin, Point, SeriesAxis, SeriesType, TickFilter};
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarginDelta {
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct FormatDelta {
    pub string: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub is_date: Option<bool>,
}

impl From<FormatSpec> for FormatDelta {
    fn from(spec: FormatSpec) -> Self {
        Self {
            string: Some(spec.string),
            prefix: Some(spec.prefix),
            suffix: Some(spec.suffix),
            is_date: Some(spec.is_date),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridlinesDelta {
    pub hidden: Option<bool>,
    pub position: Option<GridlinePosition>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AxisDelta {
    pub min: Option<AxisBound>,
    pub max: Option<AxisBound>,
    pub format: Option<FormatDelta>,
    pub gridlines: Option<GridlinesDelta>,
}

impl AxisDelta {
    #[must_use]
    pub fn with_min(mut self, min: impl Into<AxisBound>) -> Self {
        self.min = Some(min.into());
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: impl Into<AxisBound>) -> Self {
        self.max = Some(max.into());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: FormatSpec) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use]
    pub fn with_gridlines_hidden(mut self, hidden: bool) -> Self {
        self.gridlines.get_or_insert_with(GridlinesDelta::default).hidden = Some(hidden);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct XAxisMarginDelta {
    pub left: Option<f64>,
    pub right: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct XAxisDelta {
    pub padding: Option<f64>,
    pub min: Option<AxisBound>,
    pub max: Option<AxisBound>,
    pub format: Option<FormatDelta>,
    pub margin: Option<XAxisMarginDelta>,
    /// `Some(None)` clears a previously set filter.
    #[serde(skip)]
    pub filter: Option<Option<TickFilter>>,
    pub gridlines: Option<GridlinesDelta>,
}

impl XAxisDelta {
    #[must_use]
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = Some(padding);
        self
    }

    #[must_use]
    pub fn with_min(mut self, min: impl Into<AxisBound>) -> Self {
        self.min = Some(min.into());
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: impl Into<AxisBound>) -> Self {
        self.max = Some(max.into());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: FormatSpec) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: TickFilter) -> Self {
        self.filter = Some(Some(filter));
        self
    }

    #[must_use]
    pub fn without_filter(mut self) -> Self {
        self.filter = Some(None);
        self
    }

    #[must_use]
    pub fn with_gridlines(mut self, hidden: bool, position: GridlinePosition) -> Self {
        self.gridlines = Some(GridlinesDelta {
            hidden: Some(hidden),
            position: Some(position),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct DatasetDelta {
    pub values: Option<Vec<Point>>,
    pub color: Option<Color>,
    pub radius: Option<f64>,
    pub border_radius: Option<f64>,
    pub line_width: Option<f64>,
    pub has_best_fit: Option<bool>,
    pub is_smooth: Option<bool>,
    pub axis: Option<SeriesAxis>,
    #[serde(rename = "type")]
    pub series_type: Option<SeriesType>,
}

impl DatasetDelta {
    #[must_use]
    pub fn values(values: Vec<Point>) -> Self {
        Self {
            values: Some(values),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    #[must_use]
    pub fn with_border_radius(mut self, border_radius: f64) -> Self {
        self.border_radius = Some(border_radius);
        self
    }

    #[must_use]
    pub fn with_line_width(mut self, line_width: f64) -> Self {
        self.line_width = Some(line_width);
        self
    }

    #[must_use]
    pub fn with_best_fit(mut self, has_best_fit: bool) -> Self {
        self.has_best_fit = Some(has_best_fit);
        self
    }

    #[must_use]
    pub fn with_smooth(mut self, is_smooth: bool) -> Self {
        self.is_smooth = Some(is_smooth);
        self
    }

    #[must_use]
    pub fn with_axis(mut self, axis: SeriesAxis) -> Self {
        self.axis = Some(axis);
        self
    }

    #[must_use]
    pub fn with_type(mut self, series_type: SeriesType) -> Self {
        self.series_type = Some(series_type);
        self
    }
}

/// Partial update of a [`ChartConfig`].
///
/// In `datasets`, a `None` value (`null` in JSON) deletes the dataset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ChartConfigDelta {
    pub margin: Option<MarginDelta>,
    pub datasets: Option<IndexMap<String, Option<DatasetDelta>>>,
    pub is_smooth: Option<bool>,
    pub is_percent: Option<bool>,
    pub left_y_axis: Option<AxisDelta>,
    pub right_y_axis: Option<AxisDelta>,
    pub bottom_x_axis: Option<XAxisDelta>,
}

impl ChartConfigDelta {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> ChartResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = Some(MarginDelta {
            top: Some(margin.top),
            right: Some(margin.right),
            bottom: Some(margin.bottom),
            left: Some(margin.left),
        });
        self
    }

    #[must_use]
    pub fn with_dataset(mut self, name: impl Into<String>, dataset: DatasetDelta) -> Self {
        self.datasets
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), Some(dataset));
        self
    }

    #[must_use]
    pub fn remove_dataset(mut self, name: impl Into<String>) -> Self {
        self.datasets
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), None);
        self
    }

    #[must_use]
    pub fn with_smooth(mut self, is_smooth: bool) -> Self {
        self.is_smooth = Some(is_smooth);
        self
    }

    #[must_use]
    pub fn with_percent(mut self, is_percent: bool) -> Self {
        self.is_percent = Some(is_percent);
        self
    }

    #[must_use]
    pub fn with_left_y_axis(mut self, axis: AxisDelta) -> Self {
        self.left_y_axis = Some(axis);
        self
    }

    #[must_use]
    pub fn with_right_y_axis(mut self, axis: AxisDelta) -> Self {
        self.right_y_axis = Some(axis);
        self
    }

    #[must_use]
    pub fn with_bottom_x_axis(mut self, axis: XAxisDelta) -> Self {
        self.bottom_x_axis = Some(axis);
        self
    }

    /// Checks the delta without touching any configuration.
    pub fn validate(&self) -> ChartResult<()> {
        if let Some(margin) = &self.margin {
            for (side, value) in [
                ("top", margin.top),
                ("right", margin.right),
                ("bottom", margin.bottom),
                ("left", margin.left),
            ] {
                non_negative(value, || format!("margin.{side}"))?;
            }
        }

        if let Some(datasets) = &self.datasets {
            for (name, dataset) in datasets {
                if name.is_empty() {
                    return Err(ChartError::InvalidData(
                        "dataset name must not be empty".to_owned(),
                    ));
                }
                if let Some(dataset) = dataset {
                    validate_dataset(name, dataset)?;
                }
            }
        }

        for (axis, delta) in [("leftYAxis", &self.left_y_axis), ("rightYAxis", &self.right_y_axis)] {
            if let Some(delta) = delta {
                validate_bounds(axis, delta.min, delta.max)?;
            }
        }

        if let Some(axis) = &self.bottom_x_axis {
            if let Some(padding) = axis.padding.filter(|padding| !(0.0..1.0).contains(padding)) {
                return Err(ChartError::InvalidConfig(format!(
                    "bottomXAxis.padding must be within [0, 1), got {padding}"
                )));
            }
            if let Some(margin) = axis.margin {
                non_negative(margin.left, || "bottomXAxis.margin.left".to_owned())?;
                non_negative(margin.right, || "bottomXAxis.margin.right".to_owned())?;
            }
            validate_bounds("bottomXAxis", axis.min, axis.max)?;
        }

        Ok(())
    }

    /// Validates, then merges into `config`. On error `config` is unchanged.
    pub fn merge_into(&self, config: &mut ChartConfig) -> ChartResult<()> {
        self.validate()?;

        if let Some(margin) = &self.margin {
            merge_margin(&mut config.margin, margin);
        }
        if let Some(datasets) = &self.datasets {
            for (name, dataset) in datasets {
                match dataset {
                    None => {
                        config.datasets.shift_remove(name);
                    }
                    Some(delta) => {
                        let index = config
                            .datasets
                            .get_index_of(name)
                            .unwrap_or(config.datasets.len());
                        let target = config
                            .datasets
                            .entry(name.clone())
                            .or_insert_with(|| Dataset::new(name.clone(), Color::palette(index)));
                        merge_dataset(target, delta);
                    }
                }
            }
        }
        if let Some(is_smooth) = self.is_smooth {
            config.is_smooth = is_smooth;
        }
        if let Some(is_percent) = self.is_percent {
            config.is_percent = is_percent;
        }
        if let Some(axis) = &self.left_y_axis {
            merge_axis(&mut config.left_y_axis, axis);
        }
        if let Some(axis) = &self.right_y_axis {
            merge_axis(&mut config.right_y_axis, axis);
        }
        if let Some(axis) = &self.bottom_x_axis {
            merge_x_axis(&mut config.bottom_x_axis, axis);
        }
        Ok(())
    }
}

fn non_negative(value: Option<f64>, field: impl FnOnce() -> String) -> ChartResult<()> {
    match value {
        Some(value) if !value.is_finite() || value < 0.0 => Err(ChartError::InvalidConfig(
            format!("{} must be finite and >= 0, got {value}", field()),
        )),
        _ => Ok(()),
    }
}

fn validate_bounds(axis: &str, min: Option<AxisBound>, max: Option<AxisBound>) -> ChartResult<()> {
    for bound in [min, max].into_iter().flatten() {
        match bound {
            AxisBound::Value(value) if !value.is_finite() => {
                return Err(ChartError::InvalidConfig(format!(
                    "{axis} bounds must be finite, got {value}"
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_dataset(name: &str, dataset: &DatasetDelta) -> ChartResult<()> {
    let non_finite = dataset
        .values
        .iter()
        .flatten()
        .find(|point| point.y.is_some_and(|y| !y.is_finite()));
    if let Some(point) = non_finite {
        return Err(ChartError::InvalidData(format!(
            "dataset `{name}` has a non-finite y at x = {}",
            point.x
        )));
    }
    if let Some(color) = dataset.color {
        color.validate()?;
    }
    non_negative(dataset.radius, || format!("datasets.{name}.radius"))?;
    non_negative(dataset.border_radius, || format!("datasets.{name}.borderRadius"))?;
    non_negative(dataset.line_width, || format!("datasets.{name}.lineWidth"))?;
    Ok(())
}

fn merge_margin(margin: &mut Margin, delta: &MarginDelta) {
    set(&mut margin.top, delta.top);
    set(&mut margin.right, delta.right);
    set(&mut margin.bottom, delta.bottom);
    set(&mut margin.left, delta.left);
}

fn merge_dataset(dataset: &mut Dataset, delta: &DatasetDelta) {
    if let Some(values) = &delta.values {
        dataset.values.clone_from(values);
    }
    set(&mut dataset.color, delta.color);
    set(&mut dataset.radius, delta.radius);
    set(&mut dataset.border_radius, delta.border_radius);
    set(&mut dataset.line_width, delta.line_width);
    set(&mut dataset.has_best_fit, delta.has_best_fit);
    if delta.is_smooth.is_some() {
        dataset.is_smooth = delta.is_smooth;
    }
    set(&mut dataset.axis, delta.axis);
    set(&mut dataset.series_type, delta.series_type);
}

fn merge_format(format: &mut FormatSpec, delta: &FormatDelta) {
    set(&mut format.string, delta.string.clone());
    set(&mut format.prefix, delta.prefix.clone());
    set(&mut format.suffix, delta.suffix.clone());
    set(&mut format.is_date, delta.is_date);
}

fn merge_gridlines(gridlines: &mut Gridlines, delta: &GridlinesDelta) {
    set(&mut gridlines.hidden, delta.hidden);
    set(&mut gridlines.position, delta.position);
}

fn merge_axis(axis: &mut AxisConfig, delta: &AxisDelta) {
    set(&mut axis.min, delta.min);
    set(&mut axis.max, delta.max);
    if let Some(format) = &delta.format {
        merge_format(&mut axis.format, format);
    }
    if let Some(gridlines) = &delta.gridlines {
        merge_gridlines(&mut axis.gridlines, gridlines);
    }
}

fn merge_x_axis(axis: &mut XAxisConfig, delta: &XAxisDelta) {
    set(&mut axis.padding, delta.padding);
    set(&mut axis.min, delta.min);
    set(&mut axis.max, delta.max);
    if let Some(format) = &delta.format {
        merge_format(&mut axis.format, format);
    }
    if let Some(margin) = &delta.margin {
        set(&mut axis.margin.left, margin.left);
        set(&mut axis.margin.right, margin.right);
    }
    if let Some(filter) = &delta.filter {
        axis.filter.clone_from(filter);
    }
    if let Some(gridlines) = &delta.gridlines {
        merge_gridlines(&mut axis.gridlines, gridlines);
    }
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

#[cfg(test)]
mod tests {
    use super::{AxisDelta, ChartConfigDelta, DatasetDelta};
    use crate::api::ChartConfig;
    use crate::charts::ChartKind;
    use crate::core::{AxisBound, Point};
    use crate::error::ChartError;

    #[test]
    fn absent_keys_keep_previous_values() {
        let mut config = ChartConfig::for_kind(ChartKind::Column);
        ChartConfigDelta::new()
            .with_left_y_axis(AxisDelta::default().with_max(100.0))
            .merge_into(&mut config)
            .expect("merge");
        ChartConfigDelta::new()
            .with_dataset("a", DatasetDelta::values(vec![Point::new("q1", 1.0)]))
            .merge_into(&mut config)
            .expect("merge");
        assert_eq!(config.left_y_axis.max, AxisBound::Value(100.0));
        assert_eq!(config.left_y_axis.min, AxisBound::Auto);
    }

    #[test]
    fn dataset_fields_merge_individually() {
        let mut config = ChartConfig::for_kind(ChartKind::Line);
        ChartConfigDelta::new()
            .with_dataset("a", DatasetDelta::values(vec![Point::new("q1", 1.0)]).with_radius(4.0))
            .merge_into(&mut config)
            .expect("merge");
        ChartConfigDelta::new()
            .with_dataset("a", DatasetDelta::default().with_line_width(3.0))
            .merge_into(&mut config)
            .expect("merge");
        let dataset = &config.datasets["a"];
        assert_eq!(dataset.radius, 4.0);
        assert_eq!(dataset.line_width, 3.0);
        assert_eq!(dataset.values.len(), 1);
    }

    #[test]
    fn rejected_delta_leaves_config_untouched() {
        let mut config = ChartConfig::for_kind(ChartKind::Column);
        let delta = ChartConfigDelta::new()
            .with_dataset("a", DatasetDelta::values(vec![Point::new("q1", 1.0)]))
            .with_dataset("b", DatasetDelta::values(vec![Point::new("q1", f64::INFINITY)]));
        assert!(matches!(
            delta.merge_into(&mut config),
            Err(ChartError::InvalidData(_))
        ));
        assert!(config.datasets.is_empty());
    }

    #[test]
    fn json_null_deletes_and_unknown_keys_fail() {
        let delta = ChartConfigDelta::from_json(r#"{"datasets": {"a": null}}"#).expect("json");
        let datasets = delta.datasets.expect("datasets");
        assert_eq!(datasets.get("a"), Some(&None));

        let error = ChartConfigDelta::from_json(r#"{"leftYAxis": {"maximum": 3}}"#);
        assert!(matches!(error, Err(ChartError::Json(_))));
    }
}
