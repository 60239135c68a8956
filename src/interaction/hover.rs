use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{Margin, XValue};

/// Payload delivered to `mouseMove` observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverInfo {
    /// X value of the matched position.
    pub name: XValue,
    /// Matched position in container coordinates.
    pub left: f64,
    /// Pointer height in container coordinates.
    pub top: f64,
    /// Value of every dataset at the matched x, in dataset order.
    pub y: IndexMap<String, Option<f64>>,
}

/// Index of the position closest to `pointer`; the first one wins ties.
#[must_use]
pub fn nearest_index(positions: &[f64], pointer: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, position) in positions.iter().enumerate() {
        let distance = (position - pointer).abs();
        if !distance.is_finite() {
            continue;
        }
        if best.is_none_or(|(_, closest)| distance < closest) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}

/// Hover candidates of one rendered scene.
///
/// Positions are in plot coordinates: band charts use band centers, point,
/// linear and time charts use the mapped x.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HoverIndex {
    margin: Margin,
    names: Vec<XValue>,
    positions: Vec<f64>,
    series: Vec<String>,
    /// `values[category][series]`
    values: Vec<Vec<Option<f64>>>,
}

impl HoverIndex {
    #[must_use]
    pub fn new(margin: Margin, series: Vec<String>) -> Self {
        Self {
            margin,
            series,
            ..Self::default()
        }
    }

    /// Adds one candidate; `values` follow the series order given to `new`.
    pub fn push(&mut self, name: XValue, position: f64, values: Vec<Option<f64>>) {
        self.names.push(name);
        self.positions.push(position);
        self.values.push(values);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[must_use]
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Resolves a pointer given in plot coordinates.
    #[must_use]
    pub fn resolve(&self, plot_x: f64, plot_y: f64) -> Option<HoverInfo> {
        let index = nearest_index(&self.positions, plot_x)?;
        let values = &self.values[index];
        let y = self
            .series
            .iter()
            .enumerate()
            .map(|(position, name)| (name.clone(), values.get(position).copied().flatten()))
            .collect();

        Some(HoverInfo {
            name: self.names[index].clone(),
            left: self.positions[index] + self.margin.left,
            top: plot_y + self.margin.top,
            y,
        })
    }
}
