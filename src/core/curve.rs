//! Path geometry for line and area marks.
//!
//! Samples arrive in pixel space as `Option`s; `None` marks an undefined
//! sample and splits the path into separately started segments.

use serde::{Deserialize, Serialize};

use crate::render::PathCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Curve {
    /// Straight segments between vertices.
    #[default]
    Linear,
    /// Monotone cubic interpolation in x; never overshoots the data.
    MonotoneX,
}

impl Curve {
    #[must_use]
    pub fn from_smooth(smooth: bool) -> Self {
        if smooth { Self::MonotoneX } else { Self::Linear }
    }
}

/// One vertical extent of an area at a given x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaSample {
    pub x: f64,
    pub top: f64,
    pub base: f64,
}

/// Splits samples into maximal runs of defined points.
#[must_use]
pub fn defined_runs<T: Copy>(samples: &[Option<T>]) -> Vec<Vec<T>> {
    samples
        .split(Option::is_none)
        .filter(|run| !run.is_empty())
        .map(|run| run.iter().flatten().copied().collect())
        .collect()
}

/// Commands for a line through `samples`, broken at undefined samples.
#[must_use]
pub fn line_commands(samples: &[Option<(f64, f64)>], curve: Curve) -> Vec<PathCommand> {
    let mut commands = Vec::new();
    for run in defined_runs(samples) {
        let (x, y) = run[0];
        commands.push(PathCommand::MoveTo { x, y });
        push_curve(&run, curve, &mut commands);
    }
    commands
}

/// Commands for a filled area: each run traces its top edge forward and its
/// base edge backward, then closes.
#[must_use]
pub fn area_commands(samples: &[Option<AreaSample>], curve: Curve) -> Vec<PathCommand> {
    let mut commands = Vec::new();
    for run in defined_runs(samples) {
        let top: Vec<(f64, f64)> = run.iter().map(|sample| (sample.x, sample.top)).collect();
        let base: Vec<(f64, f64)> = run
            .iter()
            .rev()
            .map(|sample| (sample.x, sample.base))
            .collect();

        let (x, y) = top[0];
        commands.push(PathCommand::MoveTo { x, y });
        push_curve(&top, curve, &mut commands);
        let (x, y) = base[0];
        commands.push(PathCommand::LineTo { x, y });
        push_curve(&base, curve, &mut commands);
        commands.push(PathCommand::Close);
    }
    commands
}

/// Appends commands from `run[0]` (already the current point) to the last vertex.
fn push_curve(run: &[(f64, f64)], curve: Curve, commands: &mut Vec<PathCommand>) {
    if run.len() < 3 || curve == Curve::Linear {
        commands.extend(run.iter().skip(1).map(|&(x, y)| PathCommand::LineTo { x, y }));
        return;
    }

    let tangents = monotone_tangents(run);
    for (index, pair) in run.windows(2).enumerate() {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        let dx = (x1 - x0) / 3.0;
        commands.push(PathCommand::CubicTo {
            c1x: x0 + dx,
            c1y: y0 + dx * tangents[index],
            c2x: x1 - dx,
            c2y: y1 - dx * tangents[index + 1],
            x: x1,
            y: y1,
        });
    }
}

/// Fritsch-Carlson style tangents as used by monotone-x interpolation.
fn monotone_tangents(run: &[(f64, f64)]) -> Vec<f64> {
    let n = run.len();
    let mut tangents = vec![0.0; n];

    for index in 1..n - 1 {
        let (x0, y0) = run[index - 1];
        let (x1, y1) = run[index];
        let (x2, y2) = run[index + 1];
        let h0 = x1 - x0;
        let h1 = x2 - x1;
        let s0 = secant(y1 - y0, h0);
        let s1 = secant(y2 - y1, h1);
        let p = if h0 + h1 == 0.0 {
            0.0
        } else {
            (s0 * h1 + s1 * h0) / (h0 + h1)
        };
        let tangent = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
        tangents[index] = if tangent.is_finite() { tangent } else { 0.0 };
    }

    tangents[0] = end_tangent(run[0], run[1], tangents[1]);
    tangents[n - 1] = end_tangent(run[n - 2], run[n - 1], tangents[n - 2]);
    tangents
}

fn end_tangent(from: (f64, f64), to: (f64, f64), neighbour: f64) -> f64 {
    let h = to.0 - from.0;
    if h == 0.0 {
        neighbour
    } else {
        (3.0 * (to.1 - from.1) / h - neighbour) / 2.0
    }
}

fn secant(dy: f64, dx: f64) -> f64 {
    if dx == 0.0 { 0.0 } else { dy / dx }
}

fn sign(value: f64) -> f64 {
    if value < 0.0 { -1.0 } else { 1.0 }
}
