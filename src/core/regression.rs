//! Best-fit curves for scatterplots.
//!
//! The chart only depends on the [`Regression`] trait; [`LeastSquares`] is
//! the built-in implementation trying linear, quadratic, exponential and
//! power models and keeping the one with the highest R².

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitModel {
    /// `y = a + b·x`
    Linear,
    /// `y = a + b·x + c·x²`
    Quadratic,
    /// `y = a·e^(b·x)`
    Exponential,
    /// `y = a·x^b`
    Power,
}

impl FitModel {
    pub const ALL: [Self; 4] = [Self::Linear, Self::Quadratic, Self::Exponential, Self::Power];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fit {
    pub model: FitModel,
    pub coefficients: SmallVec<[f64; 3]>,
    pub r_squared: f64,
}

impl Fit {
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        let c = |index: usize| self.coefficients.get(index).copied().unwrap_or(0.0);
        match self.model {
            FitModel::Linear => c(0) + c(1) * x,
            FitModel::Quadratic => c(0) + c(1) * x + c(2) * x * x,
            FitModel::Exponential => c(0) * (c(1) * x).exp(),
            FitModel::Power => c(0) * x.powf(c(1)),
        }
    }
}

/// External collaborator producing a fitted curve from `(x, y)` pairs.
///
/// Returning `None` means "no best-fit line"; the chart then draws nothing.
pub trait Regression {
    fn best_fit(&self, points: &[(f64, f64)]) -> Option<Fit>;
}

/// Ordinary least squares over the models in [`FitModel::ALL`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastSquares;

impl Regression for LeastSquares {
    fn best_fit(&self, points: &[(f64, f64)]) -> Option<Fit> {
        let points: Vec<(f64, f64)> = points
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();

        FitModel::ALL
            .into_iter()
            .filter_map(|model| fit(model, &points))
            .filter(|fit| fit.r_squared.is_finite())
            // Strictly greater keeps the earlier model on ties.
            .fold(None, |best: Option<Fit>, candidate| match best {
                Some(best) if best.r_squared >= candidate.r_squared => Some(best),
                _ => Some(candidate),
            })
    }
}

/// Fits a single model; `None` when the data cannot support it.
#[must_use]
pub fn fit(model: FitModel, points: &[(f64, f64)]) -> Option<Fit> {
    let coefficients: SmallVec<[f64; 3]> = match model {
        FitModel::Linear => {
            let (a, b) = linear_least_squares(points.iter().copied())?;
            SmallVec::from_slice(&[a, b])
        }
        FitModel::Quadratic => SmallVec::from_slice(&quadratic_least_squares(points)?),
        FitModel::Exponential => {
            if points.iter().any(|&(_, y)| y <= 0.0) {
                return None;
            }
            let (ln_a, b) = linear_least_squares(points.iter().map(|&(x, y)| (x, y.ln())))?;
            SmallVec::from_slice(&[ln_a.exp(), b])
        }
        FitModel::Power => {
            if points.iter().any(|&(x, y)| x <= 0.0 || y <= 0.0) {
                return None;
            }
            let (ln_a, b) =
                linear_least_squares(points.iter().map(|&(x, y)| (x.ln(), y.ln())))?;
            SmallVec::from_slice(&[ln_a.exp(), b])
        }
    };

    if coefficients.iter().any(|value| !value.is_finite()) {
        return None;
    }

    let mut fit = Fit {
        model,
        coefficients,
        r_squared: 0.0,
    };
    fit.r_squared = r_squared(&fit, points);
    Some(fit)
}

/// Coefficient of determination measured on the original (untransformed) data.
fn r_squared(fit: &Fit, points: &[(f64, f64)]) -> f64 {
    let n = points.len() as f64;
    let mean = points.iter().map(|&(_, y)| y).sum::<f64>() / n;
    let (ss_res, ss_tot) = points.iter().fold((0.0, 0.0), |(res, tot), &(x, y)| {
        let residual = y - fit.predict(x);
        (res + residual * residual, tot + (y - mean) * (y - mean))
    });
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

fn linear_least_squares(points: impl Iterator<Item = (f64, f64)>) -> Option<(f64, f64)> {
    let (mut n, mut sx, mut sy, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (x, y) in points {
        n += 1.0;
        sx += x;
        sy += y;
        sxx += x * x;
        sxy += x * y;
    }
    if n < 2.0 {
        return None;
    }
    let denominator = n * sxx - sx * sx;
    if denominator == 0.0 {
        return None;
    }
    let slope = (n * sxy - sx * sy) / denominator;
    let intercept = (sy - slope * sx) / n;
    Some((intercept, slope))
}

fn quadratic_least_squares(points: &[(f64, f64)]) -> Option<[f64; 3]> {
    if points.len() < 3 {
        return None;
    }
    // Normal equations: sum(x^(i+j)) * c_j = sum(x^i * y).
    let mut matrix = [[0.0; 4]; 3];
    for &(x, y) in points {
        let powers = [1.0, x, x * x, x * x * x, x * x * x * x];
        for (row, equation) in matrix.iter_mut().enumerate() {
            for (column, cell) in equation.iter_mut().take(3).enumerate() {
                *cell += powers[row + column];
            }
            equation[3] += powers[row] * y;
        }
    }
    solve_3x3(matrix)
}

/// Gaussian elimination with partial pivoting on an augmented 3x4 matrix.
fn solve_3x3(mut matrix: [[f64; 4]; 3]) -> Option<[f64; 3]> {
    for pivot in 0..3 {
        let best = (pivot..3).max_by(|&a, &b| {
            matrix[a][pivot]
                .abs()
                .total_cmp(&matrix[b][pivot].abs())
        })?;
        if matrix[best][pivot].abs() < f64::EPSILON {
            return None;
        }
        matrix.swap(pivot, best);
        for row in pivot + 1..3 {
            let factor = matrix[row][pivot] / matrix[pivot][pivot];
            for column in pivot..4 {
                matrix[row][column] -= factor * matrix[pivot][column];
            }
        }
    }

    let mut solution = [0.0; 3];
    for row in (0..3).rev() {
        let known: f64 = (row + 1..3).map(|column| matrix[row][column] * solution[column]).sum();
        solution[row] = (matrix[row][3] - known) / matrix[row][row];
    }
    Some(solution)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{FitModel, LeastSquares, Regression, fit};

    #[test]
    fn exact_line_is_recovered() {
        let points: Vec<(f64, f64)> = (0..5).map(|x| (f64::from(x), 2.0 * f64::from(x) + 1.0)).collect();
        let line = fit(FitModel::Linear, &points).expect("linear fit");
        assert_relative_eq!(line.coefficients[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(line.coefficients[1], 2.0, epsilon = 1e-9);
        assert_relative_eq!(line.r_squared, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn parabola_prefers_quadratic_model() {
        let points: Vec<(f64, f64)> = (-4..=4)
            .map(|x| {
                let x = f64::from(x);
                (x, x * x - 3.0)
            })
            .collect();
        let best = LeastSquares.best_fit(&points).expect("fit");
        assert_eq!(best.model, FitModel::Quadratic);
        assert_relative_eq!(best.predict(2.0), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn exponential_needs_positive_y() {
        assert!(fit(FitModel::Exponential, &[(0.0, 1.0), (1.0, -2.0)]).is_none());
        assert!(fit(FitModel::Power, &[(0.0, 1.0), (1.0, 2.0)]).is_none());
    }

    #[test]
    fn single_point_has_no_fit() {
        assert!(LeastSquares.best_fit(&[(1.0, 1.0)]).is_none());
    }
}
