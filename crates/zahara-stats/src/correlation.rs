//! Pairwise correlation structure of a returns window.

use ndarray::{Array2, ArrayView2};
use zahara_traits::stats::MIN_STD_THRESHOLD;

/// Pearson correlation matrix of the columns of `window`.
///
/// A pair involving a column with (near) zero variance gets `NaN`; the
/// diagonal is always 1.
pub fn correlation_matrix(window: ArrayView2<'_, f64>) -> Array2<f64> {
    let n_rows = window.nrows();
    let n_cols = window.ncols();
    let mut corr = Array2::from_elem((n_cols, n_cols), f64::NAN);

    if n_rows < 2 {
        for i in 0..n_cols {
            corr[[i, i]] = 1.0;
        }
        return corr;
    }

    let means: Vec<f64> = (0..n_cols)
        .map(|j| window.column(j).sum() / n_rows as f64)
        .collect();
    let stds: Vec<f64> = (0..n_cols)
        .map(|j| {
            let m = means[j];
            let var = window.column(j).iter().map(|x| (x - m).powi(2)).sum::<f64>()
                / (n_rows - 1) as f64;
            var.sqrt()
        })
        .collect();

    for i in 0..n_cols {
        corr[[i, i]] = 1.0;
        for j in (i + 1)..n_cols {
            if stds[i] < MIN_STD_THRESHOLD || stds[j] < MIN_STD_THRESHOLD {
                continue;
            }
            let cov = window
                .column(i)
                .iter()
                .zip(window.column(j).iter())
                .map(|(a, b)| (a - means[i]) * (b - means[j]))
                .sum::<f64>()
                / (n_rows - 1) as f64;
            let rho = cov / (stds[i] * stds[j]);
            corr[[i, j]] = rho;
            corr[[j, i]] = rho;
        }
    }
    corr
}

/// The strict upper triangle of a square matrix, row by row.
pub fn upper_triangle(matrix: &Array2<f64>) -> Vec<f64> {
    let n = matrix.nrows();
    let mut values = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            values.push(matrix[[i, j]]);
        }
    }
    values
}

/// Map a correlation matrix to a distance matrix via `d = sqrt(2(1 - rho))`.
///
/// Correlations are clamped into `[-1, 1]` first so rounding noise cannot
/// produce a negative radicand. Distances range from 0 (perfectly
/// correlated) to 2 (perfectly anti-correlated); the diagonal is 0.
pub fn correlation_to_distance(corr: &Array2<f64>) -> Array2<f64> {
    corr.mapv(|rho| (2.0 * (1.0 - rho.clamp(-1.0, 1.0))).sqrt())
}
