//! Bivariate Granger causality test.
//!
//! For each lag order, compares a restricted autoregression of the target
//! on its own lags against an unrestricted one that adds the candidate
//! cause's lags, and reports the F statistic of the improvement.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use zahara_traits::{Result, ZaharaError};

/// Test outcome for one lag order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GrangerResult {
    /// Lag order tested.
    pub lag: usize,
    /// F statistic of the restricted-vs-unrestricted comparison.
    pub f_stat: f64,
    /// Right-tail p-value of the F statistic.
    pub p_value: f64,
}

/// Test whether `cause` Granger-causes `target` at lags `1..=max_lag`.
///
/// # Errors
///
/// [`ZaharaError::Configuration`] on a zero `max_lag` or mismatched series
/// lengths; [`ZaharaError::InsufficientData`] when a lag order leaves too
/// few observations for the unrestricted regression.
pub fn granger_causality(
    cause: &[f64],
    target: &[f64],
    max_lag: usize,
) -> Result<Vec<GrangerResult>> {
    if max_lag == 0 {
        return Err(ZaharaError::Configuration(
            "max_lag must be positive".to_string(),
        ));
    }
    if cause.len() != target.len() {
        return Err(ZaharaError::Configuration(format!(
            "series lengths differ: {} vs {}",
            cause.len(),
            target.len()
        )));
    }

    let mut results = Vec::with_capacity(max_lag);
    for lag in 1..=max_lag {
        results.push(test_at_lag(cause, target, lag)?);
    }
    Ok(results)
}

fn test_at_lag(cause: &[f64], target: &[f64], lag: usize) -> Result<GrangerResult> {
    let n = target.len();
    if n <= lag {
        return Err(ZaharaError::InsufficientData(format!(
            "{n} observations cannot support lag {lag}"
        )));
    }
    let n_obs = n - lag;
    let k_unrestricted = 2 * lag + 1; // intercept + own lags + cause lags
    if n_obs <= k_unrestricted {
        return Err(ZaharaError::InsufficientData(format!(
            "{n_obs} usable rows for {k_unrestricted} regressors at lag {lag}"
        )));
    }

    let y = Array1::from_iter(target[lag..].iter().copied());

    // Restricted: intercept + target lags
    let mut x_r = Array2::zeros((n_obs, lag + 1));
    // Unrestricted: intercept + target lags + cause lags
    let mut x_u = Array2::zeros((n_obs, k_unrestricted));
    for t in 0..n_obs {
        x_r[[t, 0]] = 1.0;
        x_u[[t, 0]] = 1.0;
        for l in 1..=lag {
            let own = target[lag + t - l];
            x_r[[t, l]] = own;
            x_u[[t, l]] = own;
            x_u[[t, lag + l]] = cause[lag + t - l];
        }
    }

    let rss_r = residual_sum_of_squares(&x_r, &y)?;
    let rss_u = residual_sum_of_squares(&x_u, &y)?;

    let df2 = (n_obs - k_unrestricted) as f64;
    let (f_stat, p_value) = if rss_u < 1e-12 {
        // Perfect unrestricted fit
        (f64::INFINITY, 0.0)
    } else {
        let f = ((rss_r - rss_u) / lag as f64) / (rss_u / df2);
        let f = f.max(0.0);
        let dist = FisherSnedecor::new(lag as f64, df2)
            .map_err(|e| ZaharaError::InvalidData(format!("F distribution: {e}")))?;
        (f, 1.0 - dist.cdf(f))
    };

    Ok(GrangerResult {
        lag,
        f_stat,
        p_value,
    })
}

/// Residual sum of squares of the OLS fit of `y` on `x`, via the normal
/// equations.
fn residual_sum_of_squares(x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);
    let beta = solve_symmetric(xtx, xty)?;
    let fitted = x.dot(&beta);
    Ok(y.iter()
        .zip(fitted.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum())
}

/// Solve `a * x = b` by Gaussian elimination with partial pivoting.
fn solve_symmetric(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .ok_or_else(|| ZaharaError::InvalidData("empty system".to_string()))?;
        if a[[pivot, col]].abs() < 1e-12 {
            return Err(ZaharaError::InvalidData(
                "singular design matrix in regression".to_string(),
            ));
        }
        if pivot != col {
            for k in 0..n {
                a.swap([pivot, k], [col, k]);
            }
            b.swap(pivot, col);
        }
        for row in (col + 1)..n {
            let factor = a[[row, col]] / a[[col, col]];
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::zeros(n);
    for row in (0..n).rev() {
        let mut acc = b[row];
        for k in (row + 1)..n {
            acc -= a[[row, k]] * x[k];
        }
        x[row] = acc / a[[row, row]];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_solver_exact() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let b = array![5.0, 10.0];
        let x = solve_symmetric(a, b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-10);
        assert!((x[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_solver_singular() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![1.0, 2.0];
        assert!(solve_symmetric(a, b).is_err());
    }

    #[test]
    fn test_lagged_cause_is_detected() {
        // target follows cause with a one-day delay plus small noise
        let mut rng = StdRng::seed_from_u64(5);
        let cause: Vec<f64> = (0..300).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let mut target = vec![0.0];
        for t in 1..300 {
            let noise: f64 = rng.gen_range(-0.05..0.05);
            target.push(0.8 * cause[t - 1] + noise);
        }

        let results = granger_causality(&cause, &target, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].p_value < 0.01, "p = {}", results[0].p_value);
        assert!(results[0].f_stat > 10.0);
    }

    #[test]
    fn test_independent_series_usually_insignificant() {
        let mut rng = StdRng::seed_from_u64(17);
        let cause: Vec<f64> = (0..400).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let target: Vec<f64> = (0..400).map(|_| rng.gen_range(-1.0..1.0)).collect();

        let results = granger_causality(&cause, &target, 1).unwrap();
        assert!(results[0].p_value > 0.001);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(granger_causality(&[1.0, 2.0], &[1.0], 1).is_err());
        assert!(granger_causality(&[1.0, 2.0], &[1.0, 2.0], 0).is_err());
        // far too short for the regression
        let err = granger_causality(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], 1).unwrap_err();
        assert!(matches!(err, ZaharaError::InsufficientData(_)));
    }
}
