//! Performance metrics for a daily return series.
//!
//! Pure functions of the input returns: the same series and periodicity
//! always produce the same summary.

use serde::{Deserialize, Serialize};
use zahara_traits::stats::{MIN_STD_THRESHOLD, mean, sample_std};
use zahara_traits::{Result, ZaharaError};

/// Performance summary of a daily return series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Final equity over initial equity, minus one.
    pub total_return: f64,
    /// Geometric annualization of the total return.
    pub annualized_return: f64,
    /// Mean over standard deviation of daily returns, scaled by the
    /// square root of the periods per year. Zero when the series has no
    /// variance.
    pub sharpe: f64,
    /// Sample standard deviation of daily returns, annualized.
    pub annualized_volatility: f64,
    /// Worst peak-to-trough decline of the equity curve, as a
    /// non-positive fraction.
    pub max_drawdown: f64,
    /// Fraction of strictly positive days over all days.
    pub win_rate: f64,
    /// Annualized return over the magnitude of the max drawdown. Zero
    /// when the drawdown is zero.
    pub calmar: f64,
    /// Number of daily observations.
    pub n_days: usize,
    /// Trading periods per year used for annualization.
    pub periods_per_year: f64,
}

impl PerformanceSummary {
    /// Summarize a daily return series.
    ///
    /// # Errors
    ///
    /// [`ZaharaError::InsufficientData`] on an empty series,
    /// [`ZaharaError::InvalidData`] on non-finite returns,
    /// [`ZaharaError::Configuration`] on a non-positive periodicity.
    pub fn from_returns(returns: &[f64], periods_per_year: f64) -> Result<Self> {
        if returns.is_empty() {
            return Err(ZaharaError::InsufficientData(
                "cannot summarize an empty return series".to_string(),
            ));
        }
        if returns.iter().any(|r| !r.is_finite()) {
            return Err(ZaharaError::InvalidData(
                "return series contains non-finite values".to_string(),
            ));
        }
        if periods_per_year <= 0.0 || !periods_per_year.is_finite() {
            return Err(ZaharaError::Configuration(format!(
                "periods_per_year must be positive, got {periods_per_year}"
            )));
        }

        let curve = equity_curve(returns);
        let total_return = curve[curve.len() - 1] - 1.0;
        let n = returns.len() as f64;
        let annualized_return = (1.0 + total_return).powf(periods_per_year / n) - 1.0;

        let std = sample_std(returns);
        let sharpe = if std < MIN_STD_THRESHOLD {
            0.0
        } else {
            mean(returns) / std * periods_per_year.sqrt()
        };
        let annualized_volatility = std * periods_per_year.sqrt();

        let max_drawdown = max_drawdown(&curve);
        let calmar = if max_drawdown == 0.0 {
            0.0
        } else {
            annualized_return / max_drawdown.abs()
        };

        let win_rate = returns.iter().filter(|r| **r > 0.0).count() as f64 / n;

        Ok(Self {
            total_return,
            annualized_return,
            sharpe,
            annualized_volatility,
            max_drawdown,
            win_rate,
            calmar,
            n_days: returns.len(),
            periods_per_year,
        })
    }
}

/// Cumulative equity curve `prod(1 + r)`, one point per return.
pub fn equity_curve(returns: &[f64]) -> Vec<f64> {
    let mut curve = Vec::with_capacity(returns.len());
    let mut equity = 1.0;
    for r in returns {
        equity *= 1.0 + r;
        curve.push(equity);
    }
    curve
}

/// Worst drawdown of an equity curve: the minimum over time of
/// `(equity - running_max) / running_max`. Non-positive; zero for a
/// never-declining curve.
pub fn max_drawdown(curve: &[f64]) -> f64 {
    let mut run_max = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &equity in curve {
        if equity > run_max {
            run_max = equity;
        }
        let dd = (equity - run_max) / run_max;
        if dd < worst {
            worst = dd;
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE: [f64; 5] = [0.01, -0.02, 0.015, 0.00, 0.03];

    #[test]
    fn test_equity_curve() {
        let curve = equity_curve(&SAMPLE);
        assert_relative_eq!(curve[0], 1.01, epsilon = 1e-12);
        assert_relative_eq!(curve[1], 1.01 * 0.98, epsilon = 1e-12);
        assert_relative_eq!(curve[2], 1.01 * 0.98 * 1.015, epsilon = 1e-12);
    }

    #[test]
    fn test_max_drawdown_exact() {
        let curve = equity_curve(&SAMPLE);
        // The only decline is the -2% day off the 1.01 peak.
        assert_relative_eq!(max_drawdown(&curve), -0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_max_drawdown_monotone_curve_is_zero() {
        let curve = equity_curve(&[0.01, 0.0, 0.02]);
        assert_eq!(max_drawdown(&curve), 0.0);
    }

    #[test]
    fn test_summary_fields() {
        let summary = PerformanceSummary::from_returns(&SAMPLE, 252.0).unwrap();
        let curve = equity_curve(&SAMPLE);
        assert_relative_eq!(summary.total_return, curve[4] - 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            summary.annualized_return,
            (curve[4]).powf(252.0 / 5.0) - 1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(summary.max_drawdown, -0.02, epsilon = 1e-12);
        // 3 of 5 days are strictly positive
        assert_relative_eq!(summary.win_rate, 0.6, epsilon = 1e-12);
        assert_relative_eq!(
            summary.calmar,
            summary.annualized_return / 0.02,
            epsilon = 1e-10
        );
        assert_eq!(summary.n_days, 5);
    }

    #[test]
    fn test_sharpe_zero_variance() {
        let summary = PerformanceSummary::from_returns(&[0.01; 10], 252.0).unwrap();
        assert_eq!(summary.sharpe, 0.0);
        // A never-declining curve also has zero drawdown and zero Calmar
        assert_eq!(summary.max_drawdown, 0.0);
        assert_eq!(summary.calmar, 0.0);
    }

    #[test]
    fn test_sharpe_scale_invariance() {
        let base = PerformanceSummary::from_returns(&SAMPLE, 252.0).unwrap();
        let scaled: Vec<f64> = SAMPLE.iter().map(|r| r * 3.0).collect();
        let tripled = PerformanceSummary::from_returns(&scaled, 252.0).unwrap();
        // Scaling all returns by a positive constant leaves Sharpe unchanged
        assert_relative_eq!(base.sharpe, tripled.sharpe, epsilon = 1e-10);
    }

    #[test]
    fn test_idempotence() {
        let a = PerformanceSummary::from_returns(&SAMPLE, 252.0).unwrap();
        let b = PerformanceSummary::from_returns(&SAMPLE, 252.0).unwrap();
        assert_eq!(a.total_return, b.total_return);
        assert_eq!(a.sharpe, b.sharpe);
        assert_eq!(a.max_drawdown, b.max_drawdown);
        assert_eq!(a.calmar, b.calmar);
    }

    #[test]
    fn test_crypto_periodicity() {
        let daily = PerformanceSummary::from_returns(&SAMPLE, 252.0).unwrap();
        let crypto = PerformanceSummary::from_returns(&SAMPLE, 365.0).unwrap();
        assert!(crypto.annualized_return > daily.annualized_return);
        assert_relative_eq!(
            crypto.sharpe / daily.sharpe,
            (365.0_f64 / 252.0).sqrt(),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(PerformanceSummary::from_returns(&[], 252.0).is_err());
        assert!(PerformanceSummary::from_returns(&[0.01, f64::NAN], 252.0).is_err());
        assert!(PerformanceSummary::from_returns(&SAMPLE, 0.0).is_err());
    }
}
