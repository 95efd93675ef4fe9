//! Multi-strategy comparison and equal-weight ensemble.
//!
//! Aligns several strategies on their common dates, summarizes each,
//! ranks them by Sharpe, reports how correlated they are, and evaluates
//! the equal-weight blend. Failed pipeline variants are recorded and
//! skipped; the surviving variants are still compared.

use std::collections::BTreeSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use zahara_stats::{correlation_matrix, upper_triangle};
use zahara_traits::{Date, Provenance, Result, ZaharaError};

use crate::metrics::PerformanceSummary;

/// A named daily return series, the unit of comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyReturns {
    /// Strategy label.
    pub name: String,
    /// Trading dates, ascending.
    pub dates: Vec<Date>,
    /// Net daily returns, parallel to `dates`.
    pub returns: Vec<f64>,
    /// Provenance of the data the strategy traded on.
    pub provenance: Provenance,
}

/// One strategy's summary within a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedStrategy {
    /// Strategy label.
    pub name: String,
    /// Summary over the common date range.
    pub summary: PerformanceSummary,
}

/// Outcome of comparing several strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    /// Strategies ranked by Sharpe, best first.
    pub ranked: Vec<RankedStrategy>,
    /// Dates every compared strategy has in common.
    pub common_dates: Vec<Date>,
    /// Mean pairwise correlation of the strategies' daily returns (`NaN`
    /// with fewer than two strategies).
    pub mean_correlation: f64,
    /// Equal-weight blend of the compared strategies.
    pub ensemble: RankedStrategy,
    /// Pipeline variants that failed, with their error messages. These
    /// are excluded from the ranking but reported so a comparison never
    /// hides a broken variant.
    pub failures: Vec<(String, String)>,
}

/// Compare strategies on their common dates.
///
/// # Errors
///
/// [`ZaharaError::InsufficientData`] when no strategies are given or no
/// common dates exist.
pub fn compare(strategies: &[StrategyReturns], periods_per_year: f64) -> Result<Comparison> {
    compare_with_failures(strategies, Vec::new(), periods_per_year)
}

/// Compare the successful outcomes of several pipeline variants.
///
/// Failed variants are recorded in [`Comparison::failures`] and the
/// survivors compared; only an empty survivor set is an error.
pub fn compare_outcomes(
    outcomes: Vec<(String, Result<StrategyReturns>)>,
    periods_per_year: f64,
) -> Result<Comparison> {
    let mut survivors = Vec::new();
    let mut failures = Vec::new();
    for (name, outcome) in outcomes {
        match outcome {
            Ok(s) => survivors.push(s),
            Err(e) => failures.push((name, e.to_string())),
        }
    }
    compare_with_failures(&survivors, failures, periods_per_year)
}

fn compare_with_failures(
    strategies: &[StrategyReturns],
    failures: Vec<(String, String)>,
    periods_per_year: f64,
) -> Result<Comparison> {
    if strategies.is_empty() {
        return Err(ZaharaError::InsufficientData(
            "no strategies to compare".to_string(),
        ));
    }
    for s in strategies {
        if s.dates.len() != s.returns.len() {
            return Err(ZaharaError::InvalidData(format!(
                "strategy {} has {} dates but {} returns",
                s.name,
                s.dates.len(),
                s.returns.len()
            )));
        }
    }

    // Intersection of all calendars.
    let mut common: BTreeSet<Date> = strategies[0].dates.iter().copied().collect();
    for s in &strategies[1..] {
        let dates: BTreeSet<Date> = s.dates.iter().copied().collect();
        common = common.intersection(&dates).copied().collect();
    }
    if common.is_empty() {
        return Err(ZaharaError::InsufficientData(
            "strategies share no common dates".to_string(),
        ));
    }
    let common_dates: Vec<Date> = common.into_iter().collect();

    // Aligned return matrix: rows = common dates, columns = strategies.
    let mut aligned = Array2::zeros((common_dates.len(), strategies.len()));
    for (col, s) in strategies.iter().enumerate() {
        for (row, date) in common_dates.iter().enumerate() {
            // Dates are unique within a strategy, so the first match is
            // the only one.
            let idx = s
                .dates
                .iter()
                .position(|d| d == date)
                .ok_or_else(|| ZaharaError::InvalidData("alignment lost a date".to_string()))?;
            aligned[[row, col]] = s.returns[idx];
        }
    }

    let mut ranked = Vec::with_capacity(strategies.len());
    for (col, s) in strategies.iter().enumerate() {
        let returns: Vec<f64> = aligned.column(col).to_vec();
        ranked.push(RankedStrategy {
            name: s.name.clone(),
            summary: PerformanceSummary::from_returns(&returns, periods_per_year)?,
        });
    }
    ranked.sort_by(|a, b| b.summary.sharpe.total_cmp(&a.summary.sharpe));

    let mean_correlation = if strategies.len() < 2 {
        f64::NAN
    } else {
        let corr = correlation_matrix(aligned.view());
        let pairs: Vec<f64> = upper_triangle(&corr)
            .into_iter()
            .filter(|v| v.is_finite())
            .collect();
        if pairs.is_empty() {
            f64::NAN
        } else {
            pairs.iter().sum::<f64>() / pairs.len() as f64
        }
    };

    let ensemble_returns: Vec<f64> = (0..common_dates.len())
        .map(|row| aligned.row(row).sum() / strategies.len() as f64)
        .collect();
    let ensemble = RankedStrategy {
        name: "equal_weight_ensemble".to_string(),
        summary: PerformanceSummary::from_returns(&ensemble_returns, periods_per_year)?,
    };

    Ok(Comparison {
        ranked,
        common_dates,
        mean_correlation,
        ensemble,
        failures,
    })
}
