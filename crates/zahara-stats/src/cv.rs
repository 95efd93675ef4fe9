//! Correlation-based window statistics.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use zahara_traits::stats::{mean, sample_std};
use zahara_traits::{Result, WindowStatistic, ZaharaError};

use crate::correlation::{correlation_matrix, upper_triangle};

/// Configuration for the correlation CV statistic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationCvConfig {
    /// Minimum mean correlation for the ratio to be considered defined.
    /// At or below this the statistic reports undefined rather than an
    /// exploding or sign-flipped value.
    pub min_mean: f64,
}

impl Default for CorrelationCvConfig {
    fn default() -> Self {
        Self { min_mean: 0.0 }
    }
}

/// Coefficient of variation of pairwise correlations.
///
/// For one window this is `std / mean` over the strict upper triangle of
/// the Pearson correlation matrix. Low values mean the cross-section moves
/// as one block (a crowded, fragile market); high values mean correlation
/// structure is dispersed.
#[derive(Debug, Clone, Default)]
pub struct CorrelationCv {
    config: CorrelationCvConfig,
}

impl CorrelationCv {
    /// Create the statistic with the given configuration.
    #[must_use]
    pub const fn new(config: CorrelationCvConfig) -> Self {
        Self { config }
    }
}

impl WindowStatistic for CorrelationCv {
    fn name(&self) -> &str {
        "correlation_cv"
    }

    fn compute(&self, window: ArrayView2<'_, f64>) -> Result<f64> {
        let values = finite_pairwise(window)?;
        let m = mean(&values);
        if m <= self.config.min_mean {
            return Err(ZaharaError::UndefinedStatistic(format!(
                "mean pairwise correlation {m:.4} <= {}",
                self.config.min_mean
            )));
        }
        Ok(sample_std(&values) / m)
    }

    fn min_window(&self) -> usize {
        2
    }
}

/// Mean pairwise Pearson correlation of a window.
///
/// The crisis-viability statistic: a market where this stays high is one
/// where a single common factor dominates.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanCorrelation;

impl WindowStatistic for MeanCorrelation {
    fn name(&self) -> &str {
        "mean_correlation"
    }

    fn compute(&self, window: ArrayView2<'_, f64>) -> Result<f64> {
        let values = finite_pairwise(window)?;
        Ok(mean(&values))
    }

    fn min_window(&self) -> usize {
        2
    }
}

/// Finite upper-triangle correlations of a window.
fn finite_pairwise(window: ArrayView2<'_, f64>) -> Result<Vec<f64>> {
    if window.ncols() < 2 {
        return Err(ZaharaError::UndefinedStatistic(format!(
            "pairwise correlation needs at least 2 symbols, got {}",
            window.ncols()
        )));
    }
    let corr = correlation_matrix(window);
    let values: Vec<f64> = upper_triangle(&corr)
        .into_iter()
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return Err(ZaharaError::UndefinedStatistic(
            "no finite pairwise correlations in window".to_string(),
        ));
    }
    Ok(values)
}
