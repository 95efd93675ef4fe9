//! Adaptive rolling z-score rule.
//!
//! Instead of a fixed threshold, each point is judged against the mean and
//! standard deviation of the statistic over its own trailing window. The
//! rule adapts to slow level shifts in the statistic but needs a warmup
//! window before it can label anything.

use serde::{Deserialize, Serialize};
use zahara_traits::stats::{MIN_STD_THRESHOLD, mean, sample_std};
use zahara_traits::{
    Regime, RegimeRule, RegimeSeries, Result, StatisticSeries, ZaharaError,
};

/// Configuration for [`AdaptiveZScoreRule`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveZScoreConfig {
    /// Trailing window length in evaluation points (including the point
    /// being labelled).
    pub window: usize,
    /// Symmetric z-score band: above `+z_threshold` is `HighStress`,
    /// below `-z_threshold` is `LowStress`, in between is `Normal`.
    pub z_threshold: f64,
}

impl Default for AdaptiveZScoreConfig {
    fn default() -> Self {
        Self {
            window: 60,
            z_threshold: 1.0,
        }
    }
}

/// Labels each point by its z-score against its trailing window.
///
/// Points inside the warmup window, undefined points, and points whose
/// trailing window has (near) zero variance stay unlabelled.
#[derive(Debug, Clone)]
pub struct AdaptiveZScoreRule {
    config: AdaptiveZScoreConfig,
}

impl AdaptiveZScoreRule {
    /// Create the rule with the given configuration.
    #[must_use]
    pub const fn new(config: AdaptiveZScoreConfig) -> Self {
        Self { config }
    }
}

impl Default for AdaptiveZScoreRule {
    fn default() -> Self {
        Self::new(AdaptiveZScoreConfig::default())
    }
}

impl RegimeRule for AdaptiveZScoreRule {
    fn name(&self) -> &str {
        "adaptive_zscore"
    }

    fn classify(&self, series: &StatisticSeries) -> Result<RegimeSeries> {
        let window = self.config.window;
        let z0 = self.config.z_threshold;
        if window < 2 {
            return Err(ZaharaError::Configuration(format!(
                "adaptive window must be at least 2, got {window}"
            )));
        }
        if z0 <= 0.0 || !z0.is_finite() {
            return Err(ZaharaError::Configuration(format!(
                "z threshold must be positive and finite, got {z0}"
            )));
        }

        let labels = (0..series.len())
            .map(|i| {
                let value = series.values[i];
                if i + 1 < window || !value.is_finite() {
                    return None;
                }
                let trailing: Vec<f64> = series.values[i + 1 - window..=i]
                    .iter()
                    .copied()
                    .filter(|v| v.is_finite())
                    .collect();
                if trailing.len() < 2 {
                    return None;
                }
                let std = sample_std(&trailing);
                if std < MIN_STD_THRESHOLD {
                    return None;
                }
                let z = (value - mean(&trailing)) / std;
                Some(if z > z0 {
                    Regime::HighStress
                } else if z < -z0 {
                    Regime::LowStress
                } else {
                    Regime::Normal
                })
            })
            .collect();

        Ok(RegimeSeries {
            rule: self.name().to_string(),
            dates: series.dates.clone(),
            labels,
        })
    }
}
