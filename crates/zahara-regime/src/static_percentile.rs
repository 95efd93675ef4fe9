//! Static percentile threshold rule.
//!
//! The classic train/test split: the threshold is a percentile of the
//! statistic over a fixed training range and never moves afterwards.
//! Simple, transparent, and honest about its one big assumption - that
//! the training distribution stays representative.

use serde::{Deserialize, Serialize};
use zahara_traits::stats::{MIN_STD_THRESHOLD, percentile, sample_std};
use zahara_traits::{
    Regime, RegimeRule, RegimeSeries, Result, StatisticSeries, ZaharaError,
};

pub use zahara_traits::Date;

/// Configuration for [`StaticPercentileRule`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticPercentileConfig {
    /// Percentile of the training distribution used as the threshold,
    /// in `(0, 100)`.
    pub percentile: f64,
    /// Last date (inclusive) of the training range.
    pub train_end: Date,
}

impl StaticPercentileConfig {
    /// The research default: the 75th percentile of the training range.
    #[must_use]
    pub const fn with_train_end(train_end: Date) -> Self {
        Self {
            percentile: 75.0,
            train_end,
        }
    }
}

/// Labels dates after the training range `Stressed` when the statistic
/// exceeds the trained threshold, `Calm` otherwise.
///
/// Training dates and undefined points stay unlabelled; the backtest
/// treats them as flat days.
#[derive(Debug, Clone)]
pub struct StaticPercentileRule {
    config: StaticPercentileConfig,
}

impl StaticPercentileRule {
    /// Create the rule with the given configuration.
    #[must_use]
    pub const fn new(config: StaticPercentileConfig) -> Self {
        Self { config }
    }

    /// The threshold this rule derives from `series`.
    ///
    /// # Errors
    ///
    /// [`ZaharaError::Configuration`] when the training range holds no
    /// finite values or has (near) zero variance, making every possible
    /// threshold degenerate.
    pub fn threshold(&self, series: &StatisticSeries) -> Result<f64> {
        let training = series.training_values(self.config.train_end);
        if training.is_empty() {
            return Err(ZaharaError::Configuration(format!(
                "no finite statistic values on or before {}",
                self.config.train_end
            )));
        }
        if sample_std(&training) < MIN_STD_THRESHOLD {
            return Err(ZaharaError::Configuration(
                "training statistic has zero variance, threshold is degenerate".to_string(),
            ));
        }
        percentile(&training, self.config.percentile)
    }
}

impl RegimeRule for StaticPercentileRule {
    fn name(&self) -> &str {
        "static_percentile"
    }

    fn classify(&self, series: &StatisticSeries) -> Result<RegimeSeries> {
        let threshold = self.threshold(series)?;

        let labels = series
            .dates
            .iter()
            .zip(&series.values)
            .map(|(date, value)| {
                if *date <= self.config.train_end || !value.is_finite() {
                    None
                } else if *value > threshold {
                    Some(Regime::Stressed)
                } else {
                    Some(Regime::Calm)
                }
            })
            .collect();

        Ok(RegimeSeries {
            rule: self.name().to_string(),
            dates: series.dates.clone(),
            labels,
        })
    }
}
