//! Rolling-window statistics engine.
//!
//! Walks a returns table with a fixed window and step, evaluates a
//! [`WindowStatistic`] over each window, and stamps every value with the
//! last date inside its window. A window never contains rows at or after
//! its stamp date's successor, so downstream consumers can treat the
//! series as tradeable without look-ahead.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use zahara_traits::{Date, Result, ReturnsTable, StatisticSeries, WindowStatistic, ZaharaError};

/// Configuration for the rolling engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingConfig {
    /// Window length in trading days.
    pub window: usize,
    /// Step between evaluation points in trading days.
    pub step: usize,
    /// Evaluate windows in parallel. Output order is identical either way.
    pub parallel: bool,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            window: 252,
            step: 21,
            parallel: false,
        }
    }
}

/// Rolling-window evaluator for a [`WindowStatistic`].
#[derive(Debug, Clone)]
pub struct RollingEngine {
    config: RollingConfig,
}

impl RollingEngine {
    /// Create an engine with the given configuration.
    #[must_use]
    pub const fn new(config: RollingConfig) -> Self {
        Self { config }
    }

    /// Evaluate `statistic` over every window of `table`.
    ///
    /// Windows are the row ranges `[i - window, i)` for
    /// `i = window, window + step, ...`; each value is stamped with the
    /// date of row `i - 1`. A window where the statistic is undefined
    /// becomes a `NaN` point; any other statistic error aborts the run.
    ///
    /// # Errors
    ///
    /// [`ZaharaError::Configuration`] on a zero window or step, or a window
    /// shorter than the statistic's minimum; [`ZaharaError::InsufficientData`]
    /// when the table has fewer rows than one window.
    pub fn run(
        &self,
        table: &ReturnsTable,
        statistic: &dyn WindowStatistic,
    ) -> Result<StatisticSeries> {
        let window = self.config.window;
        let step = self.config.step;
        if window == 0 || step == 0 {
            return Err(ZaharaError::Configuration(format!(
                "window and step must be positive, got window={window} step={step}"
            )));
        }
        if window < statistic.min_window() {
            return Err(ZaharaError::Configuration(format!(
                "window {window} is below the minimum {} for {}",
                statistic.min_window(),
                statistic.name()
            )));
        }
        if table.n_days() < window {
            return Err(ZaharaError::InsufficientData(format!(
                "{} rows available, window needs {window}",
                table.n_days()
            )));
        }

        let ends: Vec<usize> = (window..=table.n_days()).step_by(step).collect();

        let evaluate = |end: &usize| -> Result<(Date, f64)> {
            let end = *end;
            let view = table.window(end - window, window)?;
            let value = match statistic.compute(view) {
                Ok(v) => v,
                Err(ZaharaError::UndefinedStatistic(_)) => f64::NAN,
                Err(e) => return Err(e),
            };
            Ok((table.dates()[end - 1], value))
        };

        let mut points: Vec<(Date, f64)> = if self.config.parallel {
            ends.par_iter().map(evaluate).collect::<Result<Vec<_>>>()?
        } else {
            ends.iter().map(evaluate).collect::<Result<Vec<_>>>()?
        };
        // Parallel evaluation must not change the output ordering.
        points.sort_by_key(|(d, _)| *d);

        let (dates, values): (Vec<Date>, Vec<f64>) = points.into_iter().unzip();
        Ok(StatisticSeries {
            name: statistic.name().to_string(),
            dates,
            values,
            provenance: table.provenance(),
        })
    }
}
