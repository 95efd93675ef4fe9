//! Window statistic trait.
//!
//! A `WindowStatistic` condenses one window of the returns matrix into a
//! single number describing market structure at that point in time:
//! correlation dispersion, mean pairwise correlation, the number of
//! persistent loops in the correlation geometry, and so on.

use ndarray::ArrayView2;

use crate::Result;

/// A statistic computed over a single window of returns.
///
/// Implementations must be pure functions of the window slice they are
/// given: the rolling engine guarantees the slice ends at the stamped date,
/// so a statistic that only reads its argument can never look ahead.
/// Implementations should be thread-safe (`Send + Sync`) so windows can be
/// evaluated in parallel.
///
/// # Errors
///
/// `compute` returns [`ZaharaError::UndefinedStatistic`] when the value is
/// mathematically undefined for this particular window (for example a
/// coefficient of variation over correlations whose mean is not positive).
/// The rolling engine records such points as missing and continues; any
/// other error aborts the run.
///
/// [`ZaharaError::UndefinedStatistic`]: crate::ZaharaError::UndefinedStatistic
///
/// # Example
///
/// ```
/// use ndarray::ArrayView2;
/// use zahara_traits::{Result, WindowStatistic};
///
/// struct MeanReturn;
///
/// impl WindowStatistic for MeanReturn {
///     fn name(&self) -> &str {
///         "mean_return"
///     }
///
///     fn compute(&self, window: ArrayView2<'_, f64>) -> Result<f64> {
///         Ok(window.mean().unwrap_or(f64::NAN))
///     }
///
///     fn min_window(&self) -> usize {
///         1
///     }
/// }
/// ```
pub trait WindowStatistic: Send + Sync {
    /// Name of this statistic, used in series labels and output tables.
    fn name(&self) -> &str;

    /// Compute the statistic over one window (rows = days, columns =
    /// symbols).
    fn compute(&self, window: ArrayView2<'_, f64>) -> Result<f64>;

    /// Minimum number of rows required for the statistic to be meaningful.
    fn min_window(&self) -> usize;
}
