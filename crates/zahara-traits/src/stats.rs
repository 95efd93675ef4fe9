//! Statistical utility functions shared across the framework.

use crate::error::{Result, ZaharaError};

/// Minimum threshold for standard deviation to avoid division by zero.
/// Values below this threshold are treated as zero variance.
pub const MIN_STD_THRESHOLD: f64 = 1e-10;

/// Arithmetic mean. `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (N-1 denominator). Zero for fewer than two
/// values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Percentile by linear interpolation at fractional rank `p/100 * (n + 1)`,
/// taken as a zero-based position into the sorted sample and clamped to its
/// ends. With this convention the 75th percentile of `1..=10` is 9.25.
///
/// # Errors
///
/// Returns [`ZaharaError::Configuration`] for an empty sample or a
/// percentile outside `(0, 100)`.
pub fn percentile(values: &[f64], p: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&p) || p == 0.0 || p == 100.0 {
        return Err(ZaharaError::Configuration(format!(
            "percentile must be in (0, 100), got {p}"
        )));
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Err(ZaharaError::Configuration(
            "percentile of an empty sample".to_string(),
        ));
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let h = (p / 100.0) * (n as f64 + 1.0);
    if h <= 1.0 {
        return Ok(sorted[0]);
    }
    if h >= n as f64 {
        return Ok(sorted[n - 1]);
    }
    let lo = h.floor() as usize;
    let frac = h - h.floor();
    Ok(sorted[lo - 1] + frac * (sorted[lo] - sorted[lo - 1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((mean(&values) - 3.0).abs() < 1e-12);
        assert!((sample_std(&values) - (2.5_f64).sqrt()).abs() < 1e-12);

        assert!(mean(&[]).is_nan());
        assert_eq!(sample_std(&[1.0]), 0.0);
    }

    #[test]
    fn test_percentile_interpolation() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let p75 = percentile(&values, 75.0).unwrap();
        assert!((p75 - 9.25).abs() < 1e-12);

        let p50 = percentile(&values, 50.0).unwrap();
        assert!((p50 - 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_clamps_at_ends() {
        let values = [1.0, 2.0, 3.0];
        // rank 0.95 * 4 = 3.8 >= n, clamps to the maximum
        assert_eq!(percentile(&values, 95.0).unwrap(), 3.0);
        // rank 0.05 * 4 = 0.2 <= 1, clamps to the minimum
        assert_eq!(percentile(&values, 5.0).unwrap(), 1.0);
    }

    #[test]
    fn test_percentile_ignores_non_finite() {
        let values = [1.0, f64::NAN, 2.0, 3.0];
        let p50 = percentile(&values, 50.0).unwrap();
        assert!((p50 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_rejects_bad_inputs() {
        assert!(percentile(&[], 50.0).is_err());
        assert!(percentile(&[1.0], 0.0).is_err());
        assert!(percentile(&[1.0], 100.0).is_err());
        assert!(percentile(&[1.0], 101.0).is_err());
    }

    #[test]
    fn test_percentile_unsorted_input() {
        let values = [3.0, 1.0, 2.0];
        assert!((percentile(&values, 50.0).unwrap() - 2.0).abs() < 1e-12);
    }
}
