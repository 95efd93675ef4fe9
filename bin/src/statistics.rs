//! Statistic, rule, and policy factories for the zahara CLI.

use zahara_regime::{
    AdaptiveZScoreConfig, AdaptiveZScoreRule, StaticPercentileConfig, StaticPercentileRule,
};
use zahara_stats::{CorrelationCv, MeanCorrelation};
use zahara_traits::{Date, RegimePolicy, RegimeRule, Result, TradeStyle, WindowStatistic, ZaharaError};

/// Create a window statistic by name.
pub(crate) fn create_statistic(name: &str) -> Result<Box<dyn WindowStatistic>> {
    match name {
        "corr-cv" | "correlation-cv" => Ok(Box::new(CorrelationCv::default())),
        "mean-rho" | "mean-correlation" => Ok(Box::new(MeanCorrelation)),
        _ => Err(ZaharaError::Configuration(format!(
            "unknown statistic '{name}'; use 'corr-cv' or 'mean-rho'"
        ))),
    }
}

/// Create a regime rule by name.
///
/// `percentile` and `train_end` configure the static rule; `window` and
/// `z_threshold` the adaptive one.
pub(crate) fn create_rule(
    name: &str,
    percentile: f64,
    train_end: Date,
    window: usize,
    z_threshold: f64,
) -> Result<Box<dyn RegimeRule>> {
    match name {
        "static" | "static-percentile" => Ok(Box::new(StaticPercentileRule::new(
            StaticPercentileConfig {
                percentile,
                train_end,
            },
        ))),
        "adaptive" | "adaptive-zscore" => Ok(Box::new(AdaptiveZScoreRule::new(
            AdaptiveZScoreConfig {
                window,
                z_threshold,
            },
        ))),
        _ => Err(ZaharaError::Configuration(format!(
            "unknown rule '{name}'; use 'static' or 'adaptive'"
        ))),
    }
}

/// Create a regime-to-style policy by name.
pub(crate) fn create_policy(name: &str) -> Result<RegimePolicy> {
    match name {
        "hybrid" => Ok(RegimePolicy::hybrid()),
        "momentum" => Ok(RegimePolicy::constant(TradeStyle::Momentum)),
        "mean-reversion" => Ok(RegimePolicy::constant(TradeStyle::MeanReversion)),
        _ => Err(ZaharaError::Configuration(format!(
            "unknown policy '{name}'; use 'hybrid', 'momentum', or 'mean-reversion'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_statistics() {
        assert_eq!(create_statistic("corr-cv").unwrap().name(), "correlation_cv");
        assert_eq!(
            create_statistic("mean-rho").unwrap().name(),
            "mean_correlation"
        );
        assert!(create_statistic("loop-count").is_err());
    }

    #[test]
    fn test_create_rules() {
        let train_end = Date::from_ymd_opt(2022, 1, 1).unwrap();
        assert!(create_rule("static", 75.0, train_end, 60, 1.0).is_ok());
        assert!(create_rule("adaptive", 75.0, train_end, 60, 1.0).is_ok());
        assert!(create_rule("hmm", 75.0, train_end, 60, 1.0).is_err());
    }

    #[test]
    fn test_create_policies() {
        assert!(create_policy("hybrid").is_ok());
        assert!(create_policy("momentum").is_ok());
        assert!(create_policy("mean-reversion").is_ok());
        assert!(create_policy("pairs").is_err());
    }
}
