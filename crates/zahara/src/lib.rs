#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/zahara/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # zahara
//!
//! Rolling-window regime research framework.
//!
//! zahara is an umbrella crate that re-exports all zahara sub-crates for
//! convenience. The pipeline it implements:
//!
//! 1. **Data** — build a returns table from downloaded or synthetic
//!    prices, with explicit provenance
//! 2. **Statistics** — condense rolling windows into a market-structure
//!    statistic without look-ahead
//! 3. **Regimes** — classify each evaluation point with a static or
//!    adaptive threshold rule
//! 4. **Backtest** — trade momentum baskets in the direction the regime
//!    policy dictates, net of costs
//! 5. **Evaluation** — summarize, compare, and ensemble the strategies

/// Version information for the zahara crate.
///
/// This constant contains the current version of zahara as specified in
/// Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Traits and Types
// ============================================================================

/// Core type and trait definitions.
///
/// Re-exports the foundational pieces of the zahara API:
///
/// - [`WindowStatistic`] - a statistic over one window of returns
/// - [`RegimeRule`] - a classifier from statistic series to regime labels
/// - [`ReturnsTable`], [`StatisticSeries`], [`RegimeSeries`] - the data
///   flowing between pipeline stages
/// - [`RegimePolicy`] - the map from regime labels to trading styles
pub mod traits {
    pub use zahara_traits::*;
}

// Re-export core traits and types at top level for convenience
pub use zahara_traits::{
    Date, Provenance, Regime, RegimePolicy, RegimeRule, RegimeSeries, Result, ReturnsTable,
    StatisticSeries, Symbol, TradeStyle, WindowStatistic, ZaharaError,
};

// ============================================================================
// Rolling Statistics
// ============================================================================

/// Rolling-window statistics engine and the statistics themselves.
///
/// - **CorrelationCv** / **MeanCorrelation**: correlation structure of a
///   window
/// - **LoopCount** / **LifetimeCv**: persistent-homology summaries behind
///   the pluggable `PersistenceBackend` trait
/// - **RollingEngine**: walks a returns table, stamping each value with
///   the last date inside its window
/// - **granger** / **nullmodel**: validation tools for whether a
///   statistic carries real structure
pub mod stats {
    pub use zahara_stats::*;
}

// ============================================================================
// Regime Classification
// ============================================================================

/// Regime threshold classifiers.
///
/// - **StaticPercentileRule**: threshold trained once on a historical
///   range, labels `Stressed` / `Calm`
/// - **AdaptiveZScoreRule**: rolling z-score band, labels `HighStress` /
///   `LowStress` / `Normal`
pub mod regime {
    pub use zahara_regime::*;
}

// ============================================================================
// Backtesting and Evaluation
// ============================================================================

/// Backtesting, performance metrics, and strategy comparison.
///
/// - **Backtest**: the regime-conditioned long/short basket strategy
/// - **PerformanceSummary**: total/annualized return, Sharpe, volatility,
///   max drawdown, win rate, Calmar
/// - **compare** / **compare_outcomes**: common-date alignment, Sharpe
///   ranking, return correlation, and the equal-weight ensemble with
///   per-variant error isolation
pub mod eval {
    pub use zahara_eval::*;
}

// ============================================================================
// Data Providers
// ============================================================================

/// Price retrieval and synthetic data generation.
///
/// - **StooqClient**: daily closes from Stooq with bounded retries and
///   skip-on-failure universe fetching
/// - **generate_universe**: seeded one-factor simulator, always tagged
///   `Provenance::Synthetic`
pub mod data {
    pub use zahara_data::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use zahara::prelude::*;
/// ```
///
/// This brings into scope the core traits ([`WindowStatistic`],
/// [`RegimeRule`]), the pipeline types ([`ReturnsTable`],
/// [`StatisticSeries`], [`RegimeSeries`], [`RegimePolicy`]), and the
/// error types ([`Result`], [`ZaharaError`]).
pub mod prelude {
    pub use crate::{
        Date, Provenance, Regime, RegimePolicy, RegimeRule, RegimeSeries, Result, ReturnsTable,
        StatisticSeries, Symbol, TradeStyle, WindowStatistic, ZaharaError,
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
    }

    #[test]
    fn test_re_exports() {
        fn _accept_statistic(_s: &dyn WindowStatistic) {}
        fn _accept_rule(_r: &dyn RegimeRule) {}

        // If this compiles, re-exports are working
    }

    #[test]
    fn test_error_types() {
        let _result: Result<()> = Ok(());
        let _error: ZaharaError = ZaharaError::InvalidData("test".to_string());
    }
}
