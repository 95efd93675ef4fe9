//! Regime threshold classifiers for the Zahara framework.
//!
//! Two implementations of the `RegimeRule` trait:
//! - [`StaticPercentileRule`]: a fixed threshold trained once on a
//!   historical range (`Stressed` / `Calm`)
//! - [`AdaptiveZScoreRule`]: a rolling z-score band that adapts to the
//!   statistic's recent history (`HighStress` / `LowStress` / `Normal`)
//!
//! Both rules label every date of a statistic series or leave it
//! unlabelled; they never consume information from later dates.

pub mod adaptive_zscore;
pub mod static_percentile;

// Re-export main types
pub use adaptive_zscore::{AdaptiveZScoreConfig, AdaptiveZScoreRule};
pub use static_percentile::{StaticPercentileConfig, StaticPercentileRule};
