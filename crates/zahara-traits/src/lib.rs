#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/zahara/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

//! Core types and trait definitions for the Zahara regime research
//! framework: returns tables with explicit provenance, pluggable window
//! statistics and regime rules, and the regime-to-style trading policy.

/// The version of the zahara-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod regime;
pub mod statistic;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{Result, ZaharaError};
pub use regime::{Regime, RegimePolicy, RegimeRule, RegimeSeries, TradeStyle};
pub use statistic::WindowStatistic;
pub use types::{Date, Provenance, ReturnsTable, StatisticSeries, Symbol, TableConfig};
