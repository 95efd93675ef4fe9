//! Rolling-window market structure statistics for the Zahara framework.
//!
//! This crate provides:
//! - Correlation structure of a returns window (matrix, upper triangle,
//!   correlation-to-distance map)
//! - Window statistics: correlation CV, mean correlation, and the
//!   H1-based topology statistics behind a pluggable [`PersistenceBackend`]
//! - The rolling engine that walks a returns table and produces a dated,
//!   look-ahead-free statistic series
//! - Granger causality and a null-model shuffle test for validating that
//!   a statistic measures real cross-asset structure
//!
//! # Example
//!
//! ```rust,ignore
//! use zahara_stats::{CorrelationCv, RollingConfig, RollingEngine};
//!
//! let engine = RollingEngine::new(RollingConfig::default());
//! let series = engine.run(&returns, &CorrelationCv::default())?;
//! ```

pub mod correlation;
pub mod cv;
pub mod granger;
pub mod nullmodel;
pub mod rolling;
pub mod topology;

// Re-export main types
pub use correlation::{correlation_matrix, correlation_to_distance, upper_triangle};
pub use cv::{CorrelationCv, CorrelationCvConfig, MeanCorrelation};
pub use granger::{GrangerResult, granger_causality};
pub use nullmodel::{NullModel, NullModelConfig, NullModelResult, shuffle_columns};
pub use rolling::{RollingConfig, RollingEngine};
pub use topology::{LifetimeCv, LoopCount, PersistenceBackend, PersistencePair, TopologyConfig};
