//! Topology statistics over the correlation geometry of a window.
//!
//! The persistent-homology computation itself lives behind the
//! [`PersistenceBackend`] trait: the framework hands a backend a square
//! distance matrix and gets back the H1 (loop) persistence pairs. The
//! statistics here only summarize those pairs.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use zahara_traits::stats::{mean, sample_std};
use zahara_traits::{Result, WindowStatistic, ZaharaError};

use crate::correlation::{correlation_matrix, correlation_to_distance};

/// One H1 persistence feature: a loop that appears at `birth` and fills in
/// at `death` as the distance scale grows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersistencePair {
    /// Distance scale at which the loop appears.
    pub birth: f64,
    /// Distance scale at which the loop disappears.
    pub death: f64,
}

impl PersistencePair {
    /// How long the loop persists across scales.
    #[must_use]
    pub fn lifetime(&self) -> f64 {
        self.death - self.birth
    }
}

/// Computes H1 persistence pairs of a point cloud given by a distance
/// matrix.
///
/// This is the seam to an external persistent-homology library. The matrix
/// is square, symmetric, with a zero diagonal; entries are the pairwise
/// distances `sqrt(2(1 - rho))` derived from correlations.
pub trait PersistenceBackend: Send + Sync {
    /// H1 (loop) persistence pairs for the given distance matrix.
    fn h1_pairs(&self, distances: &Array2<f64>) -> Result<Vec<PersistencePair>>;
}

/// Configuration shared by the topology statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Features with a lifetime at or below this are treated as noise.
    pub min_lifetime: f64,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self { min_lifetime: 0.0 }
    }
}

/// Number of significant H1 loops in the correlation geometry of a window.
///
/// More loops mean a richer, more fragmented dependence structure; loop
/// counts collapsing toward zero historically coincide with crowded,
/// stressed markets.
#[derive(Debug, Clone)]
pub struct LoopCount<B> {
    backend: B,
    config: TopologyConfig,
}

impl<B: PersistenceBackend> LoopCount<B> {
    /// Create the statistic with the given backend and configuration.
    #[must_use]
    pub const fn new(backend: B, config: TopologyConfig) -> Self {
        Self { backend, config }
    }
}

impl<B: PersistenceBackend> WindowStatistic for LoopCount<B> {
    fn name(&self) -> &str {
        "h1_loop_count"
    }

    fn compute(&self, window: ArrayView2<'_, f64>) -> Result<f64> {
        let pairs = window_pairs(&self.backend, window)?;
        let count = pairs
            .iter()
            .filter(|p| p.lifetime() > self.config.min_lifetime)
            .count();
        Ok(count as f64)
    }

    fn min_window(&self) -> usize {
        2
    }
}

/// Coefficient of variation of H1 feature lifetimes.
///
/// Undefined when the window has no significant loops or their mean
/// lifetime is not positive.
#[derive(Debug, Clone)]
pub struct LifetimeCv<B> {
    backend: B,
    config: TopologyConfig,
}

impl<B: PersistenceBackend> LifetimeCv<B> {
    /// Create the statistic with the given backend and configuration.
    #[must_use]
    pub const fn new(backend: B, config: TopologyConfig) -> Self {
        Self { backend, config }
    }
}

impl<B: PersistenceBackend> WindowStatistic for LifetimeCv<B> {
    fn name(&self) -> &str {
        "h1_lifetime_cv"
    }

    fn compute(&self, window: ArrayView2<'_, f64>) -> Result<f64> {
        let pairs = window_pairs(&self.backend, window)?;
        let lifetimes: Vec<f64> = pairs
            .iter()
            .map(PersistencePair::lifetime)
            .filter(|l| *l > self.config.min_lifetime)
            .collect();
        if lifetimes.is_empty() {
            return Err(ZaharaError::UndefinedStatistic(
                "no significant H1 features in window".to_string(),
            ));
        }
        let m = mean(&lifetimes);
        if m <= 0.0 {
            return Err(ZaharaError::UndefinedStatistic(format!(
                "mean H1 lifetime {m:.4} is not positive"
            )));
        }
        Ok(sample_std(&lifetimes) / m)
    }

    fn min_window(&self) -> usize {
        2
    }
}

fn window_pairs<B: PersistenceBackend>(
    backend: &B,
    window: ArrayView2<'_, f64>,
) -> Result<Vec<PersistencePair>> {
    if window.ncols() < 2 {
        return Err(ZaharaError::UndefinedStatistic(format!(
            "topology needs at least 2 symbols, got {}",
            window.ncols()
        )));
    }
    let corr = correlation_matrix(window);
    if corr.iter().any(|v| !v.is_finite()) {
        return Err(ZaharaError::UndefinedStatistic(
            "degenerate correlation matrix (zero-variance symbol)".to_string(),
        ));
    }
    backend.h1_pairs(&correlation_to_distance(&corr))
}
