//! Common types used throughout the Zahara framework.
//!
//! The central type is [`ReturnsTable`]: a dense, date-aligned matrix of
//! simple daily returns with explicit data provenance. Statistics engines
//! consume windows of it; classifiers and backtests consume the series
//! derived from it.

use std::collections::{BTreeMap, BTreeSet};

use ndarray::{Array2, ArrayView2, s};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ZaharaError};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A market symbol identifier, e.g. "AAPL" or "btc-usd".
pub type Symbol = String;

/// Where a dataset came from.
///
/// Every table and every derived series carries its provenance. Synthetic
/// data is only ever produced on explicit request and the tag travels all
/// the way to persisted outputs, so a simulated run can never be mistaken
/// for a live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Downloaded market data.
    Real,
    /// Generated data (simulations, null models, test fixtures).
    Synthetic,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real => write!(f, "real"),
            Self::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// Length constraints applied when building a [`ReturnsTable`] from prices.
///
/// Symbols with fewer usable observations than `min_observations` are
/// dropped with a warning rather than failing the build; the build itself
/// fails only when fewer than `min_symbols` survive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Minimum usable price observations per symbol (at least 2, one
    /// return needs two prices).
    pub min_observations: usize,
    /// Minimum number of symbols that must survive the length constraint.
    pub min_symbols: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            min_observations: 2,
            min_symbols: 2,
        }
    }
}

/// A date-aligned matrix of simple daily returns.
///
/// Rows are trading days in ascending date order, columns are symbols in
/// their original insertion order (the order is meaningful: it is the
/// deterministic tie-break for momentum ranking). The table is immutable
/// after construction.
#[derive(Debug, Clone)]
pub struct ReturnsTable {
    dates: Vec<Date>,
    symbols: Vec<Symbol>,
    returns: Array2<f64>,
    provenance: Provenance,
}

impl ReturnsTable {
    /// Build a returns table from per-symbol price series with the default
    /// length constraints.
    ///
    /// See [`Self::from_prices_with`].
    ///
    /// # Errors
    ///
    /// As for [`Self::from_prices_with`].
    pub fn from_prices(
        prices: &[(Symbol, Vec<(Date, f64)>)],
        provenance: Provenance,
    ) -> Result<Self> {
        Self::from_prices_with(prices, provenance, &TableConfig::default())
    }

    /// Build a returns table from per-symbol price series.
    ///
    /// Each series is a chronological list of `(date, close)` observations.
    /// Simple returns `p_t / p_{t-1} - 1` are computed per symbol, the
    /// symbols are inner-joined on their common dates, and rows with any
    /// missing value are dropped. Symbols with fewer usable observations
    /// than `config.min_observations` are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ZaharaError::InsufficientData`] when fewer than
    /// `config.min_symbols` symbols survive the length constraint or no
    /// common dates survive the join. Returns [`ZaharaError::InvalidData`]
    /// on non-positive prices.
    pub fn from_prices_with(
        prices: &[(Symbol, Vec<(Date, f64)>)],
        provenance: Provenance,
        config: &TableConfig,
    ) -> Result<Self> {
        let min_observations = config.min_observations.max(2);
        let min_symbols = config.min_symbols.max(2);

        let mut per_symbol: Vec<(Symbol, BTreeMap<Date, f64>)> = Vec::with_capacity(prices.len());
        for (symbol, series) in prices {
            let mut sorted: Vec<(Date, f64)> = series
                .iter()
                .copied()
                .filter(|(_, p)| p.is_finite())
                .collect();
            sorted.sort_by_key(|(d, _)| *d);
            sorted.dedup_by_key(|(d, _)| *d);

            if sorted.iter().any(|(_, p)| *p <= 0.0) {
                return Err(ZaharaError::InvalidData(format!(
                    "non-positive price for symbol {symbol}"
                )));
            }
            if sorted.len() < min_observations {
                eprintln!(
                    "Warning: skipping {symbol}: {} usable prices, need {min_observations}",
                    sorted.len()
                );
                continue;
            }

            let mut rets = BTreeMap::new();
            for pair in sorted.windows(2) {
                let (_, prev) = pair[0];
                let (date, curr) = pair[1];
                rets.insert(date, curr / prev - 1.0);
            }
            per_symbol.push((symbol.clone(), rets));
        }

        if per_symbol.len() < min_symbols {
            return Err(ZaharaError::InsufficientData(format!(
                "{} of {} symbols passed the length constraint, need at least {min_symbols}",
                per_symbol.len(),
                prices.len()
            )));
        }

        // Inner join on dates: keep only days where every symbol has a return.
        let mut common: BTreeSet<Date> = per_symbol[0].1.keys().copied().collect();
        for (_, rets) in &per_symbol[1..] {
            let dates: BTreeSet<Date> = rets.keys().copied().collect();
            common = common.intersection(&dates).copied().collect();
        }
        if common.is_empty() {
            return Err(ZaharaError::InsufficientData(
                "no common dates across symbols".to_string(),
            ));
        }

        let dates: Vec<Date> = common.into_iter().collect();
        let symbols: Vec<Symbol> = per_symbol.iter().map(|(s, _)| s.clone()).collect();

        let mut returns = Array2::zeros((dates.len(), symbols.len()));
        for (col, (_, rets)) in per_symbol.iter().enumerate() {
            for (row, date) in dates.iter().enumerate() {
                returns[[row, col]] = rets[date];
            }
        }

        Ok(Self {
            dates,
            symbols,
            returns,
            provenance,
        })
    }

    /// Build a table directly from a returns matrix.
    ///
    /// Rows must correspond to `dates` (ascending, unique) and columns to
    /// `symbols`.
    pub fn from_returns(
        dates: Vec<Date>,
        symbols: Vec<Symbol>,
        returns: Array2<f64>,
        provenance: Provenance,
    ) -> Result<Self> {
        if returns.nrows() != dates.len() || returns.ncols() != symbols.len() {
            return Err(ZaharaError::InvalidData(format!(
                "matrix is {}x{} but got {} dates and {} symbols",
                returns.nrows(),
                returns.ncols(),
                dates.len(),
                symbols.len()
            )));
        }
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ZaharaError::InvalidData(
                "dates must be strictly ascending".to_string(),
            ));
        }
        Ok(Self {
            dates,
            symbols,
            returns,
            provenance,
        })
    }

    /// Trading dates, ascending.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Symbols in insertion order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// The full returns matrix (rows = dates, columns = symbols).
    pub const fn returns(&self) -> &Array2<f64> {
        &self.returns
    }

    /// Data provenance of this table.
    pub const fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Number of trading days.
    pub fn n_days(&self) -> usize {
        self.dates.len()
    }

    /// Number of symbols.
    pub fn n_symbols(&self) -> usize {
        self.symbols.len()
    }

    /// A view of rows `[start, start + len)`.
    pub fn window(&self, start: usize, len: usize) -> Result<ArrayView2<'_, f64>> {
        let end = start + len;
        if end > self.n_days() {
            return Err(ZaharaError::InsufficientData(format!(
                "window [{start}, {end}) exceeds {} rows",
                self.n_days()
            )));
        }
        Ok(self.returns.slice(s![start..end, ..]))
    }

    /// Cumulative return per symbol over the `lookback` rows strictly
    /// before row `end` (sum of daily returns, matching the momentum
    /// ranking convention). `None` when there is not enough history.
    pub fn trailing_cumulative(&self, end: usize, lookback: usize) -> Option<Vec<f64>> {
        if lookback == 0 || end < lookback || end > self.n_days() {
            return None;
        }
        let slice = self.returns.slice(s![end - lookback..end, ..]);
        Some(slice.sum_axis(ndarray::Axis(0)).to_vec())
    }

    /// Export as a DataFrame with a `date` column and one column per symbol.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let dates: Vec<String> = self.dates.iter().map(|d| d.to_string()).collect();
        let mut columns = vec![Column::new("date".into(), dates)];
        for (col, symbol) in self.symbols.iter().enumerate() {
            let values: Vec<f64> = self.returns.column(col).to_vec();
            columns.push(Column::new(symbol.as_str().into(), values));
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// A dated series of statistic values.
///
/// Produced by the rolling engine: one value per evaluation point, stamped
/// with the last date inside the window. `NaN` encodes a point where the
/// statistic was undefined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticSeries {
    /// Name of the statistic that produced this series.
    pub name: String,
    /// Evaluation dates, ascending.
    pub dates: Vec<Date>,
    /// Statistic values; `NaN` marks an undefined point.
    pub values: Vec<f64>,
    /// Provenance inherited from the input table.
    pub provenance: Provenance,
}

impl StatisticSeries {
    /// Number of evaluation points (including undefined ones).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Finite values with their dates, in order.
    pub fn finite(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.dates
            .iter()
            .zip(&self.values)
            .filter(|(_, v)| v.is_finite())
            .map(|(d, v)| (*d, *v))
    }

    /// Finite values on dates up to and including `train_end`.
    pub fn training_values(&self, train_end: Date) -> Vec<f64> {
        self.finite()
            .filter(|(d, _)| *d <= train_end)
            .map(|(_, v)| v)
            .collect()
    }

    /// Export as a DataFrame with `date` and `value` columns.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let dates: Vec<String> = self.dates.iter().map(|d| d.to_string()).collect();
        let df = df! {
            "date" => dates,
            "value" => self.values.clone(),
        }?;
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Date {
        Date::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_prices() -> Vec<(Symbol, Vec<(Date, f64)>)> {
        vec![
            (
                "AAA".to_string(),
                vec![
                    (d("2024-01-01"), 100.0),
                    (d("2024-01-02"), 101.0),
                    (d("2024-01-03"), 99.99),
                ],
            ),
            (
                "BBB".to_string(),
                vec![
                    (d("2024-01-01"), 50.0),
                    (d("2024-01-02"), 51.0),
                    (d("2024-01-03"), 52.02),
                ],
            ),
        ]
    }

    #[test]
    fn test_from_prices_basic() {
        let table = ReturnsTable::from_prices(&sample_prices(), Provenance::Real).unwrap();
        assert_eq!(table.n_days(), 2);
        assert_eq!(table.n_symbols(), 2);
        assert_eq!(table.symbols(), &["AAA".to_string(), "BBB".to_string()]);
        assert!((table.returns()[[0, 0]] - 0.01).abs() < 1e-12);
        assert!((table.returns()[[0, 1]] - 0.02).abs() < 1e-12);
        assert_eq!(table.provenance(), Provenance::Real);
    }

    #[test]
    fn test_from_prices_inner_join_drops_missing_days() {
        let mut prices = sample_prices();
        // BBB misses 2024-01-02, so only 2024-01-03 has returns for both
        // symbols after the join... except AAA's 01-03 return exists and
        // BBB's 01-03 return spans two days. Both dates with full coverage
        // survive; here that is just 01-03.
        prices[1].1.remove(1);
        let table = ReturnsTable::from_prices(&prices, Provenance::Real).unwrap();
        assert_eq!(table.n_days(), 1);
        assert_eq!(table.dates()[0], d("2024-01-03"));
    }

    #[test]
    fn test_from_prices_too_few_symbols() {
        let prices = vec![sample_prices().remove(0)];
        let err = ReturnsTable::from_prices(&prices, Provenance::Real).unwrap_err();
        assert!(matches!(err, ZaharaError::InsufficientData(_)));
    }

    #[test]
    fn test_from_prices_drops_short_symbols() {
        let mut prices = sample_prices();
        prices.push(("CCC".to_string(), vec![(d("2024-01-01"), 10.0)]));
        // CCC has one usable price; the build continues without it
        let table = ReturnsTable::from_prices(&prices, Provenance::Real).unwrap();
        assert_eq!(table.symbols(), &["AAA".to_string(), "BBB".to_string()]);
    }

    #[test]
    fn test_min_observations_constraint() {
        let config = TableConfig {
            min_observations: 3,
            min_symbols: 2,
        };
        let mut prices = sample_prices();
        let table =
            ReturnsTable::from_prices_with(&prices, Provenance::Real, &config).unwrap();
        assert_eq!(table.n_symbols(), 2);

        // Trim AAA below the constraint: only BBB survives
        prices[0].1.truncate(2);
        let err = ReturnsTable::from_prices_with(&prices, Provenance::Real, &config).unwrap_err();
        assert!(matches!(err, ZaharaError::InsufficientData(_)));
    }

    #[test]
    fn test_from_prices_rejects_non_positive_price() {
        let mut prices = sample_prices();
        prices[0].1[1].1 = 0.0;
        let err = ReturnsTable::from_prices(&prices, Provenance::Real).unwrap_err();
        assert!(matches!(err, ZaharaError::InvalidData(_)));
    }

    #[test]
    fn test_trailing_cumulative() {
        let table = ReturnsTable::from_prices(&sample_prices(), Provenance::Real).unwrap();
        let cumulative = table.trailing_cumulative(2, 2).unwrap();
        assert!((cumulative[0] - (0.01 + (-0.01))).abs() < 1e-10);
        assert!((cumulative[1] - (0.02 + 0.02)).abs() < 1e-10);

        // Insufficient history
        assert!(table.trailing_cumulative(1, 2).is_none());
        assert!(table.trailing_cumulative(2, 0).is_none());
    }

    #[test]
    fn test_window_bounds() {
        let table = ReturnsTable::from_prices(&sample_prices(), Provenance::Real).unwrap();
        assert!(table.window(0, 2).is_ok());
        assert!(table.window(1, 2).is_err());
    }

    #[test]
    fn test_from_returns_shape_mismatch() {
        let err = ReturnsTable::from_returns(
            vec![d("2024-01-01")],
            vec!["AAA".to_string(), "BBB".to_string()],
            Array2::zeros((2, 2)),
            Provenance::Synthetic,
        )
        .unwrap_err();
        assert!(matches!(err, ZaharaError::InvalidData(_)));
    }

    #[test]
    fn test_statistic_series_training_values() {
        let series = StatisticSeries {
            name: "corr_cv".to_string(),
            dates: vec![d("2024-01-01"), d("2024-01-02"), d("2024-01-03")],
            values: vec![0.5, f64::NAN, 0.7],
            provenance: Provenance::Real,
        };
        assert_eq!(series.training_values(d("2024-01-02")), vec![0.5]);
        assert_eq!(series.training_values(d("2024-01-03")), vec![0.5, 0.7]);
        assert_eq!(series.finite().count(), 2);
    }

    #[test]
    fn test_to_dataframe() {
        let table = ReturnsTable::from_prices(&sample_prices(), Provenance::Real).unwrap();
        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
    }
}
