//! Price series types shared by the retrieval and generation paths.

use serde::{Deserialize, Serialize};
use zahara_traits::{Date, Provenance, ReturnsTable, Symbol};

/// One daily close observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date.
    pub date: Date,
    /// Closing price.
    pub close: f64,
}

/// A chronological series of daily closes for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    /// The symbol these prices belong to.
    pub symbol: Symbol,
    /// Daily observations, ascending by date.
    pub points: Vec<PricePoint>,
    /// Where the prices came from.
    pub provenance: Provenance,
}

impl PriceSeries {
    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series holds no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First observation date, if any.
    pub fn first_date(&self) -> Option<Date> {
        self.points.first().map(|p| p.date)
    }

    /// Last observation date, if any.
    pub fn last_date(&self) -> Option<Date> {
        self.points.last().map(|p| p.date)
    }
}

/// Build a returns table from a set of price series.
///
/// The table's provenance is `Real` only when every input series is real;
/// a single synthetic series makes the whole table synthetic.
///
/// # Errors
///
/// Propagates [`zahara_traits::ZaharaError`] from table construction.
pub fn to_returns_table(series: &[PriceSeries]) -> zahara_traits::Result<ReturnsTable> {
    let provenance = if series.iter().all(|s| s.provenance == Provenance::Real) {
        Provenance::Real
    } else {
        Provenance::Synthetic
    };
    let prices: Vec<(Symbol, Vec<(Date, f64)>)> = series
        .iter()
        .map(|s| {
            (
                s.symbol.clone(),
                s.points.iter().map(|p| (p.date, p.close)).collect(),
            )
        })
        .collect();
    ReturnsTable::from_prices(&prices, provenance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Date {
        Date::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(symbol: &str, provenance: Provenance) -> PriceSeries {
        PriceSeries {
            symbol: symbol.to_string(),
            points: vec![
                PricePoint { date: d("2024-01-01"), close: 100.0 },
                PricePoint { date: d("2024-01-02"), close: 101.0 },
                PricePoint { date: d("2024-01-03"), close: 102.0 },
            ],
            provenance,
        }
    }

    #[test]
    fn test_to_returns_table_real() {
        let table = to_returns_table(&[
            series("a.us", Provenance::Real),
            series("b.us", Provenance::Real),
        ])
        .unwrap();
        assert_eq!(table.provenance(), Provenance::Real);
        assert_eq!(table.n_days(), 2);
    }

    #[test]
    fn test_synthetic_taints_the_table() {
        let table = to_returns_table(&[
            series("a.us", Provenance::Real),
            series("sim", Provenance::Synthetic),
        ])
        .unwrap();
        assert_eq!(table.provenance(), Provenance::Synthetic);
    }

    #[test]
    fn test_series_accessors() {
        let s = series("a.us", Provenance::Real);
        assert_eq!(s.len(), 3);
        assert_eq!(s.first_date(), Some(d("2024-01-01")));
        assert_eq!(s.last_date(), Some(d("2024-01-03")));
    }
}
