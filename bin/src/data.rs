//! Data loading and CSV output utilities for the zahara CLI.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{Datelike, Duration, Weekday};
use polars::prelude::{CsvReadOptions, CsvWriter, DataFrame, SerReader, SerWriter};
use zahara_data::{PriceSeries, StooqClient, SyntheticConfig, generate_universe};
use zahara_eval::StrategyReturns;
use zahara_traits::{Date, Provenance, Result, ZaharaError};

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<Date> {
    Date::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|e| ZaharaError::InvalidDate(format!("{date_str}: {e}")))
}

/// Load a price universe for the given symbols and date range.
///
/// With `synthetic` set, a seeded universe covering the same trading
/// calendar is generated instead of downloading; the symbol list then
/// only determines the universe size.
pub(crate) async fn load_universe(
    symbols: &[String],
    start: Date,
    end: Date,
    synthetic: bool,
    seed: u64,
) -> Result<Vec<PriceSeries>> {
    if end <= start {
        return Err(ZaharaError::InvalidDate(format!(
            "end {end} must be after start {start}"
        )));
    }

    if synthetic {
        let config = SyntheticConfig {
            n_symbols: if symbols.is_empty() { 8 } else { symbols.len() },
            n_days: trading_days_between(start, end),
            start,
            seed,
            ..Default::default()
        };
        return Ok(generate_universe(&config)?);
    }

    let client = StooqClient::from_defaults()?;
    Ok(client.fetch_universe(symbols, start, end).await?)
}

/// Number of weekdays in `[start, end]`, the synthetic calendar length
/// matching a download over the same range.
fn trading_days_between(start: Date, end: Date) -> usize {
    let mut count = 0;
    let mut date = start;
    while date <= end {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            count += 1;
        }
        date += Duration::days(1);
    }
    count
}

/// Write a DataFrame as `<dir>/<name>`, creating the directory if needed.
pub(crate) fn write_csv(df: &mut DataFrame, dir: &Path, name: &str) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    let file = File::create(&path)?;
    CsvWriter::new(file).finish(df)?;
    Ok(path)
}

/// Read a strategy CSV written by `zahara backtest` back into a return
/// series. The strategy name is taken from the file stem.
pub(crate) fn read_strategy_csv(path: &Path) -> anyhow::Result<StrategyReturns> {
    let name = path
        .file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let dates: Vec<Date> = df
        .column("date")?
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|d| {
            d.ok_or_else(|| anyhow::anyhow!("{}: null date", path.display()))
                .and_then(|s| Ok(parse_date(s)?))
        })
        .collect::<anyhow::Result<_>>()?;

    let returns: Vec<f64> = df
        .column("net_return")?
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|v| v.ok_or_else(|| anyhow::anyhow!("{}: null net_return", path.display())))
        .collect::<anyhow::Result<_>>()?;

    // Any synthetic row taints the whole series
    let provenance = df
        .column("provenance")?
        .as_materialized_series()
        .str()?
        .into_iter()
        .try_fold(Provenance::Real, |acc, p| match p {
            Some("real") => Ok(acc),
            Some("synthetic") => Ok(Provenance::Synthetic),
            other => Err(anyhow::anyhow!(
                "{}: unknown provenance {other:?}",
                path.display()
            )),
        })?;

    Ok(StrategyReturns {
        name,
        dates,
        returns,
        provenance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("not-a-date").is_err());
    }

    #[test]
    fn test_trading_days_between() {
        // 2024-01-01 is a Monday; two full weeks contain ten weekdays
        let start = parse_date("2024-01-01").unwrap();
        let end = parse_date("2024-01-14").unwrap();
        assert_eq!(trading_days_between(start, end), 10);
    }

    #[test]
    fn test_strategy_csv_round_trip() {
        let dir = std::env::temp_dir().join("zahara-cli-test");
        let mut df = polars::df! {
            "date" => ["2024-01-02", "2024-01-03"],
            "net_return" => [0.01, -0.005],
            "provenance" => ["synthetic", "synthetic"],
        }
        .unwrap();
        let path = write_csv(&mut df, &dir, "variant.csv").unwrap();

        let strategy = read_strategy_csv(&path).unwrap();
        assert_eq!(strategy.name, "variant");
        assert_eq!(strategy.dates.len(), 2);
        assert_eq!(strategy.returns, vec![0.01, -0.005]);
        assert_eq!(strategy.provenance, Provenance::Synthetic);
    }
}
