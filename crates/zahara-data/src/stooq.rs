//! Stooq daily price client.
//!
//! Stooq serves daily OHLCV history as plain CSV without an API key,
//! which makes it a convenient default provider for research universes.
//! Symbols use Stooq's naming, e.g. `aapl.us` or `^spx`.

use std::time::Duration;

use reqwest::Client;
use zahara_traits::{Date, Provenance};

use crate::error::{DataError, Result};
use crate::types::{PricePoint, PriceSeries};

/// Base URL for Stooq CSV downloads.
const STOOQ_BASE_URL: &str = "https://stooq.com/q/d/l/";

/// Configuration for the Stooq client.
#[derive(Debug, Clone)]
pub struct StooqConfig {
    /// Total attempts per symbol, including the first.
    pub max_attempts: usize,
    /// Minimum number of symbols that must survive a universe fetch.
    pub min_symbols: usize,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for StooqConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_symbols: 2,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Client for Stooq daily price history.
#[derive(Debug, Clone)]
pub struct StooqClient {
    client: Client,
    config: StooqConfig,
}

impl StooqClient {
    /// Create a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: StooqConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Create a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_defaults() -> Result<Self> {
        Self::new(StooqConfig::default())
    }

    /// Build the CSV download URL for one symbol and date range.
    fn url(&self, symbol: &str, start: Date, end: Date) -> String {
        format!(
            "{STOOQ_BASE_URL}?s={}&d1={}&d2={}&i=d",
            symbol.to_lowercase(),
            start.format("%Y%m%d"),
            end.format("%Y%m%d"),
        )
    }

    /// Fetch daily closes for one symbol with bounded retries.
    ///
    /// # Errors
    ///
    /// [`DataError::NoData`] when the provider has nothing for the symbol
    /// (not retried); [`DataError::RetriesExhausted`] when every attempt
    /// failed on transport or parsing.
    pub async fn fetch_daily(&self, symbol: &str, start: Date, end: Date) -> Result<PriceSeries> {
        let url = self.url(symbol, start, end);
        let mut last_error = String::new();

        for attempt in 1..=self.config.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(Duration::from_millis(200 * attempt as u64)).await;
            }
            match self.try_fetch(symbol, &url).await {
                Ok(series) => return Ok(series),
                // An explicit empty answer will not improve on retry
                Err(DataError::NoData(s)) => return Err(DataError::NoData(s)),
                Err(e) => last_error = e.to_string(),
            }
        }

        Err(DataError::RetriesExhausted {
            symbol: symbol.to_string(),
            attempts: self.config.max_attempts,
            last_error,
        })
    }

    async fn try_fetch(&self, symbol: &str, url: &str) -> Result<PriceSeries> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(DataError::Parse(format!(
                "HTTP {} for {symbol}",
                response.status()
            )));
        }
        let body = response.text().await?;
        let points = parse_csv(symbol, &body)?;
        Ok(PriceSeries {
            symbol: symbol.to_string(),
            points,
            provenance: Provenance::Real,
        })
    }

    /// Fetch a whole universe, skipping symbols that fail.
    ///
    /// Failures are reported on stderr and the symbol dropped; only when
    /// fewer than `min_symbols` survive does the fetch as a whole fail.
    ///
    /// # Errors
    ///
    /// [`DataError::InsufficientUniverse`] when too few symbols survive.
    pub async fn fetch_universe(
        &self,
        symbols: &[String],
        start: Date,
        end: Date,
    ) -> Result<Vec<PriceSeries>> {
        let mut series = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            match self.fetch_daily(symbol, start, end).await {
                Ok(s) => series.push(s),
                Err(e) => {
                    eprintln!("Warning: skipping {symbol}: {e}");
                }
            }
        }
        if series.len() < self.config.min_symbols {
            return Err(DataError::InsufficientUniverse {
                got: series.len(),
                requested: symbols.len(),
                min: self.config.min_symbols,
            });
        }
        Ok(series)
    }
}

/// Parse Stooq's daily CSV (`Date,Open,High,Low,Close,Volume`).
fn parse_csv(symbol: &str, body: &str) -> Result<Vec<PricePoint>> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with("No data") {
        return Err(DataError::NoData(symbol.to_string()));
    }

    let mut points = Vec::new();
    for (lineno, line) in trimmed.lines().enumerate() {
        if lineno == 0 {
            if !line.starts_with("Date") {
                return Err(DataError::Parse(format!(
                    "unexpected header for {symbol}: {line}"
                )));
            }
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 5 {
            return Err(DataError::Parse(format!(
                "line {} for {symbol} has {} fields",
                lineno + 1,
                fields.len()
            )));
        }
        let date = Date::parse_from_str(fields[0], "%Y-%m-%d")
            .map_err(|e| DataError::Parse(format!("bad date {:?} for {symbol}: {e}", fields[0])))?;
        let close: f64 = fields[4]
            .parse()
            .map_err(|e| DataError::Parse(format!("bad close {:?} for {symbol}: {e}", fields[4])))?;
        points.push(PricePoint { date, close });
    }
    if points.is_empty() {
        return Err(DataError::NoData(symbol.to_string()));
    }
    points.sort_by_key(|p| p.date);
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "Date,Open,High,Low,Close,Volume\n\
2024-01-02,100.0,102.0,99.0,101.5,1000000\n\
2024-01-03,101.5,103.0,101.0,102.25,900000\n";

    #[test]
    fn test_parse_csv() {
        let points = parse_csv("aapl.us", SAMPLE_CSV).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].close, 101.5);
        assert_eq!(
            points[1].date,
            Date::parse_from_str("2024-01-03", "%Y-%m-%d").unwrap()
        );
    }

    #[test]
    fn test_parse_csv_no_data() {
        assert!(matches!(
            parse_csv("xyz.us", "No data"),
            Err(DataError::NoData(_))
        ));
        assert!(matches!(parse_csv("xyz.us", ""), Err(DataError::NoData(_))));
    }

    #[test]
    fn test_parse_csv_bad_header() {
        assert!(matches!(
            parse_csv("xyz.us", "<html>error</html>"),
            Err(DataError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_csv_bad_row() {
        let body = "Date,Open,High,Low,Close,Volume\n2024-01-02,1,2\n";
        assert!(matches!(parse_csv("xyz.us", body), Err(DataError::Parse(_))));
    }

    #[test]
    fn test_url_format() {
        let client = StooqClient::from_defaults().unwrap();
        let start = Date::parse_from_str("2020-01-01", "%Y-%m-%d").unwrap();
        let end = Date::parse_from_str("2024-12-31", "%Y-%m-%d").unwrap();
        let url = client.url("AAPL.US", start, end);
        assert_eq!(
            url,
            "https://stooq.com/q/d/l/?s=aapl.us&d1=20200101&d2=20241231&i=d"
        );
    }
}
