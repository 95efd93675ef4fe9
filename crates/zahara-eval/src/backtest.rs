//! Regime-conditioned long/short basket backtest.
//!
//! Each day the policy turns the prevailing regime label into a trading
//! style, trailing momentum ranks the universe, and the strategy holds
//! equal-weight winner/loser baskets in the direction the style dictates.
//! Transaction costs are charged on rebalance steps.

use std::cmp::Ordering;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use zahara_traits::{
    Date, Provenance, Regime, RegimePolicy, RegimeSeries, Result, ReturnsTable, Symbol,
    TradeStyle, ZaharaError,
};

use crate::metrics::PerformanceSummary;

/// Backtesting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Trailing window for the momentum ranking, in trading days.
    pub momentum_lookback: usize,
    /// Target number of symbols per basket. The effective size is capped
    /// at half the universe so the baskets stay disjoint.
    pub basket_size: usize,
    /// Charge transaction costs every this many traded days.
    pub rebalance_frequency: usize,
    /// Cost per traded position per rebalance, as a return fraction.
    pub cost_per_trade: f64,
    /// Trading periods per year (252 for equities, 365 for crypto).
    pub periods_per_year: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            momentum_lookback: 20,
            basket_size: 5,
            rebalance_frequency: 5,
            cost_per_trade: 0.0005,
            periods_per_year: 252.0,
        }
    }
}

/// One day of the backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRecord {
    /// Trading date.
    pub date: Date,
    /// Regime label in force on this day (forward-filled from the last
    /// evaluation point), if any.
    pub regime: Option<Regime>,
    /// Style the policy chose for this day.
    pub style: TradeStyle,
    /// Long basket held on this day.
    pub long: Vec<Symbol>,
    /// Short basket held on this day.
    pub short: Vec<Symbol>,
    /// Strategy return before costs.
    pub gross_return: f64,
    /// Transaction cost charged on this day.
    pub cost: f64,
    /// `gross_return - cost`.
    pub net_return: f64,
}

/// Full output of a backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Strategy label for comparisons and output tables.
    pub strategy: String,
    /// Provenance inherited from the returns table.
    pub provenance: Provenance,
    /// Per-day records over the whole calendar of the input table.
    pub days: Vec<DayRecord>,
    /// Performance summary of the net daily returns.
    pub summary: PerformanceSummary,
    /// Sum of all transaction costs charged.
    pub total_costs: f64,
    /// Number of days with a non-empty position.
    pub n_traded_days: usize,
}

impl BacktestResult {
    /// Net daily returns, one per calendar day of the input table.
    pub fn returns(&self) -> Vec<f64> {
        self.days.iter().map(|d| d.net_return).collect()
    }

    /// Trading dates matching [`Self::returns`].
    pub fn dates(&self) -> Vec<Date> {
        self.days.iter().map(|d| d.date).collect()
    }

    /// Export as a DataFrame with one row per day.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let dates: Vec<String> = self.days.iter().map(|d| d.date.to_string()).collect();
        let regimes: Vec<String> = self
            .days
            .iter()
            .map(|d| d.regime.map_or_else(String::new, |r| r.to_string()))
            .collect();
        let styles: Vec<String> = self.days.iter().map(|d| d.style.to_string()).collect();
        let gross: Vec<f64> = self.days.iter().map(|d| d.gross_return).collect();
        let costs: Vec<f64> = self.days.iter().map(|d| d.cost).collect();
        let net: Vec<f64> = self.days.iter().map(|d| d.net_return).collect();
        let provenance = vec![self.provenance.to_string(); self.days.len()];
        let df = df! {
            "date" => dates,
            "regime" => regimes,
            "style" => styles,
            "gross_return" => gross,
            "cost" => costs,
            "net_return" => net,
            "provenance" => provenance,
        }?;
        Ok(df)
    }
}

/// Regime-conditioned backtest engine.
#[derive(Debug, Clone, Default)]
pub struct Backtest {
    config: BacktestConfig,
}

impl Backtest {
    /// Create a backtest with the given configuration.
    #[must_use]
    pub const fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    /// Run the strategy over the full calendar of `table`.
    ///
    /// Regime labels are forward-filled from their evaluation dates: a day
    /// trades under the most recent evaluation point at or before it, and
    /// an unlabelled evaluation point forces flat until the next labelled
    /// one. Days before the first evaluation point, days without enough
    /// momentum history, and days the policy maps to [`TradeStyle::Flat`]
    /// hold no positions and return exactly zero.
    ///
    /// # Errors
    ///
    /// [`ZaharaError::Configuration`] on zero lookback, basket size, or
    /// rebalance frequency, or a negative cost.
    pub fn run(
        &self,
        table: &ReturnsTable,
        regimes: &RegimeSeries,
        policy: &RegimePolicy,
        strategy: &str,
    ) -> Result<BacktestResult> {
        let cfg = &self.config;
        if cfg.momentum_lookback == 0 || cfg.basket_size == 0 || cfg.rebalance_frequency == 0 {
            return Err(ZaharaError::Configuration(format!(
                "lookback, basket size, and rebalance frequency must be positive, got {} / {} / {}",
                cfg.momentum_lookback, cfg.basket_size, cfg.rebalance_frequency
            )));
        }
        if cfg.cost_per_trade < 0.0 || !cfg.cost_per_trade.is_finite() {
            return Err(ZaharaError::Configuration(format!(
                "cost_per_trade must be a non-negative fraction, got {}",
                cfg.cost_per_trade
            )));
        }

        // Forward-fill labels onto the daily calendar with a single cursor
        // walk over the date-sorted evaluation points. An unlabelled point
        // clears the prevailing label: those days trade flat instead of
        // under a stale regime.
        let mut points: Vec<(Date, Option<Regime>)> = regimes
            .dates
            .iter()
            .zip(&regimes.labels)
            .map(|(d, l)| (*d, *l))
            .collect();
        points.sort_by_key(|(d, _)| *d);

        let mut days = Vec::with_capacity(table.n_days());
        let mut cursor = 0usize;
        let mut current: Option<Regime> = None;
        let mut traded_days = 0usize;
        let mut total_costs = 0.0;

        for (i, date) in table.dates().iter().enumerate() {
            while cursor < points.len() && points[cursor].0 <= *date {
                current = points[cursor].1;
                cursor += 1;
            }
            let style = policy.style_for(current);

            let (long, short) = if style == TradeStyle::Flat {
                (Vec::new(), Vec::new())
            } else {
                self.baskets(table, i, style)
            };

            let gross = if long.is_empty() && short.is_empty() {
                0.0
            } else {
                let long_mean = basket_return(table, i, &long);
                let short_mean = basket_return(table, i, &short);
                (long_mean - short_mean) / 2.0
            };

            let cost = if long.is_empty() && short.is_empty() {
                0.0
            } else {
                traded_days += 1;
                if (traded_days - 1) % cfg.rebalance_frequency == 0 {
                    (long.len() + short.len()) as f64 * cfg.cost_per_trade
                } else {
                    0.0
                }
            };
            total_costs += cost;

            days.push(DayRecord {
                date: *date,
                regime: current,
                style,
                long,
                short,
                gross_return: gross,
                cost,
                net_return: gross - cost,
            });
        }

        let net: Vec<f64> = days.iter().map(|d| d.net_return).collect();
        let summary = PerformanceSummary::from_returns(&net, cfg.periods_per_year)?;

        Ok(BacktestResult {
            strategy: strategy.to_string(),
            provenance: table.provenance(),
            days,
            summary,
            total_costs,
            n_traded_days: traded_days,
        })
    }

    /// Winner/loser baskets for day `i`, oriented by `style`.
    ///
    /// Ranking is a stable descending sort of trailing cumulative returns,
    /// so ties resolve to the symbol insertion order of the table. Symbols
    /// with a non-finite momentum are excluded. The effective basket size
    /// is `min(basket_size, candidates / 2)`; when that is zero (not
    /// enough history or candidates) both baskets come back empty.
    fn baskets(
        &self,
        table: &ReturnsTable,
        i: usize,
        style: TradeStyle,
    ) -> (Vec<Symbol>, Vec<Symbol>) {
        let Some(momentum) = table.trailing_cumulative(i, self.config.momentum_lookback) else {
            return (Vec::new(), Vec::new());
        };

        let mut ranked: Vec<(usize, f64)> = momentum
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_finite())
            .map(|(j, m)| (j, *m))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let k = self.config.basket_size.min(ranked.len() / 2);
        if k == 0 {
            return (Vec::new(), Vec::new());
        }

        let winners: Vec<Symbol> = ranked[..k]
            .iter()
            .map(|(j, _)| table.symbols()[*j].clone())
            .collect();
        let losers: Vec<Symbol> = ranked[ranked.len() - k..]
            .iter()
            .map(|(j, _)| table.symbols()[*j].clone())
            .collect();

        match style {
            TradeStyle::Momentum => (winners, losers),
            TradeStyle::MeanReversion => (losers, winners),
            TradeStyle::Flat => (Vec::new(), Vec::new()),
        }
    }
}

/// Mean of day `i`'s returns over the basket symbols.
fn basket_return(table: &ReturnsTable, i: usize, basket: &[Symbol]) -> f64 {
    if basket.is_empty() {
        return 0.0;
    }
    let sum: f64 = basket
        .iter()
        .filter_map(|s| {
            table
                .symbols()
                .iter()
                .position(|t| t == s)
                .map(|j| table.returns()[[i, j]])
        })
        .sum();
    sum / basket.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use ndarray::Array2;

    fn dates_from(start: &str, n: usize) -> Vec<Date> {
        let start = Date::parse_from_str(start, "%Y-%m-%d").unwrap();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    /// Two symbols: A gains 0.25% a day, B loses 0.25% a day.
    fn trending_table(n_days: usize) -> ReturnsTable {
        let mut returns = Array2::zeros((n_days, 2));
        for i in 0..n_days {
            returns[[i, 0]] = 0.0025;
            returns[[i, 1]] = -0.0025;
        }
        ReturnsTable::from_returns(
            dates_from("2024-01-01", n_days),
            vec!["A".to_string(), "B".to_string()],
            returns,
            Provenance::Synthetic,
        )
        .unwrap()
    }

    /// A single label applying from the first date onward.
    fn labels_from_start(table: &ReturnsTable, regime: Regime) -> RegimeSeries {
        RegimeSeries {
            rule: "test".to_string(),
            dates: vec![table.dates()[0]],
            labels: vec![Some(regime)],
        }
    }

    fn config(k: usize) -> BacktestConfig {
        BacktestConfig {
            momentum_lookback: 20,
            basket_size: k,
            rebalance_frequency: 5,
            cost_per_trade: 0.0,
            periods_per_year: 252.0,
        }
    }

    #[test]
    fn test_mean_reversion_longs_the_loser() {
        let table = trending_table(30);
        let regimes = labels_from_start(&table, Regime::Stressed);
        let policy = RegimePolicy::hybrid(); // stressed -> mean reversion
        let result = Backtest::new(config(1))
            .run(&table, &regimes, &policy, "hybrid")
            .unwrap();

        // Day 20 is the first with enough momentum history: A is the
        // winner (+5% cumulative), B the loser (-5%); mean reversion longs
        // B and shorts A.
        let day = &result.days[20];
        assert_eq!(day.style, TradeStyle::MeanReversion);
        assert_eq!(day.long, vec!["B".to_string()]);
        assert_eq!(day.short, vec!["A".to_string()]);
        // long B (-0.25%) short A (+0.25%) -> (-0.0025 - 0.0025) / 2
        assert!((day.gross_return - (-0.0025)).abs() < 1e-12);
    }

    #[test]
    fn test_momentum_longs_the_winner() {
        let table = trending_table(30);
        let regimes = labels_from_start(&table, Regime::Calm);
        let policy = RegimePolicy::hybrid(); // calm -> momentum
        let result = Backtest::new(config(1))
            .run(&table, &regimes, &policy, "hybrid")
            .unwrap();

        let day = &result.days[20];
        assert_eq!(day.style, TradeStyle::Momentum);
        assert_eq!(day.long, vec!["A".to_string()]);
        assert_eq!(day.short, vec!["B".to_string()]);
        assert!((day.gross_return - 0.0025).abs() < 1e-12);
    }

    #[test]
    fn test_days_without_label_are_flat_and_zero() {
        let table = trending_table(30);
        // Label only from day 25 onward
        let regimes = RegimeSeries {
            rule: "test".to_string(),
            dates: vec![table.dates()[25]],
            labels: vec![Some(Regime::Calm)],
        };
        let result = Backtest::new(config(1))
            .run(&table, &regimes, &policy(), "hybrid")
            .unwrap();

        for day in &result.days[..25] {
            assert_eq!(day.style, TradeStyle::Flat);
            assert_eq!(day.net_return, 0.0);
            assert!(day.long.is_empty() && day.short.is_empty());
        }
        assert_eq!(result.days[25].style, TradeStyle::Momentum);
    }

    fn policy() -> RegimePolicy {
        RegimePolicy::hybrid()
    }

    #[test]
    fn test_unlabelled_point_clears_stale_label() {
        let table = trending_table(30);
        // Labelled from day 0, then the day-25 evaluation point could not
        // be labelled (undefined statistic): no stale forward-fill.
        let regimes = RegimeSeries {
            rule: "test".to_string(),
            dates: vec![table.dates()[0], table.dates()[25]],
            labels: vec![Some(Regime::Calm), None],
        };
        let result = Backtest::new(config(1))
            .run(&table, &regimes, &policy(), "hybrid")
            .unwrap();

        assert_eq!(result.days[24].style, TradeStyle::Momentum);
        for day in &result.days[25..] {
            assert_eq!(day.style, TradeStyle::Flat);
            assert_eq!(day.net_return, 0.0);
            assert!(day.long.is_empty() && day.short.is_empty());
        }
    }

    #[test]
    fn test_baskets_disjoint_and_bounded() {
        let table = trending_table(40);
        let regimes = labels_from_start(&table, Regime::Calm);
        // Ask for baskets bigger than half the universe
        let result = Backtest::new(config(5))
            .run(&table, &regimes, &policy(), "hybrid")
            .unwrap();

        for day in &result.days {
            assert!(day.long.len() <= 5 && day.short.len() <= 5);
            // Effective size is min(5, 2/2) = 1
            assert!(day.long.len() <= 1);
            for s in &day.long {
                assert!(!day.short.contains(s));
            }
        }
    }

    #[test]
    fn test_tie_break_follows_insertion_order() {
        // Identical returns everywhere: all momentum values tie.
        let n = 25;
        let mut returns = Array2::zeros((n, 4));
        returns.fill(0.001);
        let table = ReturnsTable::from_returns(
            dates_from("2024-01-01", n),
            vec!["W".into(), "X".into(), "Y".into(), "Z".into()],
            returns,
            Provenance::Synthetic,
        )
        .unwrap();
        let regimes = labels_from_start(&table, Regime::Calm);
        let result = Backtest::new(config(1))
            .run(&table, &regimes, &policy(), "hybrid")
            .unwrap();

        let day = &result.days[20];
        // Stable sort keeps insertion order: first symbol wins, last loses
        assert_eq!(day.long, vec!["W".to_string()]);
        assert_eq!(day.short, vec!["Z".to_string()]);
    }

    #[test]
    fn test_costs_charged_on_rebalance_steps() {
        let table = trending_table(32);
        let regimes = labels_from_start(&table, Regime::Calm);
        let cfg = BacktestConfig {
            cost_per_trade: 0.0005,
            ..config(1)
        };
        let result = Backtest::new(cfg)
            .run(&table, &regimes, &policy(), "hybrid")
            .unwrap();

        // Traded days start at day 20: 12 traded days, charges on traded
        // steps 1, 6, 11 -> 3 charges of 2 positions * 5 bps.
        assert_eq!(result.n_traded_days, 12);
        let expected = 3.0 * 2.0 * 0.0005;
        assert!((result.total_costs - expected).abs() < 1e-12);
        assert!((result.days[20].cost - 0.001).abs() < 1e-12);
        assert_eq!(result.days[21].cost, 0.0);
    }

    #[test]
    fn test_flat_policy_returns_all_zero() {
        let table = trending_table(30);
        let regimes = labels_from_start(&table, Regime::Normal);
        let result = Backtest::new(config(1))
            .run(&table, &regimes, &policy(), "hybrid")
            .unwrap();

        assert!(result.returns().iter().all(|r| *r == 0.0));
        assert_eq!(result.summary.sharpe, 0.0);
        assert_eq!(result.n_traded_days, 0);
    }

    #[test]
    fn test_bad_config_rejected() {
        let table = trending_table(30);
        let regimes = labels_from_start(&table, Regime::Calm);
        let cfg = BacktestConfig {
            momentum_lookback: 0,
            ..BacktestConfig::default()
        };
        assert!(matches!(
            Backtest::new(cfg).run(&table, &regimes, &policy(), "x"),
            Err(ZaharaError::Configuration(_))
        ));
    }

    #[test]
    fn test_to_dataframe_carries_provenance() {
        let table = trending_table(25);
        let regimes = labels_from_start(&table, Regime::Calm);
        let result = Backtest::new(config(1))
            .run(&table, &regimes, &policy(), "hybrid")
            .unwrap();
        let df = result.to_dataframe().unwrap();
        assert_eq!(df.height(), 25);
        assert!(df.column("provenance").is_ok());
    }
}
