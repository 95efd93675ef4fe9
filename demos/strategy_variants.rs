//! Compare regime-policy variants on the same synthetic universe.
//!
//! This example demonstrates:
//! - Running several pipeline variants over one returns table
//! - Error isolation: a failing variant is reported, not fatal
//! - Ranking by Sharpe and blending into an equal-weight ensemble

use zahara::data::{SyntheticConfig, generate_universe, to_returns_table};
use zahara::eval::{Backtest, BacktestConfig, StrategyReturns, compare_outcomes};
use zahara::prelude::*;
use zahara::regime::{
    AdaptiveZScoreConfig, AdaptiveZScoreRule, StaticPercentileConfig, StaticPercentileRule,
};
use zahara::stats::{CorrelationCv, RollingConfig, RollingEngine};

const PERIODS_PER_YEAR: f64 = 252.0;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let universe = generate_universe(&SyntheticConfig {
        n_symbols: 10,
        n_days: 1200,
        target_correlation: 0.4,
        seed: 7,
        ..Default::default()
    })?;
    let table = to_returns_table(&universe)?;

    let engine = RollingEngine::new(RollingConfig {
        window: 252,
        step: 21,
        parallel: true,
    });
    let series = engine.run(&table, &CorrelationCv::default())?;
    let train_end = series.dates[series.len() / 2];

    let static_rule =
        StaticPercentileRule::new(StaticPercentileConfig::with_train_end(train_end));
    let adaptive_rule = AdaptiveZScoreRule::new(AdaptiveZScoreConfig {
        window: 12,
        z_threshold: 1.0,
    });

    let variants: Vec<(&str, &dyn RegimeRule, RegimePolicy)> = vec![
        ("static_hybrid", &static_rule, RegimePolicy::hybrid()),
        ("adaptive_hybrid", &adaptive_rule, RegimePolicy::hybrid()),
        (
            "always_momentum",
            &static_rule,
            RegimePolicy::constant(TradeStyle::Momentum),
        ),
        (
            "always_mean_reversion",
            &static_rule,
            RegimePolicy::constant(TradeStyle::MeanReversion),
        ),
    ];

    let backtest = Backtest::new(BacktestConfig::default());
    let outcomes: Vec<(String, Result<StrategyReturns>)> = variants
        .into_iter()
        .map(|(name, rule, policy)| {
            let outcome = rule.classify(&series).and_then(|regimes| {
                let result = backtest.run(&table, &regimes, &policy, name)?;
                Ok(StrategyReturns {
                    name: name.to_string(),
                    dates: result.dates(),
                    returns: result.returns(),
                    provenance: result.provenance,
                })
            });
            (name.to_string(), outcome)
        })
        .collect();

    let comparison = compare_outcomes(outcomes, PERIODS_PER_YEAR)?;

    println!("\nStrategy Variants");
    println!("═════════════════");
    println!("Common days: {}", comparison.common_dates.len());
    println!();
    println!("{:<24} {:>8} {:>8} {:>8}", "Strategy", "Ann.", "Sharpe", "Max DD");
    println!("{}", "─".repeat(52));
    for ranked in &comparison.ranked {
        let s = &ranked.summary;
        println!(
            "{:<24} {:>7.1}% {:>8.2} {:>7.1}%",
            ranked.name,
            s.annualized_return * 100.0,
            s.sharpe,
            s.max_drawdown * 100.0
        );
    }
    let e = &comparison.ensemble.summary;
    println!(
        "{:<24} {:>7.1}% {:>8.2} {:>7.1}%",
        comparison.ensemble.name,
        e.annualized_return * 100.0,
        e.sharpe,
        e.max_drawdown * 100.0
    );
    println!();
    println!(
        "Mean pairwise correlation: {:.3}",
        comparison.mean_correlation
    );

    for (name, error) in &comparison.failures {
        eprintln!("Warning: variant {name} failed: {error}");
    }

    Ok(())
}
