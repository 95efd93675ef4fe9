//! Zahara CLI binary.
//!
//! Each subcommand is an independent pipeline run over a price universe:
//! rolling statistics, a regime-conditioned backtest, a strategy
//! comparison, or a shuffle null-model experiment.

mod data;
mod statistics;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use zahara_eval::{Backtest, BacktestConfig, compare};
use zahara_stats::{NullModel, NullModelConfig, RollingConfig, RollingEngine};
use zahara_traits::{Date, RegimeSeries, StatisticSeries};

#[derive(Parser)]
#[command(name = "zahara")]
#[command(about = "Rolling-window regime research over daily returns", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a rolling statistic over a universe
    Stats {
        /// Ticker symbols in Stooq format (e.g. aapl.us,msft.us)
        #[arg(short, long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Statistic to compute (corr-cv or mean-rho)
        #[arg(long, default_value = "corr-cv")]
        statistic: String,

        /// Rolling window length in trading days
        #[arg(short, long, default_value = "252")]
        window: usize,

        /// Days between evaluation points
        #[arg(long, default_value = "21")]
        step: usize,

        /// Evaluate windows in parallel
        #[arg(long)]
        parallel: bool,

        /// Generate a seeded synthetic universe instead of downloading
        #[arg(long)]
        synthetic: bool,

        /// Seed for the synthetic universe
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output directory for CSV artifacts
        #[arg(short, long, default_value = "out")]
        out: PathBuf,
    },

    /// Run the full regime-conditioned backtest pipeline
    Backtest {
        /// Ticker symbols in Stooq format (e.g. aapl.us,msft.us)
        #[arg(short, long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Statistic to condition on (corr-cv or mean-rho)
        #[arg(long, default_value = "corr-cv")]
        statistic: String,

        /// Rolling window length in trading days
        #[arg(short, long, default_value = "252")]
        window: usize,

        /// Days between evaluation points
        #[arg(long, default_value = "21")]
        step: usize,

        /// Regime rule (static or adaptive)
        #[arg(long, default_value = "static")]
        rule: String,

        /// Threshold percentile for the static rule
        #[arg(long, default_value = "75")]
        percentile: f64,

        /// End of the training range for the static rule (YYYY-MM-DD,
        /// defaults to the midpoint of the statistic series)
        #[arg(long)]
        train_end: Option<String>,

        /// Trailing window for the adaptive rule, in evaluation points
        #[arg(long, default_value = "60")]
        z_window: usize,

        /// Z-score band half-width for the adaptive rule
        #[arg(long, default_value = "1.0")]
        z_threshold: f64,

        /// Regime policy (hybrid, momentum, or mean-reversion)
        #[arg(long, default_value = "hybrid")]
        policy: String,

        /// Momentum ranking lookback in trading days
        #[arg(long, default_value = "20")]
        lookback: usize,

        /// Symbols per basket side
        #[arg(short, long, default_value = "5")]
        basket: usize,

        /// Days between cost-bearing rebalances
        #[arg(long, default_value = "5")]
        rebalance: usize,

        /// Cost per unit of traded notional
        #[arg(long, default_value = "0.0005")]
        cost: f64,

        /// Trading periods per year (252 equities, 365 crypto)
        #[arg(long, default_value = "252")]
        periods_per_year: f64,

        /// Generate a seeded synthetic universe instead of downloading
        #[arg(long)]
        synthetic: bool,

        /// Seed for the synthetic universe
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Output directory for CSV artifacts
        #[arg(short, long, default_value = "out")]
        out: PathBuf,
    },

    /// Compare strategy CSVs written by `zahara backtest`
    Compare {
        /// Strategy CSV files
        files: Vec<PathBuf>,

        /// Trading periods per year (252 equities, 365 crypto)
        #[arg(long, default_value = "252")]
        periods_per_year: f64,

        /// Output directory for CSV artifacts
        #[arg(short, long, default_value = "out")]
        out: PathBuf,
    },

    /// Test a statistic against column-shuffled null tables
    NullModel {
        /// Ticker symbols in Stooq format (e.g. aapl.us,msft.us)
        #[arg(short, long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Statistic to test (corr-cv or mean-rho)
        #[arg(long, default_value = "corr-cv")]
        statistic: String,

        /// Number of shuffled tables
        #[arg(short, long, default_value = "100")]
        n_shuffles: usize,

        /// Seed for the shuffles
        #[arg(long, default_value = "42")]
        shuffle_seed: u64,

        /// Generate a seeded synthetic universe instead of downloading
        #[arg(long)]
        synthetic: bool,

        /// Seed for the synthetic universe
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

#[tokio::main]
async fn main() {
    // Pick up proxy and TLS settings before any HTTP client is built
    let _ = dotenvy::dotenv();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats {
            symbols,
            start,
            end,
            statistic,
            window,
            step,
            parallel,
            synthetic,
            seed,
            out,
        } => {
            run_stats(
                &symbols, &start, &end, &statistic, window, step, parallel, synthetic, seed, &out,
            )
            .await?;
        }
        Commands::Backtest {
            symbols,
            start,
            end,
            statistic,
            window,
            step,
            rule,
            percentile,
            train_end,
            z_window,
            z_threshold,
            policy,
            lookback,
            basket,
            rebalance,
            cost,
            periods_per_year,
            synthetic,
            seed,
            format,
            out,
        } => {
            let args = BacktestArgs {
                symbols,
                start,
                end,
                statistic,
                window,
                step,
                rule,
                percentile,
                train_end,
                z_window,
                z_threshold,
                policy,
                lookback,
                basket,
                rebalance,
                cost,
                periods_per_year,
                synthetic,
                seed,
                format,
                out,
            };
            run_backtest(args).await?;
        }
        Commands::Compare {
            files,
            periods_per_year,
            out,
        } => {
            run_compare(&files, periods_per_year, &out)?;
        }
        Commands::NullModel {
            symbols,
            start,
            end,
            statistic,
            n_shuffles,
            shuffle_seed,
            synthetic,
            seed,
        } => {
            run_null_model(
                &symbols,
                &start,
                &end,
                &statistic,
                n_shuffles,
                shuffle_seed,
                synthetic,
                seed,
            )
            .await?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_stats(
    symbols: &[String],
    start: &str,
    end: &str,
    statistic_name: &str,
    window: usize,
    step: usize,
    parallel: bool,
    synthetic: bool,
    seed: u64,
    out: &std::path::Path,
) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     Rolling Statistics                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let series = compute_series(
        symbols,
        start,
        end,
        statistic_name,
        window,
        step,
        parallel,
        synthetic,
        seed,
    )
    .await?;

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("STATISTIC SERIES ({})", series.name);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    let finite: Vec<_> = series.finite().collect();
    println!(
        "Evaluation points: {} ({} defined)",
        series.len(),
        finite.len()
    );
    println!("Provenance:        {}", series.provenance);
    println!();

    println!("{:<12} {:>12}", "Date", "Value");
    println!("{}", "─".repeat(25));
    for (date, value) in finite.iter().rev().take(10).rev() {
        println!("{:<12} {:>12.6}", date.to_string(), value);
    }
    println!();

    let mut df = series.to_dataframe()?;
    let path = data::write_csv(&mut df, out, "statistics.csv")?;
    println!("Wrote {}", path.display());
    println!();

    Ok(())
}

/// All knobs of a backtest pipeline run.
struct BacktestArgs {
    symbols: Vec<String>,
    start: String,
    end: String,
    statistic: String,
    window: usize,
    step: usize,
    rule: String,
    percentile: f64,
    train_end: Option<String>,
    z_window: usize,
    z_threshold: f64,
    policy: String,
    lookback: usize,
    basket: usize,
    rebalance: usize,
    cost: f64,
    periods_per_year: f64,
    synthetic: bool,
    seed: u64,
    format: String,
    out: PathBuf,
}

async fn run_backtest(args: BacktestArgs) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Regime-Conditioned Backtest                  ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Statistic: {}", args.statistic);
    println!("Rule:      {}", args.rule);
    println!("Policy:    {}", args.policy);
    println!("Period:    {} to {}", args.start, args.end);
    println!();

    let start_date = data::parse_date(&args.start)?;
    let end_date = data::parse_date(&args.end)?;

    println!("Fetching market data...");
    let universe = data::load_universe(
        &args.symbols,
        start_date,
        end_date,
        args.synthetic,
        args.seed,
    )
    .await?;
    let table = zahara_data::to_returns_table(&universe)?;
    println!(
        "Loaded {} days of returns for {} symbols ({})",
        table.n_days(),
        table.n_symbols(),
        table.provenance()
    );
    println!();

    let statistic = statistics::create_statistic(&args.statistic)?;
    let engine = RollingEngine::new(RollingConfig {
        window: args.window,
        step: args.step,
        parallel: false,
    });
    let series = engine.run(&table, statistic.as_ref())?;
    println!(
        "Computed {} evaluation points of {}",
        series.len(),
        series.name
    );

    let regimes = classify(&series, &args)?;
    println!("Labelled {} of {} points", regimes.n_labelled(), regimes.len());
    let mut breakdown: Vec<_> = regimes.breakdown().into_iter().collect();
    breakdown.sort_by_key(|(r, _)| r.to_string());
    for (regime, count) in breakdown {
        println!("  {:<12} {:>5}", regime.to_string(), count);
    }
    println!();

    let policy = statistics::create_policy(&args.policy)?;
    let backtest = Backtest::new(BacktestConfig {
        momentum_lookback: args.lookback,
        basket_size: args.basket,
        rebalance_frequency: args.rebalance,
        cost_per_trade: args.cost,
        periods_per_year: args.periods_per_year,
    });
    let strategy_name = format!("{}_{}_{}", args.statistic, args.rule, args.policy);
    let result = backtest.run(&table, &regimes, &policy, &strategy_name)?;

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("BACKTEST RESULTS ({strategy_name})");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&result.summary)?);
    } else {
        let s = &result.summary;
        println!("Performance Metrics:");
        println!("  Total Return:      {:>10.2}%", s.total_return * 100.0);
        println!("  Annualized Return: {:>10.2}%", s.annualized_return * 100.0);
        println!(
            "  Annualized Vol:    {:>10.2}%",
            s.annualized_volatility * 100.0
        );
        println!("  Sharpe Ratio:      {:>10.2}", s.sharpe);
        println!("  Max Drawdown:      {:>10.2}%", s.max_drawdown * 100.0);
        println!("  Win Rate:          {:>10.2}%", s.win_rate * 100.0);
        println!("  Calmar Ratio:      {:>10.2}", s.calmar);
        println!();

        println!("Trading:");
        println!("  Traded Days:       {:>10}", result.n_traded_days);
        println!(
            "  Total Txn Costs:   {:>10.4}%",
            result.total_costs * 100.0
        );
        println!("  Provenance:        {:>10}", result.provenance.to_string());
    }
    println!();

    let mut df = result.to_dataframe()?;
    let path = data::write_csv(&mut df, &args.out, "strategy.csv")?;
    println!("Wrote {}", path.display());
    println!();

    Ok(())
}

/// Classify the statistic series with the rule the arguments select.
fn classify(series: &StatisticSeries, args: &BacktestArgs) -> Result<RegimeSeries> {
    let train_end: Date = match &args.train_end {
        Some(s) => data::parse_date(s)?,
        None => {
            // Default to a half/half train-test split
            if series.is_empty() {
                anyhow::bail!("statistic series is empty, cannot pick a training range");
            }
            series.dates[series.len() / 2]
        }
    };
    let rule = statistics::create_rule(
        &args.rule,
        args.percentile,
        train_end,
        args.z_window,
        args.z_threshold,
    )?;
    Ok(rule.classify(series)?)
}

fn run_compare(files: &[PathBuf], periods_per_year: f64, out: &std::path::Path) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Strategy Comparison                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    if files.len() < 2 {
        anyhow::bail!("need at least two strategy CSVs to compare");
    }

    let mut strategies = Vec::with_capacity(files.len());
    for file in files {
        let strategy = data::read_strategy_csv(file)?;
        println!("Loaded {:<30} ({} days)", strategy.name, strategy.dates.len());
        strategies.push(strategy);
    }
    println!();

    let comparison = compare(&strategies, periods_per_year)?;

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("RANKING ({} common days)", comparison.common_dates.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    println!(
        "{:<30} {:>9} {:>9} {:>8} {:>9}",
        "Strategy", "Total", "Ann.", "Sharpe", "Max DD"
    );
    println!("{}", "─".repeat(70));
    for ranked in comparison.ranked.iter().chain(std::iter::once(&comparison.ensemble)) {
        let s = &ranked.summary;
        println!(
            "{:<30} {:>8.2}% {:>8.2}% {:>8.2} {:>8.2}%",
            ranked.name,
            s.total_return * 100.0,
            s.annualized_return * 100.0,
            s.sharpe,
            s.max_drawdown * 100.0
        );
    }
    println!();
    println!(
        "Mean pairwise correlation: {:.4}",
        comparison.mean_correlation
    );

    if !comparison.failures.is_empty() {
        println!();
        println!("Failed variants:");
        for (name, error) in &comparison.failures {
            println!("  {name}: {error}");
        }
    }
    println!();

    let names: Vec<&str> = comparison
        .ranked
        .iter()
        .chain(std::iter::once(&comparison.ensemble))
        .map(|r| r.name.as_str())
        .collect();
    let col = |f: fn(&zahara_eval::PerformanceSummary) -> f64| -> Vec<f64> {
        comparison
            .ranked
            .iter()
            .chain(std::iter::once(&comparison.ensemble))
            .map(|r| f(&r.summary))
            .collect()
    };
    let mut df = polars::df! {
        "strategy" => names,
        "total_return" => col(|s| s.total_return),
        "annualized_return" => col(|s| s.annualized_return),
        "sharpe" => col(|s| s.sharpe),
        "annualized_volatility" => col(|s| s.annualized_volatility),
        "max_drawdown" => col(|s| s.max_drawdown),
        "win_rate" => col(|s| s.win_rate),
        "calmar" => col(|s| s.calmar),
    }?;
    let path = data::write_csv(&mut df, out, "comparison.csv")?;
    println!("Wrote {}", path.display());
    println!();

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_null_model(
    symbols: &[String],
    start: &str,
    end: &str,
    statistic_name: &str,
    n_shuffles: usize,
    shuffle_seed: u64,
    synthetic: bool,
    seed: u64,
) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                   Null-Model Experiment                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let start_date = data::parse_date(start)?;
    let end_date = data::parse_date(end)?;

    println!("Fetching market data...");
    let universe = data::load_universe(symbols, start_date, end_date, synthetic, seed).await?;
    let table = zahara_data::to_returns_table(&universe)?;
    println!(
        "Loaded {} days of returns for {} symbols ({})",
        table.n_days(),
        table.n_symbols(),
        table.provenance()
    );
    println!();

    let statistic = statistics::create_statistic(statistic_name)?;
    let model = NullModel::new(NullModelConfig {
        n_shuffles,
        seed: shuffle_seed,
    });
    println!("Running {} shuffles...", n_shuffles);
    let result = model.run(&table, statistic.as_ref())?;

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("NULL MODEL ({})", result.statistic);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    println!("  Observed:          {:>10.6}", result.observed);
    println!("  Null Mean:         {:>10.6}", result.null_mean);
    println!("  Null Std Dev:      {:>10.6}", result.null_std);
    println!("  Z-Score:           {:>10.2}", result.z_score);
    println!("  Effect Size:       {:>10.2}", result.effect_size);
    println!("  Effective Shuffles:{:>10}", result.n_effective);
    println!();

    if result.effect_size > 2.0 {
        println!("The observed value sits far outside the shuffled distribution.");
    } else {
        println!("The observed value is consistent with the shuffled distribution.");
    }
    println!();

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn compute_series(
    symbols: &[String],
    start: &str,
    end: &str,
    statistic_name: &str,
    window: usize,
    step: usize,
    parallel: bool,
    synthetic: bool,
    seed: u64,
) -> Result<StatisticSeries> {
    let start_date = data::parse_date(start)?;
    let end_date = data::parse_date(end)?;

    println!("Fetching market data...");
    let universe = data::load_universe(symbols, start_date, end_date, synthetic, seed).await?;
    let table = zahara_data::to_returns_table(&universe)?;
    println!(
        "Loaded {} days of returns for {} symbols ({})",
        table.n_days(),
        table.n_symbols(),
        table.provenance()
    );
    println!();

    let statistic = statistics::create_statistic(statistic_name)?;
    let engine = RollingEngine::new(RollingConfig {
        window,
        step,
        parallel,
    });
    Ok(engine.run(&table, statistic.as_ref())?)
}
