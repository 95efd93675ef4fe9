//! Regime-conditioned backtesting and performance evaluation for zahara.
//!
//! This crate provides:
//! - [`Backtest`]: the regime-conditioned long/short momentum-basket
//!   strategy with transaction costs
//! - [`PerformanceSummary`]: total/annualized return, Sharpe, volatility,
//!   max drawdown, win rate, and Calmar for a daily return series
//! - [`compare`] / [`compare_outcomes`]: multi-strategy alignment,
//!   ranking, correlation, and the equal-weight ensemble
//!
//! # Example
//!
//! ```rust,ignore
//! use zahara_eval::{Backtest, BacktestConfig};
//! use zahara_traits::RegimePolicy;
//!
//! let backtest = Backtest::new(BacktestConfig::default());
//! let result = backtest.run(&returns, &regimes, &RegimePolicy::hybrid(), "hybrid")?;
//! println!("Sharpe: {:.2}", result.summary.sharpe);
//! ```

pub mod backtest;
pub mod compare;
pub mod metrics;

// Re-export main types
pub use backtest::{Backtest, BacktestConfig, BacktestResult, DayRecord};
pub use compare::{Comparison, RankedStrategy, StrategyReturns, compare, compare_outcomes};
pub use metrics::{PerformanceSummary, equity_curve, max_drawdown};
