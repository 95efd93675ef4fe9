//! Regime labels, classification rules, and the regime-to-style policy.
//!
//! A [`RegimeRule`] turns a statistic series into per-date regime labels.
//! A [`RegimePolicy`] is the deterministic map from those labels to the
//! trading style the backtest uses on that day. Keeping the two separate
//! lets the same classifier drive different strategies.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Date, Result, StatisticSeries};

/// Market regime label.
///
/// `Stressed`/`Calm` come from static threshold rules; `HighStress`/
/// `LowStress`/`Normal` from adaptive z-score rules. A policy maps any of
/// them to a trading style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    /// Statistic above a fixed threshold.
    Stressed,
    /// Statistic at or below a fixed threshold.
    Calm,
    /// Statistic unusually high relative to its recent history.
    HighStress,
    /// Statistic unusually low relative to its recent history.
    LowStress,
    /// Statistic within its recent normal band.
    Normal,
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Stressed => "stressed",
            Self::Calm => "calm",
            Self::HighStress => "high_stress",
            Self::LowStress => "low_stress",
            Self::Normal => "normal",
        };
        write!(f, "{s}")
    }
}

/// Trading style used on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStyle {
    /// Long recent losers, short recent winners.
    MeanReversion,
    /// Long recent winners, short recent losers.
    Momentum,
    /// No positions.
    Flat,
}

impl std::fmt::Display for TradeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MeanReversion => "mean_reversion",
            Self::Momentum => "momentum",
            Self::Flat => "flat",
        };
        write!(f, "{s}")
    }
}

/// Deterministic total map from regime labels to trading styles.
///
/// Every label maps to exactly one style; an unlabelled date always maps
/// to [`TradeStyle::Flat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimePolicy {
    /// Style in the `Stressed` regime.
    pub stressed: TradeStyle,
    /// Style in the `Calm` regime.
    pub calm: TradeStyle,
    /// Style in the `HighStress` regime.
    pub high_stress: TradeStyle,
    /// Style in the `LowStress` regime.
    pub low_stress: TradeStyle,
    /// Style in the `Normal` regime.
    pub normal: TradeStyle,
}

impl RegimePolicy {
    /// The hybrid policy: mean-reversion when the market is crowded or at
    /// a stress extreme, momentum in calm trending markets, flat when the
    /// adaptive rule sees nothing unusual.
    pub const fn hybrid() -> Self {
        Self {
            stressed: TradeStyle::MeanReversion,
            calm: TradeStyle::Momentum,
            high_stress: TradeStyle::MeanReversion,
            low_stress: TradeStyle::MeanReversion,
            normal: TradeStyle::Flat,
        }
    }

    /// A baseline policy that trades the same style in every regime.
    pub const fn constant(style: TradeStyle) -> Self {
        Self {
            stressed: style,
            calm: style,
            high_stress: style,
            low_stress: style,
            normal: style,
        }
    }

    /// Style for a (possibly missing) regime label.
    pub const fn style_for(&self, regime: Option<Regime>) -> TradeStyle {
        match regime {
            Some(Regime::Stressed) => self.stressed,
            Some(Regime::Calm) => self.calm,
            Some(Regime::HighStress) => self.high_stress,
            Some(Regime::LowStress) => self.low_stress,
            Some(Regime::Normal) => self.normal,
            None => TradeStyle::Flat,
        }
    }
}

/// Per-date regime labels produced by a [`RegimeRule`].
///
/// `None` marks dates the rule could not label (training range, warmup
/// window, undefined statistic); the backtest treats those as flat days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeSeries {
    /// Name of the rule that produced these labels.
    pub rule: String,
    /// Label dates, ascending (same calendar as the statistic series).
    pub dates: Vec<Date>,
    /// Per-date labels; `None` = unlabelled.
    pub labels: Vec<Option<Regime>>,
}

impl RegimeSeries {
    /// Number of dates in the series.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series has no dates.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of labelled dates.
    pub fn n_labelled(&self) -> usize {
        self.labels.iter().filter(|l| l.is_some()).count()
    }

    /// Date-indexed view of the labelled dates.
    pub fn label_map(&self) -> HashMap<Date, Regime> {
        self.dates
            .iter()
            .zip(&self.labels)
            .filter_map(|(d, l)| l.map(|r| (*d, r)))
            .collect()
    }

    /// Count of dates per regime label.
    pub fn breakdown(&self) -> HashMap<Regime, usize> {
        let mut counts = HashMap::new();
        for label in self.labels.iter().flatten() {
            *counts.entry(*label).or_insert(0) += 1;
        }
        counts
    }
}

/// A classifier mapping a statistic series to regime labels.
///
/// Implementations must be thread-safe (`Send + Sync`) and must not label
/// any date using information from later dates.
pub trait RegimeRule: Send + Sync {
    /// Name of this rule, used in labels and output tables.
    fn name(&self) -> &str;

    /// Classify every date of the series.
    ///
    /// # Errors
    ///
    /// Returns [`ZaharaError::Configuration`] when the rule's parameters
    /// can never produce a valid classification for this series (empty
    /// training range, zero-variance threshold base).
    ///
    /// [`ZaharaError::Configuration`]: crate::ZaharaError::Configuration
    fn classify(&self, series: &StatisticSeries) -> Result<RegimeSeries>;
}
