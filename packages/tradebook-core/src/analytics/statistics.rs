//! Performance statistics over an equity curve.
//!
//! Provides CAGR, Sharpe ratio and max drawdown. Degenerate inputs (empty
//! series, zero or negative denominators) yield 0 rather than an error.

use crate::portfolio::PortfolioSummary;
use crate::types::EquityCurve;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trading days per year used for annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// Annual risk-free rate used when none is configured.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Lower bound on elapsed years, keeps the CAGR exponent finite.
const MIN_YEARS: f64 = 0.01;

/// Compound annual growth rate, as a percentage.
///
/// Returns 0 when `start_value` or `years` is not positive.
pub fn cagr(start_value: f64, end_value: f64, years: f64) -> f64 {
    if start_value <= 0.0 || years <= 0.0 {
        return 0.0;
    }
    ((end_value / start_value).powf(1.0 / years) - 1.0) * 100.0
}

/// Years between `first_entry` and `now`, floored at 0.01.
pub fn years_elapsed(first_entry: NaiveDate, now: NaiveDate) -> f64 {
    let days = (now - first_entry).num_days() as f64;
    (days / 365.0).max(MIN_YEARS)
}

/// Day-over-day simple returns of an equity curve.
///
/// Days following a zero equity value have no defined return and are skipped.
pub fn daily_returns(curve: &EquityCurve) -> Vec<f64> {
    curve
        .points()
        .windows(2)
        .filter(|w| w[0].equity > 0.0)
        .map(|w| (w[1].equity - w[0].equity) / w[0].equity)
        .collect()
}

/// Annualized Sharpe ratio of daily returns.
///
/// # Arguments
///
/// * `returns` - Daily returns (e.g., 0.01 for 1%)
/// * `risk_free_rate` - Annual risk-free rate (e.g., 0.02 for 2%)
///
/// # Returns
///
/// `mean(excess) / std(excess) * sqrt(252)` using the sample standard
/// deviation, or 0 with fewer than two returns or no variation.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let daily_rf = risk_free_rate / TRADING_DAYS;
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();

    let n = excess.len() as f64;
    let mean = excess.iter().sum::<f64>() / n;
    let variance = excess.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();

    // Rounding noise on a constant series is not real variation
    if std <= f64::EPSILON * mean.abs().max(1.0) {
        return 0.0;
    }

    mean / std * TRADING_DAYS.sqrt()
}

/// Worst peak-to-trough decline of a value series, as a negative percentage.
///
/// Returns 0 for an empty or never-declining series. Points before the
/// series first turns positive have no peak to measure against.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut running_max = f64::NEG_INFINITY;
    let mut worst = 0.0;

    for &value in values {
        if value > running_max {
            running_max = value;
        }
        if running_max <= 0.0 {
            continue;
        }
        let drawdown = (value - running_max) / running_max * 100.0;
        if drawdown < worst {
            worst = drawdown;
        }
    }

    worst
}

/// Headline performance figures for a portfolio.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PerformanceMetrics {
    /// Total P&L as a percentage of invested capital
    pub net_profit_percent: f64,
    /// Number of successfully evaluated trades
    pub total_trades: usize,
    /// Share of closed trades with a gain
    pub win_rate_percent: f64,
    /// Compound annual growth rate percentage
    pub cagr_percent: f64,
    /// Annualized Sharpe ratio
    pub sharpe_ratio: f64,
    /// Maximum drawdown percentage (negative)
    pub max_drawdown_percent: f64,
}

impl PerformanceMetrics {
    /// Derive metrics from portfolio totals and the equity curve.
    ///
    /// CAGR grows total invested capital into invested plus total P&L over the
    /// time since `first_entry`. Curve-based figures need at least two points.
    pub fn calculate(
        summary: &PortfolioSummary,
        curve: &EquityCurve,
        first_entry: Option<NaiveDate>,
        now: NaiveDate,
        risk_free_rate: f64,
    ) -> Self {
        let mut metrics = Self {
            net_profit_percent: summary.total_pnl_percent,
            total_trades: summary.position_count,
            win_rate_percent: summary.win_rate_percent,
            ..Default::default()
        };

        if curve.len() < 2 {
            return metrics;
        }

        if let Some(first_entry) = first_entry {
            let years = years_elapsed(first_entry, now);
            metrics.cagr_percent = cagr(
                summary.total_invested,
                summary.total_invested + summary.total_pnl,
                years,
            );
        }
        metrics.sharpe_ratio = sharpe_ratio(&daily_returns(curve), risk_free_rate);
        metrics.max_drawdown_percent = max_drawdown(&curve.values());

        metrics
    }
}
