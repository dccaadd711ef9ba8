//! Portfolio versus benchmark index comparison.

use super::period::Period;
use crate::config::Benchmark;
use crate::market::{MarketData, PricePoint};
use crate::types::EquityCurve;
use crate::Error;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Label used for the portfolio's own series.
pub const PORTFOLIO_NAME: &str = "Portfolio";

/// A series rebased so that its first value is 100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NormalizedPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Return of one series over the comparison window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkComparison {
    /// Display name ("Portfolio", "S&P 500", ...)
    pub name: String,
    /// Index symbol, `None` for the portfolio itself
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Percentage change from the first to the last value in the window
    pub return_percent: f64,
    /// Series rebased to 100 at the start of the window
    pub normalized: Vec<NormalizedPoint>,
}

/// Percentage change from first to last value, 0 when undefined.
fn total_return(values: &[f64]) -> f64 {
    match (values.first(), values.last()) {
        (Some(&first), Some(&last)) if first > 0.0 => (last - first) / first * 100.0,
        _ => 0.0,
    }
}

/// Return of an equity curve over its full length.
pub fn portfolio_return(curve: &EquityCurve) -> f64 {
    total_return(&curve.values())
}

/// Return of a price history from its first to its last close.
pub fn benchmark_return(history: &[PricePoint]) -> f64 {
    let closes: Vec<f64> = history.iter().map(|p| p.close).collect();
    total_return(&closes)
}

/// Rebase values so the first one is 100.
///
/// Returns an empty series when the first value is not positive.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    match values.first() {
        Some(&first) if first > 0.0 => values.iter().map(|v| v / first * 100.0).collect(),
        _ => Vec::new(),
    }
}

fn normalized_series<I>(points: I) -> Vec<NormalizedPoint>
where
    I: Iterator<Item = (NaiveDate, f64)> + Clone,
{
    let values: Vec<f64> = points.clone().map(|(_, v)| v).collect();
    points
        .zip(normalize(&values))
        .map(|((date, _), value)| NormalizedPoint { date, value })
        .collect()
}

/// Compare the portfolio against each benchmark over `period`.
///
/// The curve is filtered to the period first; benchmark histories are then
/// requested from the filtered curve's first date. The portfolio comes first
/// in the result, followed by the benchmarks in the given order. A benchmark
/// without history is reported with a 0% return and an empty series.
pub fn compare_benchmarks(
    curve: &EquityCurve,
    benchmarks: &[Benchmark],
    market: &dyn MarketData,
    period: Period,
    now: NaiveDateTime,
) -> Vec<BenchmarkComparison> {
    let window = period.filter(curve, now);

    let mut comparisons = Vec::with_capacity(benchmarks.len() + 1);
    comparisons.push(BenchmarkComparison {
        name: PORTFOLIO_NAME.to_string(),
        symbol: None,
        return_percent: portfolio_return(&window),
        normalized: normalized_series(window.points().iter().map(|p| (p.date, p.equity))),
    });

    let start = window.first().map(|p| p.date);
    for benchmark in benchmarks {
        let history = match start {
            Some(start) => market.history(&benchmark.symbol, start),
            None => Vec::new(),
        };

        if history.is_empty() {
            tracing::warn!("{}", Error::MissingMarketData(benchmark.symbol.clone()));
        }

        comparisons.push(BenchmarkComparison {
            name: benchmark.name.clone(),
            symbol: Some(benchmark.symbol.clone()),
            return_percent: benchmark_return(&history),
            normalized: normalized_series(history.iter().map(|p| (p.date, p.close))),
        });
    }

    tracing::debug!(
        "Compared {} series over {} ({} curve points)",
        comparisons.len(),
        period,
        window.len()
    );

    comparisons
}
