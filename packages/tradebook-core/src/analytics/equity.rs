//! Historical equity curve reconstruction.

use crate::types::{EquityCurve, EquityPoint, TradeRecord};
use chrono::NaiveDate;

/// Replays the ledger day by day up to a fixed evaluation date.
#[derive(Debug, Clone, Copy)]
pub struct EquityCurveBuilder {
    end: NaiveDate,
}

impl EquityCurveBuilder {
    /// Build curves ending on `end` (inclusive).
    pub fn new(end: NaiveDate) -> Self {
        Self { end }
    }

    /// Build curves ending today (local time).
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Build the daily equity curve for a set of trades.
    ///
    /// Equity on a day is the capital of every trade entered and not yet
    /// exited, plus the realized P&L of every trade exited by that day, floored
    /// at zero. Trades without an entry date or with non-positive entry price or
    /// capital are ignored. The curve starts at the earliest entry date and has
    /// one point per calendar day.
    pub fn build(&self, trades: &[TradeRecord]) -> EquityCurve {
        let dated: Vec<(&TradeRecord, NaiveDate)> = trades
            .iter()
            .filter(|t| t.is_valid())
            .filter_map(|t| t.entry_date.map(|d| (t, d)))
            .collect();

        let Some(start) = dated.iter().map(|(_, d)| *d).min() else {
            return EquityCurve::default();
        };
        if start > self.end {
            return EquityCurve::default();
        }

        tracing::debug!(
            "Replaying {} trades from {} to {}",
            dated.len(),
            start,
            self.end
        );

        // TODO: switch to an event-sorted running balance if ledgers grow to thousands of trades.
        start
            .iter_days()
            .take_while(|day| *day <= self.end)
            .map(|day| EquityPoint {
                date: day,
                equity: equity_on(&dated, day),
            })
            .collect()
    }
}

fn equity_on(trades: &[(&TradeRecord, NaiveDate)], day: NaiveDate) -> f64 {
    let mut capital = 0.0;
    let mut realized = 0.0;

    for (trade, entry_date) in trades {
        if day < *entry_date {
            continue;
        }
        match trade.sell_date {
            Some(sell_date) if day >= sell_date => {
                let exit_price = trade.sell_price.unwrap_or(trade.entry_price);
                realized += (exit_price - trade.entry_price) * trade.initial_shares();
            }
            _ => capital += trade.capital,
        }
    }

    (capital + realized).max(0.0)
}
