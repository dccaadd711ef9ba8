//! One-pass portfolio report.
//!
//! [`build_report`] recomputes every figure from a ledger snapshot, the
//! supplied market data and the evaluation time. Nothing is cached between
//! calls, so the same inputs always produce the same report.

use crate::analytics::{
    compare_benchmarks, monthly_table, BenchmarkComparison, EquityCurveBuilder, MonthlyTable,
    PerformanceMetrics,
};
use crate::config::Settings;
use crate::ledger::{Ledger, SkippedTrade};
use crate::market::{DayChange, MarketData};
use crate::portfolio::{classify, Observation, PortfolioSummary};
use crate::types::{EquityCurve, Position};
use crate::Error;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A position together with the ledger and market context it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_date: Option<NaiveDate>,
    pub entry_price: f64,
    /// Latest price, `None` when unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    /// Change against the previous close, never set for closed positions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_change: Option<DayChange>,
    pub sell_targets: [Option<f64>; 3],
    #[serde(flatten)]
    pub position: Position,
}

/// Everything the dashboard shows for one refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub generated_at: NaiveDateTime,
    pub positions: Vec<PositionRow>,
    /// Ledger rows and trades left out of the figures
    pub skipped: Vec<SkippedTrade>,
    pub summary: PortfolioSummary,
    pub performance: PerformanceMetrics,
    pub monthly: MonthlyTable,
    pub equity_curve: EquityCurve,
    /// Portfolio first, then each configured benchmark
    pub benchmarks: Vec<BenchmarkComparison>,
}

impl PortfolioReport {
    /// Price and P&L observations for change tracking.
    pub fn observations(&self) -> Vec<Observation> {
        self.positions
            .iter()
            .map(|row| Observation {
                ticker: row.position.ticker.clone(),
                price: row.current_price,
                total_pnl: row.position.total_pnl,
            })
            .collect()
    }
}

fn usable_price(price: f64) -> Option<f64> {
    (price.is_finite() && price > 0.0).then_some(price)
}

/// Build the full report for a ledger.
///
/// Trades that fail classification are listed under `skipped` next to the
/// rows the ledger rejected, and the rest of the report is computed without
/// them. Benchmarks are compared over `settings.default_period`.
pub fn build_report(
    ledger: &Ledger,
    market: &dyn MarketData,
    settings: &Settings,
    now: NaiveDateTime,
) -> PortfolioReport {
    let mut skipped = ledger.rejected.clone();
    let mut positions = Vec::with_capacity(ledger.trades.len());

    for trade in &ledger.trades {
        let quote = market.quote(&trade.ticker);
        let current_price = quote.and_then(|q| usable_price(q.price));

        let position = match classify(trade, current_price) {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", trade.ticker, e);
                skipped.push(SkippedTrade {
                    row: None,
                    ticker: trade.ticker.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if current_price.is_none() && !position.is_closed() {
            tracing::warn!("{}", Error::MissingMarketData(trade.ticker.clone()));
        }

        let day_change = if position.is_closed() {
            None
        } else {
            quote.and_then(|q| q.day_change())
        };

        positions.push(PositionRow {
            entry_date: trade.entry_date,
            entry_price: trade.entry_price,
            current_price,
            day_change,
            sell_targets: trade.sell_targets,
            position,
        });
    }

    let classified: Vec<Position> = positions.iter().map(|row| row.position.clone()).collect();
    let summary = PortfolioSummary::from_positions(&classified);

    let equity_curve = EquityCurveBuilder::new(now.date()).build(&ledger.trades);
    let performance = PerformanceMetrics::calculate(
        &summary,
        &equity_curve,
        ledger.first_entry_date(),
        now.date(),
        settings.risk_free_rate,
    );
    let monthly = monthly_table(&equity_curve);
    let benchmarks = compare_benchmarks(
        &equity_curve,
        &settings.benchmarks,
        market,
        settings.default_period,
        now,
    );

    tracing::debug!(
        "Report built: {} positions, {} skipped, {} curve points",
        positions.len(),
        skipped.len(),
        equity_curve.len()
    );

    PortfolioReport {
        generated_at: now,
        positions,
        skipped,
        summary,
        performance,
        monthly,
        equity_curve,
        benchmarks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{PricePoint, StaticMarketData};
    use crate::types::TradeRecord;
    use crate::PreviousState;
    use approx::assert_relative_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger() -> Ledger {
        Ledger::from_trades(vec![
            TradeRecord::new("AAPL", Some(ymd(2024, 1, 2)), 100.0, 1000.0),
            TradeRecord::new("MSFT", Some(ymd(2024, 1, 10)), 50.0, 500.0).with_sale(
                Some(ymd(2024, 2, 1)),
                Some(60.0),
                100.0,
            ),
        ])
    }

    fn now() -> NaiveDateTime {
        ymd(2024, 3, 1).and_hms_opt(16, 0, 0).unwrap()
    }

    #[test]
    fn test_report_figures() {
        let market = StaticMarketData::new()
            .with_quote("AAPL", 150.0, 140.0)
            .with_quote("MSFT", 70.0, 65.0);

        let report = build_report(&ledger(), &market, &Settings::default(), now());

        assert_eq!(report.positions.len(), 2);
        assert!(report.skipped.is_empty());
        assert_relative_eq!(report.summary.total_invested, 1500.0);
        assert_relative_eq!(report.summary.total_unrealized, 500.0);
        assert_relative_eq!(report.summary.total_realized, 100.0);
        assert_eq!(report.summary.closed_count, 1);
        assert_relative_eq!(report.summary.win_rate_percent, 100.0);

        let aapl = &report.positions[0];
        assert_eq!(aapl.current_price, Some(150.0));
        let change = aapl.day_change.unwrap();
        assert_relative_eq!(change.amount, 10.0);

        // Closed positions carry no day change
        assert!(report.positions[1].position.is_closed());
        assert_eq!(report.positions[1].day_change, None);

        assert_eq!(report.equity_curve.first().unwrap().date, ymd(2024, 1, 2));
        assert_eq!(report.equity_curve.last().unwrap().date, ymd(2024, 3, 1));
        assert_eq!(report.monthly.rows.len(), 1);
        assert_eq!(report.benchmarks.len(), 3);
        assert_eq!(report.performance.total_trades, 2);
    }

    #[test]
    fn test_invalid_trade_is_skipped() {
        let mut ledger = ledger();
        ledger
            .trades
            .push(TradeRecord::new("BROKEN", Some(ymd(2024, 1, 5)), 0.0, 1000.0));

        let market = StaticMarketData::new();
        let report = build_report(&ledger, &market, &Settings::default(), now());

        assert_eq!(report.positions.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].ticker, "BROKEN");
        assert_eq!(report.skipped[0].row, None);
    }

    #[test]
    fn test_missing_quotes() {
        let market = StaticMarketData::new();
        let report = build_report(&ledger(), &market, &Settings::default(), now());

        let aapl = &report.positions[0];
        assert_eq!(aapl.current_price, None);
        assert_eq!(aapl.day_change, None);
        assert_relative_eq!(aapl.position.current_value, 1000.0);
        assert!(report
            .benchmarks
            .iter()
            .skip(1)
            .all(|b| b.return_percent == 0.0));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_missing_quote_logged_as_warning() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let market = StaticMarketData::new();
        tracing::subscriber::with_default(subscriber, || {
            build_report(&ledger(), &market, &Settings::default(), now());
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("Missing market data: AAPL"));
        // Closed positions need no quote
        assert!(!output.contains("Missing market data: MSFT"));
    }

    #[test]
    fn test_benchmark_period_from_settings() {
        let market = StaticMarketData::new().with_history(
            "SPY",
            vec![
                PricePoint {
                    date: ymd(2024, 1, 2),
                    close: 100.0,
                },
                PricePoint {
                    date: ymd(2024, 2, 27),
                    close: 110.0,
                },
                PricePoint {
                    date: ymd(2024, 3, 1),
                    close: 121.0,
                },
            ],
        );
        let settings = Settings {
            default_period: crate::Period::OneWeek,
            ..Default::default()
        };

        let report = build_report(&ledger(), &market, &settings, now());

        assert_relative_eq!(report.benchmarks[1].return_percent, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_observations_feed_change_tracking() {
        let first = build_report(
            &ledger(),
            &StaticMarketData::new().with_quote("AAPL", 150.0, 140.0),
            &Settings::default(),
            now(),
        );
        let (_, state) = PreviousState::new().advance(&first.observations());

        let second = build_report(
            &ledger(),
            &StaticMarketData::new().with_quote("AAPL", 155.0, 140.0),
            &Settings::default(),
            now(),
        );
        let (changes, _) = state.advance(&second.observations());

        assert_eq!(changes[0].price, Some(crate::Change::Up));
        assert_eq!(changes[0].pnl, Some(crate::Change::Up));
        assert_eq!(changes[1].pnl, Some(crate::Change::Unchanged));
    }
}
