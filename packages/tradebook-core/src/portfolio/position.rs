//! Per-trade position classification and P&L.

use crate::types::{Position, PositionStatus, TradeRecord, TradeStatus};
use crate::Result;

/// Percentage of `part` in `whole`, 0 when `whole` is not positive.
fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        (part / whole) * 100.0
    } else {
        0.0
    }
}

/// Classify a trade as open, partially exited or closed and compute its P&L.
///
/// Rules are applied in order:
///
/// 1. Status CLOSED or `sell_percent >= 100` closes the whole position. The
///    exit price falls back from the sell price to `current_price` to the
///    entry price.
/// 2. `0 < sell_percent < 100` with a sell price is a partial exit. Without a
///    sell price the trade is treated as not yet sold at all.
/// 3. Everything else is open.
///
/// A `current_price` that is not a positive number counts as unknown.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidTrade`] when entry price or capital is not positive.
pub fn classify(trade: &TradeRecord, current_price: Option<f64>) -> Result<Position> {
    trade.validate()?;

    let price = current_price.filter(|p| p.is_finite() && *p > 0.0);

    if trade.status == TradeStatus::Closed || trade.sell_percent >= 100.0 {
        return Ok(closed(trade, price));
    }

    if trade.sell_percent > 0.0 {
        if let Some(sell_price) = trade.sell_price {
            return Ok(partial(trade, sell_price, price));
        }
        // A percentage without a sell price reads as "not sold yet".
        // TODO: report these rows as skipped once the ledger editor enforces sell prices.
        tracing::debug!(
            "{}: {}% sold without a sell price, treating as open",
            trade.ticker,
            trade.sell_percent
        );
    }

    Ok(open(trade, price))
}

fn closed(trade: &TradeRecord, price: Option<f64>) -> Position {
    let capital = trade.capital;
    let shares = trade.initial_shares();
    let exit_price = trade.sell_price.or(price).unwrap_or(trade.entry_price);

    let realized_pnl = (exit_price - trade.entry_price) * shares;
    let realized_pnl_percent = percent_of(realized_pnl, capital);

    build(
        trade,
        PositionStatus::Closed,
        Amounts {
            remaining_shares: 0.0,
            remaining_capital: 0.0,
            current_value: 0.0,
            realized_pnl,
            realized_pnl_percent,
            unrealized_pnl: 0.0,
            unrealized_pnl_percent: 0.0,
            average_sell_price: Some(exit_price),
        },
    )
}

fn partial(trade: &TradeRecord, sell_price: f64, price: Option<f64>) -> Position {
    let capital = trade.capital;
    let shares = trade.initial_shares();
    let fraction = trade.sell_percent / 100.0;

    let sold_shares = shares * fraction;
    let sold_capital = capital * fraction;
    let realized_pnl = (sell_price - trade.entry_price) * sold_shares;

    let remaining_shares = shares - sold_shares;
    let remaining_capital = capital - sold_capital;

    let (current_value, unrealized_pnl) = match price {
        Some(p) => {
            let value = remaining_shares * p;
            (value, value - remaining_capital)
        }
        None => (remaining_capital, 0.0),
    };

    build(
        trade,
        PositionStatus::Partial {
            sold_percent: trade.sell_percent,
        },
        Amounts {
            remaining_shares,
            remaining_capital,
            current_value,
            realized_pnl,
            realized_pnl_percent: percent_of(realized_pnl, sold_capital),
            unrealized_pnl,
            unrealized_pnl_percent: percent_of(unrealized_pnl, remaining_capital),
            average_sell_price: Some(sell_price),
        },
    )
}

fn open(trade: &TradeRecord, price: Option<f64>) -> Position {
    let capital = trade.capital;
    let shares = trade.initial_shares();

    let (current_value, unrealized_pnl) = match price {
        Some(p) => {
            let value = shares * p;
            (value, value - capital)
        }
        None => (capital, 0.0),
    };

    build(
        trade,
        PositionStatus::Open,
        Amounts {
            remaining_shares: shares,
            remaining_capital: capital,
            current_value,
            realized_pnl: 0.0,
            realized_pnl_percent: 0.0,
            unrealized_pnl,
            unrealized_pnl_percent: percent_of(unrealized_pnl, capital),
            average_sell_price: None,
        },
    )
}

struct Amounts {
    remaining_shares: f64,
    remaining_capital: f64,
    current_value: f64,
    realized_pnl: f64,
    realized_pnl_percent: f64,
    unrealized_pnl: f64,
    unrealized_pnl_percent: f64,
    average_sell_price: Option<f64>,
}

fn build(trade: &TradeRecord, status: PositionStatus, amounts: Amounts) -> Position {
    let total_pnl = amounts.realized_pnl + amounts.unrealized_pnl;

    Position {
        ticker: trade.ticker.clone(),
        status,
        label: status.label(),
        initial_capital: trade.capital,
        initial_shares: trade.initial_shares(),
        remaining_shares: amounts.remaining_shares,
        remaining_capital: amounts.remaining_capital,
        current_value: amounts.current_value,
        realized_pnl: amounts.realized_pnl,
        realized_pnl_percent: amounts.realized_pnl_percent,
        unrealized_pnl: amounts.unrealized_pnl,
        unrealized_pnl_percent: amounts.unrealized_pnl_percent,
        total_pnl,
        total_pnl_percent: percent_of(total_pnl, trade.capital),
        average_sell_price: amounts.average_sell_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, FieldError};
    use approx::assert_relative_eq;

    fn trade() -> TradeRecord {
        TradeRecord::new("AAPL", None, 100.0, 1000.0)
    }

    #[test]
    fn test_open_with_price() {
        let pos = classify(&trade(), Some(150.0)).unwrap();

        assert_eq!(pos.status, PositionStatus::Open);
        assert_eq!(pos.label, "Open");
        assert_relative_eq!(pos.initial_shares, 10.0);
        assert_relative_eq!(pos.remaining_shares, 10.0);
        assert_relative_eq!(pos.current_value, 1500.0);
        assert_relative_eq!(pos.unrealized_pnl, 500.0);
        assert_relative_eq!(pos.unrealized_pnl_percent, 50.0);
        assert_relative_eq!(pos.total_pnl, 500.0);
        assert_relative_eq!(pos.total_pnl_percent, 50.0);
        assert_eq!(pos.realized_pnl, 0.0);
        assert_eq!(pos.average_sell_price, None);
    }

    #[test]
    fn test_open_without_price() {
        let pos = classify(&trade(), None).unwrap();

        assert_eq!(pos.status, PositionStatus::Open);
        assert_eq!(pos.current_value, 1000.0);
        assert_eq!(pos.unrealized_pnl, 0.0);
        assert_eq!(pos.total_pnl, 0.0);
    }

    #[test]
    fn test_unusable_price_is_unknown() {
        let zero = classify(&trade(), Some(0.0)).unwrap();
        assert_eq!(zero.current_value, 1000.0);

        let nan = classify(&trade(), Some(f64::NAN)).unwrap();
        assert_eq!(nan.current_value, 1000.0);
    }

    #[test]
    fn test_partial_exit() {
        let t = trade().with_sale(None, Some(120.0), 50.0);
        let pos = classify(&t, Some(130.0)).unwrap();

        assert_eq!(pos.status, PositionStatus::Partial { sold_percent: 50.0 });
        assert_eq!(pos.label, "Partial (50% sold)");
        assert_relative_eq!(pos.realized_pnl, 100.0);
        assert_relative_eq!(pos.realized_pnl_percent, 20.0);
        assert_relative_eq!(pos.remaining_shares, 5.0);
        assert_relative_eq!(pos.remaining_capital, 500.0);
        assert_relative_eq!(pos.current_value, 650.0);
        assert_relative_eq!(pos.unrealized_pnl, 150.0);
        assert_relative_eq!(pos.unrealized_pnl_percent, 30.0);
        assert_relative_eq!(pos.total_pnl, 250.0);
        assert_relative_eq!(pos.total_pnl_percent, 25.0);
        assert_eq!(pos.average_sell_price, Some(120.0));
    }

    #[test]
    fn test_partial_exit_without_price() {
        let t = trade().with_sale(None, Some(120.0), 50.0);
        let pos = classify(&t, None).unwrap();

        assert_relative_eq!(pos.realized_pnl, 100.0);
        assert_relative_eq!(pos.current_value, 500.0);
        assert_eq!(pos.unrealized_pnl, 0.0);
        assert_eq!(pos.unrealized_pnl_percent, 0.0);
        assert_relative_eq!(pos.total_pnl, 100.0);
        assert_relative_eq!(pos.total_pnl_percent, 10.0);
    }

    #[test]
    fn test_partial_without_sell_price_is_open() {
        let t = trade().with_sale(None, None, 50.0);
        let pos = classify(&t, Some(150.0)).unwrap();

        assert_eq!(pos.status, PositionStatus::Open);
        assert_relative_eq!(pos.remaining_shares, 10.0);
        assert_relative_eq!(pos.current_value, 1500.0);
        assert_eq!(pos.realized_pnl, 0.0);
    }

    #[test]
    fn test_closed_with_sell_price() {
        let t = trade()
            .with_sale(None, Some(90.0), 100.0)
            .with_status(TradeStatus::Closed);
        let pos = classify(&t, Some(500.0)).unwrap();

        assert_eq!(pos.status, PositionStatus::Closed);
        assert_relative_eq!(pos.realized_pnl, -100.0);
        assert_relative_eq!(pos.realized_pnl_percent, -10.0);
        assert_relative_eq!(pos.total_pnl, -100.0);
        assert_eq!(pos.remaining_shares, 0.0);
        assert_eq!(pos.current_value, 0.0);
        assert_eq!(pos.unrealized_pnl, 0.0);
    }

    #[test]
    fn test_closed_by_status_overrides_percent() {
        let t = trade()
            .with_sale(None, Some(110.0), 30.0)
            .with_status(TradeStatus::Closed);
        let pos = classify(&t, None).unwrap();

        assert_eq!(pos.status, PositionStatus::Closed);
        assert_relative_eq!(pos.realized_pnl, 100.0);
    }

    #[test]
    fn test_closed_exit_price_fallback() {
        let t = trade().with_sale(None, None, 100.0);

        let with_quote = classify(&t, Some(120.0)).unwrap();
        assert_eq!(with_quote.average_sell_price, Some(120.0));
        assert_relative_eq!(with_quote.realized_pnl, 200.0);

        let without_quote = classify(&t, None).unwrap();
        assert_eq!(without_quote.average_sell_price, Some(100.0));
        assert_eq!(without_quote.realized_pnl, 0.0);
    }

    #[test]
    fn test_invalid_trade() {
        let t = TradeRecord::new("AAPL", None, 0.0, 1000.0);
        let result = classify(&t, Some(100.0));

        assert!(matches!(
            result,
            Err(Error::InvalidTrade {
                reason: FieldError::NonPositive { .. },
                ..
            })
        ));
    }
}
