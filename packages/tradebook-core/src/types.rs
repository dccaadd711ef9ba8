//! Core data types for the trade ledger.

use crate::{Error, FieldError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle flag recorded in the ledger's `Trade Status` column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Open,
    Closed,
    #[default]
    Unset,
}

impl TradeStatus {
    /// Parse a ledger cell. Anything other than OPEN or CLOSED is unset.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "OPEN" => Self::Open,
            "CLOSED" => Self::Closed,
            _ => Self::Unset,
        }
    }
}

/// One validated row of the trade ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRecord {
    /// Ticker symbol (uppercase)
    pub ticker: String,
    /// Entry date, absent when the ledger cell could not be parsed
    pub entry_date: Option<NaiveDate>,
    /// Price per share at entry
    pub entry_price: f64,
    /// Capital allocated at entry
    pub capital: f64,
    /// Date of the (last) exit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_date: Option<NaiveDate>,
    /// Exit price per share
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_price: Option<f64>,
    /// Percentage of the position already exited (0-100)
    pub sell_percent: f64,
    /// Status recorded in the ledger
    pub status: TradeStatus,
    /// Advisory sell targets, never used in calculations
    #[serde(default)]
    pub sell_targets: [Option<f64>; 3],
}

impl TradeRecord {
    /// Create an unsold trade.
    pub fn new(
        ticker: &str,
        entry_date: Option<NaiveDate>,
        entry_price: f64,
        capital: f64,
    ) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            entry_date,
            entry_price,
            capital,
            sell_date: None,
            sell_price: None,
            sell_percent: 0.0,
            status: TradeStatus::Unset,
            sell_targets: [None; 3],
        }
    }

    /// Record an exit of `sell_percent` of the position.
    pub fn with_sale(
        mut self,
        sell_date: Option<NaiveDate>,
        sell_price: Option<f64>,
        sell_percent: f64,
    ) -> Self {
        self.sell_date = sell_date;
        self.sell_price = sell_price;
        self.sell_percent = sell_percent;
        self
    }

    /// Set the ledger status.
    pub fn with_status(mut self, status: TradeStatus) -> Self {
        self.status = status;
        self
    }

    /// Check the invariants every computation relies on.
    pub fn validate(&self) -> Result<()> {
        if !self.entry_price.is_finite() || self.entry_price <= 0.0 {
            return Err(Error::invalid_trade(
                &self.ticker,
                FieldError::NonPositive {
                    field: "Entry Price",
                    value: self.entry_price,
                },
            ));
        }
        if !self.capital.is_finite() || self.capital <= 0.0 {
            return Err(Error::invalid_trade(
                &self.ticker,
                FieldError::NonPositive {
                    field: "Capital",
                    value: self.capital,
                },
            ));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Shares bought at entry (capital / entry price).
    pub fn initial_shares(&self) -> f64 {
        self.capital / self.entry_price
    }
}

/// How far a position has been exited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum PositionStatus {
    Open,
    Partial { sold_percent: f64 },
    Closed,
}

impl PositionStatus {
    /// Human-readable status label.
    pub fn label(&self) -> String {
        match self {
            Self::Open => "Open".to_string(),
            Self::Partial { sold_percent } => format!("Partial ({:.0}% sold)", sold_percent),
            Self::Closed => "Closed".to_string(),
        }
    }
}

/// P&L view of a single trade, derived from a [`TradeRecord`] and an optional price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub ticker: String,
    pub status: PositionStatus,
    pub label: String,
    pub initial_capital: f64,
    pub initial_shares: f64,
    pub remaining_shares: f64,
    pub remaining_capital: f64,
    /// Market value of the remaining shares
    pub current_value: f64,
    pub realized_pnl: f64,
    pub realized_pnl_percent: f64,
    pub unrealized_pnl: f64,
    pub unrealized_pnl_percent: f64,
    pub total_pnl: f64,
    pub total_pnl_percent: f64,
    /// Exit price used for the realized part, absent for open positions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_sell_price: Option<f64>,
}

impl Position {
    pub fn is_closed(&self) -> bool {
        matches!(self.status, PositionStatus::Closed)
    }
}

/// Portfolio equity on one calendar day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Daily equity series, ascending by date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct EquityCurve {
    points: Vec<EquityPoint>,
}

impl EquityCurve {
    pub fn new(points: Vec<EquityPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&EquityPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&EquityPoint> {
        self.points.last()
    }

    /// Equity values in date order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.equity).collect()
    }
}

impl FromIterator<EquityPoint> for EquityCurve {
    fn from_iter<I: IntoIterator<Item = EquityPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Month-over-month change in closing equity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MonthlyReturn {
    pub year: i32,
    /// Calendar month, 1-12
    pub month: u32,
    pub return_percent: f64,
}

/// API response wrapper used by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
