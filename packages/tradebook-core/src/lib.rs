//! Tradebook Core - Trade ledger analytics library.
//!
//! This crate turns a ledger of equity trades into portfolio analytics:
//!
//! - **Ledger ingestion**: CSV rows validated into typed trade records
//! - **Position P&L**: Open, partially exited and closed trade classification
//! - **Equity curve**: Day-by-day replay of allocated capital and realized gains
//! - **Performance**: CAGR, Sharpe ratio, max drawdown, monthly returns
//! - **Benchmarks**: Period-windowed comparison against index histories
//!
//! Every computation is a pure function of the ledger snapshot, the market
//! prices supplied by the caller and the evaluation time.
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::Local;
//! use tradebook_core::{build_report, Ledger, Settings, StaticMarketData};
//!
//! let ledger = Ledger::load(&Ledger::default_path()).unwrap();
//! let market = StaticMarketData::new().with_quote("AAPL", 190.0, 188.5);
//!
//! let report = build_report(&ledger, &market, &Settings::default(), Local::now().naive_local());
//! println!("Total P&L: {:.2}", report.summary.total_pnl);
//! ```

pub mod analytics;
pub mod config;
pub mod ledger;
pub mod market;
pub mod portfolio;
pub mod report;
pub mod types;

// Re-export commonly used types
pub use types::{
    ApiResponse, EquityCurve, EquityPoint, MonthlyReturn, Position, PositionStatus, TradeRecord,
    TradeStatus,
};

// Re-export main functionality
pub use analytics::{
    cagr, compare_benchmarks, daily_returns, max_drawdown, monthly_returns, monthly_table,
    sharpe_ratio, BenchmarkComparison, EquityCurveBuilder, MonthlyTable, PerformanceMetrics,
    Period,
};
pub use config::{Benchmark, Settings};
pub use ledger::{normalize_date, Ledger, LedgerRow, SkippedTrade};
pub use market::{DayChange, MarketData, PricePoint, Quote, StaticMarketData};
pub use portfolio::{classify, Change, Observation, PortfolioSummary, PreviousState, TickerChange};
pub use report::{build_report, PortfolioReport, PositionRow};

/// Why a single ledger field could not be used.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("{0} is missing")]
    Missing(&'static str),

    #[error("{field} is not a number: {value:?}")]
    Malformed { field: &'static str, value: String },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
}

/// Error types for tradebook-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid trade {ticker}: {reason}")]
    InvalidTrade { ticker: String, reason: FieldError },

    #[error("Missing market data: {0}")]
    MissingMarketData(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
}

impl Error {
    pub(crate) fn invalid_trade(ticker: &str, reason: FieldError) -> Self {
        Self::InvalidTrade {
            ticker: ticker.to_string(),
            reason,
        }
    }
}

/// Result type for tradebook-core operations.
pub type Result<T> = std::result::Result<T, Error>;
