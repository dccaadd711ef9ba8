//! Analytics module.
//!
//! Provides equity curve reconstruction, performance statistics, monthly
//! return tables, trailing period windows and benchmark comparison.

mod benchmark;
mod equity;
mod monthly;
mod period;
mod statistics;

pub use benchmark::{
    benchmark_return, compare_benchmarks, normalize, portfolio_return, BenchmarkComparison,
    NormalizedPoint, PORTFOLIO_NAME,
};
pub use equity::EquityCurveBuilder;
pub use monthly::{monthly_returns, monthly_table, MonthlyRow, MonthlyTable};
pub use period::Period;
pub use statistics::{
    cagr, daily_returns, max_drawdown, sharpe_ratio, years_elapsed, PerformanceMetrics,
    DEFAULT_RISK_FREE_RATE, TRADING_DAYS,
};
