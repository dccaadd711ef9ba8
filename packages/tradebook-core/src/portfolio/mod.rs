//! Portfolio module.
//!
//! Provides per-trade position classification, portfolio totals and
//! refresh-to-refresh change tracking.

mod changes;
mod position;
mod summary;

pub use changes::{Change, Observation, PreviousState, TickerChange};
pub use position::classify;
pub use summary::PortfolioSummary;
