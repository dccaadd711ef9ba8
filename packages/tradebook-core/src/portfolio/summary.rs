//! Portfolio-level totals.

use crate::types::Position;
use serde::{Deserialize, Serialize};

/// Totals across every successfully classified position.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PortfolioSummary {
    /// Capital allocated across all trades
    pub total_invested: f64,
    /// Market value of everything still held
    pub total_current_value: f64,
    /// Realized gain/loss in dollars
    pub total_realized: f64,
    /// Unrealized gain/loss in dollars
    pub total_unrealized: f64,
    /// Realized plus unrealized
    pub total_pnl: f64,
    /// Total P&L as a percentage of invested capital
    pub total_pnl_percent: f64,
    /// Number of positions
    pub position_count: usize,
    /// Number of fully closed positions
    pub closed_count: usize,
    /// Share of closed positions with a positive realized P&L
    pub win_rate_percent: f64,
    /// Number of positions with gains
    pub positions_in_profit: usize,
    /// Number of positions with losses
    pub positions_in_loss: usize,
}

impl PortfolioSummary {
    /// Sum up a set of positions.
    pub fn from_positions(positions: &[Position]) -> Self {
        let total_invested: f64 = positions.iter().map(|p| p.initial_capital).sum();
        let total_current_value = positions.iter().map(|p| p.current_value).sum();
        let total_realized: f64 = positions.iter().map(|p| p.realized_pnl).sum();
        let total_unrealized: f64 = positions.iter().map(|p| p.unrealized_pnl).sum();
        let total_pnl = total_realized + total_unrealized;

        let total_pnl_percent = if total_invested > 0.0 {
            (total_pnl / total_invested) * 100.0
        } else {
            0.0
        };

        let closed: Vec<&Position> = positions.iter().filter(|p| p.is_closed()).collect();
        let winners = closed.iter().filter(|p| p.realized_pnl > 0.0).count();
        let win_rate_percent = if !closed.is_empty() {
            (winners as f64 / closed.len() as f64) * 100.0
        } else {
            0.0
        };

        Self {
            total_invested,
            total_current_value,
            total_realized,
            total_unrealized,
            total_pnl,
            total_pnl_percent,
            position_count: positions.len(),
            closed_count: closed.len(),
            win_rate_percent,
            positions_in_profit: positions.iter().filter(|p| p.total_pnl > 0.0).count(),
            positions_in_loss: positions.iter().filter(|p| p.total_pnl < 0.0).count(),
        }
    }
}
