//! Refresh-to-refresh change tracking for prices and P&L.
//!
//! Display layers highlight tickers whose price or P&L moved since the last
//! refresh. The previous values live in a [`PreviousState`] owned by the
//! caller; advancing it never mutates the old value.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Direction of a value against its previous observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    Up,
    Down,
    Unchanged,
}

impl Change {
    fn between(previous: f64, current: f64) -> Self {
        match current.partial_cmp(&previous) {
            Some(Ordering::Greater) => Self::Up,
            Some(Ordering::Less) => Self::Down,
            _ => Self::Unchanged,
        }
    }
}

/// Values seen for one ticker during a refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub ticker: String,
    pub price: Option<f64>,
    pub total_pnl: f64,
}

/// Changes detected for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickerChange {
    pub ticker: String,
    /// `None` on the first sighting or when no price is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Change>,
    /// `None` on the first sighting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl: Option<Change>,
}

/// Last observed price and P&L per ticker.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PreviousState {
    prices: BTreeMap<String, f64>,
    pnl: BTreeMap<String, f64>,
}

impl PreviousState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare observations against this state and return the changes along
    /// with the state to pass into the next refresh.
    pub fn advance(&self, observations: &[Observation]) -> (Vec<TickerChange>, PreviousState) {
        let mut next = self.clone();
        let mut changes = Vec::with_capacity(observations.len());

        for obs in observations {
            let ticker = obs.ticker.to_uppercase();

            let price = obs.price.and_then(|current| {
                let change = self
                    .prices
                    .get(&ticker)
                    .map(|&previous| Change::between(previous, current));
                next.prices.insert(ticker.clone(), current);
                change
            });

            let pnl = self
                .pnl
                .get(&ticker)
                .map(|&previous| Change::between(previous, obs.total_pnl));
            next.pnl.insert(ticker.clone(), obs.total_pnl);

            changes.push(TickerChange { ticker, price, pnl });
        }

        (changes, next)
    }

    pub fn last_price(&self, ticker: &str) -> Option<f64> {
        self.prices.get(&ticker.to_uppercase()).copied()
    }

    pub fn last_pnl(&self, ticker: &str) -> Option<f64> {
        self.pnl.get(&ticker.to_uppercase()).copied()
    }
}
