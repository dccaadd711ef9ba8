//! Market data boundary.
//!
//! The analytics never fetch prices themselves. Callers hand in a
//! [`MarketData`] implementation whose lookups cannot fail: a missing quote
//! or an empty history simply means "unknown".

use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Latest known price for a ticker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub price: f64,
    pub previous_close: f64,
}

/// Change of the latest price against the previous close.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DayChange {
    pub amount: f64,
    pub percent: f64,
}

impl Quote {
    pub fn new(price: f64, previous_close: f64) -> Self {
        Self {
            price,
            previous_close,
        }
    }

    /// Day change, or `None` without a usable previous close.
    pub fn day_change(&self) -> Option<DayChange> {
        if !self.previous_close.is_finite() || self.previous_close <= 0.0 {
            return None;
        }
        let amount = self.price - self.previous_close;
        Some(DayChange {
            amount,
            percent: (amount / self.previous_close) * 100.0,
        })
    }
}

/// One daily close.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Source of quotes and price history.
pub trait MarketData {
    /// Latest quote for a ticker, `None` when unknown.
    fn quote(&self, ticker: &str) -> Option<Quote>;

    /// Daily closes from `start` onwards in ascending date order. May be empty.
    fn history(&self, symbol: &str, start: NaiveDate) -> Vec<PricePoint>;
}

/// In-memory market data, typically loaded from a JSON snapshot.
///
/// ```json
/// {
///   "quotes": { "AAPL": { "price": 190.0, "previous_close": 188.5 } },
///   "history": { "SPY": [ { "date": "2024-01-02", "close": 472.6 } ] }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticMarketData {
    quotes: HashMap<String, Quote>,
    history: HashMap<String, Vec<PricePoint>>,
}

impl StaticMarketData {
    /// Create an empty snapshot where every lookup is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&content)?;
        Ok(snapshot.normalized())
    }

    // Tickers are matched case-insensitively and history must be sorted.
    fn normalized(self) -> Self {
        let quotes = self
            .quotes
            .into_iter()
            .map(|(ticker, quote)| (ticker.to_uppercase(), quote))
            .collect();
        let history = self
            .history
            .into_iter()
            .map(|(symbol, mut points)| {
                points.sort_by_key(|p| p.date);
                (symbol.to_uppercase(), points)
            })
            .collect();
        Self { quotes, history }
    }

    pub fn with_quote(mut self, ticker: &str, price: f64, previous_close: f64) -> Self {
        self.quotes
            .insert(ticker.to_uppercase(), Quote::new(price, previous_close));
        self
    }

    pub fn with_history(mut self, symbol: &str, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        self.history.insert(symbol.to_uppercase(), points);
        self
    }
}

impl MarketData for StaticMarketData {
    fn quote(&self, ticker: &str) -> Option<Quote> {
        self.quotes.get(&ticker.to_uppercase()).copied()
    }

    fn history(&self, symbol: &str, start: NaiveDate) -> Vec<PricePoint> {
        self.history
            .get(&symbol.to_uppercase())
            .map(|points| points.iter().filter(|p| p.date >= start).copied().collect())
            .unwrap_or_default()
    }
}
