//! Trade ledger ingestion.
//!
//! Reads the CSV ledger into validated [`TradeRecord`]s. Rows that cannot be
//! used are kept aside as [`SkippedTrade`]s instead of failing the whole load.

mod dates;

pub use dates::normalize_date;

use crate::types::{TradeRecord, TradeStatus};
use crate::{Error, FieldError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Raw ledger row, one string per column.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LedgerRow {
    #[serde(rename = "Stock Name")]
    pub stock_name: String,
    #[serde(rename = "Entry Date")]
    pub entry_date: String,
    #[serde(rename = "Entry Price")]
    pub entry_price: String,
    #[serde(rename = "Capital")]
    pub capital: String,
    #[serde(rename = "Sell Date")]
    pub sell_date: String,
    #[serde(rename = "Sell Price")]
    pub sell_price: String,
    #[serde(rename = "Sell %")]
    pub sell_percent: String,
    #[serde(rename = "Trade Status")]
    pub trade_status: String,
    #[serde(rename = "Sell Target 1")]
    pub sell_target_1: String,
    #[serde(rename = "Sell Target 2")]
    pub sell_target_2: String,
    #[serde(rename = "Sell Target 3")]
    pub sell_target_3: String,
}

impl LedgerRow {
    /// True when every cell is blank.
    pub fn is_blank(&self) -> bool {
        [
            &self.stock_name,
            &self.entry_date,
            &self.entry_price,
            &self.capital,
            &self.sell_date,
            &self.sell_price,
            &self.sell_percent,
            &self.trade_status,
            &self.sell_target_1,
            &self.sell_target_2,
            &self.sell_target_3,
        ]
        .iter()
        .all(|cell| is_blank_cell(cell))
    }
}

fn is_blank_cell(cell: &str) -> bool {
    matches!(cell.trim().to_lowercase().as_str(), "" | "nan" | "none")
}

/// Parse an optional numeric cell, telling blank apart from garbage.
fn parse_number(field: &'static str, raw: &str) -> std::result::Result<Option<f64>, FieldError> {
    if is_blank_cell(raw) {
        return Ok(None);
    }
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(FieldError::Malformed {
            field,
            value: raw.trim().to_string(),
        }),
    }
}

fn parse_positive(field: &'static str, raw: &str) -> std::result::Result<f64, FieldError> {
    let value = parse_number(field, raw)?.ok_or(FieldError::Missing(field))?;
    if value <= 0.0 {
        return Err(FieldError::NonPositive { field, value });
    }
    Ok(value)
}

fn parse_optional_positive(
    field: &'static str,
    raw: &str,
) -> std::result::Result<Option<f64>, FieldError> {
    match parse_number(field, raw)? {
        Some(value) if value <= 0.0 => Err(FieldError::NonPositive { field, value }),
        other => Ok(other),
    }
}

fn parse_sell_percent(raw: &str) -> std::result::Result<f64, FieldError> {
    let value = parse_number("Sell %", raw)?.unwrap_or(0.0);
    if value < 0.0 {
        return Err(FieldError::Malformed {
            field: "Sell %",
            value: raw.trim().to_string(),
        });
    }
    Ok(value)
}

fn parse_ticker(raw: &str) -> std::result::Result<String, FieldError> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() || ticker == "NAN" || ticker == "0" {
        return Err(FieldError::Missing("Stock Name"));
    }
    Ok(ticker)
}

impl TryFrom<&LedgerRow> for TradeRecord {
    type Error = Error;

    fn try_from(row: &LedgerRow) -> Result<Self> {
        let fail = |reason: FieldError| Error::invalid_trade(row.stock_name.trim(), reason);

        let ticker = parse_ticker(&row.stock_name).map_err(fail)?;
        let entry_price = parse_positive("Entry Price", &row.entry_price).map_err(fail)?;
        let capital = parse_positive("Capital", &row.capital).map_err(fail)?;
        // Exit fields never reject a trade: a bad value is logged and read as unsold.
        let sell_price = parse_optional_positive("Sell Price", &row.sell_price)
            .unwrap_or_else(|e| {
                tracing::warn!("{}: ignoring {}", ticker, e);
                None
            });
        let sell_percent = parse_sell_percent(&row.sell_percent).unwrap_or_else(|e| {
            tracing::warn!("{}: ignoring {}, treating as unsold", ticker, e);
            0.0
        });

        let targets = [
            ("Sell Target 1", &row.sell_target_1),
            ("Sell Target 2", &row.sell_target_2),
            ("Sell Target 3", &row.sell_target_3),
        ];
        let mut sell_targets = [None; 3];
        for (slot, (field, raw)) in sell_targets.iter_mut().zip(targets) {
            // Targets are advisory
            *slot = parse_number(field, raw).unwrap_or_else(|e| {
                tracing::warn!("{}: ignoring {}", ticker, e);
                None
            });
        }

        Ok(TradeRecord {
            ticker,
            entry_date: normalize_date(&row.entry_date),
            entry_price,
            capital,
            sell_date: normalize_date(&row.sell_date),
            sell_price,
            sell_percent,
            status: TradeStatus::parse(&row.trade_status),
            sell_targets,
        })
    }
}

/// A ledger row or trade that was left out of the analytics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedTrade {
    /// 1-based data row in the ledger file, if the trade came from one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    pub ticker: String,
    pub reason: String,
}

/// Snapshot of the trade ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    /// Rows that passed validation, in file order
    pub trades: Vec<TradeRecord>,
    /// Rows that were rejected
    pub rejected: Vec<SkippedTrade>,
}

impl Ledger {
    /// Build a ledger from already-validated trades.
    pub fn from_trades(trades: Vec<TradeRecord>) -> Self {
        Self {
            trades,
            rejected: Vec::new(),
        }
    }

    /// Get the default ledger file path.
    ///
    /// Default path: `~/.tradebook/trades.csv`
    /// Can be overridden with `TRADEBOOK_LEDGER_FILE` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("TRADEBOOK_LEDGER_FILE") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".tradebook/trades.csv"))
            .unwrap_or_else(|| PathBuf::from("trades.csv"))
    }

    /// Load the ledger from a CSV file. A missing file is an empty ledger.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No ledger at {}, starting empty", path.display());
            return Ok(Self::default());
        }

        let file = fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse CSV ledger content with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.byte_headers()?.clone();
        let ticker_column = headers.iter().position(|h| h == b"Stock Name");

        let mut ledger = Self::default();
        for (idx, record) in csv_reader.byte_records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    ledger.reject(idx + 1, String::new(), e.to_string());
                    continue;
                }
            };

            // Decoded per row: a badly encoded cell rejects only its own row
            let row: LedgerRow = match record.deserialize(Some(&headers)) {
                Ok(row) => row,
                Err(e) => {
                    let ticker = ticker_column
                        .and_then(|i| record.get(i))
                        .map(|cell| String::from_utf8_lossy(cell).trim().to_uppercase())
                        .unwrap_or_default();
                    ledger.reject(idx + 1, ticker, e.to_string());
                    continue;
                }
            };
            if row.is_blank() {
                continue;
            }

            match TradeRecord::try_from(&row) {
                Ok(trade) => ledger.trades.push(trade),
                Err(e) => {
                    let ticker = row.stock_name.trim().to_uppercase();
                    ledger.reject(idx + 1, ticker, e.to_string());
                }
            }
        }

        tracing::debug!(
            "Loaded {} trades ({} rejected)",
            ledger.trades.len(),
            ledger.rejected.len()
        );
        Ok(ledger)
    }

    fn reject(&mut self, row: usize, ticker: String, reason: String) {
        tracing::warn!("Skipping ledger row {}: {}", row, reason);
        self.rejected.push(SkippedTrade {
            row: Some(row),
            ticker,
            reason,
        });
    }

    /// Earliest entry date among trades usable for computation.
    pub fn first_entry_date(&self) -> Option<chrono::NaiveDate> {
        self.trades
            .iter()
            .filter(|t| t.is_valid())
            .filter_map(|t| t.entry_date)
            .min()
    }
}
