//! User settings.
//!
//! Settings are read from a TOML file. Every field is optional, so an empty
//! or missing file yields the defaults:
//!
//! ```toml
//! ledger_path = "/home/me/trades.csv"
//! risk_free_rate = 0.02
//! default_period = "1Y"
//!
//! [[benchmarks]]
//! symbol = "SPY"
//! name = "S&P 500"
//! ```

use crate::analytics::{Period, DEFAULT_RISK_FREE_RATE};
use crate::ledger::Ledger;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// An index the portfolio is compared against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Benchmark {
    /// Ticker used for history lookups
    pub symbol: String,
    /// Display name
    pub name: String,
}

impl Benchmark {
    pub fn new(symbol: &str, name: &str) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            name: name.to_string(),
        }
    }
}

fn default_benchmarks() -> Vec<Benchmark> {
    vec![
        Benchmark::new("SPY", "S&P 500"),
        Benchmark::new("QQQ", "NASDAQ"),
    ]
}

/// Analytics settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Ledger CSV location, overrides the default ledger path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<PathBuf>,
    /// Annual risk-free rate for the Sharpe ratio (0.02 = 2%)
    pub risk_free_rate: f64,
    /// Indices to compare against, in display order
    pub benchmarks: Vec<Benchmark>,
    /// Window used for benchmark comparison when none is requested
    pub default_period: Period,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ledger_path: None,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            benchmarks: default_benchmarks(),
            default_period: Period::default(),
        }
    }
}

impl Settings {
    /// Get the default settings file path.
    ///
    /// Default path: `~/.tradebook/config.toml`
    /// Can be overridden with `TRADEBOOK_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("TRADEBOOK_CONFIG") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".tradebook/config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Load settings from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load settings from a specific path. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)?;
        Ok(settings.sanitized())
    }

    fn sanitized(mut self) -> Self {
        if !self.risk_free_rate.is_finite() {
            tracing::warn!(
                "Ignoring risk_free_rate {}, using {}",
                self.risk_free_rate,
                DEFAULT_RISK_FREE_RATE
            );
            self.risk_free_rate = DEFAULT_RISK_FREE_RATE;
        }
        for benchmark in &mut self.benchmarks {
            benchmark.symbol = benchmark.symbol.trim().to_uppercase();
        }
        self.benchmarks.retain(|b| !b.symbol.is_empty());
        self
    }

    /// Ledger file to read: the configured path, else the ledger default.
    pub fn ledger_path(&self) -> PathBuf {
        self.ledger_path
            .clone()
            .unwrap_or_else(Ledger::default_path)
    }
}
