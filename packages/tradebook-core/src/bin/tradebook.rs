//! Tradebook CLI - Command line interface for trade ledger analytics.
//!
//! Every command prints an `ApiResponse` as pretty JSON on stdout. Logs go to
//! stderr and are controlled with `RUST_LOG`.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tradebook_core::{
    build_report, compare_benchmarks, normalize_date, ApiResponse, Ledger, Period,
    PortfolioReport, Settings, StaticMarketData,
};

#[derive(Parser)]
#[command(name = "tradebook")]
#[command(about = "Tradebook CLI - trade ledger P&L and performance analytics")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to ~/.tradebook/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ledger CSV file (overrides the configured ledger)
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    /// Market data snapshot (JSON quotes and price history)
    #[arg(long, global = true)]
    market: Option<PathBuf>,

    /// Evaluation time, e.g. 2024-03-01 or 2024-03-01T16:00:00 (defaults to now)
    #[arg(long, global = true)]
    now: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List positions with P&L
    Positions,
    /// Portfolio totals
    Summary,
    /// CAGR, Sharpe ratio, max drawdown and win rate
    Performance,
    /// Monthly return table
    Monthly,
    /// Daily equity curve
    Equity {
        /// Trailing window: 1D, 1W, 1M, 6M, YTD, 1Y, 5Y or MAX
        #[arg(short, long)]
        period: Option<Period>,
    },
    /// Portfolio return against benchmark indices
    Benchmarks {
        /// Trailing window: 1D, 1W, 1M, 6M, YTD, 1Y, 5Y or MAX
        #[arg(short, long)]
        period: Option<Period>,
    },
    /// Full report
    Report,
}

fn main() -> Result<()> {
    // Logs on stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let output = match run(cli) {
        Ok(output) => output,
        Err(e) => {
            tracing::error!("{:#}", e);
            serde_json::to_string_pretty(&ApiResponse::<()>::err(format!("{:#}", e)))?
        }
    };

    println!("{}", output);
    Ok(())
}

fn render<T: Serialize>(data: T) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ApiResponse::ok(data))?)
}

fn parse_now(raw: Option<&str>) -> Result<NaiveDateTime> {
    let Some(raw) = raw else {
        return Ok(Local::now().naive_local());
    };

    if let Ok(datetime) = raw.trim().parse::<NaiveDateTime>() {
        return Ok(datetime);
    }

    normalize_date(raw)
        .map(|date| date.and_time(NaiveTime::MIN))
        .with_context(|| format!("Invalid --now value: {}", raw))
}

fn load_settings(path: Option<PathBuf>) -> Result<Settings> {
    let path = path.unwrap_or_else(Settings::default_path);
    Settings::load_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}

fn load_market(path: Option<PathBuf>) -> Result<StaticMarketData> {
    match path {
        Some(path) => StaticMarketData::load(&path)
            .with_context(|| format!("Failed to load market data from {}", path.display())),
        None => {
            tracing::debug!("No market data given, prices are unknown");
            Ok(StaticMarketData::new())
        }
    }
}

fn run(cli: Cli) -> Result<String> {
    let now = parse_now(cli.now.as_deref())?;
    let settings = load_settings(cli.config)?;
    let market = load_market(cli.market)?;

    let ledger_path = cli.ledger.unwrap_or_else(|| settings.ledger_path());
    let ledger = Ledger::load(&ledger_path)
        .with_context(|| format!("Failed to read ledger {}", ledger_path.display()))?;

    let report = build_report(&ledger, &market, &settings, now);

    match cli.command {
        Commands::Positions => render(&report.positions),
        Commands::Summary => render(&report.summary),
        Commands::Performance => render(&report.performance),
        Commands::Monthly => render(&report.monthly),
        Commands::Equity { period } => handle_equity(&report, period, now),
        Commands::Benchmarks { period } => {
            let period = period.unwrap_or(settings.default_period);
            handle_benchmarks(&report, &settings, &market, period, now)
        }
        Commands::Report => render(&report),
    }
}

fn handle_equity(
    report: &PortfolioReport,
    period: Option<Period>,
    now: NaiveDateTime,
) -> Result<String> {
    let period = period.unwrap_or_default();
    let curve = period.filter(&report.equity_curve, now);
    render(json!({
        "period": period,
        "points": curve,
    }))
}

fn handle_benchmarks(
    report: &PortfolioReport,
    settings: &Settings,
    market: &StaticMarketData,
    period: Period,
    now: NaiveDateTime,
) -> Result<String> {
    let series = compare_benchmarks(
        &report.equity_curve,
        &settings.benchmarks,
        market,
        period,
        now,
    );
    render(json!({
        "period": period,
        "series": series,
    }))
}
