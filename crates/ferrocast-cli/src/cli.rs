//! CLI argument definitions for ferrocast.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `forecast` | Multi-horizon forecast cards for one symbol |
//! | `archive` | Past forecasts for one symbol |
//! | `indices` | Past forecasts for the tracked indices |
//! | `overview` | Market overview for a date |
//! | `watchlist` | List, add or remove watched symbols |
//! | `simulate` | Monte-Carlo simulation table and chart series |
//! | `health` | Forecast service liveness |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--api-url` | `http://localhost:8000` | Forecast service base url |
//! | `--timeout-ms` | none | Request timeout in ms; requests wait indefinitely when unset |
//! | `--pretty` | `false` | Pretty-print JSON output |
//!
//! # Examples
//!
//! ```bash
//! ferrocast forecast SPY --pretty
//! ferrocast overview --date 2024-05-01
//! ferrocast watchlist add nvda
//! ferrocast simulate AAPL --method bootstrap --conservative
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use ferrocast_core::config::{API_URL_ENV, DEFAULT_API_URL, TIMEOUT_ENV};
use ferrocast_core::SimulationMethod;

/// Ferrocast - forecast dashboard client
///
/// Fetches forecasts, overviews and simulations from a forecasting service
/// and prints the reduced view models as JSON.
#[derive(Debug, Parser)]
#[command(name = "ferrocast", author, version, about = "Forecast dashboard client")]
pub struct Cli {
    /// Base url of the forecasting service.
    #[arg(long, global = true, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Request timeout in milliseconds. Unset means no timeout.
    #[arg(long, global = true, env = TIMEOUT_ENV)]
    pub timeout_ms: Option<u64>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast cards and regime summary for a symbol.
    ///
    ///   ferrocast forecast SPY
    Forecast(SymbolArgs),

    /// Archived forecasts for a symbol.
    Archive(SymbolArgs),

    /// Archived forecasts for the tracked market indices.
    Indices,

    /// Market overview, optionally as of a date.
    ///
    ///   ferrocast overview --date 2024-05-01
    Overview(OverviewArgs),

    /// Watchlist management.
    Watchlist(WatchlistArgs),

    /// Advanced Monte-Carlo simulation.
    ///
    ///   ferrocast simulate AAPL --method garch
    Simulate(SimulateArgs),

    /// Forecast service liveness check.
    Health,
}

#[derive(Debug, Args)]
pub struct SymbolArgs {
    /// Market symbol (case-insensitive).
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct OverviewArgs {
    /// ISO date (YYYY-MM-DD); the service default when omitted.
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct WatchlistArgs {
    #[command(subcommand)]
    pub command: WatchlistCommand,
}

#[derive(Debug, Subcommand)]
pub enum WatchlistCommand {
    /// Show the watchlist and its overview.
    List,
    /// Add a symbol.
    Add(SymbolArgs),
    /// Remove a symbol.
    Remove(SymbolArgs),
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Market symbol (case-insensitive).
    pub symbol: String,

    /// Path generator.
    #[arg(long, value_enum, default_value_t = MethodArg::Garch)]
    pub method: MethodArg,

    /// Use conservative volatility assumptions.
    #[arg(long, default_value_t = false)]
    pub conservative: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    /// Regime-switching GARCH with jumps.
    Garch,
    /// Empirical block bootstrap.
    Bootstrap,
}

impl From<MethodArg> for SimulationMethod {
    fn from(value: MethodArg) -> Self {
        match value {
            MethodArg::Garch => Self::Garch,
            MethodArg::Bootstrap => Self::Bootstrap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_watchlist_command() {
        let cli = Cli::try_parse_from(["ferrocast", "--pretty", "watchlist", "add", "aapl"])
            .expect("parses");
        assert!(cli.pretty);
        assert_eq!(cli.timeout_ms, None);
        match cli.command {
            Command::Watchlist(WatchlistArgs {
                command: WatchlistCommand::Add(args),
            }) => assert_eq!(args.symbol, "aapl"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn simulate_defaults_to_garch() {
        let cli = Cli::try_parse_from(["ferrocast", "simulate", "SPY"]).expect("parses");
        match cli.command {
            Command::Simulate(args) => {
                assert_eq!(SimulationMethod::from(args.method), SimulationMethod::Garch);
                assert!(!args.conservative);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
