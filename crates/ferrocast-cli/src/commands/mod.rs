mod forecast;
mod health;
mod history;
mod overview;
mod simulate;
mod watchlist;

use std::sync::Arc;

use ferrocast_core::{ForecastService, GatewayConfig, HttpForecastGateway, ViewState};
use serde::Serialize;
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let mut config = GatewayConfig::new(&cli.api_url)?;
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }
    let gateway: Arc<dyn ForecastService> = Arc::new(HttpForecastGateway::new(config));

    match &cli.command {
        Command::Forecast(args) => forecast::run(args, gateway).await,
        Command::Archive(args) => history::archive(args, gateway).await,
        Command::Indices => history::indices(gateway).await,
        Command::Overview(args) => overview::run(args, gateway).await,
        Command::Watchlist(args) => watchlist::run(args, gateway).await,
        Command::Simulate(args) => simulate::run(args, gateway).await,
        Command::Health => health::run(gateway).await,
    }
}

/// Serializes the data of a settled view, or returns its error.
fn settled<T: Serialize>(state: ViewState<T>) -> Result<Value, CliError> {
    match state {
        ViewState::Ready(data) => Ok(serde_json::to_value(data)?),
        ViewState::Failed(error) => Err(CliError::Gateway(error)),
        other => Err(CliError::Command(format!(
            "view did not settle (state: {})",
            other.phase()
        ))),
    }
}
