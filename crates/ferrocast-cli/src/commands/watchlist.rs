use std::sync::Arc;

use ferrocast_core::forecast_view::{overview_rows, OverviewRowView};
use ferrocast_core::{
    ForecastService, Notice, ViewConfig, ViewState, Watchlist, WatchlistSynchronizer,
};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::cli::{WatchlistArgs, WatchlistCommand};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct WatchlistResponseData {
    symbols: Watchlist,
    overview: Vec<OverviewRowView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    overview_error: Option<String>,
    notices: Vec<Notice>,
}

pub async fn run(args: &WatchlistArgs, gateway: Arc<dyn ForecastService>) -> Result<Value, CliError> {
    let sync = WatchlistSynchronizer::new(gateway);

    match &args.command {
        WatchlistCommand::List => {
            if let Err(error) = sync.initialize().await {
                warn!(%error, "watchlist degraded to empty");
            }
        }
        WatchlistCommand::Add(symbol) => sync.add(&symbol.symbol).await?,
        WatchlistCommand::Remove(symbol) => sync.remove(&symbol.symbol).await?,
    }

    let (overview, overview_error) = match sync.overview() {
        ViewState::Ready(table) => (overview_rows(&table, &ViewConfig::default().horizons), None),
        ViewState::Failed(error) => (Vec::new(), Some(error.user_message())),
        ViewState::Idle | ViewState::Loading => (Vec::new(), None),
    };

    let data = WatchlistResponseData {
        symbols: sync.watchlist(),
        overview,
        overview_error,
        notices: sync.notices().take(),
    };
    Ok(serde_json::to_value(data)?)
}
