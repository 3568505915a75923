use std::sync::Arc;

use ferrocast_core::{ForecastService, MarketOverviewView, TradeDate, ViewConfig};
use serde_json::Value;

use crate::cli::OverviewArgs;
use crate::error::CliError;

use super::settled;

pub async fn run(args: &OverviewArgs, gateway: Arc<dyn ForecastService>) -> Result<Value, CliError> {
    let date = args.date.as_deref().map(TradeDate::parse).transpose()?;
    let view = MarketOverviewView::new(gateway, &ViewConfig::default());
    settled(view.load(date).await)
}
