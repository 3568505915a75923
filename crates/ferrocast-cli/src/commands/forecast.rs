use std::sync::Arc;

use ferrocast_core::{DashboardView, ForecastService, ViewConfig};
use serde_json::Value;

use crate::cli::SymbolArgs;
use crate::error::CliError;

use super::settled;

pub async fn run(args: &SymbolArgs, gateway: Arc<dyn ForecastService>) -> Result<Value, CliError> {
    let view = DashboardView::new(gateway, &ViewConfig::default());
    settled(view.search(&args.symbol).await)
}
