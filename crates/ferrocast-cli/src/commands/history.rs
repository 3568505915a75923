use std::sync::Arc;

use ferrocast_core::{ArchiveView, ForecastService, IndicesView};
use serde_json::Value;

use crate::cli::SymbolArgs;
use crate::error::CliError;

use super::settled;

pub async fn archive(
    args: &SymbolArgs,
    gateway: Arc<dyn ForecastService>,
) -> Result<Value, CliError> {
    let view = ArchiveView::new(gateway);
    settled(view.load(&args.symbol).await)
}

pub async fn indices(gateway: Arc<dyn ForecastService>) -> Result<Value, CliError> {
    let view = IndicesView::new(gateway);
    settled(view.load().await)
}
