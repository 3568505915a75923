use std::sync::Arc;

use ferrocast_core::{AdvancedSimulationView, ForecastService, SimulationParams, ViewConfig};
use serde_json::Value;

use crate::cli::SimulateArgs;
use crate::error::CliError;

use super::settled;

pub async fn run(args: &SimulateArgs, gateway: Arc<dyn ForecastService>) -> Result<Value, CliError> {
    let params = SimulationParams::new(args.method.into(), args.conservative);
    let view = AdvancedSimulationView::new(gateway, &ViewConfig::default());
    settled(view.run(&args.symbol, params).await)
}
