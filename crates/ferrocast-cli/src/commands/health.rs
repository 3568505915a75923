use std::sync::Arc;

use ferrocast_core::ForecastService;
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

#[derive(Debug, Serialize)]
struct HealthResponseData {
    ok: bool,
    status: String,
    version: Option<String>,
}

pub async fn run(gateway: Arc<dyn ForecastService>) -> Result<Value, CliError> {
    let report = gateway.health().await?;
    let data = HealthResponseData {
        ok: report.is_ok(),
        status: report.status,
        version: report.version,
    };
    Ok(serde_json::to_value(data)?)
}
