//! Advanced simulation results to a risk table plus chart series.

use serde::Serialize;

use crate::format::{self, NO_VALUE};
use crate::path_series::{build_series, ChartSeries, PathSeriesConfig};
use crate::{SimulationResult, Symbol};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationView {
    pub symbol: Symbol,
    pub method: Option<String>,
    pub current_price: String,
    pub regime_label: Option<String>,
    pub rows: Vec<SimulationRow>,
    pub series: ChartSeries,
}

/// One horizon of the risk table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationRow {
    pub horizon_days: u32,
    /// Row heading, e.g. `10 Days`.
    pub label: String,
    pub p10: String,
    pub p50: String,
    pub p90: String,
    pub risk_label: String,
    pub interpretation: String,
}

/// Rows follow the quantile horizons in ascending day order.
pub fn reduce_simulation(result: &SimulationResult, config: PathSeriesConfig) -> SimulationView {
    let rows = result
        .quantiles_by_horizon
        .iter()
        .map(|(&days, band)| {
            let analysis = result.analysis_by_horizon.get(&days);
            SimulationRow {
                horizon_days: days,
                label: format!("{days} Days"),
                p10: format::price(band.p10),
                p50: format::price(band.p50),
                p90: format::price(band.p90),
                risk_label: analysis
                    .and_then(|a| a.risk_label.clone())
                    .unwrap_or_else(|| String::from(NO_VALUE)),
                interpretation: analysis
                    .and_then(|a| a.interpretation.clone())
                    .unwrap_or_else(|| String::from(NO_VALUE)),
            }
        })
        .collect();

    SimulationView {
        symbol: result.symbol.clone(),
        method: result.method.clone(),
        current_price: format::price(result.current_price),
        regime_label: result
            .current_regime
            .as_ref()
            .and_then(|regime| regime.label.clone()),
        rows,
        series: build_series(&result.paths, config),
    }
}
