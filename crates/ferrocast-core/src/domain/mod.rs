//! # Domain Models
//!
//! Typed shapes of everything the forecasting service returns.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated uppercase ticker |
//! | [`TradeDate`] | ISO calendar date |
//! | [`Horizon`] | Forecast lookahead in days |
//! | [`ForecastBundle`] | Per-symbol multi-horizon forecast |
//! | [`OverviewTable`] | Per-symbol close + forecast rows for one date |
//! | [`Watchlist`] | User-curated symbol list |
//! | [`SimulationResult`] | Monte-Carlo paths, quantiles and risk analysis |
//! | [`ArchiveEntry`] / [`IndexHistoryEntry`] | Past forecasts with realised outcomes |
//!
//! Wire payloads are decoded leniently: optional numeric fields stay `None`
//! and are rendered as `N/A` by the view reducers instead of failing the
//! whole response.

mod date;
mod horizon;
mod models;
mod symbol;

pub use date::TradeDate;
pub use horizon::Horizon;
pub(crate) use models::WireOverviewRow;
pub use models::{
    ArchiveEntry, ComponentValue, ForecastBundle, HealthReport, HorizonAnalysis, HorizonForecast,
    IndexHistoryEntry, Outlook, OverviewForecast, OverviewRow, OverviewTable, QuantileBand,
    RegimeSnapshot, RegimeTag, SimulationMethod, SimulationParams, SimulationResult, Watchlist,
};
pub use symbol::Symbol;
