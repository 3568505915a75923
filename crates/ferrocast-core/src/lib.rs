//! # Ferrocast Core
//!
//! Client-side data orchestration for the ferrocast forecast dashboard.
//!
//! ## Overview
//!
//! This crate sits between a forecasting service and whatever renders its
//! results:
//!
//! - **Remote data gateway** with typed errors over a pluggable HTTP client
//! - **View-state containers** that discard responses from superseded triggers
//! - **Watchlist synchronization** with value-driven overview refetch
//! - **Pure reducers** from forecast bundles and simulation paths to display
//!   records and chart-ready series
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Gateway endpoint and view display settings |
//! | [`domain`] | Domain models (Symbol, ForecastBundle, Watchlist, ...) |
//! | [`error`] | Validation and gateway error types |
//! | [`format`] | Currency, percent and log-return rendering |
//! | [`forecast_view`] | Forecast cards, regime bar, overview and history tables |
//! | [`gateway`] | `ForecastService` trait and its HTTP implementation |
//! | [`http_client`] | HTTP client abstraction |
//! | [`path_series`] | Simulated paths to chart series |
//! | [`simulation_view`] | Simulation risk table |
//! | [`view_state`] | Per-view fetch state machine |
//! | [`views`] | Dashboard, overview, archive, indices and simulation views |
//! | [`watchlist`] | Watchlist synchronizer and notices |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ferrocast_core::{DashboardView, GatewayConfig, HttpForecastGateway, ViewConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = Arc::new(HttpForecastGateway::new(GatewayConfig::from_env()?));
//!     let dashboard = DashboardView::new(gateway, &ViewConfig::default());
//!
//!     if let Some(view) = dashboard.search("spy").await.data() {
//!         println!("{} regime: {}", view.summary.symbol, view.summary.regime.label);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │ Views / Synchronizer │
//! └──────────┬───────────┘
//!            │ begin / complete(token)
//!            ▼
//! ┌──────────────────────┐     ┌──────────────────┐
//! │ ViewStateContainer   │     │ Reducers         │
//! └──────────┬───────────┘     │ (pure, sync)     │
//!            │                 └────────▲─────────┘
//!            ▼                          │
//! ┌──────────────────────┐              │
//! │ ForecastService      │──────────────┘
//! │ (HttpForecastGateway)│
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │ HttpClient           │
//! │ (reqwest / scripted) │
//! └──────────────────────┘
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod forecast_view;
pub mod format;
pub mod gateway;
pub mod http_client;
pub mod path_series;
pub mod simulation_view;
pub mod view_state;
pub mod views;
pub mod watchlist;

pub use config::{GatewayConfig, ViewConfig};
pub use domain::{
    ArchiveEntry, ComponentValue, ForecastBundle, HealthReport, Horizon, HorizonAnalysis,
    HorizonForecast, IndexHistoryEntry, Outlook, OverviewForecast, OverviewRow, OverviewTable,
    QuantileBand, RegimeSnapshot, RegimeTag, SimulationMethod, SimulationParams, SimulationResult,
    Symbol, TradeDate, Watchlist,
};
pub use error::{CoreError, GatewayError, GatewayErrorKind, ValidationError};
pub use forecast_view::{
    reduce, ArchiveRowView, CardBody, ForecastView, HorizonCard, IndexRowView, OverviewRowView,
    ProbabilityBar,
};
pub use gateway::{ForecastService, GatewayFuture, HttpForecastGateway};
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
    ScriptedHttpClient,
};
pub use path_series::{build_series, ChartSeries, PathSeriesConfig, PathShape};
pub use simulation_view::{reduce_simulation, SimulationView};
pub use view_state::{Completion, RequestToken, ViewState, ViewStateContainer};
pub use views::{AdvancedSimulationView, ArchiveView, DashboardView, IndicesView, MarketOverviewView};
pub use watchlist::{Notice, NoticeBoard, Severity, WatchlistSynchronizer};
