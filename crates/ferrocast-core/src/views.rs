//! Per-view controllers.
//!
//! | View | Trigger | Failure policy |
//! |------|---------|----------------|
//! | [`DashboardView`] | `search(symbol)` | dismissible banner |
//! | [`MarketOverviewView`] | `load(date)`, day stepping | log, empty table |
//! | [`ArchiveView`] | `load(symbol)` | log, empty list |
//! | [`IndicesView`] | `load()` | log, empty list |
//! | [`AdvancedSimulationView`] | `run(symbol, params)` | dismissible banner |
//!
//! Views share the gateway handle and nothing else; each owns its own
//! [`ViewStateContainer`]. The watchlist view is
//! [`WatchlistSynchronizer`](crate::WatchlistSynchronizer).

use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::forecast_view::{
    archive_rows, index_rows, overview_rows, reduce, ArchiveRowView, ForecastView, IndexRowView,
    OverviewRowView,
};
use crate::path_series::PathSeriesConfig;
use crate::simulation_view::{reduce_simulation, SimulationView};
use crate::view_state::{ViewState, ViewStateContainer};
use crate::{ForecastService, GatewayError, Horizon, SimulationParams, Symbol, TradeDate, ViewConfig};

/// Single-symbol forecast lookup.
pub struct DashboardView {
    gateway: Arc<dyn ForecastService>,
    horizons: Vec<Horizon>,
    state: ViewStateContainer<ForecastView>,
}

impl DashboardView {
    pub fn new(gateway: Arc<dyn ForecastService>, config: &ViewConfig) -> Self {
        Self {
            gateway,
            horizons: config.horizons.clone(),
            state: ViewStateContainer::new("dashboard"),
        }
    }

    pub async fn search(&self, raw: &str) -> ViewState<ForecastView> {
        let symbol = match Symbol::parse(raw) {
            Ok(symbol) => symbol,
            Err(error) => {
                self.state.fail(GatewayError::from(error));
                return self.state.snapshot();
            }
        };

        self.state
            .run(async {
                let bundle = self.gateway.forecast(&symbol).await?;
                Ok::<_, GatewayError>(reduce(&bundle, &self.horizons))
            })
            .await;
        self.state.snapshot()
    }

    pub fn state(&self) -> ViewState<ForecastView> {
        self.state.snapshot()
    }

    pub fn dismiss_error(&self) {
        self.state.dismiss_error();
    }
}

/// Market-wide overview for one calendar date.
pub struct MarketOverviewView {
    gateway: Arc<dyn ForecastService>,
    horizons: Vec<Horizon>,
    date: Mutex<Option<TradeDate>>,
    state: ViewStateContainer<Vec<OverviewRowView>>,
}

impl MarketOverviewView {
    pub fn new(gateway: Arc<dyn ForecastService>, config: &ViewConfig) -> Self {
        Self {
            gateway,
            horizons: config.horizons.clone(),
            date: Mutex::new(None),
            state: ViewStateContainer::new("market_overview"),
        }
    }

    /// Loads the overview as of `date`, or the service default when `None`.
    pub async fn load(&self, date: Option<TradeDate>) -> ViewState<Vec<OverviewRowView>> {
        *self.lock_date() = date;

        self.state
            .run(async {
                match self.gateway.market_overview(date).await {
                    Ok(table) => Ok::<_, GatewayError>(overview_rows(&table, &self.horizons)),
                    Err(error) => {
                        warn!(%error, "market overview unavailable, showing empty table");
                        Ok(Vec::new())
                    }
                }
            })
            .await;
        self.state.snapshot()
    }

    pub async fn today(&self) -> ViewState<Vec<OverviewRowView>> {
        self.load(Some(TradeDate::today_utc())).await
    }

    pub async fn previous_day(&self) -> ViewState<Vec<OverviewRowView>> {
        let base = self.selected_date().unwrap_or_else(TradeDate::today_utc);
        match base.previous_day() {
            Ok(date) => self.load(Some(date)).await,
            Err(error) => {
                self.state.fail(GatewayError::from(error));
                self.state.snapshot()
            }
        }
    }

    pub async fn next_day(&self) -> ViewState<Vec<OverviewRowView>> {
        let base = self.selected_date().unwrap_or_else(TradeDate::today_utc);
        match base.next_day() {
            Ok(date) => self.load(Some(date)).await,
            Err(error) => {
                self.state.fail(GatewayError::from(error));
                self.state.snapshot()
            }
        }
    }

    pub fn selected_date(&self) -> Option<TradeDate> {
        *self.lock_date()
    }

    pub fn state(&self) -> ViewState<Vec<OverviewRowView>> {
        self.state.snapshot()
    }

    fn lock_date(&self) -> std::sync::MutexGuard<'_, Option<TradeDate>> {
        self.date
            .lock()
            .expect("overview date lock is not poisoned")
    }
}

/// Past forecasts for one symbol.
pub struct ArchiveView {
    gateway: Arc<dyn ForecastService>,
    state: ViewStateContainer<Vec<ArchiveRowView>>,
}

impl ArchiveView {
    pub fn new(gateway: Arc<dyn ForecastService>) -> Self {
        Self {
            gateway,
            state: ViewStateContainer::new("archive"),
        }
    }

    pub async fn load(&self, raw: &str) -> ViewState<Vec<ArchiveRowView>> {
        let symbol = match Symbol::parse(raw) {
            Ok(symbol) => symbol,
            Err(error) => {
                self.state.fail(GatewayError::from(error));
                return self.state.snapshot();
            }
        };

        self.state
            .run(async {
                match self.gateway.archive(&symbol).await {
                    Ok(entries) => Ok::<_, GatewayError>(archive_rows(&entries)),
                    Err(error) => {
                        warn!(%symbol, %error, "archive unavailable, showing empty history");
                        Ok(Vec::new())
                    }
                }
            })
            .await;
        self.state.snapshot()
    }

    pub fn state(&self) -> ViewState<Vec<ArchiveRowView>> {
        self.state.snapshot()
    }
}

/// Past forecasts for the tracked market indices.
pub struct IndicesView {
    gateway: Arc<dyn ForecastService>,
    state: ViewStateContainer<Vec<IndexRowView>>,
}

impl IndicesView {
    pub fn new(gateway: Arc<dyn ForecastService>) -> Self {
        Self {
            gateway,
            state: ViewStateContainer::new("indices"),
        }
    }

    pub async fn load(&self) -> ViewState<Vec<IndexRowView>> {
        self.state
            .run(async {
                match self.gateway.indices_history().await {
                    Ok(entries) => Ok::<_, GatewayError>(index_rows(&entries)),
                    Err(error) => {
                        warn!(%error, "index history unavailable, showing empty history");
                        Ok(Vec::new())
                    }
                }
            })
            .await;
        self.state.snapshot()
    }

    pub fn state(&self) -> ViewState<Vec<IndexRowView>> {
        self.state.snapshot()
    }
}

/// Monte-Carlo simulation panel.
pub struct AdvancedSimulationView {
    gateway: Arc<dyn ForecastService>,
    series: PathSeriesConfig,
    state: ViewStateContainer<SimulationView>,
}

impl AdvancedSimulationView {
    pub fn new(gateway: Arc<dyn ForecastService>, config: &ViewConfig) -> Self {
        Self {
            gateway,
            series: PathSeriesConfig::from(config),
            state: ViewStateContainer::new("advanced_simulation"),
        }
    }

    pub async fn run(&self, raw: &str, params: SimulationParams) -> ViewState<SimulationView> {
        let symbol = match Symbol::parse(raw) {
            Ok(symbol) => symbol,
            Err(error) => {
                self.state.fail(GatewayError::from(error));
                return self.state.snapshot();
            }
        };

        self.state
            .run(async {
                let result = self.gateway.advanced_simulation(&symbol, params).await?;
                Ok::<_, GatewayError>(reduce_simulation(&result, self.series))
            })
            .await;
        self.state.snapshot()
    }

    pub fn state(&self) -> ViewState<SimulationView> {
        self.state.snapshot()
    }

    pub fn dismiss_error(&self) {
        self.state.dismiss_error();
    }
}
