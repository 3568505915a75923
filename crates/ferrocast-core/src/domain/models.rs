use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Horizon, Symbol, TradeDate, ValidationError};

/// Bullish/bearish classification of a forecast.
///
/// Always derived from the expected return; never stored alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outlook {
    Bullish,
    Bearish,
}

impl Outlook {
    /// Strictly positive returns are bullish; zero counts as bearish.
    pub fn from_return(expected_return_pct: f64) -> Self {
        if expected_return_pct > 0.0 {
            Self::Bullish
        } else {
            Self::Bearish
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
        }
    }
}

/// P10/P50/P90 outcome band at one horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileBand {
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

/// Volatility regime as reported alongside a forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegimeSnapshot {
    /// Binary regime code (0 = low volatility, 1 = high volatility).
    #[serde(default)]
    pub current: Option<u8>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "probs")]
    pub probabilities: Vec<f64>,
}

/// One model's contribution to a horizon forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentValue {
    Number(f64),
    Label(String),
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonForecast {
    pub expected_return_pct: f64,
    pub target_price: f64,
    pub target_date: TradeDate,
    #[serde(default)]
    pub log_return: Option<f64>,
    #[serde(default)]
    pub components: BTreeMap<String, ComponentValue>,
    #[serde(default)]
    pub simulation: Option<QuantileBand>,
    #[serde(default)]
    pub analysis: Option<String>,
}

impl HorizonForecast {
    pub fn outlook(&self) -> Outlook {
        Outlook::from_return(self.expected_return_pct)
    }
}

/// Per-symbol forecast snapshot; replaced wholesale on every refetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub symbol: Symbol,
    #[serde(rename = "date")]
    pub as_of: TradeDate,
    pub current_price: f64,
    #[serde(default)]
    pub regime: RegimeSnapshot,
    /// `None` marks a horizon the service could not forecast.
    #[serde(rename = "forecasts", default)]
    pub horizons: BTreeMap<Horizon, Option<HorizonForecast>>,
}

impl ForecastBundle {
    pub fn horizon(&self, horizon: Horizon) -> Option<&HorizonForecast> {
        self.horizons.get(&horizon).and_then(Option::as_ref)
    }
}

/// Percent change and price forecast cell of an overview row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OverviewForecast {
    pub pct: Option<f64>,
    pub price: Option<f64>,
}

/// One symbol's closing price and horizon forecasts for a calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewRow {
    pub symbol: Symbol,
    pub date: Option<TradeDate>,
    pub close_price: Option<f64>,
    pub forecasts: BTreeMap<Horizon, OverviewForecast>,
}

impl OverviewRow {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            date: None,
            close_price: None,
            forecasts: BTreeMap::new(),
        }
    }

    pub fn forecast(&self, horizon: Horizon) -> Option<&OverviewForecast> {
        self.forecasts.get(&horizon)
    }
}

/// Flat row shape emitted by the overview endpoints
/// (`today_close`, `forecast_10d_pct`, `forecast_10d_price`, ...).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireOverviewRow {
    symbol: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    today_close: Option<f64>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl TryFrom<WireOverviewRow> for OverviewRow {
    type Error = ValidationError;

    fn try_from(value: WireOverviewRow) -> Result<Self, Self::Error> {
        let mut row = OverviewRow::new(Symbol::parse(&value.symbol)?);
        row.date = value
            .date
            .as_deref()
            .and_then(|raw| TradeDate::parse(raw).ok());
        row.close_price = value.today_close;

        for (key, field) in &value.extra {
            let Some(rest) = key.strip_prefix("forecast_") else {
                continue;
            };
            let (horizon_key, is_pct) = if let Some(h) = rest.strip_suffix("_pct") {
                (h, true)
            } else if let Some(h) = rest.strip_suffix("_price") {
                (h, false)
            } else {
                continue;
            };
            let Some(horizon) = Horizon::parse_key(horizon_key) else {
                continue;
            };

            let cell = row.forecasts.entry(horizon).or_default();
            if is_pct {
                cell.pct = field.as_f64();
            } else {
                cell.price = field.as_f64();
            }
        }

        Ok(row)
    }
}

/// Overview rows keyed by symbol, in fetch order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OverviewTable {
    rows: Vec<OverviewRow>,
}

impl OverviewTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row, replacing any existing row for the same symbol in place.
    pub fn upsert(&mut self, row: OverviewRow) {
        match self.rows.iter_mut().find(|existing| existing.symbol == row.symbol) {
            Some(existing) => *existing = row,
            None => self.rows.push(row),
        }
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&OverviewRow> {
        self.rows.iter().find(|row| &row.symbol == symbol)
    }

    pub fn rows(&self) -> &[OverviewRow] {
        &self.rows
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.rows.iter().map(|row| &row.symbol)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<OverviewRow> for OverviewTable {
    fn from_iter<I: IntoIterator<Item = OverviewRow>>(iter: I) -> Self {
        let mut table = Self::new();
        for row in iter {
            table.upsert(row);
        }
        table
    }
}

/// Insertion-ordered, duplicate-free list of tracked symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Watchlist {
    symbols: Vec<Symbol>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `symbol` unless already present; returns whether it was added.
    pub fn insert(&mut self, symbol: Symbol) -> bool {
        if self.contains(&symbol) {
            return false;
        }
        self.symbols.push(symbol);
        true
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.symbols.contains(symbol)
    }

    /// Membership equality, ignoring order.
    pub fn same_symbols(&self, other: &Self) -> bool {
        self.len() == other.len() && self.symbols.iter().all(|symbol| other.contains(symbol))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl FromIterator<Symbol> for Watchlist {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        let mut list = Self::new();
        for symbol in iter {
            list.insert(symbol);
        }
        list
    }
}

/// Regime detected at the start of a simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegimeTag {
    #[serde(default)]
    pub id: Option<u8>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Risk reading for one simulated horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HorizonAnalysis {
    #[serde(default)]
    pub risk_label: Option<String>,
    #[serde(default)]
    pub upside_pct: Option<f64>,
    #[serde(default)]
    pub downside_pct: Option<f64>,
    #[serde(default)]
    pub interpretation: Option<String>,
}

/// Output of an advanced Monte-Carlo simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub symbol: Symbol,
    #[serde(default)]
    pub method: Option<String>,
    pub current_price: f64,
    #[serde(default)]
    pub current_regime: Option<RegimeTag>,
    /// Sampled price paths, one row per path.
    #[serde(default, deserialize_with = "deserialize_path_matrix")]
    pub paths: Vec<Vec<f64>>,
    #[serde(rename = "quantiles", default)]
    pub quantiles_by_horizon: BTreeMap<u32, QuantileBand>,
    #[serde(rename = "analysis", default)]
    pub analysis_by_horizon: BTreeMap<u32, HorizonAnalysis>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WirePaths {
    Matrix(Vec<Vec<f64>>),
    // The bootstrap method reports final prices only, which cannot be charted.
    Flat(Vec<f64>),
}

fn deserialize_path_matrix<'de, D>(deserializer: D) -> Result<Vec<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<WirePaths>::deserialize(deserializer)?;
    Ok(match raw {
        Some(WirePaths::Matrix(matrix)) => matrix,
        Some(WirePaths::Flat(_)) | None => Vec::new(),
    })
}

/// Archived forecast for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub id: i64,
    pub date: TradeDate,
    pub horizon: u32,
    /// Predicted log return.
    pub prediction: f64,
    pub target_date: TradeDate,
    #[serde(default)]
    pub actual: Option<f64>,
}

/// Archived forecast for one of the tracked market indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexHistoryEntry {
    pub id: i64,
    pub date: TradeDate,
    pub symbol: Symbol,
    pub horizon: u32,
    pub prediction: f64,
    #[serde(default)]
    pub start_price: Option<f64>,
    pub target_date: TradeDate,
    #[serde(default)]
    pub actual: Option<f64>,
}

/// Liveness report of the forecasting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthReport {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Path generator used by the advanced simulation endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMethod {
    /// Regime-switching GARCH with jumps.
    #[default]
    Garch,
    /// Empirical block bootstrap.
    Bootstrap,
}

impl SimulationMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Garch => "garch",
            Self::Bootstrap => "bootstrap",
        }
    }
}

impl Display for SimulationMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimulationMethod {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "garch" => Ok(Self::Garch),
            "bootstrap" => Ok(Self::Bootstrap),
            _ => Err(ValidationError::InvalidSimulationMethod {
                value: value.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationParams {
    pub method: SimulationMethod,
    pub conservative: bool,
}

impl SimulationParams {
    pub const fn new(method: SimulationMethod, conservative: bool) -> Self {
        Self {
            method,
            conservative,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_return_is_not_bullish() {
        assert_eq!(Outlook::from_return(0.0), Outlook::Bearish);
        assert_eq!(Outlook::from_return(0.0001), Outlook::Bullish);
        assert_eq!(Outlook::from_return(-3.0), Outlook::Bearish);
    }

    #[test]
    fn decodes_forecast_bundle_with_missing_horizon() {
        let body = r#"{
            "symbol": "spy",
            "date": "2024-05-01",
            "current_price": 500.0,
            "regime": {"current": 1, "label": "High Volatility", "probs": [0.2, 0.8]},
            "forecasts": {
                "10d": {
                    "log_return": 0.01,
                    "expected_return_pct": 1.0,
                    "target_price": 505.0,
                    "target_date": "2024-05-11",
                    "components": {"LightGBM": 0.01, "HMM Regime": "High Volatility"},
                    "simulation": {"p10": 480.0, "p50": 504.0, "p90": 530.0},
                    "analysis": "Stable"
                },
                "730d": null
            }
        }"#;

        let bundle: ForecastBundle = serde_json::from_str(body).expect("bundle decodes");
        assert_eq!(bundle.symbol.as_str(), "SPY");
        assert!(bundle.horizon(Horizon::TEN_DAYS).is_some());
        assert!(bundle.horizons.contains_key(&Horizon::TWO_YEARS));
        assert!(bundle.horizon(Horizon::TWO_YEARS).is_none());

        let ten = bundle.horizon(Horizon::TEN_DAYS).expect("10d present");
        assert_eq!(
            ten.components.get("HMM Regime"),
            Some(&ComponentValue::Label(String::from("High Volatility")))
        );
        assert_eq!(ten.outlook(), Outlook::Bullish);
    }

    #[test]
    fn wire_overview_row_keeps_partial_fields() {
        let raw: WireOverviewRow = serde_json::from_str(
            r#"{"symbol": "aapl", "date": "2024-05-01", "today_close": 190.5,
                "forecast_10d_pct": 1.5, "forecast_10d_price": 193.36,
                "forecast_100d_pct": null, "past_date": "N/A"}"#,
        )
        .expect("row decodes");

        let row = OverviewRow::try_from(raw).expect("valid symbol");
        assert_eq!(row.symbol.as_str(), "AAPL");
        assert_eq!(row.close_price, Some(190.5));
        let ten = row.forecast(Horizon::TEN_DAYS).expect("10d cell");
        assert_eq!(ten.pct, Some(1.5));
        let hundred = row.forecast(Horizon::HUNDRED_DAYS).expect("100d cell");
        assert_eq!(hundred.pct, None);
        assert!(row.forecast(Horizon::ONE_YEAR).is_none());
    }

    #[test]
    fn overview_table_replaces_duplicate_symbols_in_place() {
        let aapl = Symbol::parse("AAPL").expect("valid");
        let msft = Symbol::parse("MSFT").expect("valid");
        let mut replacement = OverviewRow::new(aapl.clone());
        replacement.close_price = Some(2.0);

        let table: OverviewTable = vec![
            OverviewRow::new(aapl.clone()),
            OverviewRow::new(msft.clone()),
            replacement,
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].symbol, aapl);
        assert_eq!(table.get(&aapl).and_then(|row| row.close_price), Some(2.0));
    }

    #[test]
    fn watchlist_deduplicates_and_compares_membership() {
        let list: Watchlist = ["AAPL", "aapl", "MSFT"]
            .iter()
            .map(|raw| Symbol::parse(raw).expect("valid"))
            .collect();
        assert_eq!(list.len(), 2);

        let reordered: Watchlist = ["MSFT", "AAPL"]
            .iter()
            .map(|raw| Symbol::parse(raw).expect("valid"))
            .collect();
        assert_ne!(list, reordered);
        assert!(list.same_symbols(&reordered));
    }

    #[test]
    fn flat_bootstrap_paths_decode_to_empty_matrix() {
        let result: SimulationResult = serde_json::from_str(
            r#"{"symbol": "AAPL", "method": "Block Bootstrap", "current_price": 10.0,
                "quantiles": {"730": {"p10": 8.0, "p50": 11.0, "p90": 14.0}},
                "paths": [10.5, 11.2, 9.8]}"#,
        )
        .expect("bootstrap result decodes");

        assert!(result.paths.is_empty());
        assert!(result.quantiles_by_horizon.contains_key(&730));
        assert!(result.current_regime.is_none());
    }

    #[test]
    fn simulation_method_parses_case_insensitively() {
        assert_eq!("GARCH".parse::<SimulationMethod>(), Ok(SimulationMethod::Garch));
        assert!(matches!(
            "heston".parse::<SimulationMethod>(),
            Err(ValidationError::InvalidSimulationMethod { .. })
        ));
    }
}
