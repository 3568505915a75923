//! Forecast bundles and overview tables to display records.
//!
//! Every function here is pure. [`reduce`] turns a [`ForecastBundle`] into a
//! summary plus one [`HorizonCard`] per configured horizon, and
//! [`overview_rows`] is the one reduction used by both the market overview and
//! the watchlist tables.

use serde::Serialize;

use crate::format::{self, NOT_AVAILABLE};
use crate::{
    ArchiveEntry, ComponentValue, ForecastBundle, Horizon, HorizonForecast, IndexHistoryEntry,
    Outlook, OverviewTable, QuantileBand, RegimeSnapshot, Symbol, TradeDate,
};

/// Allowed deviation of the probability sum from 1 before renormalising.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

const SEGMENT_LABELS: [&str; 2] = ["Low Vol", "High Vol"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastView {
    pub summary: ForecastSummary,
    pub cards: Vec<HorizonCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub symbol: Symbol,
    pub as_of: TradeDate,
    pub current_price: String,
    pub regime: RegimeSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeSummary {
    pub label: String,
    pub bar: ProbabilityBar,
}

/// Two-segment regime probability bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityBar {
    pub segments: [BarSegment; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSegment {
    pub label: &'static str,
    /// Width in percent, `0..=100`.
    pub width_pct: f64,
    /// Hover text, e.g. `Low Vol: 30.0%`.
    pub title: String,
}

impl BarSegment {
    /// CSS width value, e.g. `30%`.
    pub fn width_css(&self) -> String {
        let rounded = format!("{:.2}", self.width_pct);
        let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
        format!("{trimmed}%")
    }
}

impl ProbabilityBar {
    /// Builds the bar from raw regime probabilities.
    ///
    /// Missing entries count as zero and every value is clamped to `[0, 1]`.
    /// A positive sum that strays from 1 is renormalised; an all-zero input
    /// yields two zero-width segments.
    pub fn from_probabilities(probabilities: &[f64]) -> Self {
        let clamped = [0, 1].map(|index| {
            probabilities
                .get(index)
                .copied()
                .filter(|value| value.is_finite())
                .unwrap_or(0.0)
                .clamp(0.0, 1.0)
        });

        let sum = clamped[0] + clamped[1];
        let values = if sum > 0.0 && (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            clamped.map(|value| value / sum)
        } else {
            clamped
        };

        let segments = [0, 1].map(|index| BarSegment {
            label: SEGMENT_LABELS[index],
            width_pct: values[index] * 100.0,
            title: format!(
                "{}: {}",
                SEGMENT_LABELS[index],
                format::fraction_pct(values[index])
            ),
        });

        Self { segments }
    }

    pub fn total_pct(&self) -> f64 {
        self.segments.iter().map(|segment| segment.width_pct).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizonCard {
    pub horizon: Horizon,
    /// Card heading, e.g. `10d Horizon`.
    pub title: String,
    pub body: CardBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardBody {
    Forecast {
        outlook: Outlook,
        return_display: String,
        target_price: String,
        target_date: TradeDate,
        components: Vec<ComponentDisplay>,
        quantiles: Option<QuantileDisplay>,
        analysis: Option<String>,
    },
    /// The service returned no forecast for this horizon.
    InsufficientData,
}

impl CardBody {
    pub fn outlook(&self) -> Option<Outlook> {
        match self {
            Self::Forecast { outlook, .. } => Some(*outlook),
            Self::InsufficientData => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentDisplay {
    pub model: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuantileDisplay {
    pub p10: String,
    pub p50: String,
    pub p90: String,
}

impl From<&QuantileBand> for QuantileDisplay {
    fn from(band: &QuantileBand) -> Self {
        Self {
            p10: format::price(band.p10),
            p50: format::price(band.p50),
            p90: format::price(band.p90),
        }
    }
}

/// Reduces `bundle` to one card per entry of `horizons`, in that order.
///
/// Bundle horizons outside `horizons` are ignored.
pub fn reduce(bundle: &ForecastBundle, horizons: &[Horizon]) -> ForecastView {
    let summary = ForecastSummary {
        symbol: bundle.symbol.clone(),
        as_of: bundle.as_of,
        current_price: format::price(bundle.current_price),
        regime: regime_summary(&bundle.regime),
    };

    let cards = horizons
        .iter()
        .map(|&horizon| HorizonCard {
            horizon,
            title: format!("{} Horizon", horizon.key()),
            body: bundle
                .horizon(horizon)
                .map_or(CardBody::InsufficientData, card_body),
        })
        .collect();

    ForecastView { summary, cards }
}

fn card_body(forecast: &HorizonForecast) -> CardBody {
    CardBody::Forecast {
        outlook: forecast.outlook(),
        return_display: format::signed_pct(forecast.expected_return_pct),
        target_price: format::price(forecast.target_price),
        target_date: forecast.target_date,
        components: forecast
            .components
            .iter()
            .map(|(model, value)| ComponentDisplay {
                model: model.clone(),
                value: component_display(value),
            })
            .collect(),
        quantiles: forecast.simulation.as_ref().map(QuantileDisplay::from),
        analysis: forecast.analysis.clone(),
    }
}

fn component_display(value: &ComponentValue) -> String {
    match value {
        ComponentValue::Number(number) => format::log_value(*number),
        ComponentValue::Label(label) => label.clone(),
        ComponentValue::Missing => String::from(NOT_AVAILABLE),
    }
}

pub fn regime_summary(regime: &RegimeSnapshot) -> RegimeSummary {
    RegimeSummary {
        label: regime_label(regime),
        bar: ProbabilityBar::from_probabilities(&regime.probabilities),
    }
}

/// Prefers the service label, falling back to the binary regime code.
pub fn regime_label(regime: &RegimeSnapshot) -> String {
    if let Some(label) = regime.label.as_deref().map(str::trim) {
        if !label.is_empty() {
            return label.to_owned();
        }
    }

    match regime.current {
        Some(0) => String::from("Low Volatility"),
        Some(1) => String::from("High Volatility"),
        Some(code) => format!("Regime {code}"),
        None => String::from("Unknown"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewRowView {
    pub symbol: Symbol,
    pub date: Option<TradeDate>,
    pub close_price: String,
    pub cells: Vec<OverviewCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewCell {
    pub horizon: Horizon,
    /// Column header, e.g. `1yr`.
    pub label: String,
    pub pct: String,
    pub price: String,
    pub outlook: Option<Outlook>,
}

/// One row per table entry; missing fields render as `N/A`, never dropped.
pub fn overview_rows(table: &OverviewTable, horizons: &[Horizon]) -> Vec<OverviewRowView> {
    table
        .rows()
        .iter()
        .map(|row| OverviewRowView {
            symbol: row.symbol.clone(),
            date: row.date,
            close_price: format::or_na(row.close_price, format::price),
            cells: horizons
                .iter()
                .map(|&horizon| {
                    let forecast = row.forecast(horizon).copied().unwrap_or_default();
                    let pct = forecast.pct.filter(|value| value.is_finite());
                    OverviewCell {
                        horizon,
                        label: horizon.label(),
                        pct: format::or_na(pct, format::signed_pct),
                        price: format::or_na(forecast.price, format::price),
                        outlook: pct.map(Outlook::from_return),
                    }
                })
                .collect(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveRowView {
    pub date: TradeDate,
    pub horizon: String,
    pub prediction: String,
    pub target_date: TradeDate,
    pub actual: String,
}

pub fn archive_rows(entries: &[ArchiveEntry]) -> Vec<ArchiveRowView> {
    entries
        .iter()
        .map(|entry| ArchiveRowView {
            date: entry.date,
            horizon: Horizon::from_days(entry.horizon).key(),
            prediction: format::log_value(entry.prediction),
            target_date: entry.target_date,
            actual: format::or_dash(entry.actual, format::log_value),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexRowView {
    pub date: TradeDate,
    pub symbol: Symbol,
    pub horizon: String,
    pub prediction: String,
    pub start_price: String,
    pub target_date: TradeDate,
    pub actual: String,
}

pub fn index_rows(entries: &[IndexHistoryEntry]) -> Vec<IndexRowView> {
    entries
        .iter()
        .map(|entry| IndexRowView {
            date: entry.date,
            symbol: entry.symbol.clone(),
            horizon: Horizon::from_days(entry.horizon).key(),
            prediction: format::log_value(entry.prediction),
            start_price: format::or_dash(entry.start_price, format::price),
            target_date: entry.target_date,
            actual: format::or_dash(entry.actual, format::log_value),
        })
        .collect()
}
