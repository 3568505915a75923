//! Remote data gateway.
//!
//! [`ForecastService`] is the seam every view depends on: one method per
//! backend capability, each resolving to a parsed value or a typed
//! [`GatewayError`]. [`HttpForecastGateway`] implements it over any
//! [`HttpClient`].
//!
//! | Method | Request |
//! |--------|---------|
//! | [`forecast`](ForecastService::forecast) | `GET /forecast/{symbol}` |
//! | [`archive`](ForecastService::archive) | `GET /archive/{symbol}` |
//! | [`indices_history`](ForecastService::indices_history) | `GET /indices/history` |
//! | [`market_overview`](ForecastService::market_overview) | `GET /market/overview[?date=]` |
//! | [`watchlist`](ForecastService::watchlist) | `GET /watchlist` |
//! | [`add_to_watchlist`](ForecastService::add_to_watchlist) | `POST /watchlist/{symbol}` |
//! | [`remove_from_watchlist`](ForecastService::remove_from_watchlist) | `DELETE /watchlist/{symbol}` |
//! | [`watchlist_overview`](ForecastService::watchlist_overview) | `GET /watchlist/overview` |
//! | [`advanced_simulation`](ForecastService::advanced_simulation) | `GET /simulation/advanced/{symbol}` |
//! | [`health`](ForecastService::health) | `GET /health` |
//!
//! The gateway never retries; a caller that wants another attempt re-issues
//! its trigger.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::WireOverviewRow;
use crate::http_client::{HttpClient, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::{
    ArchiveEntry, ForecastBundle, GatewayConfig, GatewayError, HealthReport, IndexHistoryEntry,
    OverviewRow, OverviewTable, SimulationParams, SimulationResult, Symbol, TradeDate, Watchlist,
};

/// Boxed future returned by [`ForecastService`] methods.
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send + 'a>>;

/// Typed access to the forecasting service.
///
/// Implementations must be `Send + Sync`; views share one instance behind an
/// `Arc`.
pub trait ForecastService: Send + Sync {
    fn forecast<'a>(&'a self, symbol: &'a Symbol) -> GatewayFuture<'a, ForecastBundle>;

    fn archive<'a>(&'a self, symbol: &'a Symbol) -> GatewayFuture<'a, Vec<ArchiveEntry>>;

    fn indices_history(&self) -> GatewayFuture<'_, Vec<IndexHistoryEntry>>;

    /// Overview of the service's default universe, optionally as of `date`.
    fn market_overview(&self, date: Option<TradeDate>) -> GatewayFuture<'_, OverviewTable>;

    fn watchlist(&self) -> GatewayFuture<'_, Watchlist>;

    fn add_to_watchlist<'a>(&'a self, symbol: &'a Symbol) -> GatewayFuture<'a, ()>;

    /// Removing a symbol that is not listed is not an error.
    fn remove_from_watchlist<'a>(&'a self, symbol: &'a Symbol) -> GatewayFuture<'a, ()>;

    fn watchlist_overview(&self) -> GatewayFuture<'_, OverviewTable>;

    fn advanced_simulation<'a>(
        &'a self,
        symbol: &'a Symbol,
        params: SimulationParams,
    ) -> GatewayFuture<'a, SimulationResult>;

    fn health(&self) -> GatewayFuture<'_, HealthReport>;
}

/// [`ForecastService`] backed by HTTP + JSON.
#[derive(Clone)]
pub struct HttpForecastGateway {
    config: GatewayConfig,
    http_client: Arc<dyn HttpClient>,
}

impl HttpForecastGateway {
    pub fn new(config: GatewayConfig) -> Self {
        let http_client = Arc::new(ReqwestHttpClient::new(&config.user_agent));
        Self {
            config,
            http_client,
        }
    }

    pub fn with_http_client(config: GatewayConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let request = HttpRequest::new(method, self.config.endpoint(path))
            .with_header("accept", "application/json");
        match self.config.timeout_ms {
            Some(timeout_ms) => request.with_timeout_ms(timeout_ms),
            None => request,
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, GatewayError> {
        let method = request.method;
        let path = request.path_and_query().to_owned();
        debug!(%method, %path, "forecast service request");

        let response = self.http_client.execute(request).await.map_err(|error| {
            warn!(%method, %path, error = error.message(), "forecast service unreachable");
            GatewayError::transport(error.message())
        })?;

        if response.is_success() {
            return Ok(response);
        }

        let error = error_from_status(&response);
        warn!(%method, %path, status = response.status, %error, "forecast service rejected request");
        Err(error)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, GatewayError> {
        let response = self.send(request).await?;
        decode_body(&response.body)
    }
}

/// Maps a non-2xx response onto the gateway error taxonomy.
fn error_from_status(response: &HttpResponse) -> GatewayError {
    #[derive(Deserialize)]
    struct DetailBody {
        detail: serde_json::Value,
    }

    let detail = serde_json::from_str::<DetailBody>(&response.body)
        .ok()
        .and_then(|body| match body.detail {
            serde_json::Value::String(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        });

    match detail {
        Some(detail) => GatewayError::service(response.status, detail),
        None => GatewayError::http_status(
            response.status,
            format!("forecast service returned status {}", response.status),
        ),
    }
}

fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, GatewayError> {
    serde_json::from_str(body)
        .map_err(|error| GatewayError::decode(format!("unexpected response body: {error}")))
}

#[derive(Deserialize)]
struct OverviewEnvelope {
    #[serde(default)]
    overview: Vec<serde_json::Value>,
}

fn overview_table(envelope: OverviewEnvelope) -> OverviewTable {
    envelope
        .overview
        .into_iter()
        .filter_map(|value| {
            let row = serde_json::from_value::<WireOverviewRow>(value)
                .map_err(|error| error.to_string())
                .and_then(|raw| OverviewRow::try_from(raw).map_err(|error| error.to_string()));
            match row {
                Ok(row) => Some(row),
                Err(error) => {
                    warn!(%error, "dropping overview row without a usable symbol");
                    None
                }
            }
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WatchlistBody {
    Bare(Vec<String>),
    Wrapped { symbols: Vec<String> },
}

fn watchlist_from_body(body: WatchlistBody) -> Watchlist {
    let raw = match body {
        WatchlistBody::Bare(symbols) | WatchlistBody::Wrapped { symbols } => symbols,
    };

    raw.iter()
        .filter_map(|entry| match Symbol::parse(entry) {
            Ok(symbol) => Some(symbol),
            Err(error) => {
                warn!(entry = entry.as_str(), %error, "ignoring invalid watchlist entry");
                None
            }
        })
        .collect()
}

#[derive(Deserialize)]
struct HistoryBody<T> {
    #[serde(default = "Vec::new")]
    history: Vec<T>,
}

impl ForecastService for HttpForecastGateway {
    fn forecast<'a>(&'a self, symbol: &'a Symbol) -> GatewayFuture<'a, ForecastBundle> {
        Box::pin(async move {
            let path = format!("/forecast/{}", symbol.encoded());
            self.fetch_json(self.request(HttpMethod::Get, &path)).await
        })
    }

    fn archive<'a>(&'a self, symbol: &'a Symbol) -> GatewayFuture<'a, Vec<ArchiveEntry>> {
        Box::pin(async move {
            let path = format!("/archive/{}", symbol.encoded());
            let body: HistoryBody<ArchiveEntry> =
                self.fetch_json(self.request(HttpMethod::Get, &path)).await?;
            Ok(body.history)
        })
    }

    fn indices_history(&self) -> GatewayFuture<'_, Vec<IndexHistoryEntry>> {
        Box::pin(async move {
            let body: HistoryBody<IndexHistoryEntry> = self
                .fetch_json(self.request(HttpMethod::Get, "/indices/history"))
                .await?;
            Ok(body.history)
        })
    }

    fn market_overview(&self, date: Option<TradeDate>) -> GatewayFuture<'_, OverviewTable> {
        Box::pin(async move {
            let mut request = self.request(HttpMethod::Get, "/market/overview");
            if let Some(date) = date {
                request = request.with_query(&[("date", date.format_iso())]);
            }
            let envelope: OverviewEnvelope = self.fetch_json(request).await?;
            Ok(overview_table(envelope))
        })
    }

    fn watchlist(&self) -> GatewayFuture<'_, Watchlist> {
        Box::pin(async move {
            let body: WatchlistBody = self
                .fetch_json(self.request(HttpMethod::Get, "/watchlist"))
                .await?;
            Ok(watchlist_from_body(body))
        })
    }

    fn add_to_watchlist<'a>(&'a self, symbol: &'a Symbol) -> GatewayFuture<'a, ()> {
        Box::pin(async move {
            let path = format!("/watchlist/{}", symbol.encoded());
            self.send(self.request(HttpMethod::Post, &path)).await?;
            Ok(())
        })
    }

    fn remove_from_watchlist<'a>(&'a self, symbol: &'a Symbol) -> GatewayFuture<'a, ()> {
        Box::pin(async move {
            let path = format!("/watchlist/{}", symbol.encoded());
            match self.send(self.request(HttpMethod::Delete, &path)).await {
                Ok(_) => Ok(()),
                // A detailed 404 comes from routing (`{"detail": "Not Found"}`), not
                // from an absent symbol.
                Err(error) if error.status() == Some(404) && error.detail().is_none() => {
                    debug!(%symbol, "symbol already absent from watchlist");
                    Ok(())
                }
                Err(error) => Err(error),
            }
        })
    }

    fn watchlist_overview(&self) -> GatewayFuture<'_, OverviewTable> {
        Box::pin(async move {
            let envelope: OverviewEnvelope = self
                .fetch_json(self.request(HttpMethod::Get, "/watchlist/overview"))
                .await?;
            Ok(overview_table(envelope))
        })
    }

    fn advanced_simulation<'a>(
        &'a self,
        symbol: &'a Symbol,
        params: SimulationParams,
    ) -> GatewayFuture<'a, SimulationResult> {
        Box::pin(async move {
            let path = format!("/simulation/advanced/{}", symbol.encoded());
            let request = self.request(HttpMethod::Get, &path).with_query(&[
                ("method", params.method.as_str().to_owned()),
                ("conservative", params.conservative.to_string()),
            ]);
            self.fetch_json(request).await
        })
    }

    fn health(&self) -> GatewayFuture<'_, HealthReport> {
        Box::pin(async move { self.fetch_json(self.request(HttpMethod::Get, "/health")).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, ScriptedHttpClient};
    use crate::GatewayErrorKind;

    fn gateway(client: &ScriptedHttpClient) -> HttpForecastGateway {
        let config = GatewayConfig::new("http://forecast.test").expect("valid url");
        HttpForecastGateway::with_http_client(config, Arc::new(client.clone()))
    }

    #[tokio::test]
    async fn service_detail_is_surfaced_as_service_error() {
        let client = ScriptedHttpClient::new();
        client.respond(
            HttpMethod::Get,
            "/forecast/ZZZZ",
            HttpResponse::new(404, r#"{"detail":"Symbol not found"}"#),
        );

        let symbol = Symbol::parse("zzzz").expect("valid");
        let error = gateway(&client)
            .forecast(&symbol)
            .await
            .expect_err("must fail");

        assert_eq!(error, GatewayError::service(404, "Symbol not found"));
    }

    #[tokio::test]
    async fn non_json_error_body_is_a_transport_error_with_status() {
        let client = ScriptedHttpClient::new();
        client.respond(
            HttpMethod::Get,
            "/watchlist/overview",
            HttpResponse::new(502, "<html>Bad Gateway</html>"),
        );

        let error = gateway(&client)
            .watchlist_overview()
            .await
            .expect_err("must fail");

        assert_eq!(error.kind(), GatewayErrorKind::Transport);
        assert_eq!(error.status(), Some(502));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error_without_status() {
        let client = ScriptedHttpClient::new();
        client.fail(
            HttpMethod::Get,
            "/health",
            HttpError::new("connection failed: refused"),
        );

        let error = gateway(&client).health().await.expect_err("must fail");
        assert_eq!(error.kind(), GatewayErrorKind::Transport);
        assert_eq!(error.status(), None);
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let client = ScriptedHttpClient::new();
        client.respond_json(HttpMethod::Get, "/forecast/SPY", r#"{"unexpected": true}"#);

        let symbol = Symbol::parse("SPY").expect("valid");
        let error = gateway(&client)
            .forecast(&symbol)
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), GatewayErrorKind::Decode);
    }

    #[tokio::test]
    async fn watchlist_accepts_bare_and_wrapped_bodies() {
        let client = ScriptedHttpClient::new();
        client
            .respond_json(HttpMethod::Get, "/watchlist", r#"["aapl", "MSFT", "AAPL"]"#)
            .respond_json(
                HttpMethod::Get,
                "/watchlist",
                r#"{"symbols": ["NVDA", "bad symbol!"]}"#,
            );
        let gateway = gateway(&client);

        let bare = gateway.watchlist().await.expect("bare list");
        let names: Vec<&str> = bare.iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["AAPL", "MSFT"]);

        let wrapped = gateway.watchlist().await.expect("wrapped list");
        let names: Vec<&str> = wrapped.iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["NVDA"]);
    }

    #[tokio::test]
    async fn removing_an_absent_symbol_is_not_an_error() {
        let client = ScriptedHttpClient::new();
        client.respond(HttpMethod::Delete, "/watchlist/TSLA", HttpResponse::new(404, ""));
        let symbol = Symbol::parse("TSLA").expect("valid");

        gateway(&client)
            .remove_from_watchlist(&symbol)
            .await
            .expect("404 on delete is idempotent");
        assert_eq!(client.request_count(HttpMethod::Delete, "/watchlist/TSLA"), 1);
    }

    #[tokio::test]
    async fn delete_on_unknown_route_is_not_mistaken_for_absent_symbol() {
        // Unscripted routes answer like an unmatched FastAPI route.
        let client = ScriptedHttpClient::new();
        let symbol = Symbol::parse("TSLA").expect("valid");

        let error = gateway(&client)
            .remove_from_watchlist(&symbol)
            .await
            .expect_err("routing 404 must surface");

        assert_eq!(error, GatewayError::service(404, "Not Found"));
    }

    #[tokio::test]
    async fn requests_ask_for_json_and_carry_no_default_timeout() {
        let client = ScriptedHttpClient::new();
        client.respond_json(HttpMethod::Get, "/health", r#"{"status": "ok"}"#);

        gateway(&client).health().await.expect("health");
        let configured = GatewayConfig::new("http://forecast.test")
            .expect("valid url")
            .with_timeout_ms(2_500);
        HttpForecastGateway::with_http_client(configured, Arc::new(client.clone()))
            .health()
            .await
            .expect("health");

        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].headers.get("accept").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(requests[0].timeout_ms, None);
        assert_eq!(requests[1].timeout_ms, Some(2_500));
    }

    #[tokio::test]
    async fn market_overview_passes_optional_date_query() {
        let client = ScriptedHttpClient::new();
        client.respond_json(
            HttpMethod::Get,
            "/market/overview?date=2024-05-01",
            r#"{"overview": [{"symbol": "AAPL", "today_close": 1.0}, {"symbol": ""}]}"#,
        );

        let date = TradeDate::parse("2024-05-01").expect("valid");
        let table = gateway(&client)
            .market_overview(Some(date))
            .await
            .expect("overview");

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].close_price, Some(1.0));
    }
}
