//! User journeys through the views, wired to the HTTP gateway over a
//! scripted transport.

use std::sync::Arc;

use ferrocast_core::{
    AdvancedSimulationView, ArchiveView, CardBody, DashboardView, GatewayConfig, GatewayErrorKind,
    HttpForecastGateway, HttpMethod, HttpResponse, IndicesView, MarketOverviewView, Outlook,
    ScriptedHttpClient, SimulationMethod, SimulationParams, TradeDate, ViewConfig, ViewState,
};

const SPY_FORECAST: &str = r#"{
    "symbol": "SPY",
    "date": "2024-05-01",
    "current_price": 500.0,
    "regime": {"current": 0, "probs": [0.3, 0.7]},
    "forecasts": {
        "10d": {
            "log_return": 0.0247,
            "expected_return_pct": 2.5,
            "target_price": 512.5,
            "target_date": "2024-05-11",
            "components": {"LightGBM": 0.0251, "HMM Regime": "Low Volatility"},
            "simulation": {"p10": 490.0, "p50": 511.0, "p90": 530.0},
            "analysis": "Moderate upside"
        },
        "100d": {
            "expected_return_pct": -1.2,
            "target_price": 494.0,
            "target_date": "2024-08-09",
            "components": {}
        },
        "365d": null
    }
}"#;

fn scripted_gateway(client: &ScriptedHttpClient) -> Arc<HttpForecastGateway> {
    let config = GatewayConfig::new("http://forecast.test").expect("valid url");
    Arc::new(HttpForecastGateway::with_http_client(
        config,
        Arc::new(client.clone()),
    ))
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn when_user_searches_a_symbol_dashboard_shows_cards_and_regime() {
    // Given: A forecast for SPY with two horizons present
    let client = ScriptedHttpClient::new();
    client.respond_json(HttpMethod::Get, "/forecast/SPY", SPY_FORECAST);
    let dashboard = DashboardView::new(scripted_gateway(&client), &ViewConfig::default());

    // When: The user searches for "spy"
    let state = dashboard.search("spy").await;

    // Then: Summary, regime bar and cards are reduced for display
    let view = state.data().expect("dashboard ready");
    assert_eq!(view.summary.current_price, "500.00");
    assert_eq!(view.summary.regime.label, "Low Volatility");
    let widths: Vec<String> = view
        .summary
        .regime
        .bar
        .segments
        .iter()
        .map(|segment| segment.width_css())
        .collect();
    assert_eq!(widths, vec!["30%", "70%"]);

    assert_eq!(view.cards.len(), 5);
    match &view.cards[0].body {
        CardBody::Forecast {
            outlook,
            return_display,
            target_price,
            quantiles,
            analysis,
            ..
        } => {
            assert_eq!(*outlook, Outlook::Bullish);
            assert_eq!(return_display, "+2.50%");
            assert_eq!(target_price, "512.50");
            assert_eq!(quantiles.as_ref().map(|q| q.p90.as_str()), Some("530.00"));
            assert_eq!(analysis.as_deref(), Some("Moderate upside"));
        }
        CardBody::InsufficientData => panic!("10d card must carry a forecast"),
    }
    assert_eq!(view.cards[1].body.outlook(), Some(Outlook::Bearish));
    assert_eq!(view.cards[2].body, CardBody::InsufficientData);
    assert_eq!(view.cards[4].title, "730d Horizon");
}

#[tokio::test]
async fn when_service_reports_unknown_symbol_dashboard_shows_dismissible_banner() {
    // Given: The service answers 404 with a detail message
    let client = ScriptedHttpClient::new();
    client.respond(
        HttpMethod::Get,
        "/forecast/NOPE",
        HttpResponse::new(404, r#"{"detail": "No forecast available for NOPE"}"#),
    );
    let dashboard = DashboardView::new(scripted_gateway(&client), &ViewConfig::default());

    // When: The user searches for it
    let state = dashboard.search("nope").await;

    // Then: The banner carries the server detail verbatim and can be dismissed
    let error = state.error().expect("error state");
    assert_eq!(error.kind(), GatewayErrorKind::Service);
    assert_eq!(error.user_message(), "No forecast available for NOPE");

    dashboard.dismiss_error();
    assert_eq!(dashboard.state(), ViewState::Idle);
}

#[tokio::test]
async fn when_user_retries_after_a_failure_the_previous_error_is_cleared() {
    // Given: A forecast route that fails once, then succeeds
    let client = ScriptedHttpClient::new();
    client
        .respond(HttpMethod::Get, "/forecast/SPY", HttpResponse::new(503, ""))
        .respond_json(HttpMethod::Get, "/forecast/SPY", SPY_FORECAST);
    let dashboard = DashboardView::new(scripted_gateway(&client), &ViewConfig::default());

    // When: The user searches twice
    let first = dashboard.search("SPY").await;
    let second = dashboard.search("SPY").await;

    // Then: The retry shows data and no stale error
    assert_eq!(
        first.error().map(|error| error.user_message()),
        Some(String::from("Failed to fetch data"))
    );
    assert!(second.error().is_none());
    assert!(second.data().is_some());
}

// =============================================================================
// Market overview
// =============================================================================

#[tokio::test]
async fn when_user_steps_back_a_day_overview_requests_the_previous_date() {
    // Given: Overviews for two consecutive dates
    let client = ScriptedHttpClient::new();
    client
        .respond_json(
            HttpMethod::Get,
            "/market/overview?date=2024-05-02",
            r#"{"overview": [{"symbol": "AAPL", "date": "2024-05-02", "today_close": 173.03,
                "forecast_10d_pct": 1.234, "forecast_10d_price": 175.17}]}"#,
        )
        .respond_json(
            HttpMethod::Get,
            "/market/overview?date=2024-05-01",
            r#"{"overview": [{"symbol": "AAPL", "date": "2024-05-01", "today_close": 169.3}]}"#,
        );
    let overview = MarketOverviewView::new(scripted_gateway(&client), &ViewConfig::default());

    // When: The user loads May 2nd and steps back one day
    let may_second = TradeDate::parse("2024-05-02").expect("valid date");
    let first = overview.load(Some(may_second)).await;
    let previous = overview.previous_day().await;

    // Then: Each date is requested once and missing cells render as N/A
    let rows = first.data().expect("ready");
    assert_eq!(rows[0].close_price, "173.03");
    assert_eq!(rows[0].cells[0].pct, "+1.23%");
    assert_eq!(rows[0].cells[0].price, "175.17");

    let rows = previous.data().expect("ready");
    assert_eq!(rows[0].close_price, "169.30");
    assert!(rows[0].cells.iter().all(|cell| cell.pct == "N/A"));
    assert_eq!(
        overview.selected_date(),
        Some(TradeDate::parse("2024-05-01").expect("valid date"))
    );
    assert_eq!(
        client.request_count(HttpMethod::Get, "/market/overview?date=2024-05-01"),
        1
    );
}

#[tokio::test]
async fn when_overview_fails_table_degrades_to_empty() {
    // Given: An unreachable overview endpoint
    let client = ScriptedHttpClient::new();
    client.respond(HttpMethod::Get, "/market/overview", HttpResponse::new(500, "oops"));
    let overview = MarketOverviewView::new(scripted_gateway(&client), &ViewConfig::default());

    // When: The default overview is loaded
    let state = overview.load(None).await;

    // Then: The view shows an empty table rather than an error
    assert_eq!(state, ViewState::Ready(Vec::new()));
}

// =============================================================================
// History views
// =============================================================================

#[tokio::test]
async fn when_archive_is_missing_history_degrades_to_empty() {
    // Given: No archive route scripted (the service answers 404)
    let client = ScriptedHttpClient::new();
    let archive = ArchiveView::new(scripted_gateway(&client));

    // When: The archive is loaded
    let state = archive.load("TSLA").await;

    // Then: The history is empty
    assert_eq!(state, ViewState::Ready(Vec::new()));
    assert_eq!(client.request_count(HttpMethod::Get, "/archive/TSLA"), 1);
}

#[tokio::test]
async fn when_archive_symbol_is_invalid_no_request_is_sent() {
    // Given: An archive view
    let client = ScriptedHttpClient::new();
    let archive = ArchiveView::new(scripted_gateway(&client));

    // When: An invalid symbol is submitted
    let state = archive.load("1ABC").await;

    // Then: Validation fails locally
    let error = state.error().expect("validation error");
    assert_eq!(error.kind(), GatewayErrorKind::Validation);
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn when_index_history_loads_rows_use_display_formats() {
    // Given: One resolved and one pending index forecast
    let client = ScriptedHttpClient::new();
    client.respond_json(
        HttpMethod::Get,
        "/indices/history",
        r#"{"history": [
            {"id": 1, "date": "2024-01-02", "symbol": "^GSPC", "horizon": 10,
             "prediction": 0.01234, "start_price": 4742.831, "target_date": "2024-01-12",
             "actual": 0.0089},
            {"id": 2, "date": "2024-04-01", "symbol": "^GSPC", "horizon": 365,
             "prediction": 0.07, "target_date": "2025-04-01"}
        ]}"#,
    );
    let indices = IndicesView::new(scripted_gateway(&client));

    // When: The index history is loaded
    let state = indices.load().await;

    // Then: Predictions use four decimals and pending fields show a dash
    let rows = state.data().expect("ready");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].prediction, "0.0123");
    assert_eq!(rows[0].start_price, "4742.83");
    assert_eq!(rows[0].actual, "0.0089");
    assert_eq!(rows[1].horizon, "365d");
    assert_eq!(rows[1].start_price, "-");
    assert_eq!(rows[1].actual, "-");
}

// =============================================================================
// Advanced simulation
// =============================================================================

fn simulation_body(path_count: usize, steps: usize) -> String {
    let paths: Vec<Vec<f64>> = (0..path_count)
        .map(|path| (0..steps).map(|step| 100.0 + (path + step) as f64).collect())
        .collect();
    serde_json::json!({
        "symbol": "AAPL",
        "method": "Regime-Switching GARCH + Jump Diffusion",
        "current_price": 100.0,
        "current_regime": {"id": 0, "label": "Low Volatility"},
        "quantiles": {
            "730": {"p10": 80.0, "p50": 120.0, "p90": 170.0},
            "10": {"p10": 96.0, "p50": 100.5, "p90": 104.0}
        },
        "analysis": {"10": {"risk_label": "Low", "interpretation": "Tight range"}},
        "paths": paths
    })
    .to_string()
}

#[tokio::test]
async fn when_simulation_returns_many_paths_only_the_first_twenty_are_charted() {
    // Given: A GARCH simulation with 25 paths of 3 steps
    let client = ScriptedHttpClient::new();
    client.respond_json(
        HttpMethod::Get,
        "/simulation/advanced/AAPL?method=garch&conservative=false",
        &simulation_body(25, 3),
    );
    let simulation = AdvancedSimulationView::new(scripted_gateway(&client), &ViewConfig::default());

    // When: The user runs the simulation
    let params = SimulationParams::new(SimulationMethod::Garch, false);
    let state = simulation.run("aapl", params).await;

    // Then: The chart has 20 path fields sampled every 5 days and the table is
    // sorted by horizon
    let view = state.data().expect("ready");
    assert_eq!(view.series.path_count(), 20);
    let xs: Vec<u64> = view.series.points().iter().map(|point| point.x).collect();
    assert_eq!(xs, vec![0, 5, 10]);

    let json = serde_json::to_value(&view.series).expect("series serializes");
    assert_eq!(json[1]["x"], 5);
    assert_eq!(json[1]["path19"], 120.0);
    assert!(json[1].get("path20").is_none());

    let labels: Vec<&str> = view.rows.iter().map(|row| row.label.as_str()).collect();
    assert_eq!(labels, vec!["10 Days", "730 Days"]);
    assert_eq!(view.rows[0].interpretation, "Tight range");
    assert_eq!(view.regime_label.as_deref(), Some("Low Volatility"));
}

#[tokio::test]
async fn when_dashboard_fails_simulation_view_is_unaffected() {
    // Given: Independent views over one gateway, the forecast route down
    let client = ScriptedHttpClient::new();
    client
        .respond(HttpMethod::Get, "/forecast/AAPL", HttpResponse::new(500, ""))
        .respond_json(
            HttpMethod::Get,
            "/simulation/advanced/AAPL?method=bootstrap&conservative=true",
            &simulation_body(2, 2),
        );
    let gateway = scripted_gateway(&client);
    let dashboard = DashboardView::new(gateway.clone(), &ViewConfig::default());
    let simulation = AdvancedSimulationView::new(gateway, &ViewConfig::default());

    // When: Both views are triggered
    let params = SimulationParams::new(SimulationMethod::Bootstrap, true);
    let (dashboard_state, simulation_state) =
        tokio::join!(dashboard.search("AAPL"), simulation.run("AAPL", params));

    // Then: Only the dashboard shows an error
    assert!(dashboard_state.error().is_some());
    assert!(simulation_state.data().is_some());
    assert!(simulation.state().error().is_none());
}
