mod api_budget;
mod config;
mod credentials;
mod error;
mod extractors;
mod forecast;
mod middleware;
mod openapi;
mod roast;
mod routes;
mod session;
mod weather;

use anyhow::Context;
use axum::{error_handling::HandleErrorLayer, http::StatusCode, BoxError};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use reqwest::Client;
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api_budget::ApiCallBudget;
use crate::config::AppConfig;
use crate::credentials::{CredentialResolver, ProfileStore};
use crate::forecast::ForecastService;
use crate::roast::{GeminiClient, RoastService};
use crate::session::{start_session_cleanup_task, SessionRegistry};
use crate::weather::WeatherService;

/// Shared HTTP client configuration
const HTTP_TIMEOUT_SECS: u64 = 30;
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;
const HTTP_POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// Outer bound on a request; long enough for a session watch to finish
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Clone)]
pub struct AppState {
    pub weather_service: Arc<WeatherService>,
    pub forecast_service: Arc<ForecastService>,
    pub roast_service: Arc<RoastService>,
    pub profile_store: Arc<ProfileStore>,
    pub sessions: Arc<SessionRegistry>,
    pub budget: Arc<ApiCallBudget>,
    pub metrics: PrometheusHandle,
    pub config: Arc<AppConfig>,
}

/// Create shared HTTP client with connection pooling
fn create_http_client() -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .pool_idle_timeout(Duration::from_secs(HTTP_POOL_IDLE_TIMEOUT_SECS))
        .pool_max_idle_per_host(10)
        .build()
}

/// Handle request timeout errors
async fn handle_timeout_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal error: {}", err),
        )
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sassy_skies=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;
    tracing::info!("Configuration loaded successfully");

    if config.fallback_weather_api_key.is_empty() {
        tracing::warn!("No fallback OpenWeatherMap key; fetches need a profile key");
    }
    if config.fallback_gemini_api_key.is_empty() {
        tracing::warn!("No fallback Gemini key; roasts come from the local table unless a profile key is set");
    }

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    // Create shared HTTP client with connection pooling
    let http_client = create_http_client().context("Failed to create HTTP client")?;
    tracing::debug!("Shared HTTP client created");

    // Keys are looked up per call against whichever profile is active
    let profile_store = Arc::new(ProfileStore::new());
    let credentials = Arc::new(
        CredentialResolver::new(
            profile_store.clone(),
            &config.fallback_weather_api_key,
            &config.fallback_gemini_api_key,
        )
        .with_lookup_timeout(Duration::from_secs(config.profile_lookup_timeout_secs)),
    );

    // Initialize services with shared client
    let weather_service = Arc::new(WeatherService::new(
        http_client.clone(),
        &config.weather_base_url,
        credentials.clone(),
    ));
    let forecast_service = Arc::new(ForecastService::new(
        http_client.clone(),
        &config.weather_base_url,
        credentials.clone(),
    ));

    let budget = Arc::new(ApiCallBudget::new(config.gemini_daily_limit));
    let gemini = Arc::new(GeminiClient::new(
        http_client,
        &config.gemini_base_url,
        &config.gemini_model,
        credentials,
    ));
    let roast_service = Arc::new(RoastService::new(gemini, budget.clone()));
    tracing::info!(
        model = %config.gemini_model,
        daily_limit = config.gemini_daily_limit,
        "Roast service ready"
    );

    let sessions = Arc::new(SessionRegistry::new(
        Duration::from_secs(config.session_idle_ttl_secs),
        config.default_style,
        weather_service.clone(),
        forecast_service.clone(),
        roast_service.clone(),
    ));
    start_session_cleanup_task(sessions.clone());

    // Create shared application state
    let state = AppState {
        weather_service,
        forecast_service,
        roast_service,
        profile_store,
        sessions,
        budget,
        metrics,
        config: Arc::new(config.clone()),
    };

    let app = routes::build_router(state.clone())
        .layer(
            ServiceBuilder::new()
                // Handle timeout errors
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS)),
        )
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
