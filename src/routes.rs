use axum::{
    extract::State,
    middleware,
    routing::{delete, get, post, put},
    Extension, Router,
};

use crate::credentials::handlers as profile_handlers;
use crate::forecast::handlers as forecast_handlers;
use crate::middleware::{require_api_key, ProfileApiKey};
use crate::openapi::swagger_ui;
use crate::session::handlers as session_handlers;
use crate::weather::handlers as weather_handlers;
use crate::AppState;

/// Build the weather API routes
fn weather_routes() -> Router<AppState> {
    Router::new().route("/weather", get(weather_handlers::get_weather))
}

/// Build the forecast API routes
fn forecast_routes() -> Router<AppState> {
    Router::new()
        .route("/forecast", get(forecast_handlers::get_forecast))
        .route("/forecast/raw", get(forecast_handlers::get_raw_forecast))
}

/// Build the session API routes
fn session_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/sessions/{id}",
            get(session_handlers::get_session).delete(session_handlers::delete_session),
        )
        .route("/sessions/{id}/watch", get(session_handlers::watch_session))
        .route("/sessions/{id}/weather", post(session_handlers::load_weather))
        .route(
            "/sessions/{id}/weather/retry",
            post(session_handlers::retry_weather),
        )
        .route("/sessions/{id}/forecast", post(session_handlers::load_forecast))
        .route(
            "/sessions/{id}/forecast/retry",
            post(session_handlers::retry_forecast),
        )
        .route("/sessions/{id}/style", put(session_handlers::set_style))
        .route("/sessions/{id}/error", delete(session_handlers::clear_error))
}

/// Build the profile API routes (protected by API key auth)
fn profile_routes(api_key: Option<String>) -> Router<AppState> {
    Router::new()
        .route(
            "/active-profile",
            get(profile_handlers::get_active_profile)
                .put(profile_handlers::set_active_profile)
                .delete(profile_handlers::clear_active_profile),
        )
        .route(
            "/profiles/{uid}",
            get(profile_handlers::get_profile)
                .put(profile_handlers::upsert_profile)
                .delete(profile_handlers::delete_profile),
        )
        .route("/profiles/{uid}/keys", put(profile_handlers::update_api_keys))
        .route("/profiles/{uid}/watch", get(profile_handlers::watch_profile))
        .layer(middleware::from_fn(require_api_key))
        .layer(Extension(ProfileApiKey(api_key)))
}

/// Build all API v1 routes
pub fn api_v1_routes(profile_api_key: Option<String>) -> Router<AppState> {
    Router::new()
        .merge(weather_routes())
        .merge(forecast_routes())
        .merge(session_routes())
        .merge(profile_routes(profile_api_key))
}

/// Prometheus text exposition
async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}

/// Build the complete application router
pub fn build_router(state: AppState) -> Router<AppState> {
    let profile_api_key = state.config.profile_api_key.clone();
    Router::new()
        // Health check at root level
        .route("/", get(weather_handlers::health))
        .route("/health", get(weather_handlers::health))
        .route("/metrics", get(metrics))
        // API v1 routes
        .nest("/api/v1", api_v1_routes(profile_api_key))
        // Swagger UI for API documentation
        .merge(swagger_ui())
}
