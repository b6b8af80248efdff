use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use super::models::WeatherReport;
use super::service::WeatherError;
use crate::extractors::{CoordinatesParam, StyleParam};
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Language-model calls left today before roasts come from the rule table
    pub generation_budget_remaining: u32,
    pub generation_budget_daily_limit: u32,
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        generation_budget_remaining: state.budget.remaining(),
        generation_budget_daily_limit: state.budget.daily_limit(),
    })
}

/// Current weather with a roast
///
/// GET /weather?lat=28.61&lon=77.20&style=global
pub async fn get_weather(
    State(state): State<AppState>,
    coords: CoordinatesParam,
    style: StyleParam,
) -> Result<Json<WeatherReport>, WeatherError> {
    let coords = coords.or_default(&state.config.default_location);
    let style = style.or_default(state.config.default_style);

    let weather = state
        .weather_service
        .get_current_weather(coords.lat, coords.lon)
        .await?;
    let sarcastic_message = state.roast_service.roast_weather(style, &weather).await;

    Ok(Json(WeatherReport {
        weather,
        sarcastic_message,
        style,
    }))
}
