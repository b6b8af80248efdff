use axum::{extract::State, Json};

use super::models::{DailyForecastResponse, ForecastResponse};
use super::service::ForecastError;
use crate::extractors::{CoordinatesParam, StyleParam};
use crate::AppState;

/// Daily forecast with a roast per day
///
/// GET /forecast?lat=28.61&lon=77.20&style=regional
pub async fn get_forecast(
    State(state): State<AppState>,
    coords: CoordinatesParam,
    style: StyleParam,
) -> Result<Json<DailyForecastResponse>, ForecastError> {
    let coords = coords.or_default(&state.config.default_location);
    let style = style.or_default(state.config.default_style);

    let forecast = state
        .forecast_service
        .get_daily(coords.lat, coords.lon)
        .await?;
    let days = state.roast_service.roast_days(style, forecast.days).await;

    Ok(Json(DailyForecastResponse {
        city: forecast.city.name,
        country: forecast.city.country,
        style,
        days,
    }))
}

/// Vendor forecast payload, three-hour samples untouched
///
/// GET /forecast/raw?lat=28.61&lon=77.20
pub async fn get_raw_forecast(
    State(state): State<AppState>,
    coords: CoordinatesParam,
) -> Result<Json<ForecastResponse>, ForecastError> {
    let coords = coords.or_default(&state.config.default_location);

    let forecast = state
        .forecast_service
        .get_forecast(coords.lat, coords.lon)
        .await?;
    Ok(Json(forecast))
}
