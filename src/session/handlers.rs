use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

use super::{ForecastState, Session, SessionError, SessionView, WeatherState};
use crate::extractors::CoordinatesParam;
use crate::roast::StyleVariant;
use crate::AppState;

/// Longest a watch request is held open before answering with the unchanged view
const WATCH_HOLD: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize, ToSchema)]
pub struct StyleRequest {
    pub style: StyleVariant,
}

fn existing(state: &AppState, id: &str) -> Result<Arc<Session>, SessionError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| SessionError::NotFound(id.to_string()))
}

/// GET /sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, SessionError> {
    Ok(Json(existing(&state, &id)?.view()))
}

/// GET /sessions/{id}/watch - Long-poll until weather or forecast state changes
pub async fn watch_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, SessionError> {
    let session = existing(&state, &id)?;
    let mut weather = session.subscribe_weather();
    let mut forecast = session.subscribe_forecast();

    let changed = async {
        tokio::select! {
            _ = weather.changed() => {},
            _ = forecast.changed() => {},
        }
    };
    if tokio::time::timeout(WATCH_HOLD, changed).await.is_err() {
        tracing::debug!(session = %session.id(), "Session watch timed out unchanged");
    }

    Ok(Json(session.view()))
}

/// DELETE /sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, SessionError> {
    if state.sessions.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(SessionError::NotFound(id))
    }
}

/// POST /sessions/{id}/weather?lat=..&lon=.. - Creates the session on first use
pub async fn load_weather(
    State(state): State<AppState>,
    Path(id): Path<String>,
    coords: CoordinatesParam,
) -> Json<WeatherState> {
    let coords = coords.or_default(&state.config.default_location);
    let session = state.sessions.get_or_create(&id);
    Json(session.load_weather(coords).await)
}

/// POST /sessions/{id}/forecast?lat=..&lon=.. - Creates the session on first use
pub async fn load_forecast(
    State(state): State<AppState>,
    Path(id): Path<String>,
    coords: CoordinatesParam,
) -> Json<ForecastState> {
    let coords = coords.or_default(&state.config.default_location);
    let session = state.sessions.get_or_create(&id);
    Json(session.load_forecast(coords).await)
}

/// POST /sessions/{id}/weather/retry
pub async fn retry_weather(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WeatherState>, SessionError> {
    let session = existing(&state, &id)?;
    Ok(Json(session.retry_weather().await?))
}

/// POST /sessions/{id}/forecast/retry
pub async fn retry_forecast(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ForecastState>, SessionError> {
    let session = existing(&state, &id)?;
    Ok(Json(session.retry_forecast().await?))
}

/// PUT /sessions/{id}/style - Rewrites held roasts, never re-fetches
pub async fn set_style(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StyleRequest>,
) -> Json<SessionView> {
    let session = state.sessions.get_or_create(&id);
    Json(session.set_style(request.style).await)
}

/// DELETE /sessions/{id}/error
pub async fn clear_error(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, SessionError> {
    let session = existing(&state, &id)?;
    Ok(Json(session.clear_error().await))
}
