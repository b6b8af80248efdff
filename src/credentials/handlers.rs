use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::time::Duration;

use super::models::{ActiveProfileRequest, ApiKeysRequest, ProfileUpsertRequest, ProfileView};
use super::{CredentialStore, ProfileError};
use crate::AppState;

/// GET /profiles/{uid} - Profile with masked keys
pub async fn get_profile(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<ProfileView>, ProfileError> {
    let profile = state
        .profile_store
        .get(&uid)
        .await
        .ok_or(ProfileError::NotFound(uid))?;

    Ok(Json(ProfileView::from(&profile)))
}

/// Longest a watch request is held open before answering with the unchanged profile
const WATCH_HOLD: Duration = Duration::from_secs(30);

/// GET /profiles/{uid}/watch - Long-poll until the profile changes
pub async fn watch_profile(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<ProfileView>, ProfileError> {
    let mut rx = state.profile_store.subscribe(&uid).await?;

    match tokio::time::timeout(WATCH_HOLD, rx.changed()).await {
        Ok(Ok(())) => tracing::debug!(uid = %uid, "Profile changed"),
        // Dropped from the store while we were waiting
        Ok(Err(_)) => return Err(ProfileError::NotFound(uid)),
        Err(_) => tracing::debug!(uid = %uid, "Profile watch timed out unchanged"),
    }

    let view = ProfileView::from(&*rx.borrow_and_update());
    Ok(Json(view))
}

/// DELETE /profiles/{uid} - Forget the local copy
pub async fn delete_profile(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<StatusCode, ProfileError> {
    if state.profile_store.remove(&uid).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ProfileError::NotFound(uid))
    }
}

/// PUT /profiles/{uid} - Create or update profile details
pub async fn upsert_profile(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(request): Json<ProfileUpsertRequest>,
) -> Result<Json<ProfileView>, ProfileError> {
    if uid.trim().is_empty() {
        return Err(ProfileError::Invalid("uid must not be empty".to_string()));
    }
    if !request.email.contains('@') {
        return Err(ProfileError::Invalid(format!(
            "invalid email address: {}",
            request.email
        )));
    }

    let profile = state
        .profile_store
        .upsert(
            &uid,
            request.email.trim(),
            request.display_name.trim(),
            request.is_verified,
            request.profile_image_url.trim(),
        )
        .await;

    Ok(Json(ProfileView::from(&profile)))
}

/// PUT /profiles/{uid}/keys - Save the user's vendor API keys
pub async fn update_api_keys(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(request): Json<ApiKeysRequest>,
) -> Result<Json<ProfileView>, ProfileError> {
    let profile = state
        .profile_store
        .update_api_keys(&uid, &request.weather_api_key, &request.gemini_api_key)
        .await?;

    tracing::info!(
        uid = %uid,
        has_all_keys = profile.has_all_api_keys(),
        "API keys updated"
    );

    Ok(Json(ProfileView::from(&profile)))
}

/// GET /active-profile - Profile whose keys outbound calls use
pub async fn get_active_profile(
    State(state): State<AppState>,
) -> Result<Json<ProfileView>, ProfileError> {
    let profile = state
        .profile_store
        .active_profile()
        .await?
        .ok_or_else(|| ProfileError::NotFound("no active profile".to_string()))?;

    Ok(Json(ProfileView::from(&profile)))
}

/// PUT /active-profile - Choose whose keys outbound calls use
pub async fn set_active_profile(
    State(state): State<AppState>,
    Json(request): Json<ActiveProfileRequest>,
) -> Result<StatusCode, ProfileError> {
    state.profile_store.set_active(&request.uid).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /active-profile - Fall back to the built-in keys
pub async fn clear_active_profile(State(state): State<AppState>) -> StatusCode {
    state.profile_store.clear_active().await;
    StatusCode::NO_CONTENT
}
