use axum::{
    body::Body,
    extract::Extension,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ErrorResponse;

/// Key guarding the profile endpoints, which can read and replace vendor keys
#[derive(Clone)]
pub struct ProfileApiKey(pub Option<String>);

/// Middleware that requires a valid API key for profile endpoints
///
/// If `profile_api_key` is not configured (None), all requests are allowed (development mode).
/// If configured, the `X-API-Key` header must match the configured key.
pub async fn require_api_key(
    Extension(ProfileApiKey(expected_key)): Extension<ProfileApiKey>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = expected_key else {
        return next.run(request).await;
    };

    let provided_key = request
        .headers()
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok());

    match provided_key {
        Some(key) if key == expected => next.run(request).await,
        Some(_) => {
            tracing::warn!(path = %request.uri().path(), "Invalid API key for profile endpoint");
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::with_code("Invalid API key", "INVALID_API_KEY")),
            )
                .into_response()
        }
        None => {
            tracing::warn!(path = %request.uri().path(), "Missing API key for profile endpoint");
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::with_code(
                    "API key required. Provide X-API-Key header.",
                    "MISSING_API_KEY",
                )),
            )
                .into_response()
        }
    }
}
