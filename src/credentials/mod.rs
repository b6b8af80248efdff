pub mod handlers;
pub mod models;
mod store;

pub use models::UserProfile;
pub use store::ProfileStore;

use async_trait::async_trait;
use axum::http::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::error::HttpError;
use crate::impl_into_response;

/// Upper bound on a profile read before the fallback key is used
const PROFILE_LOOKUP_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("Invalid profile: {0}")]
    Invalid(String),

    #[error("Profile store unavailable: {0}")]
    Unavailable(String),
}

impl HttpError for ProfileError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::NotFound(_) => Some("PROFILE_NOT_FOUND"),
            Self::Invalid(_) => Some("INVALID_PROFILE"),
            Self::Unavailable(_) => Some("PROFILE_UNAVAILABLE"),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl_into_response!(ProfileError);

/// Vendor APIs that take a user-supplied key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    OpenWeatherMap,
    Gemini,
}

impl Vendor {
    fn key_of(self, profile: &UserProfile) -> &str {
        match self {
            Vendor::OpenWeatherMap => &profile.weather_api_key,
            Vendor::Gemini => &profile.gemini_api_key,
        }
    }
}

/// Source of the profile whose keys outbound calls should use
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn active_profile(&self) -> Result<Option<UserProfile>, ProfileError>;
}

/// Resolves the key for one outbound call.
///
/// The profile's key wins when it is non-blank, otherwise the built-in
/// fallback is used. Nothing is cached between calls.
pub struct CredentialResolver {
    store: Arc<dyn CredentialStore>,
    fallback_weather_api_key: String,
    fallback_gemini_api_key: String,
    lookup_timeout: Duration,
}

impl CredentialResolver {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        fallback_weather_api_key: &str,
        fallback_gemini_api_key: &str,
    ) -> Self {
        Self {
            store,
            fallback_weather_api_key: fallback_weather_api_key.to_string(),
            fallback_gemini_api_key: fallback_gemini_api_key.to_string(),
            lookup_timeout: PROFILE_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    fn fallback(&self, vendor: Vendor) -> &str {
        match vendor {
            Vendor::OpenWeatherMap => &self.fallback_weather_api_key,
            Vendor::Gemini => &self.fallback_gemini_api_key,
        }
    }

    pub async fn resolve(&self, vendor: Vendor) -> String {
        match tokio::time::timeout(self.lookup_timeout, self.store.active_profile()).await {
            Ok(Ok(Some(profile))) => {
                let key = vendor.key_of(&profile).trim();
                if !key.is_empty() {
                    tracing::debug!(vendor = ?vendor, uid = %profile.uid, "Using profile API key");
                    return key.to_string();
                }
            }
            Ok(Ok(None)) => {}
            Ok(Err(e)) => {
                tracing::warn!(vendor = ?vendor, error = %e, "Profile lookup failed, using fallback key");
            }
            Err(_) => {
                tracing::warn!(
                    vendor = ?vendor,
                    timeout_secs = self.lookup_timeout.as_secs(),
                    "Profile lookup timed out, using fallback key"
                );
            }
        }

        tracing::debug!(vendor = ?vendor, "Using fallback API key");
        self.fallback(vendor).to_string()
    }

    #[cfg(test)]
    pub fn for_tests(fallback_weather_api_key: &str, fallback_gemini_api_key: &str) -> Self {
        Self::new(
            Arc::new(ProfileStore::new()),
            fallback_weather_api_key,
            fallback_gemini_api_key,
        )
    }
}
