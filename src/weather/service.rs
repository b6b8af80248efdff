use axum::http::StatusCode;
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;

use super::models::WeatherResponse;
use crate::credentials::{CredentialResolver, Vendor};
use crate::error::HttpError;
use crate::impl_into_response;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API Error: {code} - {reason}")]
    ApiError { code: u16, reason: String },

    #[error("Empty response body")]
    EmptyResponse,

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl HttpError for WeatherError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::RequestError(_) => StatusCode::BAD_GATEWAY,
            Self::ApiError { code, .. } => upstream_status(*code),
            Self::EmptyResponse | Self::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::RequestError(_) => Some("REQUEST_ERROR"),
            Self::ApiError { .. } => Some("API_ERROR"),
            Self::EmptyResponse => Some("EMPTY_RESPONSE"),
            Self::InvalidResponse(_) => Some("INVALID_RESPONSE"),
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

impl_into_response!(WeatherError);

/// Map a vendor status onto what we answer with: client mistakes pass
/// through, everything else is the upstream's fault.
pub(crate) fn upstream_status(code: u16) -> StatusCode {
    match code {
        400 | 404 => StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY),
        401 | 403 | 429 => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    }
}

/// OpenWeatherMap unit system. Prompts and rule thresholds are written in Celsius.
pub(crate) const UNITS: &str = "metric";

/// Human readable reason for a status, e.g. "Unauthorized"
pub(crate) fn status_reason(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

pub struct WeatherService {
    client: Client,
    base_url: String,
    credentials: Arc<CredentialResolver>,
}

impl WeatherService {
    pub fn new(client: Client, base_url: &str, credentials: Arc<CredentialResolver>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/weather", self.base_url)
    }

    /// Fetch current conditions for a coordinate pair.
    ///
    /// One GET, no retries, no caching. The API key is resolved for this call
    /// only, so a key saved to the profile is picked up by the next request.
    pub async fn get_current_weather(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherResponse, WeatherError> {
        let api_key = self.credentials.resolve(Vendor::OpenWeatherMap).await;

        tracing::debug!(lat = %lat, lon = %lon, "Fetching current weather");

        let result = self.fetch(lat, lon, &api_key).await;
        let outcome = if result.is_ok() { "success" } else { "error" };
        metrics::counter!("sassy_skies_weather_fetch_total", "outcome" => outcome).increment(1);

        result
    }

    async fn fetch(&self, lat: f64, lon: f64, api_key: &str) -> Result<WeatherResponse, WeatherError> {
        let response = self
            .client
            .get(self.endpoint())
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", api_key.to_string()),
                ("units", UNITS.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = %status, "Received weather API response");

        if !status.is_success() {
            return Err(WeatherError::ApiError {
                code: status.as_u16(),
                reason: status_reason(status),
            });
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(WeatherError::EmptyResponse);
        }

        let weather: WeatherResponse = serde_json::from_slice(&body)
            .map_err(|e| WeatherError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            location = %weather.name,
            temp = %weather.main.temp,
            "Weather data fetched successfully"
        );

        Ok(weather)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::stub_vendor;
    use super::*;
    use crate::credentials::ProfileStore;

    const SAMPLE_WEATHER: &str = r#"{
        "coord": {"lon": 77.209, "lat": 28.6139},
        "weather": [{"id": 721, "main": "Haze", "description": "haze", "icon": "50d"}],
        "base": "stations",
        "main": {"temp": 33.05, "feels_like": 38.4, "temp_min": 33.05, "temp_max": 33.05,
                 "pressure": 1004, "humidity": 56, "sea_level": 1004, "grnd_level": 979},
        "visibility": 3000,
        "wind": {"speed": 2.57, "deg": 270},
        "clouds": {"all": 0},
        "dt": 1726222000,
        "sys": {"type": 1, "id": 9165, "country": "IN", "sunrise": 1726187600, "sunset": 1726232400},
        "timezone": 19800,
        "id": 1273294,
        "name": "Delhi",
        "cod": 200
    }"#;

    #[test]
    fn test_weather_payload_deserializes() {
        let weather: WeatherResponse = serde_json::from_str(SAMPLE_WEATHER).unwrap();
        assert_eq!(weather.name, "Delhi");
        assert_eq!(weather.timezone, 19800);
        assert_eq!(weather.main.humidity, 56);
        assert_eq!(weather.description(), "haze");
        assert_eq!(weather.sys.country, "IN");
        assert!(weather.rain.is_none());
    }

    #[test]
    fn test_weather_payload_keeps_vendor_field_names() {
        let weather: WeatherResponse = serde_json::from_str(SAMPLE_WEATHER).unwrap();
        let value = serde_json::to_value(&weather).unwrap();
        assert_eq!(value["sys"]["type"], 1);
        assert_eq!(value["main"]["feels_like"], 38.4);
        assert!(value["main"].get("temp_kf").is_none());
    }

    #[test]
    fn test_api_error_message_format() {
        let err = WeatherError::ApiError {
            code: 401,
            reason: "Unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "API Error: 401 - Unauthorized");
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), Some("API_ERROR"));
        assert!(err.retryable());
    }

    #[test]
    fn test_upstream_status_mapping() {
        assert_eq!(upstream_status(400), StatusCode::BAD_REQUEST);
        assert_eq!(upstream_status(404), StatusCode::NOT_FOUND);
        assert_eq!(upstream_status(429), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(upstream_status(500), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(reqwest::StatusCode::NOT_FOUND), "Not Found");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let resolver = Arc::new(CredentialResolver::for_tests("w", "g"));
        let service = WeatherService::new(
            Client::new(),
            "https://api.openweathermap.org/data/2.5/",
            resolver,
        );
        assert_eq!(
            service.endpoint(),
            "https://api.openweathermap.org/data/2.5/weather"
        );
    }

    fn create_test_service(base_url: &str) -> WeatherService {
        let resolver = Arc::new(CredentialResolver::for_tests("fallback-weather", "g"));
        WeatherService::new(Client::new(), base_url, resolver)
    }

    #[tokio::test]
    async fn test_fetch_sends_coordinates_key_and_metric_units() {
        let (base_url, seen) = stub_vendor(StatusCode::OK, SAMPLE_WEATHER).await;
        let service = create_test_service(&base_url);

        let weather = service.get_current_weather(28.6139, 77.209).await.unwrap();

        assert_eq!(weather.name, "Delhi");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["lat"], "28.6139");
        assert_eq!(seen[0]["lon"], "77.209");
        assert_eq!(seen[0]["appid"], "fallback-weather");
        assert_eq!(seen[0]["units"], "metric");
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let (base_url, _) = stub_vendor(StatusCode::UNAUTHORIZED, r#"{"cod":401}"#).await;
        let service = create_test_service(&base_url);

        let err = service.get_current_weather(28.6, 77.2).await.unwrap_err();

        assert!(matches!(err, WeatherError::ApiError { code: 401, .. }));
        assert_eq!(err.to_string(), "API Error: 401 - Unauthorized");
    }

    #[tokio::test]
    async fn test_empty_body_is_empty_response() {
        let (base_url, _) = stub_vendor(StatusCode::OK, "").await;
        let service = create_test_service(&base_url);

        let err = service.get_current_weather(28.6, 77.2).await.unwrap_err();

        assert!(matches!(err, WeatherError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let (base_url, _) = stub_vendor(StatusCode::OK, "<html>gateway hiccup</html>").await;
        let service = create_test_service(&base_url);

        let err = service.get_current_weather(28.6, 77.2).await.unwrap_err();

        assert!(matches!(err, WeatherError::InvalidResponse(_)));
        assert_eq!(err.error_code(), Some("INVALID_RESPONSE"));
    }

    #[tokio::test]
    async fn test_blank_profile_key_sends_fallback_then_picks_up_update() {
        let (base_url, seen) = stub_vendor(StatusCode::OK, SAMPLE_WEATHER).await;
        let store = Arc::new(ProfileStore::new());
        store.upsert("u1", "a@b.c", "A", true, "").await;
        store.update_api_keys("u1", "  ", "").await.unwrap();
        store.set_active("u1").await.unwrap();
        let resolver = Arc::new(CredentialResolver::new(store.clone(), "fallback-weather", ""));
        let service = WeatherService::new(Client::new(), &base_url, resolver);

        service.get_current_weather(28.6, 77.2).await.unwrap();
        store.update_api_keys("u1", "user-weather", "").await.unwrap();
        service.get_current_weather(28.6, 77.2).await.unwrap();

        let keys: Vec<String> = seen.lock().unwrap().iter().map(|q| q["appid"].clone()).collect();
        assert_eq!(keys, ["fallback-weather", "user-weather"]);
    }
}
