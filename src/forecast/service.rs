use axum::http::StatusCode;
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;

use super::aggregate::aggregate_daily;
use super::models::{City, DailySummary, ForecastResponse};
use crate::credentials::{CredentialResolver, Vendor};
use crate::error::HttpError;
use crate::impl_into_response;
use crate::weather::service::{status_reason, upstream_status, UNITS};

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Network error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API Error: {code} - {reason}")]
    ApiError { code: u16, reason: String },

    #[error("Empty response body")]
    EmptyResponse,

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl HttpError for ForecastError {
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

impl_into_response!(ForecastError);

/// Forecast reduced to calendar days, roasts not yet attached
#[derive(Debug, Clone)]
pub struct DailyForecast {
    pub city: City,
    pub days: Vec<DailySummary>,
}

pub struct ForecastService {
    client: Client,
    base_url: String,
    credentials: Arc<CredentialResolver>,
}

impl ForecastService {
    pub fn new(client: Client, base_url: &str, credentials: Arc<CredentialResolver>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/forecast", self.base_url)
    }

    /// Raw three-hour samples for the next five days
    pub async fn get_forecast(&self, lat: f64, lon: f64) -> Result<ForecastResponse, ForecastError> {
        let api_key = self.credentials.resolve(Vendor::OpenWeatherMap).await;

        tracing::debug!(lat = %lat, lon = %lon, "Fetching forecast");

        let result = self.fetch(lat, lon, &api_key).await;
        let outcome = if result.is_ok() { "success" } else { "error" };
        metrics::counter!("sassy_skies_forecast_fetch_total", "outcome" => outcome).increment(1);

        result
    }

    /// Forecast grouped into at most seven local calendar days
    pub async fn get_daily(&self, lat: f64, lon: f64) -> Result<DailyForecast, ForecastError> {
        let forecast = self.get_forecast(lat, lon).await?;
        let days = aggregate_daily(&forecast.list, forecast.city.utc_offset());

        tracing::debug!(
            city = %forecast.city.name,
            samples = forecast.list.len(),
            days = days.len(),
            "Forecast aggregated"
        );

        Ok(DailyForecast {
            city: forecast.city,
            days,
        })
    }

    async fn fetch(&self, lat: f64, lon: f64, api_key: &str) -> Result<ForecastResponse, ForecastError> {
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
        tracing::debug!(status = %status, "Received forecast API response");

        if !status.is_success() {
            return Err(ForecastError::ApiError {
                code: status.as_u16(),
                reason: status_reason(status),
            });
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(ForecastError::EmptyResponse);
        }

        let forecast: ForecastResponse = serde_json::from_slice(&body)
            .map_err(|e| ForecastError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            city = %forecast.city.name,
            samples = forecast.cnt,
            "Forecast fetched successfully"
        );

        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::service::testing::stub_vendor;

    const SAMPLE_FORECAST: &str = r#"{
        "cod": "200",
        "message": 0,
        "cnt": 3,
        "list": [
            {"dt": 1726218000,
             "main": {"temp": 31.2, "feels_like": 35.1, "temp_min": 30.4, "temp_max": 31.2,
                      "pressure": 1004, "sea_level": 1004, "grnd_level": 979, "humidity": 62, "temp_kf": 0.8},
             "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
             "clouds": {"all": 75}, "wind": {"speed": 3.1, "deg": 110, "gust": 4.9},
             "visibility": 10000, "pop": 0.64, "rain": {"3h": 0.61},
             "sys": {"pod": "d"}, "dt_txt": "2024-09-13 09:00:00"},
            {"dt": 1726228800,
             "main": {"temp": 29.0, "feels_like": 32.0, "temp_min": 28.1, "temp_max": 29.0,
                      "pressure": 1005, "humidity": 70},
             "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04n"}],
             "clouds": {"all": 80}, "wind": {"speed": 2.2, "deg": 100},
             "visibility": 10000, "pop": 0.2,
             "sys": {"pod": "n"}, "dt_txt": "2024-09-13 12:00:00"},
            {"dt": 1726239600,
             "main": {"temp": 27.5, "feels_like": 30.2, "temp_min": 27.5, "temp_max": 27.5,
                      "pressure": 1006, "humidity": 78},
             "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01n"}],
             "clouds": {"all": 5}, "wind": {"speed": 1.4, "deg": 90},
             "visibility": 10000,
             "sys": {"pod": "n"}, "dt_txt": "2024-09-13 15:00:00"}
        ],
        "city": {"id": 1273294, "name": "Delhi", "coord": {"lat": 28.6139, "lon": 77.209},
                 "country": "IN", "population": 10927986, "timezone": 19800,
                 "sunrise": 1726187600, "sunset": 1726232400}
    }"#;

    #[test]
    fn test_forecast_payload_deserializes() {
        let forecast: ForecastResponse = serde_json::from_str(SAMPLE_FORECAST).unwrap();
        assert_eq!(forecast.cnt, 3);
        assert_eq!(forecast.list.len(), 3);
        assert_eq!(forecast.city.name, "Delhi");
        assert_eq!(forecast.list[0].pop, Some(0.64));
        assert_eq!(forecast.list[2].pop, None);
        assert_eq!(
            forecast.list[0].rain.as_ref().and_then(|r| r.three_hour),
            Some(0.61)
        );
    }

    #[test]
    fn test_sample_aggregates_in_city_time() {
        let forecast: ForecastResponse = serde_json::from_str(SAMPLE_FORECAST).unwrap();
        // 09:00, 12:00, 15:00 UTC are 14:30, 17:30, 20:30 in Delhi
        let days = aggregate_daily(&forecast.list, forecast.city.utc_offset());

        assert_eq!(days.len(), 1);
        let day = &days[0];
        assert_eq!(day.date, "Sep 13");
        assert_eq!(day.day_of_week, "Friday");
        assert_eq!(day.description, "light rain");
        assert_eq!(day.max_temp, 31);
        assert_eq!(day.min_temp, 28);
        assert_eq!(day.humidity, 70);
        assert_eq!(day.precipitation_probability, 64);
    }

    #[test]
    fn test_api_error_message_format() {
        let err = ForecastError::ApiError {
            code: 404,
            reason: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "API Error: 404 - Not Found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.retryable());
        assert_eq!(ForecastError::EmptyResponse.to_string(), "Empty response body");
    }

    #[test]
    fn test_endpoint() {
        let service = ForecastService::new(
            Client::new(),
            "https://api.openweathermap.org/data/2.5",
            Arc::new(CredentialResolver::for_tests("w", "g")),
        );
        assert_eq!(
            service.endpoint(),
            "https://api.openweathermap.org/data/2.5/forecast"
        );
    }

    fn create_test_service(base_url: &str) -> ForecastService {
        let resolver = Arc::new(CredentialResolver::for_tests("fallback-weather", "g"));
        ForecastService::new(Client::new(), base_url, resolver)
    }

    #[tokio::test]
    async fn test_get_daily_fetches_and_aggregates() {
        let (base_url, seen) = stub_vendor(StatusCode::OK, SAMPLE_FORECAST).await;
        let service = create_test_service(&base_url);

        let daily = service.get_daily(28.6139, 77.209).await.unwrap();

        assert_eq!(daily.city.name, "Delhi");
        assert_eq!(daily.days.len(), 1);
        assert_eq!(daily.days[0].precipitation_probability, 64);
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0]["appid"], "fallback-weather");
        assert_eq!(seen[0]["units"], "metric");
    }

    #[tokio::test]
    async fn test_fetch_error_mapping() {
        let (base_url, _) = stub_vendor(StatusCode::NOT_FOUND, r#"{"cod":"404","message":"city not found"}"#).await;
        let err = create_test_service(&base_url).get_forecast(0.0, 0.0).await.unwrap_err();
        assert_eq!(err.to_string(), "API Error: 404 - Not Found");

        let (base_url, _) = stub_vendor(StatusCode::OK, "").await;
        let err = create_test_service(&base_url).get_daily(0.0, 0.0).await.unwrap_err();
        assert!(matches!(err, ForecastError::EmptyResponse));

        let (base_url, _) = stub_vendor(StatusCode::OK, r#"{"cod":"200","list":"nope"}"#).await;
        let err = create_test_service(&base_url).get_forecast(0.0, 0.0).await.unwrap_err();
        assert!(matches!(err, ForecastError::InvalidResponse(_)));
    }
}
