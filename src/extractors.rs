use axum::{
    extract::{FromRequestParts, Query},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::config::DefaultLocation;
use crate::error::ErrorResponse;
use crate::roast::StyleVariant;

/// Query parameters for weather/forecast requests
#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Roast style: global or regional
    pub style: Option<String>,
}

/// A validated coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, ParamRejection> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ParamRejection(format!("lat out of range: {}", lat)));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ParamRejection(format!("lon out of range: {}", lon)));
        }
        Ok(Self { lat, lon })
    }
}

impl From<&DefaultLocation> for Coordinates {
    fn from(location: &DefaultLocation) -> Self {
        Self {
            lat: location.latitude,
            lon: location.longitude,
        }
    }
}

async fn location_query<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
) -> Result<LocationQuery, ParamRejection> {
    Query::<LocationQuery>::from_request_parts(parts, state)
        .await
        .map(|Query(query)| query)
        .map_err(|e| ParamRejection(e.body_text()))
}

/// Extracts `lat`/`lon` from the query string.
///
/// Both absent is fine: the handler falls back to the configured default
/// location. One without the other, or an out-of-range value, is rejected.
#[derive(Debug)]
pub struct CoordinatesParam(pub Option<Coordinates>);

impl CoordinatesParam {
    /// Get the coordinates or use the default location
    pub fn or_default(self, default: &DefaultLocation) -> Coordinates {
        self.0.unwrap_or_else(|| Coordinates::from(default))
    }
}

impl<S> FromRequestParts<S> for CoordinatesParam
where
    S: Send + Sync,
{
    type Rejection = ParamRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let query = location_query(parts, state).await?;
        match (query.lat, query.lon) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon).map(|c| CoordinatesParam(Some(c))),
            (None, None) => Ok(CoordinatesParam(None)),
            _ => Err(ParamRejection(
                "lat and lon must be given together".to_string(),
            )),
        }
    }
}

/// Extracts the roast style from the `style` query parameter
#[derive(Debug)]
pub struct StyleParam(pub Option<StyleVariant>);

impl StyleParam {
    /// Get the style or use a default
    pub fn or_default(self, default: StyleVariant) -> StyleVariant {
        self.0.unwrap_or(default)
    }
}

impl<S> FromRequestParts<S> for StyleParam
where
    S: Send + Sync,
{
    type Rejection = ParamRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let query = location_query(parts, state).await?;
        match query.style {
            Some(style) => style
                .parse::<StyleVariant>()
                .map(|s| StyleParam(Some(s)))
                .map_err(|e| ParamRejection(e.to_string())),
            None => Ok(StyleParam(None)),
        }
    }
}

/// Rejection type for query parameter extraction failures
#[derive(Debug)]
pub struct ParamRejection(pub String);

impl IntoResponse for ParamRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::with_code(self.0, "INVALID_PARAMETER")),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn create_test_parts(uri: &str) -> Parts {
        let (parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn test_coordinates_from_query() {
        let mut parts = create_test_parts("/weather?lat=19.07&lon=72.87");
        let CoordinatesParam(coords) = CoordinatesParam::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(coords, Some(Coordinates { lat: 19.07, lon: 72.87 }));
    }

    #[tokio::test]
    async fn test_missing_coordinates_use_default_location() {
        let mut parts = create_test_parts("/weather");
        let param = CoordinatesParam::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        let coords = param.or_default(&DefaultLocation::default());
        assert_eq!(coords.lat, 28.6139);
        assert_eq!(coords.lon, 77.2090);
    }

    #[tokio::test]
    async fn test_half_coordinate_pair_is_rejected() {
        let mut parts = create_test_parts("/weather?lat=10");
        let err = CoordinatesParam::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(err.0.contains("together"));
    }

    #[tokio::test]
    async fn test_out_of_range_latitude_is_rejected() {
        let mut parts = create_test_parts("/weather?lat=91&lon=0");
        assert!(CoordinatesParam::from_request_parts(&mut parts, &())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_style_param() {
        let mut parts = create_test_parts("/forecast?style=Indian");
        let StyleParam(style) = StyleParam::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(style, Some(StyleVariant::Regional));

        let mut parts = create_test_parts("/forecast");
        let param = StyleParam::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(param.or_default(StyleVariant::Global), StyleVariant::Global);

        let mut parts = create_test_parts("/forecast?style=pirate");
        assert!(StyleParam::from_request_parts(&mut parts, &()).await.is_err());
    }

    #[test]
    fn test_rejection_is_bad_request() {
        let response = ParamRejection("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
