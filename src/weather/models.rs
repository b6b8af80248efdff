use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::roast::StyleVariant;

// ============================================================================
// OpenWeatherMap 2.5 building blocks
// Shared by the current-conditions and the 5 day / 3 hour forecast payloads.
// Field names follow the vendor JSON so the payload round-trips unchanged.
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherCondition {
    pub id: u32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Main {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: u32,
    pub humidity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sea_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grnd_level: Option<u32>,
    /// Only present on forecast entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_kf: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Wind {
    pub speed: f64,
    pub deg: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Clouds {
    pub all: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Sys {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "type")]
    pub kind: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

/// Precipitation volume over the last hour / three hours, in mm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Precipitation {
    #[serde(rename = "1h", default, skip_serializing_if = "Option::is_none")]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h", default, skip_serializing_if = "Option::is_none")]
    pub three_hour: Option<f64>,
}

// ============================================================================
// GET /data/2.5/weather
// ============================================================================

/// Current conditions at a point in time. Never mutated; a new fetch replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherResponse {
    pub coord: Coord,
    pub weather: Vec<WeatherCondition>,
    #[serde(default)]
    pub base: String,
    pub main: Main,
    #[serde(default)]
    pub visibility: u32,
    pub wind: Wind,
    pub clouds: Clouds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<Precipitation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snow: Option<Precipitation>,
    pub dt: i64,
    pub sys: Sys,
    /// Shift in seconds from UTC
    pub timezone: i32,
    pub id: u64,
    pub name: String,
    pub cod: u16,
}

impl WeatherResponse {
    /// First reported condition, if the vendor sent any
    pub fn condition(&self) -> Option<&WeatherCondition> {
        self.weather.first()
    }

    pub fn description(&self) -> &str {
        self.condition().map(|w| w.description.as_str()).unwrap_or("")
    }
}

// ============================================================================
// What we return to clients
// ============================================================================

/// Current conditions plus the roast written about them
#[derive(Debug, Serialize, ToSchema)]
pub struct WeatherReport {
    pub weather: WeatherResponse,
    pub sarcastic_message: String,
    pub style: StyleVariant,
}
