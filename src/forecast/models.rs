use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::roast::StyleVariant;
use crate::weather::models::{Clouds, Coord, Main, Precipitation, WeatherCondition, Wind};

// ============================================================================
// GET /data/2.5/forecast (5 day / 3 hour)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastResponse {
    pub cod: String,
    #[serde(default)]
    pub message: i64,
    pub cnt: u32,
    pub list: Vec<ForecastItem>,
    pub city: City,
}

/// One three-hour forecast sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastItem {
    pub dt: i64,
    pub main: Main,
    pub weather: Vec<WeatherCondition>,
    pub clouds: Clouds,
    pub wind: Wind,
    #[serde(default)]
    pub visibility: u32,
    /// Probability of precipitation, 0..=1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pop: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<Precipitation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snow: Option<Precipitation>,
    pub sys: ForecastSys,
    pub dt_txt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastSys {
    /// Part of day: "d" or "n"
    pub pod: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct City {
    pub id: u64,
    pub name: String,
    pub coord: Coord,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
    /// Shift in seconds from UTC
    pub timezone: i32,
    pub sunrise: i64,
    pub sunset: i64,
}

impl City {
    /// Fixed offset of the city's local time; UTC if the vendor sent nonsense
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.timezone).unwrap_or(Utc.fix())
    }
}

// ============================================================================
// What we return to clients
// ============================================================================

/// One calendar day reduced from its three-hour samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailySummary {
    /// e.g. "Jul 14"
    pub date: String,
    /// e.g. "Monday"
    pub day_of_week: String,
    pub description: String,
    pub condition: String,
    pub icon: String,
    pub max_temp: i32,
    pub min_temp: i32,
    pub humidity: u32,
    pub wind_speed: f64,
    /// 0..=100
    pub precipitation_probability: u8,
    /// Empty until the roast for this day has been generated
    #[serde(default)]
    pub sarcastic_message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyForecastResponse {
    pub city: String,
    pub country: String,
    pub style: StyleVariant,
    pub days: Vec<DailySummary>,
}
