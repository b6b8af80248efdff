use serde::Serialize;
use utoipa::ToSchema;

use crate::forecast::DailySummary;
use crate::roast::StyleVariant;
use crate::weather::WeatherResponse;

/// What a client shows for current conditions.
///
/// `sarcastic_message` holds the style's placeholder while the roast is
/// being generated, and the fetch-failed notice when `error` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct WeatherState {
    pub is_loading: bool,
    pub weather: Option<WeatherResponse>,
    pub sarcastic_message: String,
    pub error: Option<String>,
    pub style: StyleVariant,
}

impl WeatherState {
    pub fn new(style: StyleVariant) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }
}

/// What a client shows for the daily forecast. Days may be listed before
/// their messages exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ForecastState {
    pub is_loading: bool,
    pub daily: Vec<DailySummary>,
    pub error: Option<String>,
    pub style: StyleVariant,
}

impl ForecastState {
    pub fn new(style: StyleVariant) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionView {
    pub id: String,
    pub style: StyleVariant,
    pub weather: WeatherState,
    pub forecast: ForecastState,
}
