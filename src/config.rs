use config::{Case, Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::roast::StyleVariant;

/// Keys baked in at build time, used whenever the active profile has none.
const BUILT_IN_WEATHER_API_KEY: Option<&str> = option_env!("SASSY_SKIES_FALLBACK_WEATHER_KEY");
const BUILT_IN_GEMINI_API_KEY: Option<&str> = option_env!("SASSY_SKIES_FALLBACK_GEMINI_KEY");

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Location used when a request carries no coordinates
    #[serde(default)]
    pub default_location: DefaultLocation,

    /// OpenWeatherMap key used when the active profile has none
    #[serde(default = "default_fallback_weather_api_key")]
    pub fallback_weather_api_key: String,

    /// Gemini key used when the active profile has none
    #[serde(default = "default_fallback_gemini_api_key")]
    pub fallback_gemini_api_key: String,

    /// OpenWeatherMap 2.5 base URL
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,

    /// Gemini REST base URL
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Gemini model name
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Maximum Gemini calls per UTC day before falling back to local roasts
    #[serde(default = "default_gemini_daily_limit")]
    pub gemini_daily_limit: u32,

    /// Seconds to wait for the active profile before using the fallback keys
    #[serde(default = "default_profile_lookup_timeout_secs")]
    pub profile_lookup_timeout_secs: u64,

    /// Sessions untouched for this long are dropped
    #[serde(default = "default_session_idle_ttl_secs")]
    pub session_idle_ttl_secs: u64,

    /// API key for profile endpoints (optional - if not set, no auth required)
    #[serde(default)]
    pub profile_api_key: Option<String>,

    /// Roast style used when a request doesn't pick one
    #[serde(default)]
    pub default_style: StyleVariant,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DefaultLocation {
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    #[serde(default = "default_longitude")]
    pub longitude: f64,

    #[serde(default = "default_location_name")]
    pub name: String,
}

impl Default for DefaultLocation {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            name: default_location_name(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

// New Delhi
fn default_latitude() -> f64 {
    28.6139
}

fn default_longitude() -> f64 {
    77.2090
}

fn default_location_name() -> String {
    "New Delhi".to_string()
}

fn default_fallback_weather_api_key() -> String {
    BUILT_IN_WEATHER_API_KEY.unwrap_or_default().to_string()
}

fn default_fallback_gemini_api_key() -> String {
    BUILT_IN_GEMINI_API_KEY.unwrap_or_default().to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_daily_limit() -> u32 {
    1000
}

fn default_profile_lookup_timeout_secs() -> u64 {
    8
}

fn default_session_idle_ttl_secs() -> u64 {
    60 * 60
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            .set_default("host", default_host())?
            .set_default("port", default_port())?
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config.local").required(false))
            // SASSY_SKIES_GEMINI_DAILY_LIMIT, SASSY_SKIES_DEFAULT_LOCATION__LATITUDE, ...
            .add_source(
                Environment::with_prefix("SASSY_SKIES")
                    .prefix_separator("_")
                    .separator("__")
                    .convert_case(Case::Snake)
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_source() {
        let config: AppConfig = Config::builder()
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("empty config should deserialize");

        assert_eq!(config.port, 3000);
        assert_eq!(config.gemini_model, "gemini-1.5-flash");
        assert_eq!(config.gemini_daily_limit, 1000);
        assert_eq!(config.profile_lookup_timeout_secs, 8);
        assert_eq!(config.default_style, StyleVariant::Global);
        assert_eq!(config.default_location.name, "New Delhi");
        assert!(config.profile_api_key.is_none());
    }

    #[test]
    fn test_overrides_nested_location() {
        let config: AppConfig = Config::builder()
            .set_override("default_location.latitude", 51.5)
            .and_then(|b| b.set_override("default_location.longitude", -0.12))
            .and_then(|b| b.set_override("default_style", "regional"))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .expect("overrides should deserialize");

        assert_eq!(config.default_location.latitude, 51.5);
        assert_eq!(config.default_location.longitude, -0.12);
        assert_eq!(config.default_style, StyleVariant::Regional);
    }
}
