//! Sarcastic commentary for weather conditions.
//!
//! A roast is asked of the language model first; anything short of a usable
//! reply (network failure, vendor error, empty text, exhausted daily budget)
//! drops to the local rule table. Callers always get a non-empty string.

mod fallback;
mod gemini;
mod prompt;
mod style;

pub use fallback::{fallback_message, FallbackInput, RuleSet};
pub use gemini::GeminiClient;
pub use prompt::build_prompt;
pub use style::{StyleVariant, UnknownStyle};

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;

use crate::api_budget::ApiCallBudget;
use crate::forecast::{round_to_int, DailySummary};
use crate::weather::models::WeatherResponse;

/// Replies longer than this are cut to `TRUNCATE_AT` chars plus an ellipsis
const MAX_ROAST_CHARS: usize = 200;
const TRUNCATE_AT: usize = 197;

#[derive(Error, Debug)]
pub enum RoastError {
    #[error("Generation request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Generation API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Generation returned no text")]
    EmptyResponse,

    #[error("No API key available for generation")]
    MissingKey,

    #[error("Daily generation budget exhausted")]
    BudgetExhausted,
}

/// Single-turn text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Key for the next call, looked up fresh each time. Empty when none is configured.
    async fn api_key(&self) -> String;

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, RoastError>;

    fn model_name(&self) -> &str;
}

/// Weather fields a roast is written about
#[derive(Debug, Clone)]
pub struct RoastRequest {
    pub description: String,
    pub temperature: i32,
    pub humidity: u32,
    pub feels_like: i32,
    pub location: String,
}

impl RoastRequest {
    pub fn for_weather(weather: &WeatherResponse) -> Self {
        Self {
            description: weather.description().to_string(),
            temperature: round_to_int(weather.main.temp),
            humidity: weather.main.humidity,
            feels_like: round_to_int(weather.main.feels_like),
            location: weather.name.clone(),
        }
    }

    /// Forecast days have no feels-like or place; the day's high stands in
    pub fn for_day(day: &DailySummary) -> Self {
        Self {
            description: day.description.clone(),
            temperature: day.max_temp,
            humidity: day.humidity,
            feels_like: day.max_temp,
            location: String::new(),
        }
    }
}

/// Trim the model's reply and bound its length. `None` if nothing usable is left.
fn finalize(reply: &str) -> Option<String> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.chars().count() > MAX_ROAST_CHARS {
        let cut: String = trimmed.chars().take(TRUNCATE_AT).collect();
        Some(format!("{}...", cut))
    } else {
        Some(trimmed.to_string())
    }
}

pub struct RoastService {
    generator: Arc<dyn TextGenerator>,
    budget: Arc<ApiCallBudget>,
}

impl RoastService {
    pub fn new(generator: Arc<dyn TextGenerator>, budget: Arc<ApiCallBudget>) -> Self {
        Self { generator, budget }
    }

    async fn remote(&self, style: StyleVariant, request: &RoastRequest) -> Result<String, RoastError> {
        // Only calls that actually go out count against the budget
        let api_key = self.generator.api_key().await;
        if api_key.is_empty() {
            return Err(RoastError::MissingKey);
        }
        if !self.budget.record_call() {
            return Err(RoastError::BudgetExhausted);
        }

        let prompt = build_prompt(style, request);
        let reply = self.generator.generate(&api_key, &prompt).await?;
        finalize(&reply).ok_or(RoastError::EmptyResponse)
    }

    /// Roast for the given conditions. Never fails and never returns an empty string.
    pub async fn roast(
        &self,
        style: StyleVariant,
        request: &RoastRequest,
        rules: RuleSet,
    ) -> String {
        match self.remote(style, request).await {
            Ok(message) => {
                metrics::counter!("sassy_skies_roast_total", "style" => style.as_str(), "source" => "remote")
                    .increment(1);
                tracing::debug!(style = %style, model = %self.generator.model_name(), "Roast generated");
                message
            }
            Err(e) => {
                metrics::counter!("sassy_skies_roast_total", "style" => style.as_str(), "source" => "fallback")
                    .increment(1);
                tracing::warn!(style = %style, error = %e, "Remote roast unavailable, using fallback");

                let input = FallbackInput {
                    description: &request.description,
                    temperature: request.temperature,
                    humidity: request.humidity,
                };
                fallback_message(style, rules, &input).to_string()
            }
        }
    }

    pub async fn roast_weather(&self, style: StyleVariant, weather: &WeatherResponse) -> String {
        self.roast(style, &RoastRequest::for_weather(weather), RuleSet::Current)
            .await
    }

    pub async fn roast_day(&self, style: StyleVariant, day: &DailySummary) -> String {
        self.roast(
            style,
            &RoastRequest::for_day(day),
            RuleSet::Day {
                precipitation_probability: day.precipitation_probability,
            },
        )
        .await
    }

    /// Roast every day at once and hand the list back with messages attached
    pub async fn roast_days(&self, style: StyleVariant, mut days: Vec<DailySummary>) -> Vec<DailySummary> {
        let messages = join_all(days.iter().map(|day| self.roast_day(style, day))).await;
        for (day, message) in days.iter_mut().zip(messages) {
            day.sarcastic_message = message;
        }
        days
    }
}
