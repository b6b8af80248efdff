pub mod aggregate;
pub mod handlers;
pub mod models;
pub mod service;

pub use aggregate::{aggregate_daily, round_to_int};
pub use models::{DailySummary, ForecastResponse};
pub use service::{DailyForecast, ForecastError, ForecastService};
