pub mod handlers;
pub mod models;
pub mod service;

pub use models::WeatherResponse;
pub use service::{WeatherError, WeatherService};
