//! Per-client weather and forecast state.
//!
//! A session holds the last snapshot, the last daily forecast and the roast
//! style, each published through a `watch` channel. Only the session writes
//! to its channels and every operation runs under the session's lock, on a
//! task of its own, so observers always see whole states in order. Changing the style rewrites
//! the roasts for what is already held; nothing is fetched again.

pub mod handlers;
mod registry;
mod state;

pub use registry::{start_session_cleanup_task, SessionRegistry};
pub use state::{ForecastState, SessionView, WeatherState};

use async_trait::async_trait;
use axum::http::StatusCode;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, Mutex};

use crate::error::HttpError;
use crate::extractors::Coordinates;
use crate::forecast::{DailyForecast, ForecastError, ForecastService};
use crate::impl_into_response;
use crate::roast::{RoastService, StyleVariant};
use crate::weather::{WeatherError, WeatherResponse, WeatherService};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Nothing to retry: no {0} has been requested in this session")]
    NothingToRetry(&'static str),
}

impl HttpError for SessionError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::NothingToRetry(_) => StatusCode::CONFLICT,
        }
    }

    fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::NotFound(_) => Some("SESSION_NOT_FOUND"),
            Self::NothingToRetry(_) => Some("NOTHING_TO_RETRY"),
        }
    }
}

impl_into_response!(SessionError);

/// Where sessions get current conditions from
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, coords: Coordinates) -> Result<WeatherResponse, WeatherError>;
}

#[async_trait]
impl WeatherSource for WeatherService {
    async fn current(&self, coords: Coordinates) -> Result<WeatherResponse, WeatherError> {
        self.get_current_weather(coords.lat, coords.lon).await
    }
}

/// Where sessions get daily forecasts from
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn daily(&self, coords: Coordinates) -> Result<DailyForecast, ForecastError>;
}

#[async_trait]
impl ForecastSource for ForecastService {
    async fn daily(&self, coords: Coordinates) -> Result<DailyForecast, ForecastError> {
        self.get_daily(coords.lat, coords.lon).await
    }
}

/// Coordinates of the last request of each kind, for retries
#[derive(Debug, Default)]
struct LastRequests {
    weather: Option<Coordinates>,
    forecast: Option<Coordinates>,
}

pub struct Session {
    id: String,
    weather: watch::Sender<WeatherState>,
    forecast: watch::Sender<ForecastState>,
    // Held for the whole of every operation; the single-writer guarantee
    last: Mutex<LastRequests>,
    weather_source: Arc<dyn WeatherSource>,
    forecast_source: Arc<dyn ForecastSource>,
    roaster: Arc<RoastService>,
}

impl Session {
    pub fn new(
        id: &str,
        style: StyleVariant,
        weather_source: Arc<dyn WeatherSource>,
        forecast_source: Arc<dyn ForecastSource>,
        roaster: Arc<RoastService>,
    ) -> Self {
        let (weather, _) = watch::channel(WeatherState::new(style));
        let (forecast, _) = watch::channel(ForecastState::new(style));
        Self {
            id: id.to_string(),
            weather,
            forecast,
            last: Mutex::new(LastRequests::default()),
            weather_source,
            forecast_source,
            roaster,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn style(&self) -> StyleVariant {
        self.weather.borrow().style
    }

    pub fn weather_state(&self) -> WeatherState {
        self.weather.borrow().clone()
    }

    pub fn forecast_state(&self) -> ForecastState {
        self.forecast.borrow().clone()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id.clone(),
            style: self.style(),
            weather: self.weather_state(),
            forecast: self.forecast_state(),
        }
    }

    pub fn subscribe_weather(&self) -> watch::Receiver<WeatherState> {
        self.weather.subscribe()
    }

    pub fn subscribe_forecast(&self) -> watch::Receiver<ForecastState> {
        self.forecast.subscribe()
    }

    /// Run `op` on a task of its own. The task keeps going if the caller is
    /// dropped, so a published placeholder is always followed by its roast.
    async fn run_owned<T, Fut>(self: &Arc<Self>, op: impl FnOnce(Arc<Self>) -> Fut) -> Option<T>
    where
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        match tokio::spawn(op(Arc::clone(self))).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(session = %self.id, error = %e, "Session task failed");
                None
            }
        }
    }

    /// Fetch current conditions, publish them with the placeholder, then
    /// publish again once the roast is ready.
    pub async fn load_weather(self: &Arc<Self>, coords: Coordinates) -> WeatherState {
        self.run_owned(move |session| async move {
            let mut last = session.last.lock().await;
            last.weather = Some(coords);
            session.fetch_weather(coords).await
        })
        .await
        .unwrap_or_else(|| self.weather_state())
    }

    /// Fetch and aggregate the forecast, publish the days, then publish the
    /// whole list again once every day has its roast.
    pub async fn load_forecast(self: &Arc<Self>, coords: Coordinates) -> ForecastState {
        self.run_owned(move |session| async move {
            let mut last = session.last.lock().await;
            last.forecast = Some(coords);
            session.fetch_forecast(coords).await
        })
        .await
        .unwrap_or_else(|| self.forecast_state())
    }

    pub async fn retry_weather(self: &Arc<Self>) -> Result<WeatherState, SessionError> {
        self.run_owned(|session| async move {
            let last = session.last.lock().await;
            let Some(coords) = last.weather else {
                return Err(SessionError::NothingToRetry("weather"));
            };
            tracing::debug!(session = %session.id, "Retrying weather");
            Ok(session.fetch_weather(coords).await)
        })
        .await
        .unwrap_or_else(|| Ok(self.weather_state()))
    }

    pub async fn retry_forecast(self: &Arc<Self>) -> Result<ForecastState, SessionError> {
        self.run_owned(|session| async move {
            let last = session.last.lock().await;
            let Some(coords) = last.forecast else {
                return Err(SessionError::NothingToRetry("forecast"));
            };
            tracing::debug!(session = %session.id, "Retrying forecast");
            Ok(session.fetch_forecast(coords).await)
        })
        .await
        .unwrap_or_else(|| Ok(self.forecast_state()))
    }

    /// Switch the roast style and rewrite every held roast in it.
    ///
    /// Works on the snapshot and days already in the session.
    pub async fn set_style(self: &Arc<Self>, style: StyleVariant) -> SessionView {
        self.run_owned(move |session| async move { session.restyle(style).await })
            .await
            .unwrap_or_else(|| self.view())
    }

    async fn restyle(&self, style: StyleVariant) -> SessionView {
        let _guard = self.last.lock().await;
        if style == self.style() {
            return self.view();
        }

        tracing::info!(session = %self.id, style = %style, "Style changed, regenerating roasts");

        let weather = self.weather.borrow().clone();
        let forecast = self.forecast.borrow().clone();

        // Placeholders first so nobody reads an old-style roast under the new style
        self.weather.send_modify(|s| {
            s.style = style;
            s.sarcastic_message = if s.weather.is_some() {
                style.placeholder().to_string()
            } else if s.error.is_some() {
                style.fetch_failed_notice().to_string()
            } else {
                String::new()
            };
        });
        self.forecast.send_modify(|s| {
            s.style = style;
            for day in &mut s.daily {
                day.sarcastic_message.clear();
            }
        });

        let regenerate_weather = async {
            if let Some(snapshot) = &weather.weather {
                let message = self.roaster.roast_weather(style, snapshot).await;
                self.weather.send_modify(|s| s.sarcastic_message = message);
            }
        };
        let regenerate_forecast = async {
            if !forecast.daily.is_empty() {
                let days = self.roaster.roast_days(style, forecast.daily).await;
                self.forecast.send_modify(|s| s.daily = days);
            }
        };
        tokio::join!(regenerate_weather, regenerate_forecast);

        self.view()
    }

    pub async fn clear_error(&self) -> SessionView {
        let _guard = self.last.lock().await;
        self.weather.send_if_modified(|s| s.error.take().is_some());
        self.forecast.send_if_modified(|s| s.error.take().is_some());
        self.view()
    }

    async fn fetch_weather(&self, coords: Coordinates) -> WeatherState {
        self.weather.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        let style = self.style();
        match self.weather_source.current(coords).await {
            Ok(snapshot) => {
                self.weather.send_replace(WeatherState {
                    is_loading: false,
                    weather: Some(snapshot.clone()),
                    sarcastic_message: style.placeholder().to_string(),
                    error: None,
                    style,
                });

                let message = self.roaster.roast_weather(style, &snapshot).await;
                self.weather.send_modify(|s| s.sarcastic_message = message);
            }
            Err(e) => {
                tracing::warn!(session = %self.id, error = %e, "Weather fetch failed");
                self.weather.send_modify(|s| {
                    s.is_loading = false;
                    s.error = Some(e.to_string());
                    s.sarcastic_message = style.fetch_failed_notice().to_string();
                });
            }
        }

        self.weather_state()
    }

    async fn fetch_forecast(&self, coords: Coordinates) -> ForecastState {
        self.forecast.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        let style = self.style();
        match self.forecast_source.daily(coords).await {
            Ok(forecast) => {
                self.forecast.send_replace(ForecastState {
                    is_loading: false,
                    daily: forecast.days.clone(),
                    error: None,
                    style,
                });

                let days = self.roaster.roast_days(style, forecast.days).await;
                self.forecast.send_modify(|s| s.daily = days);
            }
            Err(e) => {
                tracing::warn!(session = %self.id, error = %e, "Forecast fetch failed");
                self.forecast.send_modify(|s| {
                    s.is_loading = false;
                    s.error = Some(e.to_string());
                });
            }
        }

        self.forecast_state()
    }
}
