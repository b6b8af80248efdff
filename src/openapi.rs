use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::credentials::models::{ActiveProfileRequest, ApiKeysRequest, ProfileUpsertRequest, ProfileView};
use crate::error::ErrorResponse;
use crate::forecast::models::{DailyForecastResponse, DailySummary, ForecastResponse};
use crate::roast::StyleVariant;
use crate::session::handlers::StyleRequest;
use crate::session::{ForecastState, SessionView, WeatherState};
use crate::weather::handlers::HealthResponse;
use crate::weather::models::{WeatherReport, WeatherResponse};

/// OpenAPI documentation for the Sassy Skies API
///
/// Schema documentation only; handlers carry their routes in doc comments.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sassy Skies API",
        version = "1.0.0",
        description = "Current weather and a 7-day forecast from OpenWeatherMap, each served with a sarcastic roast written by Gemini or, when Gemini is unavailable, a local rule table.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    tags(
        (name = "weather", description = "Current conditions with a roast"),
        (name = "forecast", description = "Daily forecast summaries with roasts"),
        (name = "sessions", description = "Held weather/forecast state and style switching"),
        (name = "profiles", description = "User profiles and vendor API keys")
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            StyleVariant,
            WeatherResponse,
            WeatherReport,
            ForecastResponse,
            DailySummary,
            DailyForecastResponse,
            WeatherState,
            ForecastState,
            SessionView,
            StyleRequest,
            ProfileView,
            ProfileUpsertRequest,
            ApiKeysRequest,
            ActiveProfileRequest,
        )
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
