use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity record keyed by an opaque user id.
///
/// Local copies are advisory; the identity backend owns the authoritative record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub is_verified: bool,
    /// Milliseconds since the epoch
    pub created_at: i64,
    pub updated_at: i64,
    pub last_login: i64,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub weather_api_key: String,
    #[serde(default)]
    pub gemini_api_key: String,
}

impl UserProfile {
    /// Minimal profile built locally, e.g. when the remote record can't be read
    pub fn minimal(uid: impl Into<String>, email: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            uid: uid.into(),
            email: email.into(),
            display_name: String::new(),
            is_verified: false,
            created_at: now,
            updated_at: now,
            last_login: now,
            profile_image_url: String::new(),
            weather_api_key: String::new(),
            gemini_api_key: String::new(),
        }
    }

    pub fn has_all_api_keys(&self) -> bool {
        !self.weather_api_key.trim().is_empty() && !self.gemini_api_key.trim().is_empty()
    }

    pub fn masked_weather_api_key(&self) -> String {
        mask_key(&self.weather_api_key)
    }

    pub fn masked_gemini_api_key(&self) -> String {
        mask_key(&self.gemini_api_key)
    }
}

/// First 8 and last 4 characters visible, everything between starred.
/// Keys too short to keep anything hidden are starred entirely.
pub fn mask_key(key: &str) -> String {
    if key.trim().is_empty() {
        return "Not set".to_string();
    }

    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 12), tail)
}

/// What the API hands out: keys are never returned in clear
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileView {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub is_verified: bool,
    pub profile_image_url: String,
    pub weather_api_key: String,
    pub gemini_api_key: String,
    pub has_all_api_keys: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_login: i64,
}

impl From<&UserProfile> for ProfileView {
    fn from(p: &UserProfile) -> Self {
        Self {
            uid: p.uid.clone(),
            email: p.email.clone(),
            display_name: p.display_name.clone(),
            is_verified: p.is_verified,
            profile_image_url: p.profile_image_url.clone(),
            weather_api_key: p.masked_weather_api_key(),
            gemini_api_key: p.masked_gemini_api_key(),
            has_all_api_keys: p.has_all_api_keys(),
            created_at: p.created_at,
            updated_at: p.updated_at,
            last_login: p.last_login,
        }
    }
}

/// Request to create or update profile details
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProfileUpsertRequest {
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub profile_image_url: String,
}

/// Request to replace both vendor keys
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApiKeysRequest {
    #[serde(default)]
    pub weather_api_key: String,
    #[serde(default)]
    pub gemini_api_key: String,
}

/// Request to pick whose keys outbound calls use
#[derive(Debug, Deserialize, ToSchema)]
pub struct ActiveProfileRequest {
    pub uid: String,
}
