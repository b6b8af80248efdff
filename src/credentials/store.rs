use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{watch, RwLock};

use super::models::UserProfile;
use super::{CredentialStore, ProfileError};

/// In-memory profile store.
///
/// Every profile lives behind a `watch` channel so callers can subscribe to
/// changes instead of polling; updates replace the whole record.
#[derive(Default)]
pub struct ProfileStore {
    profiles: RwLock<HashMap<String, watch::Sender<UserProfile>>>,
    active: RwLock<Option<String>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a profile or update its details. Keys and creation time survive updates.
    pub async fn upsert(
        &self,
        uid: &str,
        email: &str,
        display_name: &str,
        is_verified: bool,
        profile_image_url: &str,
    ) -> UserProfile {
        let mut profiles = self.profiles.write().await;
        let now = chrono::Utc::now().timestamp_millis();

        match profiles.get(uid) {
            Some(sender) => {
                sender.send_modify(|p| {
                    p.email = email.to_string();
                    p.display_name = display_name.to_string();
                    p.is_verified = is_verified;
                    p.profile_image_url = profile_image_url.to_string();
                    p.updated_at = now;
                });
                sender.borrow().clone()
            }
            None => {
                let mut profile = UserProfile::minimal(uid, email);
                profile.display_name = display_name.to_string();
                profile.is_verified = is_verified;
                profile.profile_image_url = profile_image_url.to_string();

                let (sender, _) = watch::channel(profile.clone());
                profiles.insert(uid.to_string(), sender);
                tracing::info!(uid = %uid, "Profile created");
                profile
            }
        }
    }

    pub async fn get(&self, uid: &str) -> Option<UserProfile> {
        let profiles = self.profiles.read().await;
        profiles.get(uid).map(|s| s.borrow().clone())
    }

    /// Replace both vendor keys. Blank strings clear a key.
    pub async fn update_api_keys(
        &self,
        uid: &str,
        weather_api_key: &str,
        gemini_api_key: &str,
    ) -> Result<UserProfile, ProfileError> {
        self.modify(uid, |p| {
            p.weather_api_key = weather_api_key.trim().to_string();
            p.gemini_api_key = gemini_api_key.trim().to_string();
        })
        .await
    }

    pub async fn record_login(&self, uid: &str) -> Result<UserProfile, ProfileError> {
        let now = chrono::Utc::now().timestamp_millis();
        self.modify(uid, |p| p.last_login = now).await
    }

    async fn modify(
        &self,
        uid: &str,
        f: impl FnOnce(&mut UserProfile),
    ) -> Result<UserProfile, ProfileError> {
        let profiles = self.profiles.read().await;
        let sender = profiles
            .get(uid)
            .ok_or_else(|| ProfileError::NotFound(uid.to_string()))?;

        let now = chrono::Utc::now().timestamp_millis();
        sender.send_modify(|p| {
            f(p);
            p.updated_at = now;
        });

        let profile = sender.borrow().clone();
        Ok(profile)
    }

    /// Live view of a profile; the receiver sees every later update
    pub async fn subscribe(&self, uid: &str) -> Result<watch::Receiver<UserProfile>, ProfileError> {
        let profiles = self.profiles.read().await;
        profiles
            .get(uid)
            .map(|s| s.subscribe())
            .ok_or_else(|| ProfileError::NotFound(uid.to_string()))
    }

    /// Pick whose keys outbound vendor calls use
    pub async fn set_active(&self, uid: &str) -> Result<(), ProfileError> {
        if !self.profiles.read().await.contains_key(uid) {
            return Err(ProfileError::NotFound(uid.to_string()));
        }
        *self.active.write().await = Some(uid.to_string());
        self.record_login(uid).await?;
        tracing::info!(uid = %uid, "Active profile changed");
        Ok(())
    }

    pub async fn clear_active(&self) {
        *self.active.write().await = None;
    }

    pub async fn active_uid(&self) -> Option<String> {
        self.active.read().await.clone()
    }

    pub async fn remove(&self, uid: &str) -> bool {
        let removed = self.profiles.write().await.remove(uid).is_some();
        if removed {
            let mut active = self.active.write().await;
            if active.as_deref() == Some(uid) {
                *active = None;
            }
        }
        removed
    }
}

#[async_trait]
impl CredentialStore for ProfileStore {
    async fn active_profile(&self) -> Result<Option<UserProfile>, ProfileError> {
        let Some(uid) = self.active_uid().await else {
            return Ok(None);
        };
        // Removed between the two reads
        self.get(&uid)
            .await
            .map(Some)
            .ok_or_else(|| ProfileError::Unavailable(format!("active profile {} is gone", uid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_user() -> ProfileStore {
        let store = ProfileStore::new();
        store.upsert("u1", "rahul@example.com", "Rahul", true, "").await;
        store
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let store = store_with_user().await;
        store.update_api_keys("u1", "wkey", "gkey").await.unwrap();

        let updated = store
            .upsert("u1", "rahul@example.com", "Rahul K", true, "https://img")
            .await;

        assert_eq!(updated.display_name, "Rahul K");
        assert_eq!(updated.profile_image_url, "https://img");
        // Keys survive detail updates
        assert_eq!(updated.weather_api_key, "wkey");
        assert_eq!(store.get("u1").await.unwrap().created_at, updated.created_at);
    }

    #[tokio::test]
    async fn test_update_keys_unknown_user() {
        let store = ProfileStore::new();
        let err = store.update_api_keys("ghost", "w", "g").await.unwrap_err();
        assert!(matches!(err, ProfileError::NotFound(uid) if uid == "ghost"));
    }

    #[tokio::test]
    async fn test_update_keys_trims() {
        let store = store_with_user().await;
        let profile = store.update_api_keys("u1", "  wkey ", "").await.unwrap();
        assert_eq!(profile.weather_api_key, "wkey");
        assert_eq!(profile.gemini_api_key, "");
    }

    #[tokio::test]
    async fn test_subscriber_sees_key_change() {
        let store = store_with_user().await;
        let mut rx = store.subscribe("u1").await.unwrap();

        store.update_api_keys("u1", "new-weather", "new-gemini").await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().weather_api_key, "new-weather");
    }

    #[tokio::test]
    async fn test_active_profile() {
        let store = store_with_user().await;
        assert!(store.active_profile().await.unwrap().is_none());

        store.set_active("u1").await.unwrap();
        let active = store.active_profile().await.unwrap().unwrap();
        assert_eq!(active.uid, "u1");

        assert!(store.set_active("nobody").await.is_err());
        assert_eq!(store.active_uid().await.as_deref(), Some("u1"));

        store.clear_active().await;
        assert!(store.active_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_clears_active() {
        let store = store_with_user().await;
        store.set_active("u1").await.unwrap();

        assert!(store.remove("u1").await);
        assert!(!store.remove("u1").await);
        assert!(store.active_uid().await.is_none());
    }
}
