use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{ForecastSource, Session, WeatherSource};
use crate::roast::{RoastService, StyleVariant};

struct SessionEntry {
    session: Arc<Session>,
    last_seen: Instant,
}

/// Sessions keyed by a client-chosen id, dropped after sitting idle
pub struct SessionRegistry {
    sessions: DashMap<String, SessionEntry>,
    idle_ttl: Duration,
    default_style: StyleVariant,
    weather_source: Arc<dyn WeatherSource>,
    forecast_source: Arc<dyn ForecastSource>,
    roaster: Arc<RoastService>,
}

impl SessionRegistry {
    pub fn new(
        idle_ttl: Duration,
        default_style: StyleVariant,
        weather_source: Arc<dyn WeatherSource>,
        forecast_source: Arc<dyn ForecastSource>,
        roaster: Arc<RoastService>,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_ttl,
            default_style,
            weather_source,
            forecast_source,
            roaster,
        }
    }

    /// Existing session, if it hasn't expired
    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        let mut entry = self.sessions.get_mut(id)?;
        if entry.last_seen.elapsed() < self.idle_ttl {
            entry.last_seen = Instant::now();
            Some(Arc::clone(&entry.session))
        } else {
            drop(entry);
            self.sessions.remove(id);
            None
        }
    }

    pub fn get_or_create(&self, id: &str) -> Arc<Session> {
        if let Some(session) = self.get(id) {
            return session;
        }

        let entry = self.sessions.entry(id.to_string()).or_insert_with(|| {
            tracing::debug!(session = %id, "Session created");
            SessionEntry {
                session: Arc::new(Session::new(
                    id,
                    self.default_style,
                    Arc::clone(&self.weather_source),
                    Arc::clone(&self.forecast_source),
                    Arc::clone(&self.roaster),
                )),
                last_seen: Instant::now(),
            }
        });
        Arc::clone(&entry.session)
    }

    pub fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Drop sessions idle for longer than the TTL
    pub fn cleanup(&self) {
        let ttl = self.idle_ttl;
        self.sessions.retain(|_, entry| entry.last_seen.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}

/// Start a background task that drops idle sessions every few minutes
pub fn start_session_cleanup_task(registry: Arc<SessionRegistry>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5 * 60));
        loop {
            interval.tick().await;
            let before = registry.len();
            registry.cleanup();
            let after = registry.len();
            if before != after {
                tracing::debug!(
                    removed = before - after,
                    remaining = after,
                    "Idle session cleanup completed"
                );
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roast::testing::{roast_service, FakeGenerator};
    use crate::session::testing::{FakeForecastSource, FakeWeatherSource};

    fn create_test_registry(idle_ttl: Duration) -> SessionRegistry {
        SessionRegistry::new(
            idle_ttl,
            StyleVariant::Regional,
            Arc::new(FakeWeatherSource::new()),
            Arc::new(FakeForecastSource::new()),
            Arc::new(roast_service(Arc::new(FakeGenerator::replying("ok")))),
        )
    }

    #[test]
    fn test_get_or_create_returns_same_session() {
        let registry = create_test_registry(Duration::from_secs(60));
        let a = registry.get_or_create("phone-1");
        let b = registry.get_or_create("phone-1");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.id(), "phone-1");
        assert_eq!(a.style(), StyleVariant::Regional);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_session() {
        let registry = create_test_registry(Duration::from_secs(60));
        assert!(registry.get("nobody").is_none());
        assert!(!registry.remove("nobody"));
    }

    #[test]
    fn test_remove() {
        let registry = create_test_registry(Duration::from_secs(60));
        registry.get_or_create("phone-1");
        assert!(registry.remove("phone-1"));
        assert!(registry.get("phone-1").is_none());
    }

    #[test]
    fn test_idle_sessions_expire() {
        let registry = create_test_registry(Duration::from_millis(1));
        let first = registry.get_or_create("phone-1");
        registry.get_or_create("phone-2");
        std::thread::sleep(Duration::from_millis(10));

        assert!(registry.get("phone-1").is_none());
        registry.cleanup();
        assert_eq!(registry.len(), 0);

        let second = registry.get_or_create("phone-1");
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
