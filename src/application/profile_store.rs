// Vehicle profile store trait and the use cases built on it
use crate::domain::session::SessionContext;
use crate::domain::vehicle::{UserVehicle, VehicleProfile, filter_profiles};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait VehicleProfileStore: Send + Sync {
    async fn load_profile(&self, session: &SessionContext) -> anyhow::Result<Option<VehicleProfile>>;

    async fn save_profile(&self, session: &SessionContext, profile: &VehicleProfile) -> anyhow::Result<()>;

    /// Every user that has saved vehicle details.
    async fn list_profiles(&self, session: &SessionContext) -> anyhow::Result<Vec<UserVehicle>>;

    /// Create the user's record right after sign-up.
    async fn create_user(&self, session: &SessionContext, at: &str) -> anyhow::Result<()>;

    /// Stamp the login time and clear the previous logout time.
    async fn record_login(&self, session: &SessionContext, at: &str) -> anyhow::Result<()>;

    /// Stamp the user's record with the logout time.
    async fn record_logout(&self, session: &SessionContext, at: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn VehicleProfileStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn VehicleProfileStore>) -> Self {
        Self { store }
    }

    pub async fn profile(&self, session: &SessionContext) -> anyhow::Result<VehicleProfile> {
        Ok(self.store.load_profile(session).await?.unwrap_or_default())
    }

    /// Save the edited profile, stamped with the owner's email and the save time.
    pub async fn save(
        &self,
        session: &SessionContext,
        mut profile: VehicleProfile,
        now: chrono::DateTime<chrono::Utc>,
    ) -> anyhow::Result<VehicleProfile> {
        profile.user_email = session.email.clone();
        profile.last_updated = Some(now.to_rfc3339());
        self.store.save_profile(session, &profile).await?;
        tracing::info!("Saved vehicle profile for user {}", session.user_id);
        Ok(profile)
    }

    pub async fn search(&self, session: &SessionContext, search: &str) -> anyhow::Result<Vec<UserVehicle>> {
        let profiles = self.store.list_profiles(session).await?;
        Ok(filter_profiles(profiles, search))
    }

    pub async fn register(&self, session: &SessionContext, now: chrono::DateTime<chrono::Utc>) -> anyhow::Result<()> {
        self.store.create_user(session, &now.to_rfc3339()).await
    }

    /// Session bookkeeping never blocks the login itself.
    pub async fn record_login(&self, session: &SessionContext, now: chrono::DateTime<chrono::Utc>) {
        if let Err(e) = self.store.record_login(session, &now.to_rfc3339()).await {
            tracing::warn!("Failed to record login for user {}: {:#}", session.user_id, e);
        }
    }

    /// Session bookkeeping never blocks the logout itself.
    pub async fn record_logout(&self, session: &SessionContext, now: chrono::DateTime<chrono::Utc>) {
        if let Err(e) = self.store.record_logout(session, &now.to_rfc3339()).await {
            tracing::warn!("Failed to record logout for user {}: {:#}", session.user_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        profiles: Mutex<HashMap<String, VehicleProfile>>,
        logins: Mutex<Vec<String>>,
        logouts: Mutex<Vec<String>>,
        fail_logout: bool,
    }

    #[async_trait]
    impl VehicleProfileStore for MemoryStore {
        async fn load_profile(&self, session: &SessionContext) -> anyhow::Result<Option<VehicleProfile>> {
            Ok(self.profiles.lock().unwrap().get(&session.user_id).cloned())
        }

        async fn save_profile(&self, session: &SessionContext, profile: &VehicleProfile) -> anyhow::Result<()> {
            self.profiles
                .lock()
                .unwrap()
                .insert(session.user_id.clone(), profile.clone());
            Ok(())
        }

        async fn list_profiles(&self, _session: &SessionContext) -> anyhow::Result<Vec<UserVehicle>> {
            Ok(self
                .profiles
                .lock()
                .unwrap()
                .iter()
                .map(|(id, p)| UserVehicle { user_id: id.clone(), profile: p.clone() })
                .collect())
        }

        async fn create_user(&self, session: &SessionContext, at: &str) -> anyhow::Result<()> {
            self.logins.lock().unwrap().push(format!("created {}@{}", session.user_id, at));
            Ok(())
        }

        async fn record_login(&self, session: &SessionContext, at: &str) -> anyhow::Result<()> {
            self.logins.lock().unwrap().push(format!("{}@{}", session.user_id, at));
            Ok(())
        }

        async fn record_logout(&self, session: &SessionContext, at: &str) -> anyhow::Result<()> {
            if self.fail_logout {
                anyhow::bail!("store unavailable");
            }
            self.logouts.lock().unwrap().push(format!("{}@{}", session.user_id, at));
            Ok(())
        }
    }

    fn session() -> SessionContext {
        SessionContext::new("uid-1".to_string(), Some("driver@example.com".to_string()), "token".to_string())
    }

    #[tokio::test]
    async fn test_save_stamps_owner_and_time() {
        let store = Arc::new(MemoryStore::default());
        let service = ProfileService::new(store.clone());
        let now = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();

        let saved = service
            .save(&session(), VehicleProfile { car_name: "Swift".to_string(), ..Default::default() }, now)
            .await
            .unwrap();

        assert_eq!(saved.user_email.as_deref(), Some("driver@example.com"));
        assert_eq!(saved.last_updated.as_deref(), Some("2026-03-01T10:00:00+00:00"));
        assert_eq!(service.profile(&session()).await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_missing_profile_is_empty() {
        let service = ProfileService::new(Arc::new(MemoryStore::default()));
        assert_eq!(service.profile(&session()).await.unwrap(), VehicleProfile::default());
    }

    #[tokio::test]
    async fn test_search_filters_profiles() {
        let store = Arc::new(MemoryStore::default());
        let service = ProfileService::new(store.clone());
        let now = chrono::Utc::now();
        service
            .save(&session(), VehicleProfile { car_number: "KA01".to_string(), ..Default::default() }, now)
            .await
            .unwrap();

        assert_eq!(service.search(&session(), "ka0").await.unwrap().len(), 1);
        assert!(service.search(&session(), "tn").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_and_login_are_recorded() {
        let store = Arc::new(MemoryStore::default());
        let service = ProfileService::new(store.clone());
        let now = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();

        service.register(&session(), now).await.unwrap();
        service.record_login(&session(), now).await;

        let logins = store.logins.lock().unwrap().clone();
        assert_eq!(
            logins,
            vec![
                "created uid-1@2026-03-01T10:00:00+00:00".to_string(),
                "uid-1@2026-03-01T10:00:00+00:00".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_logout_failure_is_swallowed() {
        let store = Arc::new(MemoryStore { fail_logout: true, ..Default::default() });
        let service = ProfileService::new(store.clone());
        service.record_logout(&session(), chrono::Utc::now()).await;
        assert!(store.logouts.lock().unwrap().is_empty());
    }
}
