// Firebase Realtime Database repository implementation
use crate::application::profile_store::VehicleProfileStore;
use crate::application::telemetry_source::{Subscription, TelemetrySource};
use crate::domain::session::SessionContext;
use crate::domain::telemetry::TelemetrySnapshot;
use crate::domain::vehicle::{UserVehicle, VehicleProfile};
use crate::infrastructure::config::{FirebaseSettings, user_path};
use crate::infrastructure::event_stream::EventStreamParser;
use crate::infrastructure::realtime_tree::{RealtimeTree, TreeChange};
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use tokio::sync::mpsc;

const SUBSCRIPTION_BUFFER: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum FirebaseError {
    #[error("Realtime Database request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Realtime Database error: {0}")]
    Database(String),
}

#[derive(Debug, Clone)]
pub struct FirebaseRepository {
    database_url: String,
    telemetry_auth: Option<String>,
    users_path: String,
    user_path: String,
    profile_path: String,
    client: reqwest::Client,
}

impl FirebaseRepository {
    pub fn new(settings: &FirebaseSettings) -> Self {
        Self {
            database_url: settings.database_url.trim_end_matches('/').to_string(),
            telemetry_auth: settings.telemetry_auth.clone(),
            users_path: settings.users_path.clone(),
            user_path: settings.user_path.clone(),
            profile_path: settings.profile_path.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn build_url(&self, path: &str, auth: Option<&str>) -> String {
        let path = path.trim_matches('/');
        match auth {
            Some(token) => format!(
                "{}/{}.json?auth={}",
                self.database_url,
                path,
                urlencoding::encode(token)
            ),
            None => format!("{}/{}.json", self.database_url, path),
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FirebaseError::Status { status, body }.into());
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, auth: &str) -> Result<Option<T>> {
        let url = self.build_url(path, Some(auth));
        tracing::debug!("Reading {}", path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request to Realtime Database")?;
        let value = Self::check(response)
            .await?
            .json::<Value>()
            .await
            .context("Failed to parse Realtime Database response")?;

        if value.is_null() {
            return Ok(None);
        }
        if let Some(error) = value.get("error").and_then(Value::as_str) {
            return Err(FirebaseError::Database(error.to_string()).into());
        }
        let decoded = serde_json::from_value(value)
            .with_context(|| format!("Unexpected data at {}", path))?;
        Ok(Some(decoded))
    }

    async fn write_json(&self, method: reqwest::Method, path: &str, auth: &str, body: &Value) -> Result<()> {
        let url = self.build_url(path, Some(auth));
        tracing::debug!("Writing {} ({})", path, method);

        let response = self
            .client
            .request(method, &url)
            .json(body)
            .send()
            .await
            .context("Failed to send request to Realtime Database")?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl TelemetrySource for FirebaseRepository {
    async fn subscribe(&self, path: &str) -> Result<Subscription> {
        let url = self.build_url(path, self.telemetry_auth.as_deref());
        let response = self
            .client
            .get(&url)
            .header("Accept", "text/event-stream")
            .send()
            .await
            .context("Failed to open Realtime Database event stream")?;
        let response = Self::check(response).await?;
        tracing::info!("Subscribed to {}", path);

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let path = path.to_string();
        let task = tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut parser = EventStreamParser::new();
            let mut tree = RealtimeTree::new();

            'stream: while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        tracing::error!("Event stream for {} failed: {}", path, e);
                        break;
                    }
                };
                for event in parser.feed(&chunk) {
                    match tree.apply(&event) {
                        Ok(TreeChange::Updated) => {
                            let snapshot = TelemetrySnapshot::from_json(tree.root());
                            if tx.send(snapshot).await.is_err() {
                                break 'stream;
                            }
                        }
                        Ok(TreeChange::Unchanged) => {}
                        Ok(TreeChange::Closed(reason)) => {
                            tracing::warn!("Event stream for {} closed by server: {}", path, reason);
                            break 'stream;
                        }
                        Err(e) => tracing::warn!("Skipping event on {}: {}", path, e),
                    }
                }
            }
            tracing::debug!("Event stream for {} finished", path);
        });

        Ok(Subscription::new(rx, task))
    }
}

#[async_trait]
impl VehicleProfileStore for FirebaseRepository {
    async fn load_profile(&self, session: &SessionContext) -> Result<Option<VehicleProfile>> {
        let path = user_path(&self.profile_path, &session.user_id);
        self.get_json(&path, &session.id_token).await
    }

    async fn save_profile(&self, session: &SessionContext, profile: &VehicleProfile) -> Result<()> {
        let path = user_path(&self.profile_path, &session.user_id);
        let body = serde_json::to_value(profile)?;
        self.write_json(reqwest::Method::PUT, &path, &session.id_token, &body)
            .await
    }

    async fn list_profiles(&self, session: &SessionContext) -> Result<Vec<UserVehicle>> {
        let users: HashMap<String, Value> = self
            .get_json(&self.users_path, &session.id_token)
            .await?
            .unwrap_or_default();

        let mut profiles: Vec<UserVehicle> = users
            .into_iter()
            .filter_map(|(user_id, record)| {
                let details = record.get("vehicleDetails")?.clone();
                match serde_json::from_value::<VehicleProfile>(details) {
                    Ok(profile) => Some(UserVehicle { user_id, profile }),
                    Err(e) => {
                        tracing::warn!("Skipping malformed vehicle details for {}: {}", user_id, e);
                        None
                    }
                }
            })
            .collect();
        profiles.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        tracing::debug!("Found {} vehicle profiles", profiles.len());
        Ok(profiles)
    }

    async fn create_user(&self, session: &SessionContext, at: &str) -> Result<()> {
        let path = user_path(&self.user_path, &session.user_id);
        let body = json!({
            "email": session.email,
            "uid": session.user_id,
            "createdAt": at,
        });
        self.write_json(reqwest::Method::PATCH, &path, &session.id_token, &body)
            .await
    }

    async fn record_login(&self, session: &SessionContext, at: &str) -> Result<()> {
        let path = user_path(&self.user_path, &session.user_id);
        let body = json!({ "timeIn": at, "timeOut": null });
        self.write_json(reqwest::Method::PATCH, &path, &session.id_token, &body)
            .await
    }

    async fn record_logout(&self, session: &SessionContext, at: &str) -> Result<()> {
        let path = user_path(&self.user_path, &session.user_id);
        let body = json!({ "timeOut": at });
        self.write_json(reqwest::Method::PATCH, &path, &session.id_token, &body)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> FirebaseSettings {
        toml::from_str::<crate::infrastructure::config::FirebaseConfig>(
            r#"
            [firebase]
            database_url = "https://vehicle-rtdb.firebaseio.com/"
            api_key = "key"
            "#,
        )
        .unwrap()
        .firebase
    }

    #[test]
    fn test_build_url() {
        let repo = FirebaseRepository::new(&settings());

        assert_eq!(
            repo.build_url("/Engine_Health", None),
            "https://vehicle-rtdb.firebaseio.com/Engine_Health.json"
        );
        assert_eq!(
            repo.build_url("users/u1/vehicleDetails", Some("a b/c")),
            "https://vehicle-rtdb.firebaseio.com/users/u1/vehicleDetails.json?auth=a%20b%2Fc"
        );
    }
}
