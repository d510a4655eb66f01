use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::application::monitoring_service::MonitoringSettings;
use crate::application::report::DEFAULT_REPORT_READINGS;
use crate::domain::telemetry::DEFAULT_READING_CAPACITY;
use crate::domain::vibration::DEFAULT_VIBRATION_CAPACITY;

/// Environment overrides look like `ENGINE__FIREBASE__API_KEY`.
const ENV_PREFIX: &str = "ENGINE";

#[derive(Debug, Deserialize, Clone)]
pub struct FirebaseConfig {
    pub firebase: FirebaseSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FirebaseSettings {
    pub database_url: String,
    pub api_key: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Credential for reading the telemetry path; the device feed is not
    /// tied to a user session.
    #[serde(default)]
    pub telemetry_auth: Option<String>,
    #[serde(default = "default_telemetry_path")]
    pub telemetry_path: String,
    #[serde(default = "default_users_path")]
    pub users_path: String,
    #[serde(default = "default_user_path")]
    pub user_path: String,
    #[serde(default = "default_profile_path")]
    pub profile_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub admin: AdminSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitoringConfig {
    #[serde(default = "default_vibration_capacity")]
    pub vibration_capacity: usize,
    #[serde(default = "default_reading_capacity")]
    pub reading_capacity: usize,
    #[serde(default = "default_report_readings")]
    pub report_readings: usize,
    /// Resubscribe backoff after the telemetry stream drops.
    #[serde(default = "default_retry_initial_ms")]
    pub retry_initial_ms: u64,
    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdminSettings {
    /// Accounts allowed to browse every user's vehicle profile.
    #[serde(default)]
    pub emails: Vec<String>,
}

impl AdminSettings {
    pub fn is_admin(&self, email: Option<&str>) -> bool {
        email.is_some_and(|email| self.emails.iter().any(|admin| admin.eq_ignore_ascii_case(email)))
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            vibration_capacity: default_vibration_capacity(),
            reading_capacity: default_reading_capacity(),
            report_readings: default_report_readings(),
            retry_initial_ms: default_retry_initial_ms(),
            retry_max_ms: default_retry_max_ms(),
        }
    }
}

fn default_auth_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_telemetry_path() -> String {
    "Engine_Health".to_string()
}

fn default_users_path() -> String {
    "users".to_string()
}

fn default_user_path() -> String {
    "users/${uid}".to_string()
}

fn default_profile_path() -> String {
    "users/${uid}/vehicleDetails".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_vibration_capacity() -> usize {
    DEFAULT_VIBRATION_CAPACITY
}

fn default_reading_capacity() -> usize {
    DEFAULT_READING_CAPACITY
}

fn default_report_readings() -> usize {
    DEFAULT_REPORT_READINGS
}

fn default_retry_initial_ms() -> u64 {
    1_000
}

fn default_retry_max_ms() -> u64 {
    30_000
}

pub fn monitoring_settings(firebase: &FirebaseSettings, dashboard: &DashboardConfig) -> MonitoringSettings {
    let retry_initial = Duration::from_millis(dashboard.monitoring.retry_initial_ms.max(1));
    MonitoringSettings {
        telemetry_path: firebase.telemetry_path.clone(),
        vibration_capacity: dashboard.monitoring.vibration_capacity,
        reading_capacity: dashboard.monitoring.reading_capacity,
        retry_initial,
        retry_max: Duration::from_millis(dashboard.monitoring.retry_max_ms).max(retry_initial),
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX).separator("__")
}

pub fn load_firebase_config() -> anyhow::Result<FirebaseConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/firebase"))
        .add_source(environment())
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(environment())
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace `${var}` placeholders in a database path
pub fn prepare_path(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

pub fn user_path(template: &str, user_id: &str) -> String {
    let mut vars = HashMap::new();
    vars.insert("uid".to_string(), user_id.to_string());
    prepare_path(template, &vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_path() {
        let mut vars = HashMap::new();
        vars.insert("uid".to_string(), "abc123".to_string());
        vars.insert("section".to_string(), "vehicleDetails".to_string());

        let result = prepare_path("users/${uid}/${section}", &vars);

        assert_eq!(result, "users/abc123/vehicleDetails");
        assert_eq!(user_path("users/${uid}", "u1"), "users/u1");
    }

    #[test]
    fn test_firebase_defaults() {
        let raw = r#"
            [firebase]
            database_url = "https://example-rtdb.firebaseio.com"
            api_key = "key"
        "#;
        let config: FirebaseConfig = toml::from_str(raw).unwrap();

        assert_eq!(config.firebase.telemetry_path, "Engine_Health");
        assert_eq!(config.firebase.profile_path, "users/${uid}/vehicleDetails");
        assert_eq!(config.firebase.telemetry_auth, None);
    }

    #[test]
    fn test_dashboard_defaults_and_overrides() {
        let empty: DashboardConfig = toml::from_str("").unwrap();
        assert_eq!(empty.server.bind_address, "0.0.0.0:8080");
        assert_eq!(empty.monitoring.vibration_capacity, 21);
        assert_eq!(empty.monitoring.reading_capacity, 20);
        assert_eq!(empty.monitoring.report_readings, 5);
        assert_eq!(empty.monitoring.retry_initial_ms, 1_000);
        assert_eq!(empty.monitoring.retry_max_ms, 30_000);

        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "[monitoring]\nvibration_capacity = 30\n[admin]\nemails = [\"Ops@Example.com\"]",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let custom: DashboardConfig = settings.try_deserialize().unwrap();
        assert_eq!(custom.monitoring.vibration_capacity, 30);
        assert_eq!(custom.monitoring.reading_capacity, 20);
        assert!(custom.admin.is_admin(Some("ops@example.com")));
        assert!(!custom.admin.is_admin(Some("driver@example.com")));
        assert!(!custom.admin.is_admin(None));
    }

    #[test]
    fn test_monitoring_settings_clamp_backoff() {
        let firebase: FirebaseConfig = toml::from_str(
            "[firebase]\ndatabase_url = \"https://example-rtdb.firebaseio.com\"\napi_key = \"key\"",
        )
        .unwrap();
        let dashboard: DashboardConfig =
            toml::from_str("[monitoring]\nretry_initial_ms = 0\nretry_max_ms = 0").unwrap();

        let settings = monitoring_settings(&firebase.firebase, &dashboard);

        assert_eq!(settings.telemetry_path, "Engine_Health");
        assert_eq!(settings.retry_initial, Duration::from_millis(1));
        assert_eq!(settings.retry_max, Duration::from_millis(1));
    }
}
