// Application state for HTTP handlers
use crate::application::identity::AuthService;
use crate::application::monitoring_service::{MonitoringService, SessionMonitors};
use crate::application::profile_store::ProfileService;
use crate::infrastructure::config::AdminSettings;

pub struct AppState {
    pub auth_service: AuthService,
    pub profile_service: ProfileService,
    pub monitoring_service: MonitoringService,
    /// Per-user sessions feeding `/evaluation`, `/readings` and `/report`.
    pub monitors: SessionMonitors,
    pub admin: AdminSettings,
    pub report_readings: usize,
}
