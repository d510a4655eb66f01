// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use axum::{
    Router,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::identity::AuthService;
use crate::application::monitoring_service::{MonitoringService, SessionMonitors};
use crate::application::profile_store::ProfileService;
use crate::infrastructure::config::{load_dashboard_config, load_firebase_config, monitoring_settings};
use crate::infrastructure::firebase_repository::FirebaseRepository;
use crate::infrastructure::identity_toolkit::IdentityToolkit;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    admin_profiles, download_report, get_profile, health_check, latest_evaluation, login, logout,
    readings, save_profile, signup, stream_evaluation,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("engine_health=info,tower_http=info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let firebase_config = load_firebase_config()?;
    let dashboard_config = load_dashboard_config()?;

    // Adapters (infrastructure layer)
    let repository = Arc::new(FirebaseRepository::new(&firebase_config.firebase));
    let identity = Arc::new(IdentityToolkit::new(&firebase_config.firebase));

    // Services (application layer)
    let monitoring_service = MonitoringService::new(
        repository.clone(),
        monitoring_settings(&firebase_config.firebase, &dashboard_config),
    );
    let monitors = SessionMonitors::new(monitoring_service.clone());

    let state = Arc::new(AppState {
        auth_service: AuthService::new(identity),
        profile_service: ProfileService::new(repository),
        monitoring_service,
        monitors: monitors.clone(),
        admin: dashboard_config.admin.clone(),
        report_readings: dashboard_config.monitoring.report_readings,
    });

    // Build router (presentation layer)
    // Responses are compressed by the handlers, so no CompressionLayer here.
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/evaluation", get(latest_evaluation))
        .route("/evaluation/stream", get(stream_evaluation))
        .route("/readings", get(readings))
        .route("/report", get(download_report))
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/logout", post(logout))
        .route("/profile", get(get_profile).put(save_profile))
        .route("/admin/profiles", get(admin_profiles))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = dashboard_config.server.bind_address.parse()?;
    tracing::info!("Starting engine-health service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    monitors.close_all().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
