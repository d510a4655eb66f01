// HTTP request handlers
use crate::application::report::{render_report, report_file_name};
use crate::domain::session::SessionContext;
use crate::domain::telemetry::chart_series;
use crate::domain::vehicle::VehicleProfile;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response, text_attachment};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use crate::presentation::session::AuthSession;
use anyhow::Context;
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: String,
    pub email: Option<String>,
    pub id_token: String,
}

impl From<SessionContext> for SessionResponse {
    fn from(session: SessionContext) -> Self {
        Self {
            user_id: session.user_id,
            email: session.email,
            id_token: session.id_token,
        }
    }
}

async fn json_reply<T: Serialize>(headers: &HeaderMap, data: &T) -> Response {
    match json_response(data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest snapshot, evaluation and history of the caller's session
pub async fn latest_evaluation(
    AuthSession(session): AuthSession,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    json_reply(&headers, &state.monitors.state(&session.user_id).await).await
}

/// Live evaluation stream backed by a private session
pub async fn stream_evaluation(
    _session: AuthSession,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let rx = state.monitoring_service.stream_evaluations().await?;
    Ok(stream_from_receiver(rx, accepts_brotli(&headers)).into_response())
}

/// Chart series over the retained readings
pub async fn readings(
    AuthSession(session): AuthSession,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let series = chart_series(&state.monitors.state(&session.user_id).await.readings);
    json_reply(&headers, &series).await
}

/// Downloadable plain-text health report
pub async fn download_report(
    AuthSession(session): AuthSession,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let profile = match state.profile_service.profile(&session).await {
        Ok(profile) => Some(profile),
        Err(e) => {
            tracing::warn!("Report for user {} has no vehicle details: {:#}", session.user_id, e);
            None
        }
    };

    let dashboard = state.monitors.state(&session.user_id).await;
    let now = chrono::Utc::now();
    let report = render_report(profile.as_ref(), &dashboard, now, state.report_readings)
        .context("Failed to render report")?;
    Ok(text_attachment(report, &report_file_name(now)).into_response())
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state.auth_service.login(&request.email, &request.password).await?;
    state.profile_service.record_login(&session, chrono::Utc::now()).await;
    state.monitors.open(&session.user_id).await;
    Ok(Json(session.into()))
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session = state
        .auth_service
        .signup(&request.email, &request.password, &request.confirm_password)
        .await?;
    state.profile_service.register(&session, chrono::Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

pub async fn logout(AuthSession(session): AuthSession, State(state): State<Arc<AppState>>) -> StatusCode {
    state.profile_service.record_logout(&session, chrono::Utc::now()).await;
    state.monitors.close(&session.user_id).await;
    tracing::info!("User {} signed out", session.user_id);
    StatusCode::NO_CONTENT
}

pub async fn get_profile(
    AuthSession(session): AuthSession,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let profile = state.profile_service.profile(&session).await?;
    Ok(json_reply(&headers, &profile).await)
}

pub async fn save_profile(
    AuthSession(session): AuthSession,
    State(state): State<Arc<AppState>>,
    Json(profile): Json<VehicleProfile>,
) -> Result<Json<VehicleProfile>, ApiError> {
    let saved = state.profile_service.save(&session, profile, chrono::Utc::now()).await?;
    Ok(Json(saved))
}

/// Vehicle profiles of every user, filtered by `search`
pub async fn admin_profiles(
    AuthSession(session): AuthSession,
    Query(query): Query<SearchQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    if !state.admin.is_admin(session.email.as_deref()) {
        tracing::warn!("User {} denied admin access", session.user_id);
        return Err(ApiError::Forbidden);
    }

    let search = query.search.unwrap_or_default();
    let profiles = state.profile_service.search(&session, &search).await?;
    Ok(json_reply(&headers, &profiles).await)
}
