// Firebase identity toolkit (REST) implementation of the identity provider
use crate::application::identity::{AuthError, IdentityProvider};
use crate::domain::session::SessionContext;
use crate::infrastructure::config::FirebaseSettings;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub struct IdentityToolkit {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Failure codes that mean the caller got their credentials wrong.
const CREDENTIAL_ERRORS: [&str; 7] = [
    "EMAIL_NOT_FOUND",
    "INVALID_PASSWORD",
    "INVALID_LOGIN_CREDENTIALS",
    "INVALID_ID_TOKEN",
    "TOKEN_EXPIRED",
    "USER_DISABLED",
    "USER_NOT_FOUND",
];

/// Error codes may carry a suffix, e.g. "WEAK_PASSWORD : Password should be ...".
fn error_code(message: &str) -> &str {
    message.split(':').next().unwrap_or(message).trim()
}

fn classify_failure(status: reqwest::StatusCode, message: String) -> AuthError {
    if CREDENTIAL_ERRORS.contains(&error_code(&message)) {
        return AuthError::InvalidCredentials;
    }
    if status.is_client_error() {
        return AuthError::Rejected(message);
    }
    anyhow::anyhow!("Identity provider failed with status {}: {}", status, message).into()
}

impl IdentityToolkit {
    pub fn new(settings: &FirebaseSettings) -> Self {
        Self {
            base_url: settings.auth_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/accounts:{}?key={}",
            self.base_url,
            method,
            urlencoding::encode(&self.api_key)
        )
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, AuthError> {
        let response = self
            .client
            .post(self.endpoint(method))
            .json(&body)
            .send()
            .await
            .context("Failed to reach identity provider")?;

        let status = response.status();
        if status.is_success() {
            let decoded = response
                .json::<T>()
                .await
                .context("Failed to parse identity provider response")?;
            return Ok(decoded);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        tracing::debug!("Identity provider rejected {}: {} {}", method, status, message);
        Err(classify_failure(status, message))
    }
}

impl From<AuthResponse> for SessionContext {
    fn from(response: AuthResponse) -> Self {
        SessionContext::new(response.local_id, response.email, response.id_token)
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkit {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionContext, AuthError> {
        let body = json!({ "email": email, "password": password, "returnSecureToken": true });
        let response: AuthResponse = self.call("signInWithPassword", body).await?;
        Ok(response.into())
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SessionContext, AuthError> {
        let body = json!({ "email": email, "password": password, "returnSecureToken": true });
        let response: AuthResponse = self.call("signUp", body).await?;
        Ok(response.into())
    }

    async fn lookup(&self, id_token: &str) -> Result<SessionContext, AuthError> {
        let response: LookupResponse = self.call("lookup", json!({ "idToken": id_token })).await?;
        let user = response
            .users
            .into_iter()
            .next()
            .ok_or(AuthError::InvalidCredentials)?;
        Ok(SessionContext::new(user.local_id, user.email, id_token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_strips_detail() {
        assert_eq!(error_code("WEAK_PASSWORD : Password should be at least 6 characters"), "WEAK_PASSWORD");
        assert_eq!(error_code("INVALID_PASSWORD"), "INVALID_PASSWORD");
    }

    #[test]
    fn test_failure_classification() {
        use reqwest::StatusCode;

        for code in ["TOKEN_EXPIRED", "INVALID_ID_TOKEN", "INVALID_LOGIN_CREDENTIALS"] {
            assert!(
                matches!(classify_failure(StatusCode::BAD_REQUEST, code.to_string()), AuthError::InvalidCredentials),
                "{}",
                code
            );
        }
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, "EMAIL_EXISTS".to_string()),
            AuthError::Rejected(message) if message == "EMAIL_EXISTS"
        ));
        assert!(matches!(
            classify_failure(StatusCode::SERVICE_UNAVAILABLE, "backend down".to_string()),
            AuthError::Provider(_)
        ));
    }

    #[test]
    fn test_auth_response_into_session() {
        let response: AuthResponse = serde_json::from_str(
            r#"{"localId":"u1","email":"a@b.com","idToken":"tok","refreshToken":"r","expiresIn":"3600"}"#,
        )
        .unwrap();
        let session: SessionContext = response.into();

        assert_eq!(session.user_id, "u1");
        assert_eq!(session.email.as_deref(), Some("a@b.com"));
        assert_eq!(session.id_token, "tok");
    }

    #[test]
    fn test_endpoint() {
        let toolkit = IdentityToolkit {
            base_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            api_key: "k".to_string(),
            client: reqwest::Client::new(),
        };
        assert_eq!(
            toolkit.endpoint("signUp"),
            "https://identitytoolkit.googleapis.com/v1/accounts:signUp?key=k"
        );
    }
}
