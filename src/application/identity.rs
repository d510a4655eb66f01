// Identity provider trait - Login, signup and token verification
use crate::domain::session::SessionContext;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Sign-up rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionContext, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<SessionContext, AuthError>;

    /// Resolve an id token back into its session.
    async fn lookup(&self, id_token: &str) -> Result<SessionContext, AuthError>;
}

#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SessionContext, AuthError> {
        let session = self.provider.sign_in(email.trim(), password).await?;
        tracing::info!("User {} signed in", session.user_id);
        Ok(session)
    }

    /// Confirmation is checked locally before the provider is contacted.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<SessionContext, AuthError> {
        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        let session = self.provider.sign_up(email.trim(), password).await?;
        tracing::info!("User {} signed up", session.user_id);
        Ok(session)
    }

    pub async fn session(&self, id_token: &str) -> Result<SessionContext, AuthError> {
        self.provider.lookup(id_token).await
    }
}
