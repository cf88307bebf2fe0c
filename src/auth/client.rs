use std::sync::Arc;

use secrecy::SecretString;
use validator::Validate;

use crate::auth::AuthPresence;
use crate::errors::{AppError, AppResult};
use crate::models::dto::response::AuthTokenResponse;
use crate::models::dto::{LoginRequest, RegisterRequest};

/// Client side of the backend auth endpoints. Tokens land in the presence
/// signal's store, which publishes the login event to every subscriber.
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
    presence: Arc<AuthPresence>,
}

impl AuthClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        presence: Arc<AuthPresence>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            presence,
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> AppResult<()> {
        request.validate()?;
        let url = format!("{}/auth/login", self.base_url);
        self.authenticate(&url, request).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> AppResult<()> {
        request.validate()?;
        let url = format!("{}/auth/register", self.base_url);
        self.authenticate(&url, request).await
    }

    async fn authenticate<B: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> AppResult<()> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::AuthError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            log::error!("Authentication failed ({}): {}", status, message);
            return Err(AppError::AuthError(format!("{}: {}", status, message)));
        }

        let token: AuthTokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::AuthError(format!("malformed token response: {}", e)))?;

        self.presence
            .store_token(SecretString::from(token.access_token))
    }
}
