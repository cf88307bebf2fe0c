use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::auth::AuthPresence;
use crate::errors::{AppError, AppResult};
use crate::models::domain::Submission;
use crate::models::dto::SubmitResultRequest;

/// Destination for completed quiz attempts. Failure reasons are not
/// categorized; every rejection or transport failure is a `SubmitError`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn submit(&self, submission: &Submission) -> AppResult<()>;
}

pub struct HttpResultSink {
    client: reqwest::Client,
    base_url: String,
    auth: Arc<AuthPresence>,
}

impl HttpResultSink {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        auth: Arc<AuthPresence>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            auth,
        }
    }
}

#[async_trait]
impl ResultSink for HttpResultSink {
    async fn submit(&self, submission: &Submission) -> AppResult<()> {
        let url = format!("{}/quiz-attempts", self.base_url);
        log::info!(
            "Submitting attempt '{}' for video '{}' ({}%)",
            submission.id,
            submission.video_id,
            submission.score_percent
        );

        let mut request = self
            .client
            .post(&url)
            .json(&SubmitResultRequest::from(submission));

        if let Some(token) = self
            .auth
            .access_token()
            .map_err(|e| AppError::SubmitError(e.to_string()))?
        {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::SubmitError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            log::error!(
                "Submission '{}' rejected ({}): {}",
                submission.id,
                status,
                message
            );
            return Err(AppError::SubmitError(format!("{}: {}", status, message)));
        }

        Ok(())
    }
}
