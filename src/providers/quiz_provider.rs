use async_trait::async_trait;

use crate::errors::{AppError, AppResult};
use crate::models::domain::QuizDocument;
use crate::models::dto::QuizDocumentResponse;

/// Source of quiz documents, keyed by video identifier. Any non-success
/// response or malformed payload surfaces as `LoadError` with the underlying
/// message carried verbatim; no transport error escapes this boundary.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizProvider: Send + Sync {
    async fn fetch_quiz(&self, video_id: &str) -> AppResult<QuizDocument>;
}

pub struct HttpQuizProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpQuizProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl QuizProvider for HttpQuizProvider {
    async fn fetch_quiz(&self, video_id: &str) -> AppResult<QuizDocument> {
        let url = format!("{}/videos/{}/quiz", self.base_url, video_id);
        log::info!("Fetching quiz for video '{}'", video_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::LoadError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            log::error!("Quiz fetch for '{}' failed ({}): {}", video_id, status, message);
            return Err(AppError::LoadError(format!("{}: {}", status, message)));
        }

        let payload: QuizDocumentResponse = response
            .json()
            .await
            .map_err(|e| AppError::LoadError(format!("malformed quiz payload: {}", e)))?;

        QuizDocument::try_from(payload)
    }
}
