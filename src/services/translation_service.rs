use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;

use crate::config::Config;
use crate::errors::{AppError, AppResult};

/// Languages offered by the player UI by default.
pub static DEFAULT_LANGUAGES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["en", "hi", "bn", "ta", "te", "mr"]);

/// Seam over the third-party translation widget.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationWidget: Send + Sync {
    async fn is_ready(&self) -> bool;
    async fn supported_languages(&self) -> Vec<String>;
    async fn set_language(&self, code: &str) -> bool;
}

/// Bounded readiness polling. The loop never runs unattended: after
/// `max_attempts` probes the overlay settles on `TimedOut`.
#[derive(Clone, Copy, Debug)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub initial_interval: Duration,
}

impl PollPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.translation_poll_attempts.max(1),
            initial_interval: Duration::from_millis(config.translation_poll_interval_ms),
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_interval: Duration::from_millis(200),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayStatus {
    Ready,
    TimedOut,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanguageControl {
    pub code: String,
    pub enabled: bool,
}

/// Capability-detecting adapter around the translation widget. Languages the
/// widget does not report come out as disabled controls, not errors.
pub struct TranslationOverlay {
    widget: Arc<dyn TranslationWidget>,
    status: OverlayStatus,
    languages: Vec<LanguageControl>,
}

impl TranslationOverlay {
    pub async fn attach(
        widget: Arc<dyn TranslationWidget>,
        requested: &[&str],
        policy: PollPolicy,
    ) -> Self {
        let mut interval = policy.initial_interval;
        let mut ready = false;

        for attempt in 1..=policy.max_attempts {
            if widget.is_ready().await {
                ready = true;
                break;
            }
            if attempt < policy.max_attempts {
                tokio::time::sleep(interval).await;
                interval = std::cmp::min(interval * 2, Duration::from_secs(2));
            }
        }

        if !ready {
            log::warn!(
                "Translation widget not ready after {} attempts, disabling language controls",
                policy.max_attempts
            );
            let languages = requested
                .iter()
                .map(|code| LanguageControl {
                    code: code.to_string(),
                    enabled: false,
                })
                .collect();
            return Self {
                widget,
                status: OverlayStatus::TimedOut,
                languages,
            };
        }

        let supported = widget.supported_languages().await;
        let languages: Vec<LanguageControl> = requested
            .iter()
            .map(|code| LanguageControl {
                code: code.to_string(),
                enabled: supported.iter().any(|s| s == code),
            })
            .collect();
        log::info!(
            "Translation widget ready, {}/{} requested languages available",
            languages.iter().filter(|l| l.enabled).count(),
            languages.len()
        );

        Self {
            widget,
            status: OverlayStatus::Ready,
            languages,
        }
    }

    pub fn status(&self) -> OverlayStatus {
        self.status
    }

    pub fn languages(&self) -> &[LanguageControl] {
        &self.languages
    }

    pub fn is_enabled(&self, code: &str) -> bool {
        self.languages
            .iter()
            .any(|l| l.code == code && l.enabled)
    }

    pub async fn select_language(&self, code: &str) -> AppResult<()> {
        if self.status != OverlayStatus::Ready {
            return Err(AppError::Precondition(
                "translation widget is not ready".to_string(),
            ));
        }
        if !self.is_enabled(code) {
            return Err(AppError::ValidationError(format!(
                "language '{}' is not available",
                code
            )));
        }
        if self.widget.set_language(code).await {
            Ok(())
        } else {
            Err(AppError::ValidationError(format!(
                "translation widget rejected language '{}'",
                code
            )))
        }
    }
}
