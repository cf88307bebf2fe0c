pub mod quiz_session_service;
pub mod scoring_service;
pub mod translation_service;

pub use quiz_session_service::{LoadTicket, QuizSessionService, SaveOutcome, SessionState};
pub use scoring_service::ScoringService;
pub use translation_service::{
    OverlayStatus, PollPolicy, TranslationOverlay, TranslationWidget, DEFAULT_LANGUAGES,
};
