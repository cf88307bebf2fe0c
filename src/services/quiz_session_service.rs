use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::AuthPresence;
use crate::errors::{AppError, AppResult};
use crate::models::domain::{AnswerMap, OptionLabel, Question, QuizDocument, ScoreResult, Submission};
use crate::providers::{QuizProvider, ResultSink};
use crate::services::scoring_service::ScoringService;
use crate::storage::PendingSubmissionStore;

/// Session progress. Traversal is strictly forward; redoing a quiz means
/// loading a fresh document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Presenting(usize),
    Scored,
    Submitting,
    Submitted,
    SubmitError(String),
    AwaitingAuth,
}

/// Result of the manual "save my result" action from `AwaitingAuth`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Submitted,
    SubmitFailed(String),
    /// Still unauthenticated; the caller redirects to registration carrying
    /// the pending submission for later resumption.
    RedirectToRegistration(Submission),
}

/// Ticket handed out by `begin_load`. A completion whose ticket no longer
/// matches the service generation is stale and gets discarded.
#[derive(Debug)]
pub struct LoadTicket {
    generation: u64,
    video_id: String,
}

impl LoadTicket {
    pub fn video_id(&self) -> &str {
        &self.video_id
    }
}

struct QuizSession {
    document: QuizDocument,
    answers: AnswerMap,
    state: SessionState,
    started_at: DateTime<Utc>,
    score: Option<ScoreResult>,
    submission: Option<Submission>,
}

/// The quiz session engine. Owns at most one active session; every state
/// transition runs in response to a discrete user action or the completion of
/// a network call, never concurrently against the same session.
pub struct QuizSessionService {
    quiz_provider: Arc<dyn QuizProvider>,
    result_sink: Arc<dyn ResultSink>,
    auth: Arc<AuthPresence>,
    pending: Arc<dyn PendingSubmissionStore>,
    session: Option<QuizSession>,
    generation: u64,
}

impl QuizSessionService {
    pub fn new(
        quiz_provider: Arc<dyn QuizProvider>,
        result_sink: Arc<dyn ResultSink>,
        auth: Arc<AuthPresence>,
        pending: Arc<dyn PendingSubmissionStore>,
    ) -> Self {
        Self {
            quiz_provider,
            result_sink,
            auth,
            pending,
            session: None,
            generation: 0,
        }
    }

    /// Start loading a quiz for a video. Discards the current session and
    /// invalidates every outstanding load ticket.
    pub fn begin_load(&mut self, video_id: &str) -> LoadTicket {
        self.generation += 1;
        self.session = None;
        LoadTicket {
            generation: self.generation,
            video_id: video_id.to_string(),
        }
    }

    /// Apply a finished fetch. Returns `Ok(false)` when the ticket is stale
    /// (the user switched videos while the fetch was in flight) — the result
    /// is dropped without touching the newer session. A load failure is
    /// terminal for the attempt; the caller must `begin_load` again to retry.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        fetched: AppResult<QuizDocument>,
    ) -> AppResult<bool> {
        if ticket.generation != self.generation {
            log::warn!(
                "Discarding stale quiz fetch for video '{}'",
                ticket.video_id
            );
            return Ok(false);
        }

        let document = fetched?;
        if document.questions.is_empty() {
            return Err(AppError::LoadError(format!(
                "quiz for video '{}' has no questions",
                ticket.video_id
            )));
        }

        log::info!(
            "Quiz '{}' loaded for video '{}' ({} questions)",
            document.quiz_id,
            document.video_id,
            document.total_questions()
        );
        self.session = Some(QuizSession {
            document,
            answers: AnswerMap::new(),
            state: SessionState::Presenting(0),
            started_at: Utc::now(),
            score: None,
            submission: None,
        });
        Ok(true)
    }

    /// Fetch and install a quiz in one step.
    pub async fn load(&mut self, video_id: &str) -> AppResult<bool> {
        let ticket = self.begin_load(video_id);
        let fetched = self.quiz_provider.fetch_quiz(video_id).await;
        self.complete_load(ticket, fetched)
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.session.as_ref().map(|s| &s.state)
    }

    pub fn score(&self) -> Option<&ScoreResult> {
        self.session.as_ref().and_then(|s| s.score.as_ref())
    }

    pub fn submission(&self) -> Option<&Submission> {
        self.session.as_ref().and_then(|s| s.submission.as_ref())
    }

    pub fn document(&self) -> Option<&QuizDocument> {
        self.session.as_ref().map(|s| &s.document)
    }

    /// The question currently presented, if any.
    pub fn current_question(&self) -> Option<&Question> {
        let session = self.session.as_ref()?;
        match session.state {
            SessionState::Presenting(index) => session.document.questions.get(index),
            _ => None,
        }
    }

    /// Record the answer for the presented question. Re-selecting before
    /// advancing overwrites the prior choice.
    pub fn select_answer(&mut self, label: OptionLabel) -> AppResult<()> {
        let session = self.active_session_mut()?;
        match session.state {
            SessionState::Presenting(index) => {
                session.answers.insert(index, label);
                Ok(())
            }
            _ => Err(AppError::Precondition(
                "answers can only be selected while a question is presented".to_string(),
            )),
        }
    }

    /// Move to the next question, or score the session on the last one. An
    /// unanswered current question blocks the transition; state is unchanged.
    pub fn advance(&mut self) -> AppResult<SessionState> {
        let session = self.active_session_mut()?;
        let index = match session.state {
            SessionState::Presenting(index) => index,
            _ => {
                return Err(AppError::Precondition(
                    "cannot advance outside question presentation".to_string(),
                ))
            }
        };

        if !session.answers.contains_key(&index) {
            return Err(AppError::Precondition(format!(
                "question {} has no answer",
                index
            )));
        }

        if index == session.document.last_index() {
            let score = ScoringService::score(&session.document, &session.answers)?;
            let elapsed_seconds = (Utc::now() - session.started_at).num_seconds();
            let submission = ScoringService::build_submission(
                &session.document,
                &session.answers,
                &score,
                elapsed_seconds,
            );
            log::info!(
                "Session scored: {}/{} ({}%) in {}s",
                score.correct,
                score.total,
                score.percentage,
                elapsed_seconds
            );
            session.score = Some(score);
            session.submission = Some(submission);
            session.state = SessionState::Scored;
        } else {
            session.state = SessionState::Presenting(index + 1);
        }

        Ok(session.state.clone())
    }

    /// Send or defer the scored result. Authenticated users go straight to
    /// the sink; anonymous users get the submission parked in the pending
    /// slot and a sign-up call-to-action (`AwaitingAuth`). A sink failure is
    /// carried in the state, never hides the computed score.
    pub async fn submit(&mut self) -> AppResult<SessionState> {
        {
            let session = self.active_session_ref()?;
            if session.state != SessionState::Scored {
                return Err(AppError::Precondition(
                    "only a scored session can be submitted".to_string(),
                ));
            }
        }
        self.dispatch_submission().await
    }

    /// Explicit user retry after a submission failure. No automatic backoff.
    pub async fn retry_submit(&mut self) -> AppResult<SessionState> {
        {
            let session = self.active_session_ref()?;
            if !matches!(session.state, SessionState::SubmitError(_)) {
                return Err(AppError::Precondition(
                    "retry is only available after a failed submission".to_string(),
                ));
            }
        }
        self.dispatch_submission().await
    }

    /// Manual "save my result" action from `AwaitingAuth`. Re-checks the
    /// auth signal; when now authenticated, sends the submission held in the
    /// pending slot (not a recomputed one).
    pub async fn save_pending(&mut self) -> AppResult<SaveOutcome> {
        let video_id = {
            let session = self.active_session_ref()?;
            if session.state != SessionState::AwaitingAuth {
                return Err(AppError::Precondition(
                    "no deferred submission awaiting authentication".to_string(),
                ));
            }
            session.document.video_id.clone()
        };

        let submission = self.pending.get(&video_id)?.ok_or_else(|| {
            AppError::Precondition(format!("no pending submission for video '{}'", video_id))
        })?;

        if !self.auth.is_authenticated() {
            log::info!(
                "Save requested for video '{}' while unauthenticated, redirecting to registration",
                video_id
            );
            return Ok(SaveOutcome::RedirectToRegistration(submission));
        }

        self.set_state(SessionState::Submitting);
        match self.result_sink.submit(&submission).await {
            Ok(()) => {
                self.pending.remove(&video_id)?;
                self.set_state(SessionState::Submitted);
                Ok(SaveOutcome::Submitted)
            }
            Err(err) => {
                let message = err.to_string();
                log::error!("Deferred submission failed: {}", message);
                self.set_state(SessionState::SubmitError(message.clone()));
                Ok(SaveOutcome::SubmitFailed(message))
            }
        }
    }

    /// Shared submit path. The auth signal is re-queried here, at the
    /// decision point, never cached from an earlier transition.
    async fn dispatch_submission(&mut self) -> AppResult<SessionState> {
        let (submission, video_id) = {
            let session = self.active_session_ref()?;
            let submission = session.submission.clone().ok_or_else(|| {
                AppError::Precondition("session has no assembled submission".to_string())
            })?;
            (submission, session.document.video_id.clone())
        };

        if !self.auth.is_authenticated() {
            self.pending.put(&video_id, &submission)?;
            self.set_state(SessionState::AwaitingAuth);
            log::info!(
                "User unauthenticated, submission for video '{}' parked in pending slot",
                video_id
            );
            return Ok(SessionState::AwaitingAuth);
        }

        self.set_state(SessionState::Submitting);
        let state = match self.result_sink.submit(&submission).await {
            Ok(()) => {
                self.pending.remove(&video_id)?;
                log::info!("Submission '{}' accepted", submission.id);
                SessionState::Submitted
            }
            Err(err) => {
                let message = err.to_string();
                log::error!("Submission '{}' failed: {}", submission.id, message);
                SessionState::SubmitError(message)
            }
        };
        self.set_state(state.clone());
        Ok(state)
    }

    fn set_state(&mut self, state: SessionState) {
        if let Some(session) = self.session.as_mut() {
            session.state = state;
        }
    }

    fn active_session_ref(&self) -> AppResult<&QuizSession> {
        self.session
            .as_ref()
            .ok_or_else(|| AppError::Precondition("no active quiz session".to_string()))
    }

    fn active_session_mut(&mut self) -> AppResult<&mut QuizSession> {
        self.session
            .as_mut()
            .ok_or_else(|| AppError::Precondition("no active quiz session".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{MockQuizProvider, MockResultSink};
    use crate::test_utils::fixtures::sample_document;
    use crate::test_utils::{InMemoryPendingStore, InMemoryTokenStore};
    use secrecy::SecretString;

    fn service_with(
        provider: MockQuizProvider,
        sink: MockResultSink,
        authenticated: bool,
    ) -> QuizSessionService {
        let tokens = Arc::new(InMemoryTokenStore::default());
        let auth = Arc::new(AuthPresence::new(tokens));
        if authenticated {
            auth.store_token(SecretString::from("tok-1".to_string()))
                .unwrap();
        }
        QuizSessionService::new(
            Arc::new(provider),
            Arc::new(sink),
            auth,
            Arc::new(InMemoryPendingStore::default()),
        )
    }

    fn provider_returning(video_id: &str, question_count: usize) -> MockQuizProvider {
        let doc = sample_document(video_id, question_count);
        let mut provider = MockQuizProvider::new();
        provider
            .expect_fetch_quiz()
            .returning(move |_| Ok(doc.clone()));
        provider
    }

    fn answer_current(service: &mut QuizSessionService) {
        let label = service
            .current_question()
            .expect("a question should be presented")
            .correct_label;
        service.select_answer(label).unwrap();
    }

    #[tokio::test]
    async fn load_presents_the_first_question() {
        let mut service = service_with(provider_returning("video-1", 3), MockResultSink::new(), true);

        let applied = service.load("video-1").await.unwrap();

        assert!(applied);
        assert_eq!(service.state(), Some(&SessionState::Presenting(0)));
        assert!(service.current_question().is_some());
    }

    #[tokio::test]
    async fn load_failure_is_terminal_and_leaves_no_session() {
        let mut provider = MockQuizProvider::new();
        provider
            .expect_fetch_quiz()
            .returning(|_| Err(AppError::LoadError("404 Not Found: no quiz".to_string())));
        let mut service = service_with(provider, MockResultSink::new(), true);

        let err = service.load("video-1").await.unwrap_err();

        assert!(matches!(err, AppError::LoadError(_)));
        assert!(service.state().is_none());
    }

    #[tokio::test]
    async fn advance_without_answer_does_not_change_state() {
        let mut service = service_with(provider_returning("video-1", 3), MockResultSink::new(), true);
        service.load("video-1").await.unwrap();

        let err = service.advance().unwrap_err();

        assert!(matches!(err, AppError::Precondition(_)));
        assert_eq!(service.state(), Some(&SessionState::Presenting(0)));
    }

    #[tokio::test]
    async fn reselecting_overwrites_before_advancing() {
        let mut service = service_with(provider_returning("video-1", 2), MockResultSink::new(), true);
        service.load("video-1").await.unwrap();

        service.select_answer(OptionLabel::D).unwrap();
        answer_current(&mut service);
        service.advance().unwrap();
        answer_current(&mut service);
        service.advance().unwrap();

        // The first pick was replaced by the correct one
        assert_eq!(
            service.score(),
            Some(&ScoreResult {
                correct: 2,
                total: 2,
                percentage: 100
            })
        );
    }

    #[tokio::test]
    async fn unauthenticated_submission_parks_in_pending_slot() {
        let pending = Arc::new(InMemoryPendingStore::default());
        let auth = Arc::new(AuthPresence::new(Arc::new(InMemoryTokenStore::default())));
        let mut sink = MockResultSink::new();
        sink.expect_submit().never();
        let mut service = QuizSessionService::new(
            Arc::new(provider_returning("video-1", 2)),
            Arc::new(sink),
            auth,
            pending.clone(),
        );
        service.load("video-1").await.unwrap();
        answer_current(&mut service);
        service.advance().unwrap();
        answer_current(&mut service);
        service.advance().unwrap();

        let state = service.submit().await.unwrap();

        assert_eq!(state, SessionState::AwaitingAuth);
        let parked = pending.get("video-1").unwrap().expect("slot should hold it");
        assert_eq!(parked.total_questions, 2);
    }

    #[tokio::test]
    async fn submit_outside_scored_state_is_a_precondition_error() {
        let mut service = service_with(provider_returning("video-1", 2), MockResultSink::new(), true);
        service.load("video-1").await.unwrap();

        let err = service.submit().await.unwrap_err();

        assert!(matches!(err, AppError::Precondition(_)));
    }

    #[tokio::test]
    async fn sink_failure_keeps_score_visible() {
        let mut sink = MockResultSink::new();
        sink.expect_submit()
            .returning(|_| Err(AppError::SubmitError("503: unavailable".to_string())));
        let mut service = service_with(provider_returning("video-1", 1), sink, true);
        service.load("video-1").await.unwrap();
        answer_current(&mut service);
        service.advance().unwrap();
        let score_before = *service.score().unwrap();

        let state = service.submit().await.unwrap();

        assert!(matches!(state, SessionState::SubmitError(_)));
        assert_eq!(service.score(), Some(&score_before));
    }
}
