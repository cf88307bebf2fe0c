use serde::Serialize;
use validator::Validate;

use crate::models::domain::{Submission, SubmissionAnswer};

/// Body of the POST to the result sink. Mirrors `Submission` field for field;
/// kept separate so the wire contract can drift without touching the domain.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResultRequest {
    pub attempt_id: String,
    pub quiz_id: String,
    pub video_id: String,
    pub subject_id: String,
    pub topic_id: String,
    pub chapter_id: String,
    pub total_questions: u32,
    pub correct_count: u32,
    pub score_percent: u32,
    pub elapsed_seconds: i64,
    pub answers: Vec<SubmissionAnswer>,
    pub submitted_at: String,
}

impl From<&Submission> for SubmitResultRequest {
    fn from(submission: &Submission) -> Self {
        SubmitResultRequest {
            attempt_id: submission.id.clone(),
            quiz_id: submission.quiz_id.clone(),
            video_id: submission.video_id.clone(),
            subject_id: submission.subject_id.clone(),
            topic_id: submission.topic_id.clone(),
            chapter_id: submission.chapter_id.clone(),
            total_questions: submission.total_questions,
            correct_count: submission.correct_count,
            score_percent: submission.score_percent,
            elapsed_seconds: submission.elapsed_seconds,
            answers: submission.answers.clone(),
            submitted_at: submission.submitted_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}
