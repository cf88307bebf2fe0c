use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::question::OptionLabel;

/// Question index -> selected option label. One entry per answered question;
/// re-selecting before advancing simply overwrites.
pub type AnswerMap = BTreeMap<usize, OptionLabel>;

/// Derived once per session from the document and the answer map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScoreResult {
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
}

/// The payload describing a completed quiz attempt, sent to the backend.
/// Assembled exactly once per completed session; held in the pending slot when
/// the user is unauthenticated at scoring time.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Submission {
    pub id: String,
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
    pub submitted_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubmissionAnswer {
    pub question_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_label: Option<OptionLabel>,
    pub is_correct: bool,
}
