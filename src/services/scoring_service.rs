use chrono::Utc;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::domain::{AnswerMap, QuizDocument, ScoreResult, Submission, SubmissionAnswer};

/// Pure scoring over a document and an answer map. Missing entries count as
/// incorrect; only `advance()` enforces answer presence, so by construction a
/// completed session has an entry for every index.
pub struct ScoringService;

impl ScoringService {
    /// Compute the score for a session. Repeatable: same inputs, same output.
    pub fn score(document: &QuizDocument, answers: &AnswerMap) -> AppResult<ScoreResult> {
        let total = document.total_questions();
        if total == 0 {
            // The fetch layer guarantees a non-empty document; a zero here is
            // a contract breach, never a divide-by-zero.
            return Err(AppError::Precondition(
                "cannot score a quiz with no questions".to_string(),
            ));
        }

        let correct = document
            .questions
            .iter()
            .enumerate()
            .filter(|(index, question)| answers.get(index) == Some(&question.correct_label))
            .count();

        let percentage = ((correct as f64 / total as f64) * 100.0).round() as u32;

        Ok(ScoreResult {
            correct: correct as u32,
            total: total as u32,
            percentage,
        })
    }

    /// Assemble the submission for a scored session. The answers list always
    /// has one entry per question, unanswered indices carrying no label.
    pub fn build_submission(
        document: &QuizDocument,
        answers: &AnswerMap,
        score: &ScoreResult,
        elapsed_seconds: i64,
    ) -> Submission {
        let answer_records = document
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let selected = answers.get(&index).copied();
                SubmissionAnswer {
                    question_index: index,
                    selected_label: selected,
                    is_correct: selected == Some(question.correct_label),
                }
            })
            .collect();

        Submission {
            id: Uuid::new_v4().to_string(),
            quiz_id: document.quiz_id.clone(),
            video_id: document.video_id.clone(),
            subject_id: document.subject_id.clone(),
            topic_id: document.topic_id.clone(),
            chapter_id: document.chapter_id.clone(),
            total_questions: score.total,
            correct_count: score.correct,
            score_percent: score.percentage,
            elapsed_seconds,
            answers: answer_records,
            submitted_at: Utc::now(),
        }
    }
}
