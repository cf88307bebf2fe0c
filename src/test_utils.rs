use std::collections::HashMap;
use std::sync::Mutex;

use secrecy::SecretString;

use crate::errors::AppResult;
use crate::models::domain::Submission;
use crate::storage::{PendingSubmissionStore, TokenStore};

pub mod fixtures {
    use chrono::Utc;

    use crate::models::domain::{
        AnswerMap, OptionLabel, Question, QuestionOption, QuizDocument, Submission,
        SubmissionAnswer,
    };

    const LABELS: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    /// Quiz document with the given number of questions; the correct label
    /// cycles through the alphabet by index.
    pub fn sample_document(video_id: &str, question_count: usize) -> QuizDocument {
        let questions = (0..question_count)
            .map(|index| {
                let correct_label = LABELS[index % LABELS.len()];
                Question {
                    prompt: format!("Question {}", index + 1),
                    options: LABELS
                        .iter()
                        .map(|label| QuestionOption {
                            label: *label,
                            text: format!("Option {}", label),
                        })
                        .collect(),
                    correct_label,
                    explanation: format!("Explanation for question {}", index + 1),
                }
            })
            .collect();

        QuizDocument {
            quiz_id: format!("quiz-{}", video_id),
            video_id: video_id.to_string(),
            subject_id: "subject-1".to_string(),
            topic_id: "topic-1".to_string(),
            chapter_id: "chapter-1".to_string(),
            questions,
        }
    }

    /// Full-coverage answer map: correct picks for the first `correct_count`
    /// questions, deliberately wrong picks for the rest.
    pub fn answers_for(document: &QuizDocument, correct_count: usize) -> AnswerMap {
        document
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let label = if index < correct_count {
                    question.correct_label
                } else if question.correct_label == OptionLabel::A {
                    OptionLabel::B
                } else {
                    OptionLabel::A
                };
                (index, label)
            })
            .collect()
    }

    pub fn sample_submission(video_id: &str, correct: u32, total: u32) -> Submission {
        let percentage = ((correct as f64 / total as f64) * 100.0).round() as u32;
        Submission {
            id: format!("sub-{}", video_id),
            quiz_id: format!("quiz-{}", video_id),
            video_id: video_id.to_string(),
            subject_id: "subject-1".to_string(),
            topic_id: "topic-1".to_string(),
            chapter_id: "chapter-1".to_string(),
            total_questions: total,
            correct_count: correct,
            score_percent: percentage,
            elapsed_seconds: 60,
            answers: (0..total as usize)
                .map(|index| SubmissionAnswer {
                    question_index: index,
                    selected_label: Some(OptionLabel::A),
                    is_correct: (index as u32) < correct,
                })
                .collect(),
            submitted_at: Utc::now(),
        }
    }
}

#[derive(Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<SecretString>>,
}

impl TokenStore for InMemoryTokenStore {
    fn access_token(&self) -> AppResult<Option<SecretString>> {
        Ok(self.token.lock().unwrap().clone())
    }

    fn put_access_token(&self, token: SecretString) -> AppResult<()> {
        *self.token.lock().unwrap() = Some(token);
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPendingStore {
    entries: Mutex<HashMap<String, Submission>>,
}

impl PendingSubmissionStore for InMemoryPendingStore {
    fn put(&self, video_id: &str, submission: &Submission) -> AppResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(video_id.to_string(), submission.clone());
        Ok(())
    }

    fn get(&self, video_id: &str) -> AppResult<Option<Submission>> {
        Ok(self.entries.lock().unwrap().get(video_id).cloned())
    }

    fn remove(&self, video_id: &str) -> AppResult<()> {
        self.entries.lock().unwrap().remove(video_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::OptionLabel;

    #[test]
    fn test_sample_document_cycles_correct_labels() {
        let doc = sample_document("video-1", 5);

        assert_eq!(doc.questions[0].correct_label, OptionLabel::A);
        assert_eq!(doc.questions[3].correct_label, OptionLabel::D);
        assert_eq!(doc.questions[4].correct_label, OptionLabel::A);
    }

    #[test]
    fn test_answers_for_covers_every_index() {
        let doc = sample_document("video-1", 4);
        let answers = answers_for(&doc, 2);

        assert_eq!(answers.len(), 4);
        assert_eq!(answers[&0], doc.questions[0].correct_label);
        assert_ne!(answers[&3], doc.questions[3].correct_label);
    }
}
