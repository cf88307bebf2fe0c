use serde::Deserialize;

use crate::errors::AppError;
use crate::models::domain::{OptionLabel, Question, QuestionOption, QuizDocument};

/// Wire payload returned by the quiz endpoint. Converted into the domain
/// `QuizDocument` with validation; any defect is a `LoadError` so the caller
/// sees a malformed payload the same way as a failed fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizDocumentResponse {
    pub quiz_id: String,
    pub video_id: String,
    pub subject_id: String,
    pub topic_id: String,
    pub chapter_id: String,
    pub questions: Vec<QuestionResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionResponse {
    pub prompt: String,
    pub options: Vec<OptionResponse>,
    pub correct_label: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionResponse {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthTokenResponse {
    pub access_token: String,
}

impl TryFrom<QuizDocumentResponse> for QuizDocument {
    type Error = AppError;

    fn try_from(dto: QuizDocumentResponse) -> Result<Self, Self::Error> {
        if dto.questions.is_empty() {
            return Err(AppError::LoadError(format!(
                "malformed quiz payload: quiz '{}' has no questions",
                dto.quiz_id
            )));
        }

        let questions = dto
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, q)| convert_question(index, q))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QuizDocument {
            quiz_id: dto.quiz_id,
            video_id: dto.video_id,
            subject_id: dto.subject_id,
            topic_id: dto.topic_id,
            chapter_id: dto.chapter_id,
            questions,
        })
    }
}

fn convert_question(index: usize, dto: QuestionResponse) -> Result<Question, AppError> {
    let correct_label = OptionLabel::parse(&dto.correct_label).ok_or_else(|| {
        AppError::LoadError(format!(
            "malformed quiz payload: question {} has unknown correct label '{}'",
            index, dto.correct_label
        ))
    })?;

    let options = dto
        .options
        .into_iter()
        .map(|opt| {
            let label = OptionLabel::parse(&opt.label).ok_or_else(|| {
                AppError::LoadError(format!(
                    "malformed quiz payload: question {} has unknown option label '{}'",
                    index, opt.label
                ))
            })?;
            Ok(QuestionOption {
                label,
                text: opt.text,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    if !options.iter().any(|opt| opt.label == correct_label) {
        return Err(AppError::LoadError(format!(
            "malformed quiz payload: question {} marks '{}' correct but has no such option",
            index, correct_label
        )));
    }

    Ok(Question {
        prompt: dto.prompt,
        options,
        correct_label,
        explanation: dto.explanation,
    })
}
