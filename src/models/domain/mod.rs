pub mod question;
pub mod quiz_document;
pub mod submission;

pub use question::{OptionLabel, Question, QuestionOption};
pub use quiz_document::QuizDocument;
pub use submission::{AnswerMap, ScoreResult, Submission, SubmissionAnswer};
