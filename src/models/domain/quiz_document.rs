use serde::{Deserialize, Serialize};

use crate::models::domain::question::Question;

/// The fetched, ordered set of questions plus context metadata for one video.
/// Immutable once fetched; owned by the session for its lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizDocument {
    pub quiz_id: String,
    pub video_id: String,
    pub subject_id: String,
    pub topic_id: String,
    pub chapter_id: String,
    pub questions: Vec<Question>,
}

impl QuizDocument {
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Index of the final question. Documents are validated non-empty at the
    /// fetch boundary, so this never underflows in practice.
    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::fixtures::sample_document;

    #[test]
    fn document_counts_and_last_index() {
        let doc = sample_document("video-1", 5);

        assert_eq!(doc.total_questions(), 5);
        assert_eq!(doc.last_index(), 4);
        assert_eq!(doc.video_id, "video-1");
    }

    #[test]
    fn document_round_trip_serialization() {
        let doc = sample_document("video-1", 3);

        let json = serde_json::to_string(&doc).expect("document should serialize");
        let parsed = serde_json::from_str::<super::QuizDocument>(&json)
            .expect("document should deserialize");

        assert_eq!(doc, parsed);
    }
}
