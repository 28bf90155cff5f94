use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use exam_core::model::{Question, QuestionError, Quiz, QuizId};

/// Errors surfaced by question-source providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("quiz not found")]
    NotFound,

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid quiz payload: {0}")]
    InvalidPayload(#[from] QuestionError),
}

/// Wire shape for a quiz as returned by the question API.
///
/// Mirrors the domain `Quiz` so providers can deserialize and validate
/// without leaking transport concerns into the domain layer. There is no
/// correct-answer field: the API never sends one to the client.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizRecord {
    pub id: u64,
    pub title: String,
    pub questions: Vec<QuestionRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRecord {
    pub text: String,
    pub choices: Vec<String>,
}

impl QuizRecord {
    /// Convert the record into a validated domain `Quiz`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if any question fails prompt/choice
    /// validation.
    pub fn into_quiz(self) -> Result<Quiz, QuestionError> {
        let questions = self
            .questions
            .into_iter()
            .map(|record| Question::new(record.text, record.choices))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Quiz::new(QuizId::new(self.id), self.title, questions))
    }
}

/// Contract for fetching the question set of an attempt.
///
/// Choices must come back as an ordered sequence — order is meaningful to
/// the user and to answer-index encoding.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the quiz with the given id.
    ///
    /// # Errors
    ///
    /// `SourceError::NotFound` if no such quiz exists, `Network` on
    /// transport failure, `InvalidPayload` if the response fails domain
    /// validation.
    async fn fetch_quiz(&self, id: QuizId) -> Result<Quiz, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_converts_and_preserves_order() {
        let record = QuizRecord {
            id: 9,
            title: "Networking".into(),
            questions: vec![QuestionRecord {
                text: "Default HTTP port?".into(),
                choices: vec!["21".into(), "80".into(), "443".into()],
            }],
        };

        let quiz = record.into_quiz().unwrap();
        assert_eq!(quiz.id(), QuizId::new(9));
        assert_eq!(quiz.questions()[0].choices(), ["21", "80", "443"]);
    }

    #[test]
    fn record_with_choiceless_question_is_rejected() {
        let record = QuizRecord {
            id: 9,
            title: "Broken".into(),
            questions: vec![QuestionRecord {
                text: "No options".into(),
                choices: Vec::new(),
            }],
        };

        let err = record.into_quiz().unwrap_err();
        assert_eq!(err, QuestionError::NoChoices);
    }

    #[test]
    fn record_deserializes_from_api_json() {
        let json = r#"{
            "id": 4,
            "title": "Sample",
            "questions": [
                {"text": "Pick one", "choices": ["x", "y"]}
            ]
        }"#;
        let record: QuizRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.questions.len(), 1);
        assert_eq!(record.questions[0].choices, ["x", "y"]);
    }
}
