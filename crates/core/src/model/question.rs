use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuizId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt is empty")]
    EmptyPrompt,

    #[error("question has no choices")]
    NoChoices,

    #[error("choice {index} is empty")]
    EmptyChoice { index: usize },
}

/// A single multiple-choice question as shown to the user.
///
/// Choices are an ordered sequence; the order is meaningful because
/// answers are encoded as choice indexes. The correct choice is known
/// only to the server and has no field here at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    prompt: String,
    choices: Vec<String>,
}

impl Question {
    /// Validate prompt and choices into an immutable question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, the choice list is
    /// empty, or any individual choice is blank.
    pub fn new(prompt: impl Into<String>, choices: Vec<String>) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if choices.is_empty() {
            return Err(QuestionError::NoChoices);
        }
        for (index, choice) in choices.iter().enumerate() {
            if choice.trim().is_empty() {
                return Err(QuestionError::EmptyChoice { index });
            }
        }

        Ok(Self { prompt, choices })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn choice_count(&self) -> usize {
        self.choices.len()
    }
}

/// An ordered question sequence fetched for one attempt.
///
/// Fixed once constructed; nothing mutates it afterwards. An empty quiz
/// is representable (the source may legitimately return one) — rejecting
/// it is the attempt's job at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    title: String,
    questions: Vec<Question>,
}

impl Quiz {
    #[must_use]
    pub fn new(id: QuizId, title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id,
            title: title.into(),
            questions,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
