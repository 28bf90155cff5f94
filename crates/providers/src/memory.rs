use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use exam_core::model::{Quiz, QuizId, SubmissionPayload};

use crate::sink::{SinkError, SubmissionReceipt, SubmissionSink};
use crate::source::{QuestionSource, SourceError};

/// In-memory question source for tests and the demo binary.
#[derive(Clone, Default)]
pub struct InMemoryQuestionSource {
    quizzes: Arc<Mutex<HashMap<QuizId, Quiz>>>,
}

impl InMemoryQuestionSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a quiz so later fetches can find it.
    pub fn insert(&self, quiz: Quiz) {
        if let Ok(mut guard) = self.quizzes.lock() {
            guard.insert(quiz.id(), quiz);
        }
    }
}

#[async_trait]
impl QuestionSource for InMemoryQuestionSource {
    async fn fetch_quiz(&self, id: QuizId) -> Result<Quiz, SourceError> {
        let guard = self
            .quizzes
            .lock()
            .map_err(|err| SourceError::Network(err.to_string()))?;
        guard.get(&id).cloned().ok_or(SourceError::NotFound)
    }
}

/// Sink double that records every payload it receives.
///
/// Succeeds with a zeroed receipt unless constructed with [`failing`];
/// either way the payload log tells tests exactly how often and with what
/// the sink was called.
///
/// [`failing`]: RecordingSink::failing
#[derive(Clone, Default)]
pub struct RecordingSink {
    submissions: Arc<Mutex<Vec<SubmissionPayload>>>,
    fail: bool,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `submit` always fails with a network error — the
    /// payload is still recorded first, like a request that was sent but
    /// never acknowledged.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            submissions: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    /// Every payload received so far, in call order.
    #[must_use]
    pub fn submissions(&self) -> Vec<SubmissionPayload> {
        self.submissions
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn submission_count(&self) -> usize {
        self.submissions.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

#[async_trait]
impl SubmissionSink for RecordingSink {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SinkError> {
        {
            let mut guard = self
                .submissions
                .lock()
                .map_err(|err| SinkError::Network(err.to_string()))?;
            guard.push(payload.clone());
        }

        if self.fail {
            return Err(SinkError::Network("connection reset".into()));
        }

        let total = u32::try_from(payload.answers.len()).unwrap_or(u32::MAX);
        Ok(SubmissionReceipt {
            score: 0,
            total_questions: total,
            percentage: 0.0,
        })
    }
}
