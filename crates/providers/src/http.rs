use std::env;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use exam_core::model::{Quiz, QuizId, SubmissionPayload};

use crate::sink::{SinkError, SubmissionReceipt, SubmissionSink};
use crate::source::{QuestionSource, QuizRecord, SourceError};

/// Connection settings for the quiz API.
#[derive(Clone, Debug)]
pub struct HttpProviderConfig {
    pub base_url: String,
}

impl HttpProviderConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Read the base URL from `EXAM_API_URL`, falling back to the local
    /// development server.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            env::var("EXAM_API_URL").unwrap_or_else(|_| "http://localhost:8000/api".into());
        Self { base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Question source backed by the quiz HTTP API.
#[derive(Clone)]
pub struct HttpQuestionSource {
    client: Client,
    config: HttpProviderConfig,
}

impl HttpQuestionSource {
    #[must_use]
    pub fn new(config: HttpProviderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    async fn fetch_quiz(&self, id: QuizId) -> Result<Quiz, SourceError> {
        let url = self
            .config
            .endpoint(&format!("quiz/getQuizById/{}", id.value()));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| SourceError::Network(err.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(SourceError::NotFound),
            status if !status.is_success() => {
                return Err(SourceError::Network(format!("status {status}")));
            }
            _ => {}
        }

        let record: QuizRecord = response
            .json()
            .await
            .map_err(|err| SourceError::Network(err.to_string()))?;
        Ok(record.into_quiz()?)
    }
}

/// Submission sink backed by the quiz HTTP API.
#[derive(Clone)]
pub struct HttpSubmissionSink {
    client: Client,
    config: HttpProviderConfig,
}

impl HttpSubmissionSink {
    #[must_use]
    pub fn new(config: HttpProviderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl SubmissionSink for HttpSubmissionSink {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SinkError> {
        let url = self.config.endpoint("quiz/quizzes/submit");

        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|err| SinkError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(SinkError::Rejected {
                status: response.status().as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|err| SinkError::Network(err.to_string()))
    }
}
