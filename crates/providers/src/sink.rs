use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use exam_core::model::SubmissionPayload;

/// Errors surfaced by submission sinks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SinkError {
    #[error("submission rejected with status {status}")]
    Rejected { status: u16 },

    #[error("network error: {0}")]
    Network(String),
}

/// Grading result the sink reports back on a successful submission.
///
/// Grading itself is server-side; this is only what the server chose to
/// disclose for the completion notice.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmissionReceipt {
    pub score: u32,
    pub total_questions: u32,
    pub percentage: f64,
}

/// The endpoint that durably records a submitted attempt.
///
/// Called at most once per attempt. The caller has already committed the
/// terminal transition before calling, so implementations must not assume
/// a retry will follow a failure.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Deliver the payload of a closed attempt.
    ///
    /// # Errors
    ///
    /// `SinkError::Rejected` when the server refuses the submission,
    /// `Network` on transport failure.
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SinkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_deserializes_from_api_json() {
        let json = r#"{"score": 3, "total_questions": 5, "percentage": 60.0}"#;
        let receipt: SubmissionReceipt = serde_json::from_str(json).unwrap();
        assert_eq!(receipt.score, 3);
        assert_eq!(receipt.total_questions, 5);
        assert!((receipt.percentage - 60.0).abs() < f64::EPSILON);
    }
}
