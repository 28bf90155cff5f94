//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::AttemptError;
use providers::SourceError;

/// Errors emitted while starting a session.
///
/// Sink failures never appear here: by the time the sink runs, the
/// terminal transition has already committed, so those surface as
/// notifications instead of errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The quiz could not be fetched from the question source.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The quiz loaded but the attempt cannot start (empty question set).
    #[error(transparent)]
    Attempt(#[from] AttemptError),
}

impl SessionError {
    /// True when the session should be presented as permanently
    /// unavailable rather than failed-for-now.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            SessionError::Attempt(AttemptError::EmptyQuestionSet)
                | SessionError::Source(SourceError::NotFound)
        )
    }
}
