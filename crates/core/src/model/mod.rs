mod answer;
mod attempt;
mod config;
mod ids;
mod question;
mod violation;

pub use ids::{AttemptId, QuizId};

pub use answer::{Answer, AnswerSheet, UNANSWERED_SENTINEL};
pub use attempt::{
    Attempt, AttemptError, AttemptStatus, Direction, SubmissionPayload, SubmitReason, TickOutcome,
    ViolationOutcome,
};
pub use config::{DEFAULT_DURATION_SECS, DEFAULT_VIOLATION_LIMIT, ProctorConfig};
pub use question::{Question, QuestionError, Quiz};
pub use violation::{ViolationKind, ViolationWarning};
