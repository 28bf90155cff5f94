#![forbid(unsafe_code)]

pub mod http;
pub mod memory;
pub mod sink;
pub mod source;

pub use http::{HttpProviderConfig, HttpQuestionSource, HttpSubmissionSink};
pub use memory::{InMemoryQuestionSource, RecordingSink};
pub use sink::{SinkError, SubmissionReceipt, SubmissionSink};
pub use source::{QuestionRecord, QuestionSource, QuizRecord, SourceError};
