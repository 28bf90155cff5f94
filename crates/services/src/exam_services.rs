use std::sync::Arc;

use tracing::info;

use exam_core::Clock;
use exam_core::model::{Attempt, AttemptId, ProctorConfig, QuizId};
use providers::{
    HttpProviderConfig, HttpQuestionSource, HttpSubmissionSink, QuestionSource, SubmissionSink,
};

use crate::error::SessionError;
use crate::session::controller::SessionController;
use crate::session::monitor::FullscreenControl;
use crate::session::notify;
use crate::session::notify::NotificationReceiver;
use crate::session::runtime::{SessionHandle, SessionRuntime};

/// Assembles the collaborator set and starts attempts.
///
/// One instance outlives many attempts; each `start_attempt` builds a
/// fresh controller, monitor, and runtime, so nothing carries over from a
/// previous session.
#[derive(Clone)]
pub struct ExamServices {
    clock: Clock,
    config: ProctorConfig,
    source: Arc<dyn QuestionSource>,
    sink: Arc<dyn SubmissionSink>,
    fullscreen: Arc<dyn FullscreenControl>,
}

impl ExamServices {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: ProctorConfig,
        source: Arc<dyn QuestionSource>,
        sink: Arc<dyn SubmissionSink>,
        fullscreen: Arc<dyn FullscreenControl>,
    ) -> Self {
        Self {
            clock,
            config,
            source,
            sink,
            fullscreen,
        }
    }

    /// Services backed by the quiz HTTP API.
    #[must_use]
    pub fn over_http(
        config: ProctorConfig,
        http: HttpProviderConfig,
        fullscreen: Arc<dyn FullscreenControl>,
    ) -> Self {
        Self::new(
            Clock::default_clock(),
            config,
            Arc::new(HttpQuestionSource::new(http.clone())),
            Arc::new(HttpSubmissionSink::new(http)),
            fullscreen,
        )
    }

    #[must_use]
    pub fn config(&self) -> ProctorConfig {
        self.config
    }

    /// Fetch the quiz and start a proctored attempt.
    ///
    /// On success the monitor is armed, full-screen acquisition has been
    /// attempted, and the countdown is ticking; drive the returned runtime
    /// to completion and watch the notification receiver.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the quiz cannot be fetched or has no
    /// questions. Check [`SessionError::is_unavailable`] to decide whether
    /// to present a permanent "unavailable" state.
    pub async fn start_attempt(
        &self,
        quiz_id: QuizId,
    ) -> Result<(SessionRuntime, SessionHandle, NotificationReceiver), SessionError> {
        let quiz = self.source.fetch_quiz(quiz_id).await?;
        info!(quiz_id = quiz_id.value(), title = quiz.title(), "quiz loaded");

        let mut attempt = Attempt::new(AttemptId::generate(), quiz, self.config);
        attempt.start(self.clock.now())?;

        let (notifications, receiver) = notify::channel();
        let controller = SessionController::open(
            attempt,
            self.clock,
            Arc::clone(&self.sink),
            Arc::clone(&self.fullscreen),
            notifications,
        );
        let (runtime, handle) = SessionRuntime::start(controller);
        Ok((runtime, handle, receiver))
    }
}
