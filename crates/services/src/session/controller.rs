use std::sync::Arc;

use tracing::{debug, info, warn};

use exam_core::Clock;
use exam_core::model::{
    Attempt, AttemptError, AttemptStatus, Direction, SubmitReason, TickOutcome, ViolationOutcome,
};
use providers::SubmissionSink;

use crate::session::monitor::{EnvSignal, FullscreenControl, IntegrityMonitor};
use crate::session::notify::{Notification, NotificationSender};
use crate::session::progress::AttemptProgress;

/// Sole mutator of an in-progress attempt.
///
/// Every event source — the ticker, environment signals, user commands —
/// funnels into these methods from a single runtime task, so each event
/// is applied atomically with respect to the others. Collaborator
/// failures are converted into notifications here; none of them escape.
pub struct SessionController {
    attempt: Attempt,
    monitor: IntegrityMonitor,
    clock: Clock,
    sink: Arc<dyn SubmissionSink>,
    fullscreen: Arc<dyn FullscreenControl>,
    notifications: NotificationSender,
}

impl SessionController {
    /// Take ownership of a started attempt, arm the monitor, and try to
    /// acquire full-screen (best-effort: failure only warns).
    pub(crate) fn open(
        attempt: Attempt,
        clock: Clock,
        sink: Arc<dyn SubmissionSink>,
        fullscreen: Arc<dyn FullscreenControl>,
        notifications: NotificationSender,
    ) -> Self {
        let mut monitor = IntegrityMonitor::new();
        monitor.arm();

        let controller = Self {
            attempt,
            monitor,
            clock,
            sink,
            fullscreen,
            notifications,
        };

        if controller.attempt.config().require_fullscreen {
            if let Err(err) = controller.fullscreen.enter() {
                warn!(error = %err, "fullscreen acquisition failed, continuing without it");
                controller.notify(Notification::FullscreenUnavailable);
            }
        }

        info!(
            attempt_id = %controller.attempt.id(),
            questions = controller.attempt.quiz().question_count(),
            duration_secs = controller.attempt.config().total_duration_secs,
            "attempt started"
        );
        controller
    }

    /// Record a choice. Stale events after the attempt closed are dropped
    /// silently; out-of-range indexes are logged and dropped.
    pub fn select_answer(&mut self, question: usize, choice: u32) {
        match self.attempt.select_answer(question, choice) {
            Ok(()) => {}
            Err(AttemptError::NotInProgress) => {
                debug!(question, "dropping stale answer event after close");
            }
            Err(err) => warn!(error = %err, "rejected answer selection"),
        }
    }

    /// Move the question cursor. Stale events are dropped silently.
    pub fn navigate(&mut self, direction: Direction) {
        if let Err(AttemptError::NotInProgress) = self.attempt.navigate(direction) {
            debug!("dropping stale navigation event after close");
        }
    }

    /// Advance the countdown; submits with `Timeout` when it expires.
    pub async fn tick(&mut self) {
        match self.attempt.tick() {
            Ok(TickOutcome::Expired) => {
                info!("time expired");
                self.submit(SubmitReason::Timeout).await;
            }
            Ok(TickOutcome::Running { .. }) => {}
            // Closed in the same instant; the ticker is about to stop.
            Err(_) => {}
        }
    }

    /// Apply a raw environment signal. Signals while the monitor is
    /// disarmed — in particular the full-screen exit that follows a
    /// terminal transition — are dropped before they reach the attempt.
    pub async fn handle_signal(&mut self, signal: EnvSignal) {
        let Some(kind) = self.monitor.observe(signal) else {
            debug!(?signal, "signal ignored while disarmed");
            return;
        };

        match self.attempt.report_violation(kind) {
            Ok(ViolationOutcome::Warned(warning)) => {
                warn!(
                    kind = warning.kind.describe(),
                    count = warning.count,
                    limit = warning.limit,
                    "integrity violation"
                );
                self.notify(Notification::ViolationWarning(warning));
            }
            Ok(ViolationOutcome::LimitReached { kind, count }) => {
                warn!(kind = kind.describe(), count, "violation limit reached");
                self.submit(SubmitReason::ViolationLimit).await;
            }
            // Lost a race against another closing event.
            Err(_) => {}
        }
    }

    /// Close the attempt and push the payload to the sink.
    ///
    /// Idempotent under racing callers: the terminal transition commits
    /// first, so only the first caller reaches the sink. The `Closed`
    /// notification goes out before the sink call so the presentation
    /// layer locks without waiting on the network, and a sink failure is
    /// surfaced as a notification — it never reopens the attempt.
    pub async fn submit(&mut self, reason: SubmitReason) {
        let payload = match self.attempt.finish(reason, self.clock.now()) {
            Ok(payload) => payload,
            // Already closed; a concurrent expiry or violation got here first.
            Err(_) => return,
        };

        // Disarm before leaving full-screen: the exit signal that follows
        // must not count as a violation.
        self.monitor.disarm();
        if self.attempt.config().require_fullscreen {
            self.fullscreen.exit();
        }

        info!(
            attempt_id = %payload.attempt_id,
            reason = ?reason,
            answered = self.attempt.answers().answered_count(),
            "attempt closed"
        );
        self.notify(Notification::Closed { reason });

        match self.sink.submit(&payload).await {
            Ok(receipt) => {
                self.notify(Notification::SubmissionRecorded { receipt });
            }
            Err(err) => {
                warn!(error = %err, "submission sink failed; answers may not have been recorded");
                self.notify(Notification::SubmissionFailed { reason });
            }
        }
    }

    fn notify(&self, notification: Notification) {
        // The receiver may already be gone when the view is discarded.
        let _ = self.notifications.send(notification);
    }

    #[must_use]
    pub fn status(&self) -> AttemptStatus {
        self.attempt.status()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.attempt.is_closed()
    }

    #[must_use]
    pub fn attempt(&self) -> &Attempt {
        &self.attempt
    }

    #[must_use]
    pub fn progress(&self) -> AttemptProgress {
        AttemptProgress::from_attempt(&self.attempt)
    }

    #[cfg(test)]
    pub(crate) fn monitor(&self) -> &IntegrityMonitor {
        &self.monitor
    }
}
