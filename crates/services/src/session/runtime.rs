use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use exam_core::model::{Direction, SubmitReason};

use crate::session::controller::SessionController;
use crate::session::monitor::EnvSignal;

/// Interval between countdown ticks.
pub(crate) const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// User action arriving from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    SelectAnswer { question: usize, choice: u32 },
    Navigate(Direction),
    Submit,
}

/// Events funneled into the session runtime.
///
/// All sources converge on one channel so handling is serialized: no
/// handler ever observes a half-applied predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// One-second countdown tick.
    Tick,
    /// Raw environment signal (visibility / full-screen).
    Env(EnvSignal),
    /// User action.
    Command(UserCommand),
}

/// Cloneable handle for pushing events into a running session.
#[derive(Clone)]
pub struct SessionHandle {
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle").finish_non_exhaustive()
    }
}

impl SessionHandle {
    /// Forward a raw environment signal.
    pub fn signal(&self, signal: EnvSignal) {
        let _ = self.events.send(SessionEvent::Env(signal));
    }

    /// Forward a user command.
    pub fn command(&self, command: UserCommand) {
        let _ = self.events.send(SessionEvent::Command(command));
    }
}

/// Drives one attempt to its terminal status.
///
/// Owns the event funnel and the 1 Hz ticker task. The `run` loop is the
/// single consumer of the funnel, which is what makes event handling
/// atomic. The ticker is aborted when the attempt closes or the runtime
/// is dropped, so no timer leaks into a later attempt.
pub struct SessionRuntime {
    controller: SessionController,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    ticker: JoinHandle<()>,
}

impl std::fmt::Debug for SessionRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRuntime").finish_non_exhaustive()
    }
}

impl SessionRuntime {
    /// Wrap a controller, spawn the ticker, and hand back the push handle.
    #[must_use]
    pub fn start(controller: SessionController) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        // The ticker only holds a weak sender: channel lifetime follows
        // the view's handles, so a discarded view stops the loop instead
        // of the timer keeping the session alive forever.
        let weak = tx.downgrade();
        let handle = SessionHandle { events: tx };

        let ticker = tokio::spawn(async move {
            let mut interval = time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick completes immediately; consume it so
            // the countdown starts one full second after arming.
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(events) = weak.upgrade() else { break };
                if events.send(SessionEvent::Tick).is_err() {
                    break;
                }
            }
        });

        (
            Self {
                controller,
                events: rx,
                ticker,
            },
            handle,
        )
    }

    /// Consume events until the attempt reaches a terminal status, or
    /// until every handle is gone. Tears the ticker down on exit.
    pub async fn run(&mut self) {
        while !self.controller.is_closed() {
            let Some(event) = self.events.recv().await else {
                debug!("all session handles dropped; stopping runtime");
                break;
            };
            self.dispatch(event).await;
        }
        self.ticker.abort();
    }

    async fn dispatch(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Tick => self.controller.tick().await,
            SessionEvent::Env(signal) => self.controller.handle_signal(signal).await,
            SessionEvent::Command(UserCommand::SelectAnswer { question, choice }) => {
                self.controller.select_answer(question, choice);
            }
            SessionEvent::Command(UserCommand::Navigate(direction)) => {
                self.controller.navigate(direction);
            }
            SessionEvent::Command(UserCommand::Submit) => {
                self.controller.submit(SubmitReason::Manual).await;
            }
        }
    }

    #[must_use]
    pub fn controller(&self) -> &SessionController {
        &self.controller
    }
}

impl Drop for SessionRuntime {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::monitor::NoopFullscreen;
    use crate::session::notify;
    use exam_core::model::{
        Attempt, AttemptId, AttemptStatus, ProctorConfig, Question, Quiz, QuizId,
    };
    use exam_core::time::{fixed_clock, fixed_now};
    use providers::RecordingSink;
    use std::sync::Arc;

    fn start_runtime(
        config: ProctorConfig,
        sink: &RecordingSink,
    ) -> (SessionRuntime, SessionHandle) {
        let questions = (0..3)
            .map(|i| {
                Question::new(format!("Q{i}"), vec!["a".into(), "b".into(), "c".into()]).unwrap()
            })
            .collect();
        let quiz = Quiz::new(QuizId::new(1), "Sample", questions);
        let mut attempt = Attempt::new(AttemptId::generate(), quiz, config);
        attempt.start(fixed_now()).unwrap();
        let (tx, _rx) = notify::channel();
        let controller = SessionController::open(
            attempt,
            fixed_clock(),
            Arc::new(sink.clone()),
            Arc::new(NoopFullscreen),
            tx,
        );
        SessionRuntime::start(controller)
    }

    #[tokio::test(start_paused = true)]
    async fn unattended_attempt_times_out_after_budget() {
        let sink = RecordingSink::new();
        let config = ProctorConfig {
            total_duration_secs: 5,
            ..ProctorConfig::default()
        };
        let (mut runtime, _handle) = start_runtime(config, &sink);

        // Paused virtual time auto-advances while the runtime is idle, so
        // the five ticks elapse without real waiting.
        runtime.run().await;

        assert_eq!(runtime.controller().status(), AttemptStatus::Submitted);
        assert_eq!(sink.submission_count(), 1);
        let payload = &sink.submissions()[0];
        assert_eq!(payload.termination_reason, exam_core::model::SubmitReason::Timeout);
        assert_eq!(payload.answers, vec![-1, -1, -1]);
        assert_eq!(payload.elapsed_seconds, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_submit_closes_the_loop() {
        let sink = RecordingSink::new();
        let (mut runtime, handle) = start_runtime(ProctorConfig::default(), &sink);

        handle.command(UserCommand::SelectAnswer {
            question: 0,
            choice: 2,
        });
        handle.command(UserCommand::Navigate(Direction::Next));
        handle.command(UserCommand::SelectAnswer {
            question: 1,
            choice: 0,
        });
        handle.command(UserCommand::Submit);

        runtime.run().await;

        assert_eq!(runtime.controller().status(), AttemptStatus::Submitted);
        assert_eq!(sink.submissions()[0].answers, vec![2, 0, -1]);
        assert_eq!(runtime.controller().progress().current_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn violation_limit_terminates_via_signals() {
        let sink = RecordingSink::new();
        let (mut runtime, handle) = start_runtime(ProctorConfig::default(), &sink);

        handle.signal(EnvSignal::VisibilityHidden);
        handle.signal(EnvSignal::VisibilityHidden);
        handle.signal(EnvSignal::VisibilityHidden);

        runtime.run().await;

        assert_eq!(runtime.controller().status(), AttemptStatus::Terminated);
        assert_eq!(sink.submission_count(), 1);
        assert_eq!(
            sink.submissions()[0].termination_reason,
            exam_core::model::SubmitReason::ViolationLimit
        );
    }

    #[tokio::test(start_paused = true)]
    async fn runtime_stops_when_handles_are_dropped() {
        let sink = RecordingSink::new();
        let (mut runtime, handle) = start_runtime(ProctorConfig::default(), &sink);
        drop(handle);

        runtime.run().await;

        // No submission happened: the view was discarded, not submitted.
        assert_eq!(sink.submission_count(), 0);
        assert_eq!(runtime.controller().status(), AttemptStatus::InProgress);
    }
}
