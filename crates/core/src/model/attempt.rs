use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::answer::{Answer, AnswerSheet};
use crate::model::config::ProctorConfig;
use crate::model::ids::{AttemptId, QuizId};
use crate::model::question::{Question, Quiz};
use crate::model::violation::{ViolationKind, ViolationWarning};

//
// ─── STATUS & REASONS ──────────────────────────────────────────────────────────
//

/// Lifecycle of an attempt.
///
/// Transitions run strictly forward: `Loading → InProgress →
/// {Submitted, Terminated}`. Terminal states absorb every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStatus {
    Loading,
    InProgress,
    Submitted,
    Terminated,
}

impl AttemptStatus {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptStatus::Submitted | AttemptStatus::Terminated)
    }
}

/// Why an attempt closed. `ViolationLimit` yields `Terminated`; the other
/// reasons yield `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitReason {
    Manual,
    Timeout,
    ViolationLimit,
}

/// Cursor movement for question navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

//
// ─── OPERATION OUTCOMES ────────────────────────────────────────────────────────
//

/// Result of a clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The attempt continues with this many seconds left.
    Running { remaining: u32 },
    /// The countdown just hit zero. The caller must finish the attempt
    /// with [`SubmitReason::Timeout`]; this outcome is produced exactly
    /// once, on the transition to zero.
    Expired,
}

/// Result of recording a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationOutcome {
    /// Below the limit: warn the user and keep going.
    Warned(ViolationWarning),
    /// The limit was reached. The caller must finish the attempt with
    /// [`SubmitReason::ViolationLimit`].
    LimitReached { kind: ViolationKind, count: u32 },
}

/// Wire-ready record of a closed attempt, handed to the submission sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub attempt_id: AttemptId,
    pub quiz_id: QuizId,
    /// One entry per question in question order; unanswered slots are `-1`.
    pub answers: Vec<i64>,
    pub elapsed_seconds: u32,
    pub termination_reason: SubmitReason,
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    /// The question source returned a quiz with no questions. The attempt
    /// never enters `InProgress`; callers present this as "unavailable",
    /// which is not a termination.
    #[error("quiz has no questions")]
    EmptyQuestionSet,

    /// `start` on an attempt that already left `Loading`.
    #[error("attempt already started")]
    AlreadyStarted,

    /// The operation is only valid while the attempt is in progress.
    #[error("attempt is not in progress")]
    NotInProgress,

    #[error("question index {index} out of range ({len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },

    #[error("choice index {choice} out of range for question {question}")]
    ChoiceOutOfRange { question: usize, choice: u32 },
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// One user's run through a fixed question sequence under a time budget.
///
/// The attempt is the single source of truth for whether a submission
/// happens and why. Every mutation goes through the methods below, and
/// each of them refuses to act once the status has left `InProgress`, so
/// stale timer or UI events cannot resurrect a closed attempt.
#[derive(Debug, Clone)]
pub struct Attempt {
    id: AttemptId,
    quiz: Quiz,
    config: ProctorConfig,
    answers: AnswerSheet,
    current_index: usize,
    time_remaining: u32,
    status: AttemptStatus,
    violation_count: u32,
    termination_reason: Option<SubmitReason>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl Attempt {
    /// Create an attempt shell for a fetched quiz. It stays in `Loading`
    /// until [`Attempt::start`] succeeds.
    #[must_use]
    pub fn new(id: AttemptId, quiz: Quiz, config: ProctorConfig) -> Self {
        Self {
            id,
            quiz,
            config,
            answers: AnswerSheet::empty(),
            current_index: 0,
            time_remaining: 0,
            status: AttemptStatus::Loading,
            violation_count: 0,
            termination_reason: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Complete loading: validate the question set, initialize the answer
    /// sheet, and arm the countdown.
    ///
    /// # Errors
    ///
    /// Returns `EmptyQuestionSet` if the quiz has no questions (the
    /// attempt stays in `Loading`), or `AlreadyStarted` if loading was
    /// already completed.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), AttemptError> {
        if self.status != AttemptStatus::Loading {
            return Err(AttemptError::AlreadyStarted);
        }
        if self.quiz.is_empty() {
            return Err(AttemptError::EmptyQuestionSet);
        }

        self.answers = AnswerSheet::all_unanswered(self.quiz.question_count());
        self.time_remaining = self.config.total_duration_secs;
        self.started_at = Some(now);
        self.status = AttemptStatus::InProgress;
        Ok(())
    }

    /// Record a choice for a question, overwriting any prior selection.
    ///
    /// # Errors
    ///
    /// `NotInProgress` for stale events after the attempt closed (callers
    /// drop these silently), or an out-of-range error for bad indexes.
    pub fn select_answer(&mut self, question: usize, choice: u32) -> Result<(), AttemptError> {
        self.ensure_in_progress()?;

        let len = self.quiz.question_count();
        if question >= len {
            return Err(AttemptError::QuestionOutOfRange {
                index: question,
                len,
            });
        }
        if (choice as usize) >= self.quiz.questions()[question].choice_count() {
            return Err(AttemptError::ChoiceOutOfRange { question, choice });
        }

        self.answers.set(question, Answer::Choice(choice));
        Ok(())
    }

    /// Move the cursor one question forward or back. Motion past either
    /// end is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// `NotInProgress` once the attempt has closed.
    pub fn navigate(&mut self, direction: Direction) -> Result<usize, AttemptError> {
        self.ensure_in_progress()?;

        match direction {
            Direction::Previous => {
                self.current_index = self.current_index.saturating_sub(1);
            }
            Direction::Next => {
                if self.current_index + 1 < self.quiz.question_count() {
                    self.current_index += 1;
                }
            }
        }
        Ok(self.current_index)
    }

    /// Advance the countdown by one second.
    ///
    /// Returns [`TickOutcome::Expired`] exactly once, on the transition to
    /// zero; the caller must then finish with [`SubmitReason::Timeout`].
    /// A zero counter never decrements further and never re-fires.
    ///
    /// # Errors
    ///
    /// `NotInProgress` once the attempt has closed.
    pub fn tick(&mut self) -> Result<TickOutcome, AttemptError> {
        self.ensure_in_progress()?;

        if self.time_remaining == 0 {
            return Ok(TickOutcome::Running { remaining: 0 });
        }
        self.time_remaining -= 1;
        if self.time_remaining == 0 {
            Ok(TickOutcome::Expired)
        } else {
            Ok(TickOutcome::Running {
                remaining: self.time_remaining,
            })
        }
    }

    /// Count a violation against the configured limit.
    ///
    /// Every occurrence counts; rapid repeats are not coalesced. Below the
    /// limit the outcome carries the warning to present; at the limit the
    /// caller must finish with [`SubmitReason::ViolationLimit`].
    ///
    /// # Errors
    ///
    /// `NotInProgress` once the attempt has closed.
    pub fn report_violation(
        &mut self,
        kind: ViolationKind,
    ) -> Result<ViolationOutcome, AttemptError> {
        self.ensure_in_progress()?;

        self.violation_count += 1;
        if self.violation_count >= self.config.violation_limit {
            Ok(ViolationOutcome::LimitReached {
                kind,
                count: self.violation_count,
            })
        } else {
            Ok(ViolationOutcome::Warned(ViolationWarning {
                kind,
                count: self.violation_count,
                limit: self.config.violation_limit,
            }))
        }
    }

    /// Close the attempt and produce the submission payload.
    ///
    /// The terminal transition commits here, before any sink I/O, and at
    /// most once: when an expiry and a violation limit land in the same
    /// instant, whichever caller gets here first wins and the loser
    /// observes `NotInProgress`.
    ///
    /// # Errors
    ///
    /// `NotInProgress` if the attempt already closed (or never started).
    pub fn finish(
        &mut self,
        reason: SubmitReason,
        now: DateTime<Utc>,
    ) -> Result<SubmissionPayload, AttemptError> {
        self.ensure_in_progress()?;

        self.status = match reason {
            SubmitReason::ViolationLimit => AttemptStatus::Terminated,
            SubmitReason::Manual | SubmitReason::Timeout => AttemptStatus::Submitted,
        };
        self.termination_reason = Some(reason);
        self.completed_at = Some(now);

        Ok(SubmissionPayload {
            attempt_id: self.id,
            quiz_id: self.quiz.id(),
            answers: self.answers.encode(),
            elapsed_seconds: self
                .config
                .total_duration_secs
                .saturating_sub(self.time_remaining),
            termination_reason: reason,
        })
    }

    fn ensure_in_progress(&self) -> Result<(), AttemptError> {
        if self.status == AttemptStatus::InProgress {
            Ok(())
        } else {
            Err(AttemptError::NotInProgress)
        }
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn id(&self) -> AttemptId {
        self.id
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn config(&self) -> &ProctorConfig {
        &self.config
    }

    #[must_use]
    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.questions().get(self.current_index)
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub fn violation_count(&self) -> u32 {
        self.violation_count
    }

    #[must_use]
    pub fn termination_reason(&self) -> Option<SubmitReason> {
        self.termination_reason
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn build_quiz(questions: usize) -> Quiz {
        let questions = (0..questions)
            .map(|i| {
                Question::new(
                    format!("Question {i}"),
                    vec!["a".into(), "b".into(), "c".into(), "d".into()],
                )
                .unwrap()
            })
            .collect();
        Quiz::new(QuizId::new(1), "Sample", questions)
    }

    fn started(questions: usize, config: ProctorConfig) -> Attempt {
        let mut attempt = Attempt::new(AttemptId::generate(), build_quiz(questions), config);
        attempt.start(fixed_now()).unwrap();
        attempt
    }

    #[test]
    fn start_initializes_answers_and_countdown() {
        let attempt = started(5, ProctorConfig::default());
        assert_eq!(attempt.status(), AttemptStatus::InProgress);
        assert_eq!(attempt.answers().len(), 5);
        assert_eq!(attempt.answers().answered_count(), 0);
        assert_eq!(attempt.time_remaining(), 120);
        assert_eq!(attempt.started_at(), Some(fixed_now()));
    }

    #[test]
    fn start_rejects_empty_quiz_and_stays_loading() {
        let mut attempt = Attempt::new(
            AttemptId::generate(),
            build_quiz(0),
            ProctorConfig::default(),
        );
        let err = attempt.start(fixed_now()).unwrap_err();
        assert_eq!(err, AttemptError::EmptyQuestionSet);
        assert_eq!(attempt.status(), AttemptStatus::Loading);
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut attempt = started(2, ProctorConfig::default());
        assert_eq!(
            attempt.start(fixed_now()).unwrap_err(),
            AttemptError::AlreadyStarted
        );
    }

    #[test]
    fn operations_before_start_are_rejected() {
        let mut attempt = Attempt::new(
            AttemptId::generate(),
            build_quiz(2),
            ProctorConfig::default(),
        );
        assert_eq!(attempt.tick().unwrap_err(), AttemptError::NotInProgress);
        assert_eq!(
            attempt.select_answer(0, 0).unwrap_err(),
            AttemptError::NotInProgress
        );
    }

    #[test]
    fn select_answer_overwrites() {
        let mut attempt = started(3, ProctorConfig::default());
        attempt.select_answer(1, 0).unwrap();
        attempt.select_answer(1, 2).unwrap();
        assert_eq!(attempt.answers().get(1), Some(Answer::Choice(2)));
    }

    #[test]
    fn select_answer_validates_indexes() {
        let mut attempt = started(3, ProctorConfig::default());
        assert_eq!(
            attempt.select_answer(3, 0).unwrap_err(),
            AttemptError::QuestionOutOfRange { index: 3, len: 3 }
        );
        assert_eq!(
            attempt.select_answer(0, 4).unwrap_err(),
            AttemptError::ChoiceOutOfRange {
                question: 0,
                choice: 4
            }
        );
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut attempt = started(3, ProctorConfig::default());
        assert_eq!(attempt.navigate(Direction::Previous).unwrap(), 0);
        assert_eq!(attempt.navigate(Direction::Next).unwrap(), 1);
        assert_eq!(attempt.navigate(Direction::Next).unwrap(), 2);
        assert_eq!(attempt.navigate(Direction::Next).unwrap(), 2);
        assert_eq!(attempt.navigate(Direction::Previous).unwrap(), 1);
    }

    #[test]
    fn countdown_expires_exactly_once() {
        let config = ProctorConfig {
            total_duration_secs: 120,
            ..ProctorConfig::default()
        };
        let mut attempt = started(2, config);

        let mut expiries = 0;
        for _ in 0..120 {
            if attempt.tick().unwrap() == TickOutcome::Expired {
                expiries += 1;
            }
        }
        assert_eq!(expiries, 1);
        assert_eq!(attempt.time_remaining(), 0);

        // A zero counter neither decrements nor re-fires.
        assert_eq!(
            attempt.tick().unwrap(),
            TickOutcome::Running { remaining: 0 }
        );
        assert_eq!(attempt.time_remaining(), 0);
    }

    #[test]
    fn violations_below_limit_warn() {
        let mut attempt = started(2, ProctorConfig::default());

        for expected in 1..=2 {
            let outcome = attempt.report_violation(ViolationKind::TabSwitch).unwrap();
            assert_eq!(
                outcome,
                ViolationOutcome::Warned(ViolationWarning {
                    kind: ViolationKind::TabSwitch,
                    count: expected,
                    limit: 3,
                })
            );
        }
        assert_eq!(attempt.status(), AttemptStatus::InProgress);
        assert_eq!(attempt.violation_count(), 2);
    }

    #[test]
    fn third_violation_reaches_limit() {
        let mut attempt = started(2, ProctorConfig::default());
        attempt.report_violation(ViolationKind::TabSwitch).unwrap();
        attempt
            .report_violation(ViolationKind::FullscreenExit)
            .unwrap();
        let outcome = attempt.report_violation(ViolationKind::TabSwitch).unwrap();
        assert_eq!(
            outcome,
            ViolationOutcome::LimitReached {
                kind: ViolationKind::TabSwitch,
                count: 3,
            }
        );
    }

    #[test]
    fn finish_routes_reason_to_terminal_status() {
        let mut manual = started(2, ProctorConfig::default());
        manual.finish(SubmitReason::Manual, fixed_now()).unwrap();
        assert_eq!(manual.status(), AttemptStatus::Submitted);

        let mut timed = started(2, ProctorConfig::default());
        timed.finish(SubmitReason::Timeout, fixed_now()).unwrap();
        assert_eq!(timed.status(), AttemptStatus::Submitted);

        let mut violated = started(2, ProctorConfig::default());
        violated
            .finish(SubmitReason::ViolationLimit, fixed_now())
            .unwrap();
        assert_eq!(violated.status(), AttemptStatus::Terminated);
        assert_eq!(
            violated.termination_reason(),
            Some(SubmitReason::ViolationLimit)
        );
    }

    #[test]
    fn finish_is_idempotent_under_racing_callers() {
        let mut attempt = started(2, ProctorConfig::default());
        attempt.finish(SubmitReason::Timeout, fixed_now()).unwrap();
        // The losing side of the race observes a closed attempt.
        assert_eq!(
            attempt
                .finish(SubmitReason::ViolationLimit, fixed_now())
                .unwrap_err(),
            AttemptError::NotInProgress
        );
        assert_eq!(attempt.status(), AttemptStatus::Submitted);
        assert_eq!(attempt.termination_reason(), Some(SubmitReason::Timeout));
    }

    #[test]
    fn closed_attempt_ignores_every_mutation() {
        let mut attempt = started(3, ProctorConfig::default());
        attempt.select_answer(0, 1).unwrap();
        attempt.finish(SubmitReason::Manual, fixed_now()).unwrap();

        let before = attempt.answers().clone();
        assert_eq!(
            attempt.select_answer(0, 3).unwrap_err(),
            AttemptError::NotInProgress
        );
        assert_eq!(
            attempt.navigate(Direction::Next).unwrap_err(),
            AttemptError::NotInProgress
        );
        assert_eq!(attempt.tick().unwrap_err(), AttemptError::NotInProgress);
        assert_eq!(
            attempt
                .report_violation(ViolationKind::TabSwitch)
                .unwrap_err(),
            AttemptError::NotInProgress
        );
        assert_eq!(attempt.answers(), &before);
        assert_eq!(attempt.violation_count(), 0);
    }

    #[test]
    fn payload_encodes_partial_answers() {
        let mut attempt = started(5, ProctorConfig::default());
        attempt.select_answer(0, 2).unwrap();
        attempt.select_answer(1, 2).unwrap();
        attempt.select_answer(3, 2).unwrap();

        let payload = attempt.finish(SubmitReason::Manual, fixed_now()).unwrap();
        assert_eq!(payload.answers, vec![2, 2, -1, 2, -1]);
        assert_eq!(payload.termination_reason, SubmitReason::Manual);
        assert_eq!(payload.quiz_id, QuizId::new(1));
    }

    #[test]
    fn payload_reports_elapsed_seconds() {
        let config = ProctorConfig {
            total_duration_secs: 10,
            ..ProctorConfig::default()
        };
        let mut attempt = started(2, config);
        for _ in 0..4 {
            attempt.tick().unwrap();
        }
        let payload = attempt.finish(SubmitReason::Manual, fixed_now()).unwrap();
        assert_eq!(payload.elapsed_seconds, 4);
    }

    #[test]
    fn timeout_scenario_submits_all_unanswered() {
        let config = ProctorConfig {
            total_duration_secs: 5,
            ..ProctorConfig::default()
        };
        let mut attempt = started(3, config);

        let mut expired = false;
        for _ in 0..5 {
            expired = attempt.tick().unwrap() == TickOutcome::Expired;
        }
        assert!(expired);

        let payload = attempt.finish(SubmitReason::Timeout, fixed_now()).unwrap();
        assert_eq!(payload.answers, vec![-1, -1, -1]);
        assert_eq!(payload.elapsed_seconds, 5);
        assert_eq!(payload.termination_reason, SubmitReason::Timeout);
    }

    #[test]
    fn termination_reason_serializes_snake_case() {
        let json = serde_json::to_string(&SubmitReason::ViolationLimit).unwrap();
        assert_eq!(json, r#""violation_limit""#);
    }
}
