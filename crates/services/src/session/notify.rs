use tokio::sync::mpsc;

use exam_core::model::{SubmitReason, ViolationWarning};
use providers::SubmissionReceipt;

/// User-facing signals emitted by the session.
///
/// Purely observational: the presentation layer renders these and never
/// answers back. `Closed` arrives the moment the terminal transition
/// commits — before the sink call completes — so the UI locks without
/// waiting on the network.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// A violation below the limit: warn and keep going.
    ViolationWarning(ViolationWarning),
    /// Full-screen could not be acquired; the attempt continues anyway.
    FullscreenUnavailable,
    /// The attempt closed for this reason. Lock the controls.
    Closed { reason: SubmitReason },
    /// The sink accepted the submission and reported a grade.
    SubmissionRecorded { receipt: SubmissionReceipt },
    /// The sink call failed after the terminal transition; the answers
    /// may not have reached the server.
    SubmissionFailed { reason: SubmitReason },
}

pub type NotificationSender = mpsc::UnboundedSender<Notification>;
pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

pub(crate) fn channel() -> (NotificationSender, NotificationReceiver) {
    mpsc::unbounded_channel()
}
