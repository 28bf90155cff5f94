#![forbid(unsafe_code)]

pub mod error;
pub mod exam_services;
pub mod session;

pub use exam_core::Clock;

pub use error::SessionError;
pub use exam_services::ExamServices;
pub use session::{
    AttemptProgress, EnvSignal, FullscreenControl, FullscreenError, IntegrityMonitor,
    NoopFullscreen, Notification, NotificationReceiver, NotificationSender, SessionController,
    SessionEvent, SessionHandle, SessionRuntime, UserCommand,
};
