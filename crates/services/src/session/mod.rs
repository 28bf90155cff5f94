pub(crate) mod controller;
pub(crate) mod monitor;
pub(crate) mod notify;
pub(crate) mod progress;
pub(crate) mod runtime;

// Public API of the session subsystem.
pub use controller::SessionController;
pub use monitor::{
    EnvSignal, FullscreenControl, FullscreenError, IntegrityMonitor, NoopFullscreen,
};
pub use notify::{Notification, NotificationReceiver, NotificationSender};
pub use progress::AttemptProgress;
pub use runtime::{SessionEvent, SessionHandle, SessionRuntime, UserCommand};
