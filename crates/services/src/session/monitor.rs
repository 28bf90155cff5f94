use thiserror::Error;

use exam_core::model::ViolationKind;

/// Raw signals from the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvSignal {
    /// The document became hidden (tab change, minimized window).
    VisibilityHidden,
    /// Full-screen mode was exited.
    FullscreenExited,
}

#[derive(Debug, Error)]
#[error("fullscreen unavailable: {0}")]
pub struct FullscreenError(pub String);

/// Best-effort control of the host's full-screen state.
///
/// Acquisition is not a precondition for starting an attempt: a failure
/// only warns the user.
pub trait FullscreenControl: Send + Sync {
    /// Request full-screen.
    ///
    /// # Errors
    ///
    /// Returns `FullscreenError` when the host refuses.
    fn enter(&self) -> Result<(), FullscreenError>;

    /// Leave full-screen. Callers ignore failures.
    fn exit(&self);
}

/// Full-screen control for hosts without a window, such as tests and the
/// headless driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFullscreen;

impl FullscreenControl for NoopFullscreen {
    fn enter(&self) -> Result<(), FullscreenError> {
        Ok(())
    }

    fn exit(&self) {}
}

/// Maps environment signals to violations while armed.
///
/// Armed exactly while the attempt is in progress. Disarm happens before
/// the programmatic full-screen exit on a terminal transition, so that
/// exit never registers as a violation. Signals are never debounced:
/// every occurrence counts, flicker included.
#[derive(Debug, Default)]
pub struct IntegrityMonitor {
    armed: bool,
}

impl IntegrityMonitor {
    /// A monitor that starts disarmed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Translate a raw signal into a violation; `None` while disarmed.
    #[must_use]
    pub fn observe(&self, signal: EnvSignal) -> Option<ViolationKind> {
        if !self.armed {
            return None;
        }
        Some(match signal {
            EnvSignal::VisibilityHidden => ViolationKind::TabSwitch,
            EnvSignal::FullscreenExited => ViolationKind::FullscreenExit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disarmed_monitor_drops_signals() {
        let monitor = IntegrityMonitor::new();
        assert_eq!(monitor.observe(EnvSignal::VisibilityHidden), None);
        assert_eq!(monitor.observe(EnvSignal::FullscreenExited), None);
    }

    #[test]
    fn armed_monitor_maps_each_signal() {
        let mut monitor = IntegrityMonitor::new();
        monitor.arm();
        assert_eq!(
            monitor.observe(EnvSignal::VisibilityHidden),
            Some(ViolationKind::TabSwitch)
        );
        assert_eq!(
            monitor.observe(EnvSignal::FullscreenExited),
            Some(ViolationKind::FullscreenExit)
        );
    }

    #[test]
    fn disarm_takes_effect_immediately() {
        let mut monitor = IntegrityMonitor::new();
        monitor.arm();
        monitor.disarm();
        assert_eq!(monitor.observe(EnvSignal::FullscreenExited), None);
        assert!(!monitor.is_armed());
    }
}
