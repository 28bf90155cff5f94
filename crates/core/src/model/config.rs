use serde::{Deserialize, Serialize};

/// Countdown budget for an attempt when none is configured, in seconds.
pub const DEFAULT_DURATION_SECS: u32 = 120;

/// Violation count at which an attempt is terminated, when none is
/// configured.
pub const DEFAULT_VIOLATION_LIMIT: u32 = 3;

/// Policy knobs for one proctored attempt.
///
/// The limit applies uniformly to every violation kind; there is no
/// per-kind threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProctorConfig {
    /// Countdown budget for the whole attempt, in seconds.
    pub total_duration_secs: u32,
    /// Number of violations at which the attempt is terminated.
    pub violation_limit: u32,
    /// Whether to request full-screen when the attempt starts.
    /// Acquisition is best-effort either way.
    pub require_fullscreen: bool,
}

impl Default for ProctorConfig {
    fn default() -> Self {
        Self {
            total_duration_secs: DEFAULT_DURATION_SECS,
            violation_limit: DEFAULT_VIOLATION_LIMIT,
            require_fullscreen: true,
        }
    }
}
