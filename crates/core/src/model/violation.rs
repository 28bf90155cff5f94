use serde::{Deserialize, Serialize};

/// A detected integrity-policy breach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The document lost visibility (tab change, minimized window).
    TabSwitch,
    /// The user left full-screen mode while it was required.
    FullscreenExit,
}

impl ViolationKind {
    /// User-facing reason text for warnings and termination notices.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            ViolationKind::TabSwitch => "Tab change detected",
            ViolationKind::FullscreenExit => "Fullscreen mode exited",
        }
    }
}

/// Payload for the violation-warning channel: the breach that just
/// happened and where the count stands against the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViolationWarning {
    pub kind: ViolationKind,
    pub count: u32,
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_have_distinct_descriptions() {
        assert_ne!(
            ViolationKind::TabSwitch.describe(),
            ViolationKind::FullscreenExit.describe()
        );
    }
}
