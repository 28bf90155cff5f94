use exam_core::model::Attempt;

/// Aggregated view of attempt progress, useful for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptProgress {
    pub total: usize,
    pub answered: usize,
    pub current_index: usize,
    pub time_remaining: u32,
    pub violation_count: u32,
    pub is_closed: bool,
}

impl AttemptProgress {
    #[must_use]
    pub fn from_attempt(attempt: &Attempt) -> Self {
        Self {
            total: attempt.quiz().question_count(),
            answered: attempt.answers().answered_count(),
            current_index: attempt.current_index(),
            time_remaining: attempt.time_remaining(),
            violation_count: attempt.violation_count(),
            is_closed: attempt.is_closed(),
        }
    }
}
