use serde::{Deserialize, Serialize};

/// Wire encoding for a question left unanswered.
///
/// The grading endpoint has always received `-1` for an unselected
/// question (an index lookup on a missing selection), so that is the one
/// sentinel this codebase uses.
pub const UNANSWERED_SENTINEL: i64 = -1;

/// Selection state for a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    #[default]
    Unanswered,
    Choice(u32),
}

impl Answer {
    #[must_use]
    pub fn is_answered(&self) -> bool {
        matches!(self, Answer::Choice(_))
    }

    /// Encode for the submission payload.
    #[must_use]
    pub fn encode(&self) -> i64 {
        match self {
            Answer::Unanswered => UNANSWERED_SENTINEL,
            Answer::Choice(index) => i64::from(*index),
        }
    }
}

/// One selection slot per question, in question order.
///
/// Created all-unanswered when loading completes and mutated only through
/// the attempt while it is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSheet {
    slots: Vec<Answer>,
}

impl AnswerSheet {
    /// A sheet with no slots, for an attempt that has not finished loading.
    #[must_use]
    pub fn empty() -> Self {
        Self { slots: Vec::new() }
    }

    /// A sheet with `len` unanswered slots.
    #[must_use]
    pub fn all_unanswered(len: usize) -> Self {
        Self {
            slots: vec![Answer::Unanswered; len],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Answer> {
        self.slots.get(index).copied()
    }

    pub(crate) fn set(&mut self, index: usize, answer: Answer) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = answer;
        }
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_answered()).count()
    }

    /// Encode the sheet for the submission sink: one entry per question in
    /// question order, unanswered slots as [`UNANSWERED_SENTINEL`].
    #[must_use]
    pub fn encode(&self) -> Vec<i64> {
        self.slots.iter().map(Answer::encode).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_sheet_is_all_unanswered() {
        let sheet = AnswerSheet::all_unanswered(3);
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.answered_count(), 0);
        assert_eq!(sheet.encode(), vec![-1, -1, -1]);
    }

    #[test]
    fn set_overwrites_prior_selection() {
        let mut sheet = AnswerSheet::all_unanswered(2);
        sheet.set(0, Answer::Choice(1));
        sheet.set(0, Answer::Choice(3));
        assert_eq!(sheet.get(0), Some(Answer::Choice(3)));
        assert_eq!(sheet.answered_count(), 1);
    }

    #[test]
    fn set_out_of_range_is_ignored() {
        let mut sheet = AnswerSheet::all_unanswered(1);
        sheet.set(5, Answer::Choice(0));
        assert_eq!(sheet.encode(), vec![-1]);
    }

    #[test]
    fn encode_mixes_choices_and_sentinel() {
        let mut sheet = AnswerSheet::all_unanswered(4);
        sheet.set(0, Answer::Choice(2));
        sheet.set(2, Answer::Choice(0));
        assert_eq!(sheet.encode(), vec![2, -1, 0, -1]);
    }
}
