use thiserror::Error;

use crate::date_key::DateKey;

/// Failures a caller is expected to surface to the user instead of aborting.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JournalError {
    #[error("gratitude statement cannot be empty")]
    EmptyStatement,
    #[error("gratitude statement is {len} characters long, the limit is {max}")]
    StatementTooLong { len: usize, max: usize },
    #[error("no statement #{index} on {date} (entry has {len})")]
    StatementIndexOutOfRange {
        date: DateKey,
        index: usize,
        len: usize,
    },
    #[error("no gratitude entry for {0}")]
    EntryNotFound(DateKey),
    #[error("`{0}` is not a valid date (expected YYYY-MM-DD)")]
    InvalidDateKey(String),
    #[error("daily goal must be positive, got {0}")]
    InvalidGoal(i64),
    #[error("no prompt available")]
    PromptUnavailable,
}

impl JournalError {
    /// Validation errors are shown inline next to the input rather than as a toast.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            JournalError::EmptyStatement
                | JournalError::StatementTooLong { .. }
                | JournalError::InvalidDateKey(_)
                | JournalError::InvalidGoal(_)
        )
    }
}
