use std::collections::BTreeSet;

use anyhow::Result;

use crate::{
    date_key::DateKey,
    entry::{GratitudeEntry, Mood},
    streak::Streak,
};

/// Data layer the journal logic reads from and writes to. Implementations own
/// the entries; callers refetch after every mutation instead of patching
/// their own copies.
pub trait JournalBackend: Send + Sync {
    fn get_entry(&self, date: DateKey) -> Result<Option<GratitudeEntry>>;

    fn add_statement(&self, date: DateKey, text: &str, mood: Option<Mood>) -> Result<()>;

    fn edit_statement(&self, date: DateKey, index: usize, text: &str) -> Result<()>;

    fn delete_statement(&self, date: DateKey, index: usize) -> Result<()>;

    fn set_mood(&self, date: DateKey, index: usize, mood: Option<Mood>) -> Result<()>;

    /// Days in the month that carry at least one statement.
    fn get_entry_dates_for_month(&self, year: i32, month: u32) -> Result<BTreeSet<DateKey>>;

    fn get_streak(&self) -> Result<Streak>;

    /// Non-empty entries, newest first.
    fn recent_entries(&self, limit: usize) -> Result<Vec<GratitudeEntry>>;
}
