use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{date_key::DateKey, error::JournalError};

pub const DEFAULT_MAX_STATEMENT_LEN: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Grateful,
    Happy,
    Peaceful,
    Excited,
    Loved,
    Hopeful,
    Proud,
    Calm,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Grateful,
        Mood::Happy,
        Mood::Peaceful,
        Mood::Excited,
        Mood::Loved,
        Mood::Hopeful,
        Mood::Proud,
        Mood::Calm,
    ];

    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Grateful => "🙏",
            Mood::Happy => "😊",
            Mood::Peaceful => "😌",
            Mood::Excited => "🤩",
            Mood::Loved => "🥰",
            Mood::Hopeful => "🌱",
            Mood::Proud => "💪",
            Mood::Calm => "🧘",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Grateful => "grateful",
            Mood::Happy => "happy",
            Mood::Peaceful => "peaceful",
            Mood::Excited => "excited",
            Mood::Loved => "loved",
            Mood::Hopeful => "hopeful",
            Mood::Proud => "proud",
            Mood::Calm => "calm",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Mood::ALL
            .iter()
            .copied()
            .find(|mood| mood.as_str().eq_ignore_ascii_case(needle) || mood.emoji() == needle)
            .ok_or_else(|| format!("unknown mood `{needle}`"))
    }
}

/// Length limit applied to statements before they reach storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementPolicy {
    pub max_len: usize,
}

impl Default for StatementPolicy {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_STATEMENT_LEN,
        }
    }
}

impl StatementPolicy {
    /// Returns the trimmed statement. Length is measured in characters.
    pub fn validate(&self, text: &str) -> Result<String, JournalError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(JournalError::EmptyStatement);
        }
        let len = trimmed.chars().count();
        if len > self.max_len {
            return Err(JournalError::StatementTooLong {
                len,
                max: self.max_len,
            });
        }
        Ok(trimmed.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GratitudeEntry {
    pub entry_date: DateKey,
    pub statements: Vec<String>,
    #[serde(default)]
    pub moods: BTreeMap<usize, Mood>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GratitudeEntry {
    pub fn new(entry_date: DateKey) -> Self {
        let now = Utc::now();
        Self {
            entry_date,
            statements: Vec::new(),
            moods: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn mood_for(&self, index: usize) -> Option<Mood> {
        self.moods.get(&index).copied()
    }

    pub fn add_statement(
        &mut self,
        policy: &StatementPolicy,
        text: &str,
        mood: Option<Mood>,
    ) -> Result<usize, JournalError> {
        let text = policy.validate(text)?;
        let index = self.statements.len();
        self.statements.push(text);
        if let Some(mood) = mood {
            self.moods.insert(index, mood);
        }
        self.touch();
        Ok(index)
    }

    pub fn edit_statement(
        &mut self,
        policy: &StatementPolicy,
        index: usize,
        text: &str,
    ) -> Result<(), JournalError> {
        self.check_index(index)?;
        let text = policy.validate(text)?;
        self.statements[index] = text;
        self.touch();
        Ok(())
    }

    /// Later moods shift down one slot so they stay attached to their statements.
    pub fn delete_statement(&mut self, index: usize) -> Result<String, JournalError> {
        self.check_index(index)?;
        let removed = self.statements.remove(index);
        self.moods = std::mem::take(&mut self.moods)
            .into_iter()
            .filter(|(i, _)| *i != index)
            .map(|(i, mood)| if i > index { (i - 1, mood) } else { (i, mood) })
            .collect();
        self.touch();
        Ok(removed)
    }

    pub fn set_mood(&mut self, index: usize, mood: Option<Mood>) -> Result<(), JournalError> {
        self.check_index(index)?;
        match mood {
            Some(mood) => {
                self.moods.insert(index, mood);
            }
            None => {
                self.moods.remove(&index);
            }
        }
        self.touch();
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), JournalError> {
        if index >= self.statements.len() {
            return Err(JournalError::StatementIndexOutOfRange {
                date: self.entry_date,
                index,
                len: self.statements.len(),
            });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> GratitudeEntry {
        GratitudeEntry::new(DateKey::parse("2024-01-03").unwrap())
    }

    #[test]
    fn add_trims_and_records_mood() {
        let policy = StatementPolicy::default();
        let mut entry = entry();
        let idx = entry
            .add_statement(&policy, "  warm coffee ", Some(Mood::Calm))
            .unwrap();
        assert_eq!(idx, 0);
        assert_eq!(entry.statements, vec!["warm coffee"]);
        assert_eq!(entry.mood_for(0), Some(Mood::Calm));
    }

    #[test]
    fn rejects_empty_and_long_statements() {
        let policy = StatementPolicy { max_len: 5 };
        let mut entry = entry();
        assert_eq!(
            entry.add_statement(&policy, "   ", None),
            Err(JournalError::EmptyStatement)
        );
        assert_eq!(
            entry.add_statement(&policy, "sunshine", None),
            Err(JournalError::StatementTooLong { len: 8, max: 5 })
        );
        assert!(entry.add_statement(&policy, "héllo", None).is_ok());
        assert!(!entry.is_empty());
    }

    #[test]
    fn delete_shifts_moods_down() {
        let policy = StatementPolicy::default();
        let mut entry = entry();
        entry.add_statement(&policy, "one", Some(Mood::Happy)).unwrap();
        entry.add_statement(&policy, "two", Some(Mood::Loved)).unwrap();
        entry.add_statement(&policy, "three", None).unwrap();
        entry.add_statement(&policy, "four", Some(Mood::Proud)).unwrap();

        assert_eq!(entry.delete_statement(1).unwrap(), "two");
        assert_eq!(entry.statements, vec!["one", "three", "four"]);
        assert_eq!(entry.mood_for(0), Some(Mood::Happy));
        assert_eq!(entry.mood_for(1), None);
        assert_eq!(entry.mood_for(2), Some(Mood::Proud));
        assert_eq!(entry.moods.len(), 2);
    }

    #[test]
    fn edit_keeps_mood_and_checks_bounds() {
        let policy = StatementPolicy::default();
        let mut entry = entry();
        entry.add_statement(&policy, "one", Some(Mood::Hopeful)).unwrap();
        entry.edit_statement(&policy, 0, "uno").unwrap();
        assert_eq!(entry.statements[0], "uno");
        assert_eq!(entry.mood_for(0), Some(Mood::Hopeful));
        assert!(matches!(
            entry.edit_statement(&policy, 3, "x"),
            Err(JournalError::StatementIndexOutOfRange { index: 3, len: 1, .. })
        ));
        assert!(entry.delete_statement(1).is_err());
    }

    #[test]
    fn mood_parses_names_and_emoji() {
        assert_eq!("Happy".parse::<Mood>(), Ok(Mood::Happy));
        assert_eq!("🙏".parse::<Mood>(), Ok(Mood::Grateful));
        assert!("grumpy".parse::<Mood>().is_err());
    }

    #[test]
    fn deserializes_without_moods() {
        let raw = r#"{"entry_date":"2024-01-03","statements":["a"],"created_at":"2024-01-03T10:00:00Z","updated_at":"2024-01-03T10:00:00Z"}"#;
        let entry: GratitudeEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.len(), 1);
        assert!(entry.moods.is_empty());
    }
}
