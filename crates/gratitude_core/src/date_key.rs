use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::JournalError;

const KEY_FORMAT: &str = "%Y-%m-%d";

/// Canonical `YYYY-MM-DD` day identifier used to index entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Calendar day of the timestamp in its own zone.
    pub fn from_datetime<Tz: TimeZone>(datetime: &DateTime<Tz>) -> Self {
        Self(datetime.date_naive())
    }

    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp. For timestamps the date is
    /// taken as written, so `2024-01-03T23:30:00-05:00` maps to `2024-01-03`.
    pub fn parse(input: &str) -> Result<Self, JournalError> {
        let trimmed = input.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, KEY_FORMAT) {
            return Ok(Self(date));
        }
        if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::from_datetime(&datetime));
        }
        Err(JournalError::InvalidDateKey(input.to_string()))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn pred(&self) -> Self {
        Self(self.0 - Duration::days(1))
    }

    pub fn succ(&self) -> Self {
        Self(self.0 + Duration::days(1))
    }

    pub fn days_until(&self, later: DateKey) -> i64 {
        later.0.signed_duration_since(self.0).num_days()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}
