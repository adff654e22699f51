use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::date_key::DateKey;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_entry_date: Option<DateKey>,
}

impl Streak {
    /// True when the most recent entry was written today or yesterday.
    pub fn is_active(&self, today: DateKey) -> bool {
        match self.last_entry_date {
            Some(last) => {
                let gap = last.days_until(today);
                (0..=1).contains(&gap)
            }
            None => false,
        }
    }

    /// Current streak as seen from `today`; a stale streak counts as zero.
    pub fn current_as_of(&self, today: DateKey) -> u32 {
        if self.is_active(today) {
            self.current_streak
        } else {
            0
        }
    }
}

/// Derive current and longest consecutive-day runs from the days that carry
/// at least one statement. The current run ends at the most recent day.
pub fn compute_streak<I>(dates: I) -> Streak
where
    I: IntoIterator<Item = DateKey>,
{
    let days: BTreeSet<DateKey> = dates.into_iter().collect();
    let Some(&last) = days.iter().next_back() else {
        return Streak::default();
    };

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<DateKey> = None;
    for &day in &days {
        run = match previous {
            Some(prev) if prev.succ() == day => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }

    // `run` now holds the length of the run ending at `last`.
    Streak {
        current_streak: run,
        longest_streak: longest,
        last_entry_date: Some(last),
    }
}
