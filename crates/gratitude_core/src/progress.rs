use serde::{Deserialize, Serialize};

use crate::error::JournalError;

pub const DEFAULT_DAILY_GOAL: u32 = 3;
pub const ALMOST_THERE_PERCENT: u8 = 80;

/// Number of statements a user aims to write each day. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct DailyGoal(u32);

impl DailyGoal {
    pub fn new(value: i64) -> Result<Self, JournalError> {
        if value <= 0 || value > i64::from(u32::MAX) {
            return Err(JournalError::InvalidGoal(value));
        }
        Ok(Self(value as u32))
    }

    pub fn or_default(value: Option<i64>) -> Self {
        value
            .and_then(|raw| Self::new(raw).ok())
            .unwrap_or_default()
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for DailyGoal {
    fn default() -> Self {
        Self(DEFAULT_DAILY_GOAL)
    }
}

impl TryFrom<i64> for DailyGoal {
    type Error = JournalError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DailyGoal> for i64 {
    fn from(goal: DailyGoal) -> Self {
        i64::from(goal.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Milestone {
    NotStarted,
    Started,
    AlmostThere,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub count: usize,
    pub goal: u32,
    pub percentage: u8,
    pub is_complete: bool,
}

impl Progress {
    pub fn milestone(&self) -> Milestone {
        if self.is_complete {
            Milestone::Complete
        } else if self.percentage >= ALMOST_THERE_PERCENT {
            Milestone::AlmostThere
        } else if self.count > 0 {
            Milestone::Started
        } else {
            Milestone::NotStarted
        }
    }

    pub fn remaining(&self) -> usize {
        (self.goal as usize).saturating_sub(self.count)
    }
}

/// `min(100, round(100 * count / goal))` with halves rounded up.
pub fn progress(count: usize, goal: DailyGoal) -> Progress {
    let goal_value = u128::from(goal.get());
    let scaled = (200 * count as u128 + goal_value) / (2 * goal_value);
    Progress {
        count,
        goal: goal.get(),
        percentage: scaled.min(100) as u8,
        is_complete: count as u128 >= goal_value,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalEvent {
    Completed,
    Rearmed,
}

/// Fires [`GoalEvent::Completed`] once per incomplete to complete transition.
#[derive(Debug, Default, Clone)]
pub struct GoalTracker {
    primed: bool,
    was_complete: bool,
}

impl GoalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first observation only records the state: a day that loads already
    /// complete is not a fresh completion.
    pub fn observe(&mut self, count: usize, goal: DailyGoal) -> Option<GoalEvent> {
        let complete = progress(count, goal).is_complete;
        if !self.primed {
            self.primed = true;
            self.was_complete = complete;
            return None;
        }
        match (self.was_complete, complete) {
            (false, true) => {
                self.was_complete = true;
                Some(GoalEvent::Completed)
            }
            (true, false) => {
                self.was_complete = false;
                Some(GoalEvent::Rearmed)
            }
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.was_complete
    }
}
