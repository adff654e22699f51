use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::date_key::DateKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalNotification {
    pub date: DateKey,
    pub goal: u32,
    pub count: usize,
    pub title: String,
    pub body: String,
    pub raised_at: DateTime<Utc>,
}

impl GoalNotification {
    pub fn completed(date: DateKey, goal: u32, count: usize) -> Self {
        Self {
            date,
            goal,
            count,
            title: "Daily goal reached".to_string(),
            body: format!(
                "You wrote {count} gratitude statement{} for {date}.",
                if count == 1 { "" } else { "s" }
            ),
            raised_at: Utc::now(),
        }
    }
}

/// Platform-specific notification adapters will implement this trait.
pub trait NotificationSink: Send + Sync {
    fn goal_completed(&self, notification: &GoalNotification);
}

/// Default sink for headless use: the notification becomes a log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn goal_completed(&self, notification: &GoalNotification) {
        info!(
            date = %notification.date,
            goal = notification.goal,
            count = notification.count,
            "{}",
            notification.body
        );
    }
}
