use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::progress::{DailyGoal, DEFAULT_DAILY_GOAL};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub daily_gratitude_goal: i64,
    pub use_varied_prompts: bool,
    pub display_name: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            daily_gratitude_goal: i64::from(DEFAULT_DAILY_GOAL),
            use_varied_prompts: false,
            display_name: None,
        }
    }
}

impl Profile {
    /// Stored goals that are zero or negative fall back to the default.
    pub fn goal(&self) -> DailyGoal {
        DailyGoal::or_default(Some(self.daily_gratitude_goal))
    }
}

pub trait ProfileSource: Send + Sync {
    fn profile(&self) -> Result<Profile>;
    fn save_profile(&self, profile: &Profile) -> Result<()>;
}
