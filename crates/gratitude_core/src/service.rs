use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    backend::JournalBackend,
    calendar::{self, DayMark, MarkColors},
    date_key::DateKey,
    entry::{GratitudeEntry, Mood},
    notifications::{GoalNotification, NotificationSink},
    profile::Profile,
    progress::{self, DailyGoal, GoalEvent, GoalTracker, Progress},
    prompt::{PromptRotator, PromptSource, RefreshAction},
    streak::Streak,
};

/// Everything a daily view needs for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySnapshot {
    pub date: DateKey,
    pub entry: Option<GratitudeEntry>,
    pub progress: Progress,
    pub streak: Streak,
    pub streak_active: bool,
}

impl DaySnapshot {
    pub fn statements(&self) -> &[String] {
        self.entry
            .as_ref()
            .map(|entry| entry.statements.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationOutcome {
    pub snapshot: DaySnapshot,
    pub event: Option<GoalEvent>,
}

pub struct JournalService {
    backend: Arc<dyn JournalBackend>,
    prompt_source: Option<Arc<dyn PromptSource>>,
    profile: Profile,
    goal: DailyGoal,
    notification_sink: Option<Box<dyn NotificationSink>>,
    today: Option<DateKey>,
    trackers: Mutex<HashMap<DateKey, GoalTracker>>,
}

pub struct JournalServiceBuilder {
    backend: Arc<dyn JournalBackend>,
    prompt_source: Option<Arc<dyn PromptSource>>,
    profile: Profile,
    goal_override: Option<DailyGoal>,
    notification_sink: Option<Box<dyn NotificationSink>>,
    today: Option<DateKey>,
}

impl JournalServiceBuilder {
    pub fn new(backend: Arc<dyn JournalBackend>) -> Self {
        Self {
            backend,
            prompt_source: None,
            profile: Profile::default(),
            goal_override: None,
            notification_sink: None,
            today: None,
        }
    }

    pub fn with_prompt_source(mut self, source: Arc<dyn PromptSource>) -> Self {
        self.prompt_source = Some(source);
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_goal(mut self, goal: DailyGoal) -> Self {
        self.goal_override = Some(goal);
        self
    }

    pub fn with_notification_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.notification_sink = Some(sink);
        self
    }

    /// Pins the date streak activity is judged against. Defaults to the local clock.
    pub fn with_today(mut self, today: DateKey) -> Self {
        self.today = Some(today);
        self
    }

    pub fn build(self) -> JournalService {
        let goal = self.goal_override.unwrap_or_else(|| self.profile.goal());
        JournalService {
            backend: self.backend,
            prompt_source: self.prompt_source,
            profile: self.profile,
            goal,
            notification_sink: self.notification_sink,
            today: self.today,
            trackers: Mutex::new(HashMap::new()),
        }
    }
}

impl JournalService {
    pub fn builder(backend: Arc<dyn JournalBackend>) -> JournalServiceBuilder {
        JournalServiceBuilder::new(backend)
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn goal(&self) -> DailyGoal {
        self.goal
    }

    pub fn today(&self) -> DateKey {
        self.today.unwrap_or_else(DateKey::today)
    }

    pub fn day(&self, date: DateKey) -> Result<DaySnapshot> {
        let snapshot = self.snapshot(date, self.today())?;
        self.trackers
            .lock()
            .entry(date)
            .or_default()
            .observe(snapshot.progress.count, self.goal);
        Ok(snapshot)
    }

    #[instrument(skip(self, text), fields(date = %date))]
    pub fn add_statement(
        &self,
        date: DateKey,
        text: &str,
        mood: Option<Mood>,
    ) -> Result<MutationOutcome> {
        self.prime_tracker(date)?;
        self.backend.add_statement(date, text, mood)?;
        self.after_mutation(date)
    }

    #[instrument(skip(self, text), fields(date = %date))]
    pub fn edit_statement(
        &self,
        date: DateKey,
        index: usize,
        text: &str,
    ) -> Result<MutationOutcome> {
        self.prime_tracker(date)?;
        self.backend.edit_statement(date, index, text)?;
        self.after_mutation(date)
    }

    #[instrument(skip(self), fields(date = %date))]
    pub fn delete_statement(&self, date: DateKey, index: usize) -> Result<MutationOutcome> {
        self.prime_tracker(date)?;
        self.backend.delete_statement(date, index)?;
        self.after_mutation(date)
    }

    #[instrument(skip(self), fields(date = %date))]
    pub fn set_mood(
        &self,
        date: DateKey,
        index: usize,
        mood: Option<Mood>,
    ) -> Result<MutationOutcome> {
        self.prime_tracker(date)?;
        self.backend.set_mood(date, index, mood)?;
        self.after_mutation(date)
    }

    pub fn streak(&self) -> Result<Streak> {
        self.backend.get_streak()
    }

    pub fn month_marks(
        &self,
        year: i32,
        month: u32,
        selected: Option<DateKey>,
        colors: &MarkColors,
    ) -> Result<BTreeMap<DateKey, DayMark>> {
        let dates = self.backend.get_entry_dates_for_month(year, month)?;
        Ok(calendar::build_marks(&dates, selected, colors))
    }

    pub fn history(&self, limit: usize) -> Result<Vec<GratitudeEntry>> {
        self.backend.recent_entries(limit)
    }

    pub fn prompt_rotator(&self) -> PromptRotator {
        PromptRotator::with_defaults(self.profile.use_varied_prompts)
    }

    /// A manual refresh tap. Without a prompt source the rotator stays on its
    /// local list even when varied prompts are enabled.
    pub fn refresh_prompt(&self, rotator: &mut PromptRotator) -> RefreshAction {
        match &self.prompt_source {
            Some(source) => rotator.refresh_with(source.as_ref()),
            None => {
                if rotator.varied() {
                    rotator.set_varied(false);
                }
                rotator.request_refresh()
            }
        }
    }

    fn snapshot(&self, date: DateKey, today: DateKey) -> Result<DaySnapshot> {
        let entry = self.backend.get_entry(date)?;
        let count = entry.as_ref().map(GratitudeEntry::len).unwrap_or(0);
        let streak = self.backend.get_streak()?;
        Ok(DaySnapshot {
            date,
            progress: progress::progress(count, self.goal),
            streak_active: streak.is_active(today),
            streak,
            entry,
        })
    }

    fn prime_tracker(&self, date: DateKey) -> Result<()> {
        if self.trackers.lock().contains_key(&date) {
            return Ok(());
        }
        let count = self
            .backend
            .get_entry(date)?
            .map(|entry| entry.len())
            .unwrap_or(0);
        self.trackers
            .lock()
            .entry(date)
            .or_default()
            .observe(count, self.goal);
        Ok(())
    }

    /// Refetch instead of patching local state, then fire the goal notification
    /// on an incomplete to complete transition.
    fn after_mutation(&self, date: DateKey) -> Result<MutationOutcome> {
        let snapshot = self.snapshot(date, self.today())?;
        let event = self
            .trackers
            .lock()
            .entry(date)
            .or_default()
            .observe(snapshot.progress.count, self.goal);
        debug!(
            count = snapshot.progress.count,
            percentage = snapshot.progress.percentage,
            ?event,
            "entry refreshed"
        );
        if event == Some(GoalEvent::Completed) {
            info!(goal = self.goal.get(), "daily goal completed");
            if let Some(sink) = &self.notification_sink {
                sink.goal_completed(&GoalNotification::completed(
                    date,
                    self.goal.get(),
                    snapshot.progress.count,
                ));
            }
        }
        Ok(MutationOutcome { snapshot, event })
    }
}
