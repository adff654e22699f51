use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use chrono::Datelike;
use gratitude_core::{
    calendar::MarkColors,
    entry::{StatementPolicy, DEFAULT_MAX_STATEMENT_LEN},
    notifications::LogSink,
    profile::{Profile, ProfileSource},
    progress::{DailyGoal, GoalEvent},
    prompt::RefreshAction,
    service::MutationOutcome,
    DateKey, JournalError, JournalService, JournalStore,
};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::cli::Commands;
use crate::render;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub(crate) root: PathBuf,
    pub(crate) daily_goal: Option<DailyGoal>,
    pub(crate) varied_prompts: Option<bool>,
    pub(crate) max_statement_len: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    /// Unparseable values are ignored with a warning and the default kept.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(root) = lookup("GRATITUDE_ROOT") {
            if !root.trim().is_empty() {
                config.root = PathBuf::from(root);
            }
        }
        if let Some(goal) = lookup("GRATITUDE_DAILY_GOAL") {
            match goal.trim().parse::<i64>().map(DailyGoal::new) {
                Ok(Ok(goal)) => config.daily_goal = Some(goal),
                _ => warn!(value = %goal, "ignoring invalid GRATITUDE_DAILY_GOAL"),
            }
        }
        if let Some(flag) = lookup("GRATITUDE_VARIED_PROMPTS") {
            match parse_flag(&flag) {
                Some(value) => config.varied_prompts = Some(value),
                None => warn!(value = %flag, "ignoring invalid GRATITUDE_VARIED_PROMPTS"),
            }
        }
        if let Some(len) = lookup("GRATITUDE_MAX_STATEMENT_LEN") {
            match len.trim().parse::<usize>() {
                Ok(value) if value > 0 => config.max_statement_len = value,
                _ => warn!(value = %len, "ignoring invalid GRATITUDE_MAX_STATEMENT_LEN"),
            }
        }
        config
    }

    pub fn with_root(mut self, root: PathBuf) -> Self {
        self.root = root;
        self
    }

    pub fn with_goal(mut self, goal: i64) -> Result<Self> {
        self.daily_goal = Some(DailyGoal::new(goal)?);
        Ok(self)
    }

    /// Environment overrides win over what the journal's profile stores.
    fn effective_profile(&self, stored: Profile) -> Profile {
        let mut profile = stored;
        if let Some(varied) = self.varied_prompts {
            profile.use_varied_prompts = varied;
        }
        profile
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("gratitude"),
            daily_goal: None,
            varied_prompts: None,
            max_statement_len: DEFAULT_MAX_STATEMENT_LEN,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Turn a failed action into the one-line message shown to the user.
pub fn status_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<JournalError>() {
        Some(typed) if typed.is_validation() => format!("Invalid input: {typed}"),
        Some(typed) => format!("Unable to complete action: {typed}"),
        None => format!("Something went wrong: {err:#}"),
    }
}

pub struct AppController {
    config: AppConfig,
    store: Arc<JournalStore>,
    service: JournalService,
    today: DateKey,
    json: bool,
}

impl AppController {
    pub fn new(config: AppConfig, json: bool) -> Result<Self> {
        Self::with_today(config, json, DateKey::today())
    }

    pub fn with_today(config: AppConfig, json: bool, today: DateKey) -> Result<Self> {
        info!(root = %config.root.display(), "opening journal");
        let store = Arc::new(
            JournalStore::builder(&config.root)
                .with_statement_policy(StatementPolicy {
                    max_len: config.max_statement_len,
                })
                .build()
                .context("failed to open journal")?,
        );
        let service = Self::build_service(&config, &store, today)?;
        Ok(Self {
            config,
            store,
            service,
            today,
            json,
        })
    }

    fn build_service(
        config: &AppConfig,
        store: &Arc<JournalStore>,
        today: DateKey,
    ) -> Result<JournalService> {
        let profile = config.effective_profile(store.profile()?);
        let mut builder = JournalService::builder(store.clone())
            .with_prompt_source(store.clone())
            .with_profile(profile)
            .with_today(today)
            .with_notification_sink(Box::new(LogSink));
        if let Some(goal) = config.daily_goal {
            builder = builder.with_goal(goal);
        }
        Ok(builder.build())
    }

    pub fn service(&self) -> &JournalService {
        &self.service
    }

    /// Runs a command; failures come back as a status message instead of an error.
    pub fn handle(&mut self, command: Commands) -> std::result::Result<String, String> {
        let start = Instant::now();
        let label = format!("{command:?}");
        let result = self.execute(command);
        debug!(command = %label, elapsed_ms = %start.elapsed().as_millis(), ok = result.is_ok(), "command finished");
        result.map_err(|err| {
            warn!(error = %format!("{err:#}"), "command failed");
            status_message(&err)
        })
    }

    pub fn execute(&mut self, command: Commands) -> Result<String> {
        match command {
            Commands::Today => self.show_day(self.today),
            Commands::Show { date } => self.show_day(date),
            Commands::Add { text, mood, date } => {
                let date = date.unwrap_or(self.today);
                let outcome = self.service.add_statement(date, &text, mood)?;
                self.mutation_output("Statement added", outcome)
            }
            Commands::Edit { index, text, date } => {
                let date = date.unwrap_or(self.today);
                let outcome = self
                    .service
                    .edit_statement(date, to_zero_based(index)?, &text)?;
                self.mutation_output("Statement updated", outcome)
            }
            Commands::Delete { index, date } => {
                let date = date.unwrap_or(self.today);
                let outcome = self.service.delete_statement(date, to_zero_based(index)?)?;
                self.mutation_output("Statement deleted", outcome)
            }
            Commands::Mood { index, mood, date } => {
                let date = date.unwrap_or(self.today);
                let outcome = self.service.set_mood(date, to_zero_based(index)?, mood)?;
                self.mutation_output("Mood updated", outcome)
            }
            Commands::Streak => {
                let streak = self.service.streak()?;
                if self.json {
                    return Ok(json!({
                        "streak": streak,
                        "active": streak.is_active(self.today),
                        "current_as_of_today": streak.current_as_of(self.today),
                    })
                    .to_string());
                }
                Ok(render::streak_line(&streak, self.today))
            }
            Commands::Calendar { month, select } => {
                let (year, month) = match month {
                    Some(raw) => parse_month(&raw)?,
                    None => (self.today.date().year(), self.today.date().month()),
                };
                let marks =
                    self.service
                        .month_marks(year, month, select, &MarkColors::default())?;
                if self.json {
                    let by_day: serde_json::Map<String, serde_json::Value> = marks
                        .iter()
                        .map(|(date, mark)| -> Result<(String, serde_json::Value)> {
                            Ok((date.to_string(), serde_json::to_value(mark)?))
                        })
                        .collect::<Result<_>>()?;
                    return Ok(serde_json::Value::Object(by_day).to_string());
                }
                Ok(render::month(year, month, &marks))
            }
            Commands::Prompt { taps } => self.cycle_prompts(taps),
            Commands::History { limit } => {
                let entries = self.service.history(limit)?;
                if self.json {
                    return Ok(serde_json::to_string(&entries)?);
                }
                if entries.is_empty() {
                    return Ok("No entries yet".to_string());
                }
                let mut out = String::new();
                for entry in entries {
                    out.push_str(&format!("{}\n{}", entry.entry_date, render::statements(&entry)));
                }
                Ok(out.trim_end().to_string())
            }
            Commands::Goal { value } => {
                let goal = DailyGoal::new(value)?;
                let mut profile = self.store.profile()?;
                profile.daily_gratitude_goal = i64::from(goal.get());
                self.store.save_profile(&profile)?;
                self.config.daily_goal = None;
                self.service = Self::build_service(&self.config, &self.store, self.today)?;
                info!(goal = goal.get(), "daily goal updated");
                Ok(format!("Daily goal set to {}", goal.get()))
            }
            Commands::Varied { state } => {
                let mut profile = self.store.profile()?;
                profile.use_varied_prompts = state.enabled();
                self.store.save_profile(&profile)?;
                self.config.varied_prompts = None;
                self.service = Self::build_service(&self.config, &self.store, self.today)?;
                Ok(format!(
                    "Varied prompts {}",
                    if state.enabled() { "enabled" } else { "disabled" }
                ))
            }
        }
    }

    fn show_day(&self, date: DateKey) -> Result<String> {
        let snapshot = self.service.day(date)?;
        if self.json {
            return Ok(serde_json::to_string(&snapshot)?);
        }
        let prompt = self.service.prompt_rotator().current_text();
        Ok(render::day(&snapshot, self.today, Some(&prompt)))
    }

    fn mutation_output(&self, action: &str, outcome: MutationOutcome) -> Result<String> {
        if self.json {
            return Ok(serde_json::to_string(&outcome)?);
        }
        let mut out = format!(
            "{action}\n{}",
            render::day(&outcome.snapshot, self.today, None)
        );
        if outcome.event == Some(GoalEvent::Completed) {
            out.push_str("\nDaily goal reached!");
        }
        Ok(out)
    }

    fn cycle_prompts(&self, taps: usize) -> Result<String> {
        let mut rotator = self.service.prompt_rotator();
        let mut shown = vec![rotator.current()];
        for _ in 0..taps {
            if self.service.refresh_prompt(&mut rotator) == RefreshAction::Ignored {
                continue;
            }
            shown.push(rotator.current());
        }
        if self.json {
            return Ok(serde_json::to_string(&shown)?);
        }
        Ok(shown
            .iter()
            .map(|prompt| prompt.prompt_text.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

fn to_zero_based(index: usize) -> Result<usize> {
    index
        .checked_sub(1)
        .ok_or_else(|| anyhow!("statements are numbered from 1"))
}

fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let (year, month) = raw
        .trim()
        .split_once('-')
        .ok_or_else(|| anyhow!("expected YYYY-MM, got `{raw}`"))?;
    let year: i32 = year.parse().with_context(|| format!("invalid year in `{raw}`"))?;
    let month: u32 = month
        .parse()
        .with_context(|| format!("invalid month in `{raw}`"))?;
    if !(1..=12).contains(&month) {
        return Err(anyhow!("month must be between 1 and 12, got {month}"));
    }
    Ok((year, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gratitude_core::entry::Mood;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    fn controller(root: &std::path::Path) -> AppController {
        let config = AppConfig::default().with_root(root.to_path_buf());
        AppController::with_today(config, false, key("2024-01-03")).unwrap()
    }

    #[test]
    fn config_reads_overrides_and_ignores_garbage() {
        let vars: HashMap<&str, &str> = [
            ("GRATITUDE_ROOT", "/tmp/journal"),
            ("GRATITUDE_DAILY_GOAL", "0"),
            ("GRATITUDE_VARIED_PROMPTS", "yes"),
            ("GRATITUDE_MAX_STATEMENT_LEN", "140"),
        ]
        .into();
        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.root, PathBuf::from("/tmp/journal"));
        assert_eq!(config.daily_goal, None);
        assert_eq!(config.varied_prompts, Some(true));
        assert_eq!(config.max_statement_len, 140);
    }

    #[test]
    fn add_then_show_today() {
        let temp = tempdir().unwrap();
        let mut app = controller(temp.path());
        let out = app
            .handle(Commands::Add {
                text: "clean sheets".into(),
                mood: Some(Mood::Happy),
                date: None,
            })
            .unwrap();
        assert!(out.starts_with("Statement added"));
        let today = app.handle(Commands::Today).unwrap();
        assert!(today.contains("1. clean sheets"));
        assert!(today.contains("(1/3)"));
        assert!(today.contains("Streak 1 day"));
    }

    #[test]
    fn completing_goal_is_announced_once() {
        let temp = tempdir().unwrap();
        let mut app = controller(temp.path());
        app.handle(Commands::Goal { value: 1 }).unwrap();
        let first = app
            .handle(Commands::Add {
                text: "tea".into(),
                mood: None,
                date: None,
            })
            .unwrap();
        assert!(first.ends_with("Daily goal reached!"));
        let second = app
            .handle(Commands::Add {
                text: "toast".into(),
                mood: None,
                date: None,
            })
            .unwrap();
        assert!(!second.contains("Daily goal reached!"));
    }

    #[test]
    fn errors_become_status_messages() {
        let temp = tempdir().unwrap();
        let mut app = controller(temp.path());
        let msg = app
            .handle(Commands::Add {
                text: " ".into(),
                mood: None,
                date: None,
            })
            .unwrap_err();
        assert_eq!(msg, "Invalid input: gratitude statement cannot be empty");

        let msg = app
            .handle(Commands::Delete {
                index: 1,
                date: Some(key("2023-12-25")),
            })
            .unwrap_err();
        assert_eq!(
            msg,
            "Unable to complete action: no gratitude entry for 2023-12-25"
        );

        let msg = app
            .handle(Commands::Edit {
                index: 0,
                text: "x".into(),
                date: None,
            })
            .unwrap_err();
        assert!(msg.contains("numbered from 1"));

        assert!(app
            .handle(Commands::Goal { value: -1 })
            .unwrap_err()
            .starts_with("Invalid input"));
    }

    #[test]
    fn json_day_judges_streak_against_controller_today() {
        let temp = tempdir().unwrap();
        let mut app = controller(temp.path());
        app.handle(Commands::Add {
            text: "fresh coffee".into(),
            mood: None,
            date: None,
        })
        .unwrap();
        app.json = true;
        let out = app.handle(Commands::Today).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["streak_active"], serde_json::Value::Bool(true));
        assert_eq!(value["date"], "2024-01-03");
    }

    #[test]
    fn damaged_settings_files_do_not_block_the_journal() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("prompts.json"), "not json").unwrap();
        std::fs::write(temp.path().join("profile.json"), "[1, 2").unwrap();
        let mut app = controller(temp.path());
        assert_eq!(app.service().goal().get(), 3);
        let out = app
            .handle(Commands::Add {
                text: "sunlight".into(),
                mood: None,
                date: None,
            })
            .unwrap();
        assert!(out.starts_with("Statement added"));
    }

    #[test]
    fn prompt_taps_cycle_fallbacks() {
        let temp = tempdir().unwrap();
        let mut app = controller(temp.path());
        let out = app.handle(Commands::Prompt { taps: 5 }).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], lines[5]);
        assert_ne!(lines[0], lines[1]);
    }

    #[test]
    fn calendar_json_lists_marked_days() {
        let temp = tempdir().unwrap();
        let mut app = controller(temp.path());
        app.handle(Commands::Add {
            text: "snow".into(),
            mood: None,
            date: Some(key("2024-01-02")),
        })
        .unwrap();
        app.json = true;
        let out = app
            .handle(Commands::Calendar {
                month: Some("2024-01".into()),
                select: None,
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["2024-01-02"]["marked"], serde_json::Value::Bool(true));
        assert!(app
            .handle(Commands::Calendar {
                month: Some("2024-13".into()),
                select: None,
            })
            .is_err());
    }

    #[test]
    fn parse_month_accepts_padded_and_plain() {
        assert_eq!(parse_month("2024-03").unwrap(), (2024, 3));
        assert_eq!(parse_month("2024-3").unwrap(), (2024, 3));
        assert!(parse_month("March").is_err());
    }
}
