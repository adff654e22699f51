use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::{
    backend::JournalBackend,
    calendar,
    date_key::DateKey,
    entry::{GratitudeEntry, Mood, StatementPolicy},
    error::JournalError,
    profile::{Profile, ProfileSource},
    prompt::{Prompt, PromptSource},
    streak::{self, Streak},
};

const ENTRIES_DIR: &str = "entries";
const PROFILE_FILE: &str = "profile.json";
const PROMPTS_FILE: &str = "prompts.json";

/// Journal kept as one JSON file per day under `<root>/entries`, with the
/// profile and the prompt library next to it.
pub struct JournalStore {
    root: PathBuf,
    policy: StatementPolicy,
    entries: RwLock<BTreeMap<DateKey, GratitudeEntry>>,
    prompts: RwLock<Vec<Prompt>>,
    prompt_cursor: Mutex<usize>,
    stale: Arc<AtomicBool>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

pub struct JournalStoreBuilder {
    root: PathBuf,
    policy: StatementPolicy,
}

impl JournalStoreBuilder {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            policy: StatementPolicy::default(),
        }
    }

    pub fn with_statement_policy(mut self, policy: StatementPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn max_statement_len(mut self, max_len: usize) -> Self {
        self.policy.max_len = max_len;
        self
    }

    pub fn build(self) -> Result<JournalStore> {
        fs::create_dir_all(self.root.join(ENTRIES_DIR)).with_context(|| {
            format!("unable to prepare journal root {}", self.root.display())
        })?;
        let store = JournalStore {
            root: self.root,
            policy: self.policy,
            entries: RwLock::new(BTreeMap::new()),
            prompts: RwLock::new(Vec::new()),
            prompt_cursor: Mutex::new(0),
            stale: Arc::new(AtomicBool::new(false)),
            watcher: Mutex::new(None),
        };
        store.reload_all()?;
        Ok(store)
    }
}

impl JournalStore {
    pub fn builder(root: impl AsRef<Path>) -> JournalStoreBuilder {
        JournalStoreBuilder::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn policy(&self) -> StatementPolicy {
        self.policy
    }

    pub fn reload_all(&self) -> Result<()> {
        let loaded = self.ingest_entries()?;
        let prompts = self.load_prompts();
        info!(
            root = %self.root.display(),
            entries = loaded.len(),
            prompts = prompts.len(),
            "journal loaded"
        );
        *self.entries.write() = loaded;
        *self.prompts.write() = prompts;
        self.stale.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Days that carry at least one statement.
    pub fn entry_dates(&self) -> Result<BTreeSet<DateKey>> {
        self.refresh_if_stale()?;
        Ok(self
            .entries
            .read()
            .values()
            .filter(|entry| !entry.is_empty())
            .map(|entry| entry.entry_date)
            .collect())
    }

    /// Reload lazily on the next read after the filesystem reports a change.
    pub fn watch(&self) -> Result<()> {
        let mut slot = self.watcher.lock();
        if slot.is_some() {
            return Ok(());
        }
        let stale = Arc::clone(&self.stale);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    debug!(?event, "filesystem change detected");
                    stale.store(true, Ordering::SeqCst);
                }
                Err(err) => warn!(%err, "journal watcher error"),
            }
        })?;
        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        info!(root = %self.root.display(), "watching journal for changes");
        *slot = Some(watcher);
        Ok(())
    }

    fn refresh_if_stale(&self) -> Result<()> {
        reload_when_stale(&self.stale, || self.reload_all())
    }

    fn entries_dir(&self) -> PathBuf {
        self.root.join(ENTRIES_DIR)
    }

    fn entry_path(&self, date: DateKey) -> PathBuf {
        self.entries_dir().join(format!("{date}.json"))
    }

    fn ingest_entries(&self) -> Result<BTreeMap<DateKey, GratitudeEntry>> {
        let mut entries = BTreeMap::new();
        let dir = self.entries_dir();
        if !dir.is_dir() {
            return Ok(entries);
        }
        for item in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let item = item?;
            let path = item.path();
            if !item.file_type().is_file() || !is_json_file(path) {
                continue;
            }
            let Some(date) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| DateKey::parse(stem).ok())
            else {
                warn!(path = %path.display(), "skipping file without a date name");
                continue;
            };
            match read_json::<GratitudeEntry>(path) {
                Ok(mut entry) => {
                    if entry.entry_date != date {
                        warn!(path = %path.display(), stored = %entry.entry_date, "entry date differs from file name, using file name");
                        entry.entry_date = date;
                    }
                    entries.insert(date, entry);
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping unreadable entry");
                }
            }
        }
        Ok(entries)
    }

    /// An unreadable library leaves prompts empty so only prompt requests fail.
    fn load_prompts(&self) -> Vec<Prompt> {
        let path = self.root.join(PROMPTS_FILE);
        if !path.is_file() {
            return Vec::new();
        }
        match read_json::<Vec<Prompt>>(&path) {
            Ok(prompts) => prompts
                .into_iter()
                .filter(|prompt| !prompt.prompt_text.trim().is_empty())
                .collect(),
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring unreadable prompt library");
                Vec::new()
            }
        }
    }

    fn persist(&self, entry: &GratitudeEntry) -> Result<()> {
        let path = self.entry_path(entry.entry_date);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(entry)?;
        fs::write(&path, payload)
            .with_context(|| format!("unable to write {}", path.display()))?;
        Ok(())
    }

    /// Apply `change` to a copy of the day's entry, write it, then publish it.
    fn mutate_entry<F>(&self, date: DateKey, create: bool, change: F) -> Result<()>
    where
        F: FnOnce(&mut GratitudeEntry) -> Result<(), JournalError>,
    {
        self.refresh_if_stale()?;
        let mut entries = self.entries.write();
        let mut entry = match entries.get(&date) {
            Some(existing) => existing.clone(),
            None if create => GratitudeEntry::new(date),
            None => return Err(JournalError::EntryNotFound(date).into()),
        };
        change(&mut entry)?;
        self.persist(&entry)?;
        debug!(date = %date, statements = entry.len(), "entry written");
        entries.insert(date, entry);
        Ok(())
    }
}

impl JournalBackend for JournalStore {
    fn get_entry(&self, date: DateKey) -> Result<Option<GratitudeEntry>> {
        self.refresh_if_stale()?;
        Ok(self.entries.read().get(&date).cloned())
    }

    fn add_statement(&self, date: DateKey, text: &str, mood: Option<Mood>) -> Result<()> {
        let policy = self.policy;
        self.mutate_entry(date, true, |entry| {
            entry.add_statement(&policy, text, mood).map(|_| ())
        })
    }

    fn edit_statement(&self, date: DateKey, index: usize, text: &str) -> Result<()> {
        let policy = self.policy;
        self.mutate_entry(date, false, |entry| {
            entry.edit_statement(&policy, index, text)
        })
    }

    fn delete_statement(&self, date: DateKey, index: usize) -> Result<()> {
        self.mutate_entry(date, false, |entry| {
            entry.delete_statement(index).map(|_| ())
        })
    }

    fn set_mood(&self, date: DateKey, index: usize, mood: Option<Mood>) -> Result<()> {
        self.mutate_entry(date, false, |entry| entry.set_mood(index, mood))
    }

    fn get_entry_dates_for_month(&self, year: i32, month: u32) -> Result<BTreeSet<DateKey>> {
        let (first, last) = calendar::month_bounds(year, month)
            .ok_or_else(|| anyhow!("invalid month {year}-{month:02}"))?;
        self.refresh_if_stale()?;
        Ok(self
            .entries
            .read()
            .range(first..=last)
            .filter(|(_, entry)| !entry.is_empty())
            .map(|(date, _)| *date)
            .collect())
    }

    fn get_streak(&self) -> Result<Streak> {
        Ok(streak::compute_streak(self.entry_dates()?))
    }

    fn recent_entries(&self, limit: usize) -> Result<Vec<GratitudeEntry>> {
        self.refresh_if_stale()?;
        Ok(self
            .entries
            .read()
            .values()
            .rev()
            .filter(|entry| !entry.is_empty())
            .take(limit)
            .cloned()
            .collect())
    }
}

impl PromptSource for JournalStore {
    fn get_prompt(&self) -> Result<Prompt> {
        self.refresh_if_stale()?;
        let prompts = self.prompts.read();
        if prompts.is_empty() {
            return Err(JournalError::PromptUnavailable.into());
        }
        let mut cursor = self.prompt_cursor.lock();
        let prompt = prompts[*cursor % prompts.len()].clone();
        *cursor = (*cursor + 1) % prompts.len();
        Ok(prompt)
    }
}

impl ProfileSource for JournalStore {
    fn profile(&self) -> Result<Profile> {
        let path = self.root.join(PROFILE_FILE);
        if !path.is_file() {
            return Ok(Profile::default());
        }
        match read_json::<Profile>(&path) {
            Ok(profile) => Ok(profile),
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring unreadable profile, using defaults");
                Ok(Profile::default())
            }
        }
    }

    fn save_profile(&self, profile: &Profile) -> Result<()> {
        let path = self.root.join(PROFILE_FILE);
        fs::write(&path, serde_json::to_string_pretty(profile)?)
            .with_context(|| format!("unable to write {}", path.display()))
    }
}

/// A failed reload leaves the flag raised so the next read retries.
fn reload_when_stale(stale: &AtomicBool, reload: impl FnOnce() -> Result<()>) -> Result<()> {
    if stale.swap(false, Ordering::SeqCst) {
        debug!("journal changed on disk, reloading");
        if let Err(err) = reload() {
            stale.store(true, Ordering::SeqCst);
            return Err(err);
        }
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
