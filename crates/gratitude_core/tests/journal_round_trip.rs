use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use gratitude_core::{
    backend::JournalBackend,
    calendar::MarkColors,
    entry::Mood,
    profile::{Profile, ProfileSource},
    prompt::{PromptState, RefreshAction},
    DateKey, JournalService, JournalStore,
};
use tempfile::tempdir;

fn write_file(path: &PathBuf, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, contents).expect("write fixture");
}

fn key(s: &str) -> DateKey {
    DateKey::parse(s).expect("date key")
}

#[test]
fn streak_calendar_and_history_from_disk() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path();

    for day in ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-05"] {
        write_file(
            &root.join("entries").join(format!("{day}.json")),
            &format!(
                r#"{{"entry_date":"{day}","statements":["sunrise on {day}"],"moods":{{"0":"calm"}},"created_at":"{day}T08:00:00Z","updated_at":"{day}T08:00:00Z"}}"#
            ),
        );
    }
    write_file(
        &root.join("profile.json"),
        r#"{"daily_gratitude_goal":2,"use_varied_prompts":true}"#,
    );
    write_file(
        &root.join("prompts.json"),
        r#"[{"id":"p-1","prompt_text":"Who helped you this week?"}]"#,
    );

    let store = Arc::new(JournalStore::builder(root).build().expect("build store"));
    let profile = store.profile().expect("profile");
    let service = JournalService::builder(store.clone())
        .with_prompt_source(store.clone())
        .with_profile(profile)
        .build();

    assert_eq!(service.goal().get(), 2);

    let streak = service.streak().expect("streak");
    assert_eq!(streak.current_streak, 1);
    assert_eq!(streak.longest_streak, 3);
    assert_eq!(streak.last_entry_date, Some(key("2024-01-05")));
    assert!(!streak.is_active(key("2024-01-09")));

    let snapshot = service.day(key("2024-01-02")).expect("day");
    assert_eq!(snapshot.statements(), ["sunrise on 2024-01-02"]);
    assert_eq!(snapshot.progress.percentage, 50);
    assert_eq!(
        snapshot.entry.as_ref().and_then(|entry| entry.mood_for(0)),
        Some(Mood::Calm)
    );

    let marks = service
        .month_marks(2024, 1, Some(key("2024-01-10")), &MarkColors::default())
        .expect("marks");
    assert_eq!(marks.len(), 5);
    assert!(marks[&key("2024-01-05")].marked);
    assert!(marks[&key("2024-01-10")].selected);
    assert!(!marks[&key("2024-01-10")].marked);

    let history = service.history(2).expect("history");
    let dates: Vec<DateKey> = history.iter().map(|entry| entry.entry_date).collect();
    assert_eq!(dates, vec![key("2024-01-05"), key("2024-01-03")]);

    let mut rotator = service.prompt_rotator();
    assert_eq!(service.refresh_prompt(&mut rotator), RefreshAction::Fetch);
    assert!(matches!(rotator.state(), PromptState::Ready(_)));
    assert_eq!(rotator.current_text(), "Who helped you this week?");
}

#[test]
fn mutations_refetch_and_persist() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path();
    let day = key("2024-01-04");

    {
        let store = Arc::new(JournalStore::builder(root).build().expect("build store"));
        let service = JournalService::builder(store.clone())
            .with_profile(Profile::default())
            .build();

        service
            .add_statement(day, "a long walk", Some(Mood::Peaceful))
            .expect("add");
        service.add_statement(day, "old friends", None).expect("add");
        let outcome = service
            .set_mood(day, 1, Some(Mood::Loved))
            .expect("mood");
        assert_eq!(outcome.snapshot.progress.percentage, 67);
        let outcome = service.delete_statement(day, 0).expect("delete");
        assert_eq!(outcome.snapshot.statements(), ["old friends"]);
        assert_eq!(
            outcome.snapshot.entry.as_ref().and_then(|e| e.mood_for(0)),
            Some(Mood::Loved)
        );
    }

    let reopened = JournalStore::builder(root).build().expect("reopen");
    let entry = reopened.get_entry(day).expect("get").expect("entry exists");
    assert_eq!(entry.statements, vec!["old friends"]);
    assert_eq!(entry.mood_for(0), Some(Mood::Loved));
    assert_eq!(
        reopened
            .get_entry_dates_for_month(2024, 1)
            .expect("dates")
            .len(),
        1
    );
}
