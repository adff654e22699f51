use std::collections::BTreeMap;
use std::fmt::Write;

use gratitude_core::{
    calendar::{self, DayMark},
    entry::GratitudeEntry,
    progress::{Milestone, Progress},
    service::DaySnapshot,
    streak::Streak,
    DateKey,
};

const BAR_WIDTH: usize = 20;

pub fn progress_bar(progress: &Progress) -> String {
    let filled = BAR_WIDTH * usize::from(progress.percentage) / 100;
    format!(
        "[{}{}] {:>3}% ({}/{})",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress.percentage,
        progress.count,
        progress.goal
    )
}

pub fn milestone_label(progress: &Progress) -> String {
    match progress.milestone() {
        Milestone::NotStarted => "Nothing written yet".to_string(),
        Milestone::Started => format!("{} to go", progress.remaining()),
        Milestone::AlmostThere => "Almost there".to_string(),
        Milestone::Complete => "Goal reached".to_string(),
    }
}

pub fn statements(entry: &GratitudeEntry) -> String {
    let mut out = String::new();
    for (idx, text) in entry.statements.iter().enumerate() {
        let mood = entry
            .mood_for(idx)
            .map(|mood| format!(" {}", mood.emoji()))
            .unwrap_or_default();
        let _ = writeln!(out, "{:>3}. {}{}", idx + 1, text, mood);
    }
    out
}

pub fn streak_line(streak: &Streak, today: DateKey) -> String {
    let Some(last) = streak.last_entry_date else {
        return "No streak yet".to_string();
    };
    let days = |n: u32| if n == 1 { "day" } else { "days" };
    if streak.is_active(today) {
        format!(
            "Streak {} {} (longest {})",
            streak.current_streak,
            days(streak.current_streak),
            streak.longest_streak
        )
    } else {
        format!(
            "Streak ended: {} {} as of {} (longest {})",
            streak.current_streak,
            days(streak.current_streak),
            last,
            streak.longest_streak
        )
    }
}

pub fn day(snapshot: &DaySnapshot, today: DateKey, prompt: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", heading(snapshot.date, today));
    let _ = writeln!(
        out,
        "{}  {}",
        progress_bar(&snapshot.progress),
        milestone_label(&snapshot.progress)
    );
    match &snapshot.entry {
        Some(entry) if !entry.is_empty() => out.push_str(&statements(entry)),
        _ => {
            if let Some(prompt) = prompt {
                let _ = writeln!(out, "  {prompt}");
            }
        }
    }
    let _ = write!(out, "{}", streak_line(&snapshot.streak, today));
    out
}

/// Monday-first month grid. Entry days carry a dot, the selected day is bracketed.
pub fn month(year: i32, month: u32, marks: &BTreeMap<DateKey, DayMark>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{year}-{month:02}");
    let _ = writeln!(out, " Mo  Tu  We  Th  Fr  Sa  Su");
    for week in calendar::month_grid(year, month) {
        let mut line = String::new();
        for cell in week {
            let text = match cell {
                None => "    ".to_string(),
                Some(date) => {
                    let mark = marks.get(&date);
                    let dot = if mark.map(|m| m.marked).unwrap_or(false) {
                        '•'
                    } else {
                        ' '
                    };
                    let day = date.date().format("%d").to_string();
                    if mark.map(|m| m.selected).unwrap_or(false) {
                        format!("[{day}]")
                    } else {
                        format!("{day}{dot} ")
                    }
                }
            };
            line.push_str(&text);
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

fn heading(date: DateKey, today: DateKey) -> String {
    let calendar = date.date().format("%A, %B %d, %Y");
    match date.days_until(today) {
        0 => format!("Today, {calendar}"),
        1 => format!("Yesterday, {calendar}"),
        _ => calendar.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gratitude_core::{
        calendar::{build_marks, MarkColors},
        progress::{progress, DailyGoal},
        streak::compute_streak,
    };

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    #[test]
    fn bar_scales_with_percentage() {
        let goal = DailyGoal::new(4).unwrap();
        assert_eq!(
            progress_bar(&progress(2, goal)),
            "[##########----------]  50% (2/4)"
        );
        assert!(progress_bar(&progress(9, goal)).starts_with("[####################] 100%"));
    }

    #[test]
    fn streak_line_reports_stale_streaks() {
        let streak = compute_streak([key("2024-01-01"), key("2024-01-02")]);
        assert_eq!(
            streak_line(&streak, key("2024-01-03")),
            "Streak 2 days (longest 2)"
        );
        assert_eq!(
            streak_line(&streak, key("2024-01-10")),
            "Streak ended: 2 days as of 2024-01-02 (longest 2)"
        );
    }

    #[test]
    fn month_grid_marks_entries_and_selection() {
        let dates = [key("2024-01-02")];
        let marks = build_marks(&dates, Some(key("2024-01-03")), &MarkColors::default());
        let text = month(2024, 1, &marks);
        let first_week = text.lines().nth(2).unwrap();
        assert!(first_week.starts_with("01  02• [03]"));
    }
}
