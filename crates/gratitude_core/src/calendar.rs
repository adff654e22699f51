use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::date_key::DateKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkColors {
    pub dot: String,
    pub primary: String,
    pub on_primary: String,
}

impl Default for MarkColors {
    fn default() -> Self {
        Self {
            dot: "#F4A261".to_string(),
            primary: "#2A9D8F".to_string(),
            on_primary: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMark {
    pub marked: bool,
    pub dot_color: Option<String>,
    pub selected: bool,
    pub selected_color: Option<String>,
    pub selected_text_color: Option<String>,
}

/// Map every entry day to a dot marker and highlight `selected`, which does not
/// need an entry of its own.
pub fn build_marks<'a, I>(
    entry_dates: I,
    selected: Option<DateKey>,
    colors: &MarkColors,
) -> BTreeMap<DateKey, DayMark>
where
    I: IntoIterator<Item = &'a DateKey>,
{
    let mut marks: BTreeMap<DateKey, DayMark> = entry_dates
        .into_iter()
        .map(|date| {
            (
                *date,
                DayMark {
                    marked: true,
                    dot_color: Some(colors.dot.clone()),
                    ..DayMark::default()
                },
            )
        })
        .collect();

    if let Some(date) = selected {
        let mark = marks.entry(date).or_default();
        mark.selected = true;
        mark.selected_color = Some(colors.primary.clone());
        mark.selected_text_color = Some(colors.on_primary.clone());
    }

    marks
}

/// First and last day of the month, `None` for an invalid month.
pub fn month_bounds(year: i32, month: u32) -> Option<(DateKey, DateKey)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = next_first.pred_opt()?;
    Some((DateKey::from_date(first), DateKey::from_date(last)))
}

/// Monday-first weeks covering the month; padding cells are `None`.
pub fn month_grid(year: i32, month: u32) -> Vec<[Option<DateKey>; 7]> {
    let Some((first, last)) = month_bounds(year, month) else {
        return Vec::new();
    };
    let mut weeks = Vec::new();
    let mut week: [Option<DateKey>; 7] = [None; 7];
    let mut column = first.date().weekday().num_days_from_monday() as usize;
    let mut day = first;
    loop {
        week[column] = Some(day);
        column += 1;
        if column == 7 {
            weeks.push(week);
            week = [None; 7];
            column = 0;
        }
        if day == last {
            break;
        }
        day = day.succ();
    }
    if column != 0 {
        weeks.push(week);
    }
    weeks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    #[test]
    fn entry_days_get_dots() {
        let dates: BTreeSet<DateKey> = [key("2024-01-01"), key("2024-01-03")].into();
        let colors = MarkColors::default();
        let marks = build_marks(&dates, None, &colors);
        assert_eq!(marks.len(), 2);
        let mark = &marks[&key("2024-01-01")];
        assert!(mark.marked);
        assert_eq!(mark.dot_color.as_deref(), Some("#F4A261"));
        assert!(!mark.selected);
    }

    #[test]
    fn selected_day_without_entry_is_highlighted_only() {
        let dates: BTreeSet<DateKey> = [key("2024-01-01")].into();
        let colors = MarkColors::default();
        let marks = build_marks(&dates, Some(key("2024-01-09")), &colors);
        let selected = &marks[&key("2024-01-09")];
        assert!(!selected.marked);
        assert!(selected.dot_color.is_none());
        assert!(selected.selected);
        assert_eq!(selected.selected_color.as_deref(), Some("#2A9D8F"));
        assert_eq!(selected.selected_text_color.as_deref(), Some("#FFFFFF"));
    }

    #[test]
    fn selected_entry_day_keeps_dot() {
        let dates: BTreeSet<DateKey> = [key("2024-01-01")].into();
        let marks = build_marks(&dates, Some(key("2024-01-01")), &MarkColors::default());
        let mark = &marks[&key("2024-01-01")];
        assert!(mark.marked && mark.selected);
    }

    #[test]
    fn building_twice_is_identical() {
        let dates: BTreeSet<DateKey> = [key("2024-01-01"), key("2024-01-02")].into();
        let colors = MarkColors::default();
        let first = build_marks(&dates, Some(key("2024-01-02")), &colors);
        let second = build_marks(&dates, Some(key("2024-01-02")), &colors);
        assert_eq!(first, second);
    }

    #[test]
    fn month_bounds_handle_leap_years_and_december() {
        assert_eq!(
            month_bounds(2024, 2),
            Some((key("2024-02-01"), key("2024-02-29")))
        );
        assert_eq!(
            month_bounds(2023, 12),
            Some((key("2023-12-01"), key("2023-12-31")))
        );
        assert_eq!(month_bounds(2023, 13), None);
    }

    #[test]
    fn grid_starts_on_monday() {
        // 2024-01-01 is a Monday, 2024-09-01 a Sunday.
        let january = month_grid(2024, 1);
        assert_eq!(january[0][0], Some(key("2024-01-01")));
        assert_eq!(january.len(), 5);
        let september = month_grid(2024, 9);
        assert_eq!(september[0][6], Some(key("2024-09-01")));
        assert!(september[0][..6].iter().all(Option::is_none));
        assert_eq!(september.len(), 6);
    }
}
