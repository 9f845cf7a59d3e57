use std::collections::BTreeMap;

use chrono::Duration;

use crate::domain::model::{CalendarEvent, DaySchedule, Reminder};

const TITLE_PREFIX: &str = "HK IPO: ";

/// Groups built events by their resolved start date. Dates with a single
/// event pass through unchanged; dates with several collapse into one
/// consolidated entry so the calendar shows one block per day.
pub fn aggregate_by_day(events: Vec<CalendarEvent>, alarm_minutes: u32) -> Vec<DaySchedule> {
    let mut by_date: BTreeMap<chrono::NaiveDate, Vec<CalendarEvent>> = BTreeMap::new();
    for event in events {
        by_date.entry(event.start).or_default().push(event);
    }

    by_date
        .into_iter()
        .map(|(date, mut day_events)| {
            let titles: Vec<String> = day_events.iter().map(|e| e.title.clone()).collect();
            if day_events.len() == 1 {
                DaySchedule {
                    date,
                    titles,
                    event: day_events.pop().unwrap(),
                }
            } else {
                tracing::info!(
                    "Created consolidated event for {} with {} IPOs",
                    date,
                    day_events.len()
                );
                DaySchedule {
                    date,
                    event: consolidate(date, &day_events, alarm_minutes),
                    titles,
                }
            }
        })
        .collect()
}

fn consolidate(
    date: chrono::NaiveDate,
    events: &[CalendarEvent],
    alarm_minutes: u32,
) -> CalendarEvent {
    let title = format!("HK IPO Day: {} Companies Listing", events.len());

    let mut parts = vec![format!("共{}家公司上市:", events.len())];
    for (i, event) in events.iter().enumerate() {
        let company_info = event.title.strip_prefix(TITLE_PREFIX).unwrap_or(&event.title);
        parts.push(format!("{}. {}", i + 1, company_info));
        if !event.description.is_empty() {
            parts.push(format!("   {}", event.description));
        }
    }

    CalendarEvent {
        reminders: vec![Reminder {
            offset: Duration::minutes(i64::from(alarm_minutes)),
            text: title.clone(),
        }],
        title,
        start: date,
        end: date + Duration::days(1),
        description: parts.join("\n"),
        categories: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
    }

    fn event(title: &str, start: NaiveDate, description: &str) -> CalendarEvent {
        CalendarEvent {
            title: title.to_string(),
            start,
            end: start + Duration::days(1),
            description: description.to_string(),
            categories: vec!["UPCOMING_LISTING".to_string(), "Hong Kong IPO".to_string()],
            reminders: Vec::new(),
        }
    }

    #[test]
    fn test_singleton_dates_pass_through_unchanged() {
        let events = vec![
            event("HK IPO: A (1)", date(1), "desc-a"),
            event("HK IPO: B (2)", date(2), "desc-b"),
        ];
        let days = aggregate_by_day(events.clone(), 30);

        assert_eq!(days.len(), 2);
        for (day, original) in days.iter().zip(&events) {
            assert!(!day.is_consolidated());
            assert_eq!(&day.event, original);
        }
    }

    #[test]
    fn test_two_same_day_events_consolidate() {
        // Scenario B: exactly one consolidated event for the shared date.
        let events = vec![
            event("HK IPO: A (1)", date(5), ""),
            event("HK IPO: B (2)", date(5), ""),
        ];
        let days = aggregate_by_day(events, 30);

        assert_eq!(days.len(), 1);
        let day = &days[0];
        assert!(day.is_consolidated());
        assert_eq!(day.event.title, "HK IPO Day: 2 Companies Listing");
        assert_eq!(day.event.start, date(5));
        assert_eq!(day.event.end, date(6));
    }

    #[test]
    fn test_consolidated_description_lists_titles_in_order() {
        let events = vec![
            event("HK IPO: A (1)", date(5), "line-a"),
            event("HK IPO: B (2)", date(5), ""),
            event("HK IPO: C (3)", date(5), "line-c"),
        ];
        let days = aggregate_by_day(events, 30);
        let lines: Vec<&str> = days[0].event.description.lines().collect();

        assert_eq!(
            lines,
            vec![
                "共3家公司上市:",
                "1. A (1)",
                "   line-a",
                "2. B (2)",
                "3. C (3)",
                "   line-c",
            ]
        );
        assert_eq!(
            days[0].titles,
            vec!["HK IPO: A (1)", "HK IPO: B (2)", "HK IPO: C (3)"]
        );
    }

    #[test]
    fn test_consolidated_event_has_single_default_reminder() {
        let events = vec![
            event("HK IPO: A (1)", date(5), ""),
            event("HK IPO: B (2)", date(5), ""),
        ];
        let days = aggregate_by_day(events, 45);
        let reminders = &days[0].event.reminders;
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].offset, Duration::minutes(45));
        assert_eq!(reminders[0].text, "HK IPO Day: 2 Companies Listing");
    }

    #[test]
    fn test_grouping_uses_resolved_start_of_multi_day_spans() {
        // A multi-day span keys on its start, joining events that begin
        // the same day even if they end later.
        let mut spanning = event("HK IPO: A (1)", date(5), "");
        spanning.end = date(9);
        let events = vec![spanning, event("HK IPO: B (2)", date(5), "")];
        let days = aggregate_by_day(events, 30);
        assert_eq!(days.len(), 1);
        assert!(days[0].is_consolidated());
    }

    #[test]
    fn test_days_sorted_ascending() {
        let events = vec![
            event("HK IPO: Late (9)", date(9), ""),
            event("HK IPO: Early (1)", date(1), ""),
        ];
        let days = aggregate_by_day(events, 30);
        assert_eq!(days[0].date, date(1));
        assert_eq!(days[1].date, date(9));
    }
}
