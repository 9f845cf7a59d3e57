use icalendar::{Alarm, Calendar, Component, Event, EventLike};

use crate::config::{CALENDAR_FILE, SUMMARY_FILE};
use crate::domain::model::{DaySchedule, TransformResult};
use crate::domain::ports::Storage;
use crate::utils::error::Result;

/// Serializes the aggregated day set to ICS. Events are all-day DATE
/// values; reminders become DISPLAY alarms with negative triggers relative
/// to the event start.
pub fn to_ics(days: &[DaySchedule]) -> String {
    let mut calendar = Calendar::new();
    calendar.name("Hong Kong IPO");

    for day in days {
        let source = &day.event;
        let mut event = Event::new();
        event.summary(&source.title);
        event.starts(source.start);
        event.ends(source.end);
        if !source.description.is_empty() {
            event.description(&source.description);
        }
        if !source.categories.is_empty() {
            event.add_property("CATEGORIES", source.categories.join(","));
        }
        for reminder in &source.reminders {
            event.alarm(Alarm::display(&reminder.text, -reminder.offset));
        }
        calendar.push(event.done());
    }

    calendar.to_string()
}

/// Human-readable report: one line per date (ascending), with an indented
/// title listing for consolidated days.
pub fn summary_report(days: &[DaySchedule]) -> String {
    let mut parts = vec!["=== Hong Kong IPO Calendar Summary ===".to_string()];
    parts.push(format!("Total dates with events: {}", days.len()));

    for day in days {
        if day.is_consolidated() {
            parts.push(format!(
                "\n📅 {}: {} IPOs (Consolidated)",
                day.date,
                day.titles.len()
            ));
            for title in &day.titles {
                parts.push(format!("   • {}", title));
            }
        } else {
            parts.push(format!("\n📅 {}: {}", day.date, day.event.title));
        }
    }

    parts.push(format!("\n{}", "=".repeat(40)));
    parts.join("\n")
}

/// Writes the calendar file and the summary report, returning the calendar
/// file name. Both files are overwritten on every run.
pub async fn write_outputs<S: Storage>(storage: &S, result: &TransformResult) -> Result<String> {
    let ics = to_ics(&result.days);
    storage.write_file(CALENDAR_FILE, ics.as_bytes()).await?;
    tracing::info!("Calendar saved to {}", CALENDAR_FILE);

    let summary = summary_report(&result.days);
    storage.write_file(SUMMARY_FILE, summary.as_bytes()).await?;
    tracing::info!("Event summary saved to {}", SUMMARY_FILE);

    Ok(CALENDAR_FILE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CalendarEvent, Reminder};
    use chrono::{Duration, NaiveDate};
    use icalendar::{CalendarComponent, DatePerhapsTime};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
    }

    fn day(title: &str, start: NaiveDate, end: NaiveDate, reminders: Vec<Reminder>) -> DaySchedule {
        DaySchedule {
            date: start,
            titles: vec![title.to_string()],
            event: CalendarEvent {
                title: title.to_string(),
                start,
                end,
                description: "📅 上市日期: 2025-09-01".to_string(),
                categories: vec!["UPCOMING_LISTING".to_string(), "Hong Kong IPO".to_string()],
                reminders,
            },
        }
    }

    #[test]
    fn test_ics_round_trip_preserves_title_and_span() {
        let days = vec![
            day("HK IPO: A (1)", date(1), date(2), Vec::new()),
            day("HK IPO: B (2)", date(3), date(7), Vec::new()),
        ];
        let ics = to_ics(&days);

        let parsed: icalendar::Calendar = ics.parse().unwrap();
        let mut triples = Vec::new();
        for component in &parsed.components {
            if let CalendarComponent::Event(event) = component {
                let start = match event.get_start() {
                    Some(DatePerhapsTime::Date(d)) => d,
                    other => panic!("expected DATE start, got {:?}", other),
                };
                let end = match event.get_end() {
                    Some(DatePerhapsTime::Date(d)) => d,
                    other => panic!("expected DATE end, got {:?}", other),
                };
                triples.push((event.get_summary().unwrap().to_string(), start, end));
            }
        }

        triples.sort();
        assert_eq!(
            triples,
            vec![
                ("HK IPO: A (1)".to_string(), date(1), date(2)),
                ("HK IPO: B (2)".to_string(), date(3), date(7)),
            ]
        );
    }

    #[test]
    fn test_ics_contains_display_alarms() {
        let reminders = vec![
            Reminder {
                offset: Duration::days(1),
                text: "提醒: HK IPO: A (1) 明天开始".to_string(),
            },
            Reminder {
                offset: Duration::minutes(30),
                text: "HK IPO: A (1)".to_string(),
            },
        ];
        let ics = to_ics(&[day("HK IPO: A (1)", date(1), date(2), reminders)]);

        assert_eq!(ics.matches("BEGIN:VALARM").count(), 2);
        assert!(ics.contains("ACTION:DISPLAY"));
        assert!(ics.contains("TRIGGER:-P1D"));
        assert!(ics.contains("TRIGGER:-PT30M"));
    }

    #[test]
    fn test_ics_carries_categories() {
        let ics = to_ics(&[day("HK IPO: A (1)", date(1), date(2), Vec::new())]);
        assert!(ics.contains("CATEGORIES:UPCOMING_LISTING,Hong Kong IPO"));
    }

    #[test]
    fn test_summary_single_and_consolidated_lines() {
        let mut consolidated = day("HK IPO Day: 2 Companies Listing", date(5), date(6), Vec::new());
        consolidated.titles = vec!["HK IPO: B (2)".to_string(), "HK IPO: C (3)".to_string()];

        let days = vec![
            day("HK IPO: A (1)", date(1), date(2), Vec::new()),
            consolidated,
        ];
        let summary = summary_report(&days);
        let expected = "=== Hong Kong IPO Calendar Summary ===\n\
                        Total dates with events: 2\n\
                        \n📅 2025-09-01: HK IPO: A (1)\n\
                        \n📅 2025-09-05: 2 IPOs (Consolidated)\n   \
                        • HK IPO: B (2)\n   \
                        • HK IPO: C (3)\n\
                        \n========================================";
        assert_eq!(summary, expected);
    }

    #[test]
    fn test_empty_day_set_serializes() {
        let ics = to_ics(&[]);
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("END:VCALENDAR"));
    }
}
