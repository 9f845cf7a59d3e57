use chrono::NaiveDate;

use crate::domain::model::{EventType, IpoRecord};

/// Parses a provider date field. Empty strings are simply absent; anything
/// else must be ISO `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Keeps a record iff its listing date or its application date parses and
/// lands on/after `today`. An unparsable listing date falls through to the
/// application date rather than disqualifying the record.
pub fn filter_records(records: Vec<IpoRecord>, today: NaiveDate) -> Vec<IpoRecord> {
    records
        .into_iter()
        .filter(|record| {
            let list = checked_parse(record, &record.list_date);
            let apply = checked_parse(record, &record.apply_date);

            match (list, apply) {
                (None, None) => false,
                (list, apply) => {
                    list.map(|d| d >= today).unwrap_or(false)
                        || apply.map(|d| d >= today).unwrap_or(false)
                }
            }
        })
        .collect()
}

fn checked_parse(record: &IpoRecord, raw: &str) -> Option<NaiveDate> {
    let parsed = parse_date(raw);
    if parsed.is_none() && !raw.is_empty() {
        tracing::warn!(
            "Invalid date format for {}: {}",
            if record.company_name.is_empty() {
                "Unknown"
            } else {
                &record.company_name
            },
            raw
        );
    }
    parsed
}

/// Total classification of a record's phase relative to `today`. The
/// listing date wins whenever it parses; an unparsable date string is
/// treated as absent, not as an error.
pub fn classify(list_date: &str, apply_date: &str, today: NaiveDate) -> EventType {
    if let Some(list) = parse_date(list_date) {
        return match list.cmp(&today) {
            std::cmp::Ordering::Greater => EventType::UpcomingListing,
            std::cmp::Ordering::Equal => EventType::TodayListing,
            std::cmp::Ordering::Less => EventType::PastListing,
        };
    }

    if let Some(apply) = parse_date(apply_date) {
        return match apply.cmp(&today) {
            std::cmp::Ordering::Greater => EventType::UpcomingApplication,
            std::cmp::Ordering::Equal => EventType::TodayApplication,
            std::cmp::Ordering::Less => EventType::PastApplication,
        };
    }

    EventType::Unknown
}
