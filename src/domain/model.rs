use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One IPO row as delivered by the provider. Every field may be an empty
/// string; dates are ISO `YYYY-MM-DD` calendar dates without a time part.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpoRecord {
    #[serde(default, rename = "stock_nm")]
    pub company_name: String,
    #[serde(default, rename = "stock_cd")]
    pub stock_code: String,
    #[serde(default)]
    pub market: String,
    #[serde(default, rename = "list_dt2")]
    pub list_date: String,
    #[serde(default, rename = "apply_dt2")]
    pub apply_date: String,
    #[serde(default, rename = "apply_end_dt2")]
    pub apply_end_date: String,
    #[serde(default)]
    pub price_range: String,
    #[serde(default)]
    pub issue_price: String,
    #[serde(default)]
    pub total_shares: String,
    #[serde(default)]
    pub underwriter: String,
    #[serde(default, rename = "ref_company")]
    pub reference_company: String,
    #[serde(default, rename = "green_rt")]
    pub green_shoe: String,
}

/// Provider response envelope: `{"rows": [{"cell": {...}}, ...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderResponse {
    #[serde(default)]
    pub rows: Vec<ProviderRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderRow {
    #[serde(default)]
    pub cell: IpoRecord,
}

/// Phase classification of a record relative to "today". The listing date
/// wins over the application date whenever it parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    UpcomingListing,
    TodayListing,
    PastListing,
    UpcomingApplication,
    TodayApplication,
    PastApplication,
    Unknown,
}

impl EventType {
    pub fn label(self) -> &'static str {
        match self {
            EventType::UpcomingListing => "UPCOMING_LISTING",
            EventType::TodayListing => "TODAY_LISTING",
            EventType::PastListing => "PAST_LISTING",
            EventType::UpcomingApplication => "UPCOMING_APPLICATION",
            EventType::TodayApplication => "TODAY_APPLICATION",
            EventType::PastApplication => "PAST_APPLICATION",
            EventType::Unknown => "UNKNOWN",
        }
    }

    pub fn is_upcoming(self) -> bool {
        matches!(
            self,
            EventType::UpcomingListing | EventType::UpcomingApplication
        )
    }

    pub fn is_today(self) -> bool {
        matches!(self, EventType::TodayListing | EventType::TodayApplication)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A display reminder attached to an event, fired `offset` before the
/// event start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub offset: Duration,
    pub text: String,
}

/// A fully built calendar entry. `end` is exclusive and always strictly
/// after `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub description: String,
    pub categories: Vec<String>,
    pub reminders: Vec<Reminder>,
}

/// Why a record could not be turned into an event. Skips are logged and
/// the batch continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoUsableDate { company: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoUsableDate { company } => {
                write!(f, "no valid date found for {}", company)
            }
        }
    }
}

/// One calendar date after aggregation: the event to emit plus the titles
/// of the original events that landed on that date (one title for a
/// pass-through day, N titles for a consolidated day).
#[derive(Debug, Clone)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub titles: Vec<String>,
    pub event: CalendarEvent,
}

impl DaySchedule {
    pub fn is_consolidated(&self) -> bool {
        self.titles.len() > 1
    }
}

/// Output of the transform stage, handed to the load stage by value.
#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub days: Vec<DaySchedule>,
}
