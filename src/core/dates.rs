use chrono::{Duration, Local, NaiveDate, Utc};

/// Reporting window: `[start, end]` where start is today (date-only) and
/// end is today plus the lookahead horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(today: NaiveDate, days_ahead: u32) -> Self {
        Self {
            start: today,
            end: today + Duration::days(i64::from(days_ahead)),
        }
    }

    pub fn current(days_ahead: u32) -> Self {
        Self::new(Local::now().date_naive(), days_ahead)
    }
}

/// Millisecond timestamp used as the cache-busting query parameter.
pub fn cache_bust_millis() -> i64 {
    Utc::now().timestamp_millis()
}
