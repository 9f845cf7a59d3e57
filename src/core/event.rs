use chrono::{Duration, NaiveDate};

use crate::core::classify::parse_date;
use crate::domain::model::{CalendarEvent, EventType, IpoRecord, Reminder, SkipReason};

/// Builds one calendar event per record. Per-record problems come back as
/// a typed `SkipReason` so the batch continues as a filtering transform.
#[derive(Debug, Clone, Copy)]
pub struct EventBuilder {
    alarm_minutes: u32,
}

impl EventBuilder {
    pub fn new(alarm_minutes: u32) -> Self {
        Self { alarm_minutes }
    }

    pub fn build(
        &self,
        record: &IpoRecord,
        event_type: EventType,
    ) -> Result<CalendarEvent, SkipReason> {
        let list = parse_date(&record.list_date);
        let apply = parse_date(&record.apply_date);

        // Listing date is the effective date when it parses; otherwise the
        // application date. Nothing parseable means nothing to anchor on.
        let effective = list.or(apply).ok_or_else(|| SkipReason::NoUsableDate {
            company: if record.company_name.is_empty() {
                "Unknown Company".to_string()
            } else {
                record.company_name.clone()
            },
        })?;

        let title = build_title(record);
        let (start, end) = event_span(list, apply, effective);

        let mut categories = vec![event_type.label().to_string(), "Hong Kong IPO".to_string()];
        if !record.market.is_empty() {
            categories.push(record.market.clone());
        }

        Ok(CalendarEvent {
            description: build_description(record),
            reminders: self.reminders_for(event_type, &title),
            title,
            start,
            end,
            categories,
        })
    }

    fn reminders_for(&self, event_type: EventType, title: &str) -> Vec<Reminder> {
        if event_type.is_upcoming() {
            vec![
                Reminder {
                    offset: Duration::days(1),
                    text: format!("提醒: {} 明天开始", title),
                },
                Reminder {
                    offset: Duration::minutes(i64::from(self.alarm_minutes)),
                    text: title.to_string(),
                },
            ]
        } else if event_type.is_today() {
            vec![Reminder {
                offset: Duration::minutes(30),
                text: format!("今天: {}", title),
            }]
        } else {
            Vec::new()
        }
    }
}

fn build_title(record: &IpoRecord) -> String {
    let company = if record.company_name.is_empty() {
        "Unknown Company"
    } else {
        &record.company_name
    };
    let mut title = format!("HK IPO: {} ({})", company, record.stock_code);
    if !record.market.is_empty() {
        title.push_str(&format!(" [{}]", record.market));
    }
    title
}

/// Span covering subscription-to-listing when both dates parse in order;
/// otherwise a single day on the effective date. End is exclusive, so the
/// result always satisfies end > start.
fn event_span(
    list: Option<NaiveDate>,
    apply: Option<NaiveDate>,
    effective: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    if let (Some(list_end), Some(apply_start)) = (list, apply) {
        if apply_start < list_end {
            return (apply_start, list_end + Duration::days(1));
        }
    }
    (effective, effective + Duration::days(1))
}

/// Labeled lines for present-only fields, in a fixed order.
fn build_description(record: &IpoRecord) -> String {
    let mut parts = Vec::new();

    if !record.apply_date.is_empty() && !record.list_date.is_empty() {
        parts.push(format!(
            "📅 IPO周期: {} 至 {}",
            record.apply_date, record.list_date
        ));
    } else if !record.apply_date.is_empty() {
        parts.push(format!("📅 申购开始: {}", record.apply_date));
    } else if !record.list_date.is_empty() {
        parts.push(format!("📅 上市日期: {}", record.list_date));
    }

    if !record.apply_end_date.is_empty() {
        parts.push(format!("⏰ 申购截止: {}", record.apply_end_date));
    }
    if !record.price_range.is_empty() {
        parts.push(format!("💰 价格区间: {}", record.price_range));
    }
    if !record.issue_price.is_empty() {
        parts.push(format!("💵 发行价: {}", record.issue_price));
    }
    if !record.total_shares.is_empty() {
        parts.push(format!("📊 发行股数: {}亿股", record.total_shares));
    }
    if !record.market.is_empty() {
        parts.push(format!("🏢 市场: {}", record.market));
    }
    if !record.underwriter.is_empty() {
        parts.push(format!("🏛️ 保荐人: {}", record.underwriter));
    }
    if !record.reference_company.is_empty() {
        parts.push(format!("🔗 参考公司: {}", record.reference_company));
    }
    if !record.green_shoe.is_empty() && record.green_shoe != "-" {
        parts.push(format!("🟢 绿鞋: {}", record.green_shoe));
    }

    parts.join("\n")
}
