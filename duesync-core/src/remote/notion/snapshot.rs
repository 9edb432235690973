//! Parsing of database query results into typed remote records.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::Value;

use crate::config::PropertyNames;
use crate::event::{RemoteId, RemoteIndex, RemoteRecord};
use crate::ics::start_of_day;

/// One page of a database query response.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Page {
    id: String,
    #[serde(default)]
    properties: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum PropertyValue {
    Date { date: Option<DateValue> },
    RichText { rich_text: Vec<TextSegment> },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct DateValue {
    start: String,
}

#[derive(Debug, Deserialize)]
struct TextSegment {
    #[serde(default)]
    plain_text: String,
}

/// Index query results by join key.
///
/// Malformed pages are skipped with a warning. When two pages share a join
/// key the first one wins.
pub fn index_records(pages: Vec<Value>, props: &PropertyNames, tz: Tz) -> RemoteIndex {
    let mut index = RemoteIndex::new();

    for page in pages {
        let record = match parse_record(page, props, tz) {
            Ok(record) => record,
            Err(reason) => {
                tracing::warn!(%reason, "skipping malformed remote record");
                continue;
            }
        };

        if let Some(existing) = index.get(&record.join_key) {
            tracing::warn!(
                join_key = %record.join_key,
                kept = %existing.remote_id,
                ignored = %record.remote_id,
                "duplicate join key in remote database"
            );
            continue;
        }

        index.insert(record.join_key.clone(), record);
    }

    index
}

fn parse_record(page: Value, props: &PropertyNames, tz: Tz) -> Result<RemoteRecord, String> {
    let page: Page = serde_json::from_value(page).map_err(|e| format!("invalid page: {e}"))?;

    let join_key = match property(&page, &props.join_key)? {
        PropertyValue::RichText { rich_text } => rich_text
            .into_iter()
            .map(|segment| segment.plain_text)
            .collect::<String>(),
        _ => return Err(format!("page {}: '{}' is not rich text", page.id, props.join_key)),
    };
    if join_key.is_empty() {
        return Err(format!("page {}: empty '{}'", page.id, props.join_key));
    }

    let due_at = match property(&page, &props.due)? {
        PropertyValue::Date { date: Some(date) } => parse_notion_date(&date.start, tz)
            .ok_or_else(|| format!("page {}: unreadable date '{}'", page.id, date.start))?,
        PropertyValue::Date { date: None } => {
            return Err(format!("page {}: '{}' is empty", page.id, props.due));
        }
        _ => return Err(format!("page {}: '{}' is not a date", page.id, props.due)),
    };

    Ok(RemoteRecord {
        remote_id: RemoteId::new(page.id),
        join_key,
        due_at,
    })
}

fn property(page: &Page, name: &str) -> Result<PropertyValue, String> {
    let value = page
        .properties
        .get(name)
        .ok_or_else(|| format!("page {}: missing property '{}'", page.id, name))?;
    serde_json::from_value(value.clone())
        .map_err(|e| format!("page {}: invalid property '{}': {e}", page.id, name))
}

/// Notion dates are RFC 3339 date-times or bare `YYYY-MM-DD` dates.
fn parse_notion_date(value: &str, tz: Tz) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| start_of_day(date, tz))
}
