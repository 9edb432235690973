//! JSON bodies for the Notion REST API.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::config::PropertyNames;
use crate::event::Event;

/// Notion caps database query pages at 100 results.
pub const QUERY_PAGE_SIZE: u32 = 100;

fn title_value(text: &str) -> Value {
    json!({
        "title": [{ "type": "text", "text": { "content": text } }]
    })
}

fn date_value(at: DateTime<Utc>) -> Value {
    json!({
        "date": { "start": at.to_rfc3339() }
    })
}

fn rich_text_value(text: &str) -> Value {
    json!({
        "rich_text": [{ "type": "text", "text": { "content": text } }]
    })
}

fn relation_value(page_id: &str) -> Value {
    json!({
        "relation": [{ "id": page_id }]
    })
}

/// Database query for records due on or after `after`.
pub fn query_body(props: &PropertyNames, after: DateTime<Utc>, cursor: Option<&str>) -> Value {
    let mut body = json!({
        "filter": {
            "property": props.due,
            "date": { "on_or_after": after.to_rfc3339() }
        },
        "page_size": QUERY_PAGE_SIZE,
    });
    if let Some(cursor) = cursor {
        body["start_cursor"] = json!(cursor);
    }
    body
}

/// New page in `database_id` mirroring `event`.
pub fn create_body(
    event: &Event,
    database_id: &str,
    props: &PropertyNames,
    category_id: Option<&str>,
    subcategory_id: &str,
) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert(props.title.clone(), title_value(&event.title));
    properties.insert(props.due.clone(), date_value(event.due_at));
    properties.insert(props.join_key.clone(), rich_text_value(&event.id));
    properties.insert(props.subcategory.clone(), relation_value(subcategory_id));
    if let Some(category_id) = category_id {
        properties.insert(props.category.clone(), relation_value(category_id));
    }

    json!({
        "parent": { "database_id": database_id },
        "properties": properties,
    })
}

/// Patch for an existing page: due date and title only.
pub fn update_body(event: &Event, props: &PropertyNames) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert(props.title.clone(), title_value(&event.title));
    properties.insert(props.due.clone(), date_value(event.due_at));

    json!({ "properties": properties })
}
