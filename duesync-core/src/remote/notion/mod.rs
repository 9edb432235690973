//! Notion database as the remote store.
//!
//! Records are pages of one database. The join key lives in a rich-text
//! property, the due date in a date property, and each page is related to
//! the subject's subcategory page.

mod properties;
mod snapshot;

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::config::{PropertyNames, SyncConfig};
use crate::error::{DueSyncError, DueSyncResult};
use crate::event::{Event, RemoteId, RemoteIndex};
use crate::remote::RemoteStore;

pub use snapshot::index_records;

const NOTION_API_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Attempts per request when Notion answers 429.
const MAX_ATTEMPTS: u32 = 3;

pub struct NotionStore {
    client: Client,
    base_url: String,
    token: String,
    database_id: String,
    category_id: Option<String>,
    properties: PropertyNames,
    subjects: BTreeMap<String, String>,
    tz: Tz,
}

#[derive(Debug, Deserialize)]
struct CreatedPage {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl NotionStore {
    pub fn new(config: &SyncConfig) -> DueSyncResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(NotionStore {
            client,
            base_url: NOTION_API_URL.to_string(),
            token: config.notion.token.clone(),
            database_id: config.notion.database_id.clone(),
            category_id: config.notion.category_id.clone(),
            properties: config.notion.properties.clone(),
            subjects: config.subjects.clone(),
            tz: config.tz()?,
        })
    }

    /// Point the store at another API root (a mock server in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }

    /// Send a JSON request, retrying while Notion rate-limits us.
    async fn send(&self, method: Method, path: &str, body: &Value) -> DueSyncResult<Response> {
        let mut attempt = 1;
        loop {
            let response = self.request(method.clone(), path).json(body).send().await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS && attempt < MAX_ATTEMPTS {
                let wait = retry_after(&response);
                tracing::warn!(path, attempt, ?wait, "rate limited by Notion, retrying");
                tokio::time::sleep(wait).await;
                attempt += 1;
                continue;
            }

            return check_status(response).await;
        }
    }
}

impl RemoteStore for NotionStore {
    async fn snapshot(&self, after: DateTime<Utc>) -> DueSyncResult<RemoteIndex> {
        let path = format!("/databases/{}/query", self.database_id);
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let body = properties::query_body(&self.properties, after, cursor.as_deref());
            let response: snapshot::QueryResponse =
                self.send(Method::POST, &path, &body).await?.json().await?;

            pages.extend(response.results);

            match response.next_cursor {
                Some(next) if response.has_more => cursor = Some(next),
                _ => break,
            }
        }

        tracing::info!(count = pages.len(), after = %after, "fetched remote records");
        Ok(index_records(pages, &self.properties, self.tz))
    }

    async fn create_record(&self, event: &Event) -> DueSyncResult<RemoteId> {
        let subcategory = self.subjects.get(&event.subject).ok_or_else(|| {
            DueSyncError::Config(format!("No subcategory page configured for '{}'", event.subject))
        })?;

        let body = properties::create_body(
            event,
            &self.database_id,
            &self.properties,
            self.category_id.as_deref(),
            subcategory,
        );

        let created: CreatedPage = self.send(Method::POST, "/pages", &body).await?.json().await?;
        Ok(RemoteId::new(created.id))
    }

    async fn update_record(&self, remote_id: &RemoteId, event: &Event) -> DueSyncResult<()> {
        let body = properties::update_body(event, &self.properties);
        let path = format!("/pages/{}", remote_id);
        self.send(Method::PATCH, &path, &body).await?;
        Ok(())
    }
}

/// Seconds from a `Retry-After` header, one second when absent.
fn retry_after(response: &Response) -> Duration {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(1))
}

async fn check_status(response: Response) -> DueSyncResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&text)
        .map(|e| e.message)
        .unwrap_or(text);

    Err(DueSyncError::Notion {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotionConfig;
    use chrono::TimeZone;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn config() -> SyncConfig {
        SyncConfig {
            feeds: vec!["https://lms.example/a.ics".to_string()],
            timezone: "UTC".to_string(),
            notion: NotionConfig {
                token: "secret_test".to_string(),
                database_id: "db-1".to_string(),
                category_id: Some("cat-1".to_string()),
                properties: PropertyNames::default(),
            },
            subjects: BTreeMap::from([("COSC262".to_string(), "sub-262".to_string())]),
        }
    }

    fn event(subject: &str) -> Event {
        Event {
            id: "uid-1".to_string(),
            title: "Quiz 1 – ".to_string(),
            due_at: Utc.with_ymd_and_hms(2024, 3, 10, 10, 59, 0).unwrap(),
            subject: subject.to_string(),
        }
    }

    fn page(id: &str, uid: &str, start: &str) -> Value {
        json!({
            "object": "page",
            "id": id,
            "properties": {
                "End Date": { "type": "date", "date": { "start": start } },
                "ics_uid": { "type": "rich_text", "rich_text": [{ "plain_text": uid }] }
            }
        })
    }

    #[tokio::test]
    async fn test_snapshot_follows_pagination() {
        let mut server = Server::new_async().await;

        let first = server
            .mock("POST", "/databases/db-1/query")
            .match_header("authorization", "Bearer secret_test")
            .match_header("notion-version", NOTION_VERSION)
            .match_body(Matcher::Json(json!({
                "filter": {
                    "property": "End Date",
                    "date": { "on_or_after": "2024-03-01T00:00:00+00:00" }
                },
                "page_size": 100
            })))
            .with_status(200)
            .with_body(
                json!({
                    "object": "list",
                    "results": [page("page-1", "uid-1", "2024-03-10T00:00:00.000+00:00")],
                    "has_more": true,
                    "next_cursor": "cursor-2"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let second = server
            .mock("POST", "/databases/db-1/query")
            .match_body(Matcher::PartialJson(json!({ "start_cursor": "cursor-2" })))
            .with_status(200)
            .with_body(
                json!({
                    "object": "list",
                    "results": [page("page-2", "uid-2", "2024-03-12T00:00:00.000+00:00")],
                    "has_more": false,
                    "next_cursor": null
                })
                .to_string(),
            )
            .create_async()
            .await;

        let store = NotionStore::new(&config()).unwrap().with_base_url(server.url());
        let after = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let index = store.snapshot(after).await.expect("Should fetch snapshot");

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(index.len(), 2);
        assert_eq!(index["uid-2"].remote_id, RemoteId::new("page-2"));
    }

    #[tokio::test]
    async fn test_create_record_posts_page_and_returns_id() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/pages")
            .match_body(Matcher::PartialJson(json!({
                "parent": { "database_id": "db-1" },
                "properties": {
                    "ics_uid": { "rich_text": [{ "text": { "content": "uid-1" } }] },
                    "Subcategory": { "relation": [{ "id": "sub-262" }] },
                    "Category": { "relation": [{ "id": "cat-1" }] }
                }
            })))
            .with_status(200)
            .with_body(json!({ "object": "page", "id": "new-page" }).to_string())
            .create_async()
            .await;

        let store = NotionStore::new(&config()).unwrap().with_base_url(server.url());
        let remote_id = store.create_record(&event("COSC262")).await.expect("Should create");

        mock.assert_async().await;
        assert_eq!(remote_id, RemoteId::new("new-page"));
    }

    #[tokio::test]
    async fn test_create_record_without_subcategory_page_fails_before_request() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/pages").expect(0).create_async().await;

        let store = NotionStore::new(&config()).unwrap().with_base_url(server.url());
        let err = store.create_record(&event("SENG201")).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, DueSyncError::Config(_)));
    }

    #[tokio::test]
    async fn test_update_record_patches_page() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("PATCH", "/pages/page-7")
            .match_body(Matcher::PartialJson(json!({
                "properties": {
                    "End Date": { "date": { "start": "2024-03-10T10:59:00+00:00" } },
                    "Name": { "title": [{ "text": { "content": "Quiz 1 – " } }] }
                }
            })))
            .with_status(200)
            .with_body(json!({ "object": "page", "id": "page-7" }).to_string())
            .create_async()
            .await;

        let store = NotionStore::new(&config()).unwrap().with_base_url(server.url());
        store
            .update_record(&RemoteId::new("page-7"), &event("COSC262"))
            .await
            .expect("Should update");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_carries_notion_message() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PATCH", "/pages/page-7")
            .with_status(400)
            .with_body(
                json!({
                    "object": "error",
                    "status": 400,
                    "code": "validation_error",
                    "message": "End Date is not a property that exists."
                })
                .to_string(),
            )
            .create_async()
            .await;

        let store = NotionStore::new(&config()).unwrap().with_base_url(server.url());
        let err = store
            .update_record(&RemoteId::new("page-7"), &event("COSC262"))
            .await
            .unwrap_err();

        match err {
            DueSyncError::Notion { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "End Date is not a property that exists.");
            }
            other => panic!("Expected Notion error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limited_request_is_retried() {
        let mut server = Server::new_async().await;
        let limited = server
            .mock("PATCH", "/pages/page-7")
            .with_status(429)
            .with_header("retry-after", "0")
            .expect(1)
            .create_async()
            .await;

        let ok = server
            .mock("PATCH", "/pages/page-7")
            .with_status(200)
            .with_body(json!({ "object": "page", "id": "page-7" }).to_string())
            .expect(1)
            .create_async()
            .await;

        let store = NotionStore::new(&config()).unwrap().with_base_url(server.url());
        store
            .update_record(&RemoteId::new("page-7"), &event("COSC262"))
            .await
            .expect("Should succeed after retry");

        limited.assert_async().await;
        ok.assert_async().await;
    }
}
