//! ICS subscriptions fetched over HTTP(S).

use std::time::Duration;

use chrono_tz::Tz;
use reqwest::Client;

use crate::error::{DueSyncError, DueSyncResult};
use crate::event::RawEvent;
use crate::feed::{FeedSource, merge_feeds};
use crate::ics::parse_feed;

const FEED_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpFeeds {
    client: Client,
    urls: Vec<String>,
    tz: Tz,
}

impl HttpFeeds {
    pub fn new(urls: Vec<String>, tz: Tz) -> DueSyncResult<Self> {
        let client = Client::builder().timeout(FEED_TIMEOUT).build()?;
        Ok(HttpFeeds { client, urls, tz })
    }

    async fn fetch_one(&self, url: &str) -> DueSyncResult<Vec<RawEvent>> {
        let http_url = to_http_url(url);
        tracing::info!(url = %http_url, "fetching feed");

        let feed_error = |reason: String| DueSyncError::Feed {
            url: http_url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&http_url)
            .send()
            .await
            .map_err(|e| feed_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(feed_error(format!("HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| feed_error(e.to_string()))?;
        let events = parse_feed(&body, self.tz)?;

        tracing::info!(url = %http_url, count = events.len(), "parsed feed");
        Ok(events)
    }
}

impl FeedSource for HttpFeeds {
    async fn fetch_events(&self) -> DueSyncResult<Vec<RawEvent>> {
        let mut feeds = Vec::with_capacity(self.urls.len());
        for url in &self.urls {
            feeds.push(self.fetch_one(url).await?);
        }
        Ok(merge_feeds(feeds))
    }
}

/// `webcal://` is plain HTTPS with a different scheme name.
fn to_http_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "webcal" => {
            format!("https{}", &url["webcal".len()..])
        }
        _ => url.to_string(),
    }
}
