//! Calendar feed sources.
//!
//! A `FeedSource` delivers the merged raw events of every configured
//! calendar. `HttpFeeds` is the production source; tests substitute their own.

mod http;

use std::collections::HashMap;

pub use http::HttpFeeds;

use crate::error::DueSyncResult;
use crate::event::RawEvent;

/// Something that can produce this run's raw events.
pub trait FeedSource {
    /// Fetch and merge all feeds. Any failure aborts the run.
    fn fetch_events(&self) -> impl Future<Output = DueSyncResult<Vec<RawEvent>>>;
}

/// Merge feeds into one event set keyed by UID.
///
/// Later feeds win on duplicate UIDs. The merged set keeps the position of
/// the first occurrence so output order is stable.
pub fn merge_feeds<I>(feeds: I) -> Vec<RawEvent>
where
    I: IntoIterator<Item = Vec<RawEvent>>,
{
    let mut merged: Vec<RawEvent> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();

    for event in feeds.into_iter().flatten() {
        match position.get(&event.uid) {
            Some(&i) => {
                let existing = &merged[i];
                if existing.end != event.end {
                    tracing::warn!(
                        uid = %event.uid,
                        kept = %event.end,
                        dropped = %existing.end,
                        "duplicate UID across feeds with different due dates; keeping the later feed"
                    );
                }
                merged[i] = event;
            }
            None => {
                position.insert(event.uid.clone(), merged.len());
                merged.push(event);
            }
        }
    }

    merged
}
