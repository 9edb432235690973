//! The database events are mirrored into.

pub mod notion;

use chrono::{DateTime, Utc};

use crate::error::DueSyncResult;
use crate::event::{Event, RemoteId, RemoteIndex};

pub use notion::NotionStore;

/// Remote operations a sync run needs.
pub trait RemoteStore {
    /// Records due on or after `after`, keyed by join key.
    fn snapshot(&self, after: DateTime<Utc>) -> impl Future<Output = DueSyncResult<RemoteIndex>>;

    /// Create a record for `event` and return its remote id.
    fn create_record(&self, event: &Event) -> impl Future<Output = DueSyncResult<RemoteId>>;

    /// Overwrite the due date and title of an existing record.
    fn update_record(
        &self,
        remote_id: &RemoteId,
        event: &Event,
    ) -> impl Future<Output = DueSyncResult<()>>;
}
