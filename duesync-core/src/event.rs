//! Event types shared by the feed, reconciliation and remote layers.
//!
//! `RawEvent` is what a calendar feed hands us. `Event` is the canonical
//! form produced by the normalizer and used as the unit of sync.
//! `RemoteRecord` is a previously-synced event as the database knows it.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event as it came out of a feed, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Feed identifier (ICS UID)
    pub uid: String,
    pub title: String,
    /// End of the event, i.e. when the item is due
    pub end: DateTime<Utc>,
    /// Free-text tags (ICS CATEGORIES)
    pub tags: BTreeSet<String>,
}

/// A normalized event: the unit that gets mirrored into the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Join key against remote records. Never regenerated.
    pub id: String,
    pub title: String,
    pub due_at: DateTime<Utc>,
    /// Subject code, empty when the event carries none
    pub subject: String,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

impl Event {
    /// Due date in the long human form used in log lines.
    pub fn due_display(&self) -> String {
        self.due_at.format("%A, %B %d, %Y at %I:%M %p").to_string()
    }
}

/// Identifier the remote database assigned to a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteId(pub String);

impl RemoteId {
    pub fn new(id: impl Into<String>) -> Self {
        RemoteId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A previously-synced event as stored in the remote database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub remote_id: RemoteId,
    /// The `Event::id` this record was created from
    pub join_key: String,
    pub due_at: DateTime<Utc>,
}

/// Remote records keyed by join key.
pub type RemoteIndex = HashMap<String, RemoteRecord>;
