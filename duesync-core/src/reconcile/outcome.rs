use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{Event, RemoteId};

/// Write operation a reconciled event needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Create,
    Update,
}

impl ChangeKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            ChangeKind::Create => "+",
            ChangeKind::Update => "~",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An event whose remote record exists but is out of date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpdate {
    pub remote_id: RemoteId,
    /// Due date currently stored remotely
    pub previous_due_at: DateTime<Utc>,
    pub event: Event,
}

/// Why an event was left out of the sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExclusionReason {
    /// Marks an availability window opening rather than a deadline
    Opening,
    /// Subject code is not one of the tracked subjects
    UntrackedSubject,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::Opening => write!(f, "opening"),
            ExclusionReason::UntrackedSubject => write!(f, "untracked subject"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub reason: ExclusionReason,
    pub event: Event,
}

/// Partition of one run's events relative to the remote snapshot.
///
/// Every input event lands in exactly one partition, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub to_create: Vec<Event>,
    pub to_update: Vec<PendingUpdate>,
    pub unchanged: Vec<Event>,
    pub excluded: Vec<Exclusion>,
}

impl ReconciliationResult {
    /// True when nothing needs to be written.
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty()
    }

    pub fn total(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.unchanged.len() + self.excluded.len()
    }

    pub fn excluded_count(&self, reason: ExclusionReason) -> usize {
        self.excluded.iter().filter(|e| e.reason == reason).count()
    }
}
