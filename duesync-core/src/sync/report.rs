//! Outcome of applying a sync plan.

use crate::event::{Event, RemoteId};
use crate::reconcile::ChangeKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedChange {
    pub kind: ChangeKind,
    pub event: Event,
    pub remote_id: RemoteId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedChange {
    pub kind: ChangeKind,
    pub event: Event,
    pub error: String,
}

/// What a sync run wrote, and what it failed to write.
///
/// Failed changes are picked up again by the next run since the remote
/// side still differs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub applied: Vec<AppliedChange>,
    pub failed: Vec<FailedChange>,
}

impl SyncReport {
    pub fn applied_count(&self, kind: ChangeKind) -> usize {
        self.applied.iter().filter(|c| c.kind == kind).count()
    }

    pub fn failed_count(&self, kind: ChangeKind) -> usize {
        self.failed.iter().filter(|c| c.kind == kind).count()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}
