//! Decides which events must be created or updated remotely.
//!
//! Reconciliation is a pure function of the normalized events, the remote
//! snapshot and the tracked subjects. It never reads the clock; the caller
//! picks the snapshot window.

mod outcome;

use std::collections::BTreeSet;

pub use outcome::{ChangeKind, Exclusion, ExclusionReason, PendingUpdate, ReconciliationResult};

use crate::event::{Event, RemoteIndex};

/// Suffix of events that announce an availability window instead of a deadline.
const OPENS_SUFFIX: &str = "opens";

/// Partition `events` into creates, updates, unchanged and excluded.
pub fn reconcile<I>(
    events: I,
    remote_index: &RemoteIndex,
    accepted_subjects: &BTreeSet<String>,
) -> ReconciliationResult
where
    I: IntoIterator<Item = Event>,
{
    let mut result = ReconciliationResult::default();

    for event in events {
        if let Some(reason) = exclusion_reason(&event, accepted_subjects) {
            tracing::debug!(id = %event.id, title = %event.title, %reason, "excluding event");
            result.excluded.push(Exclusion { reason, event });
            continue;
        }

        match remote_index.get(&event.id) {
            None => result.to_create.push(event),
            Some(record) if record.due_at == event.due_at => result.unchanged.push(event),
            Some(record) => result.to_update.push(PendingUpdate {
                remote_id: record.remote_id.clone(),
                previous_due_at: record.due_at,
                event,
            }),
        }
    }

    result
}

fn exclusion_reason(event: &Event, accepted_subjects: &BTreeSet<String>) -> Option<ExclusionReason> {
    if event.title.ends_with(OPENS_SUFFIX) {
        return Some(ExclusionReason::Opening);
    }
    if !accepted_subjects.contains(&event.subject) {
        return Some(ExclusionReason::UntrackedSubject);
    }
    None
}
