//! Sync driver: fetch, reconcile, apply.

use std::collections::BTreeSet;

use crate::error::DueSyncResult;
use crate::feed::FeedSource;
use crate::normalize::normalize;
use crate::reconcile::{ChangeKind, ReconciliationResult, reconcile};
use crate::remote::RemoteStore;
use crate::sync::{AppliedChange, FailedChange, SyncReport};
use crate::sync_window::SyncWindow;

/// Reconciled state of one run, ready to be shown or applied.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub window: SyncWindow,
    /// Events delivered by the feeds after merging
    pub feed_events: usize,
    /// Feed events due before the window start, left out of reconciliation
    pub past_events: usize,
    /// Remote records inside the window
    pub remote_records: usize,
    pub result: ReconciliationResult,
}

impl SyncPlan {
    /// Fetch both sides and reconcile them.
    ///
    /// Any fetch failure aborts here, before anything is written: a partial
    /// snapshot would turn known records into duplicate creates.
    pub async fn prepare<F, R>(
        feeds: &F,
        store: &R,
        accepted_subjects: &BTreeSet<String>,
        window: SyncWindow,
    ) -> DueSyncResult<Self>
    where
        F: FeedSource,
        R: RemoteStore,
    {
        let raw_events = feeds.fetch_events().await?;

        // The snapshot only holds records due inside the window, so an
        // earlier event would never match and be created again every run.
        let (events, past): (Vec<_>, Vec<_>) = raw_events
            .iter()
            .map(normalize)
            .partition(|event| event.due_at >= window.after);
        for event in &past {
            tracing::debug!(id = %event.id, due_at = %event.due_at, "skipping event due before window");
        }

        let remote_index = store.snapshot(window.after).await?;
        let remote_records = remote_index.len();

        let result = reconcile(events, &remote_index, accepted_subjects);
        tracing::info!(
            create = result.to_create.len(),
            update = result.to_update.len(),
            unchanged = result.unchanged.len(),
            excluded = result.excluded.len(),
            "reconciled events"
        );

        Ok(SyncPlan {
            window,
            feed_events: raw_events.len(),
            past_events: past.len(),
            remote_records,
            result,
        })
    }

    /// Apply creates, then updates. A failed write is logged and recorded,
    /// and the remaining writes still go ahead.
    pub async fn apply<R: RemoteStore>(&self, store: &R) -> SyncReport {
        let mut report = SyncReport::default();

        for event in &self.result.to_create {
            tracing::info!("Adding event: {} due={}", event.title, event.due_display());
            match store.create_record(event).await {
                Ok(remote_id) => report.applied.push(AppliedChange {
                    kind: ChangeKind::Create,
                    event: event.clone(),
                    remote_id,
                }),
                Err(e) => {
                    tracing::error!(id = %event.id, error = %e, "failed to create record");
                    report.failed.push(FailedChange {
                        kind: ChangeKind::Create,
                        event: event.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        for update in &self.result.to_update {
            let event = &update.event;
            tracing::info!(
                "Updating event: {} due={} (remote id={})",
                event.title,
                event.due_display(),
                update.remote_id
            );
            match store.update_record(&update.remote_id, event).await {
                Ok(()) => report.applied.push(AppliedChange {
                    kind: ChangeKind::Update,
                    event: event.clone(),
                    remote_id: update.remote_id.clone(),
                }),
                Err(e) => {
                    tracing::error!(id = %event.id, error = %e, "failed to update record");
                    report.failed.push(FailedChange {
                        kind: ChangeKind::Update,
                        event: event.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }
}
