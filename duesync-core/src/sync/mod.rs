//! One sync run from feeds to the remote database.

mod plan;
mod report;

pub use plan::SyncPlan;
pub use report::{AppliedChange, FailedChange, SyncReport};
