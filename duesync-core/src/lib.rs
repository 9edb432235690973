//! Core of duesync: mirrors deadline events from calendar feeds into a
//! Notion database.
//!
//! A run fetches and merges the ICS feeds (`feed`, `ics`), normalizes each
//! event (`normalize`, `classify`), snapshots the remote database (`remote`),
//! decides what to write (`reconcile`) and applies it (`sync`).

pub mod classify;
pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod ics;
pub mod normalize;
pub mod reconcile;
pub mod remote;
pub mod sync;
pub mod sync_window;

pub use error::{DueSyncError, DueSyncResult};
pub use event::{Event, RawEvent, RemoteId, RemoteIndex, RemoteRecord};
pub use sync::{SyncPlan, SyncReport};
pub use sync_window::SyncWindow;
