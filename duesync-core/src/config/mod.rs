//! Configuration types for duesync.

mod notion_config;
mod sync_config;

pub use notion_config::{NotionConfig, PropertyNames};
pub use sync_config::SyncConfig;
