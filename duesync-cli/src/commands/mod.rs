pub mod config;
pub mod status;
pub mod sync;

use std::path::Path;

use anyhow::Result;
use chrono_tz::Tz;
use duesync_core::config::SyncConfig;
use duesync_core::feed::HttpFeeds;
use duesync_core::remote::NotionStore;
use duesync_core::{SyncPlan, SyncWindow};

use crate::render::render_plan_header;
use crate::utils::tui::create_spinner;

/// Load config, fetch both sides and reconcile them.
///
/// Returns the store too so `sync` can apply the plan with it, and the
/// configured timezone for rendering.
pub async fn prepare(
    config_path: Option<&Path>,
    from: Option<&str>,
) -> Result<(SyncPlan, NotionStore, Tz)> {
    let config = SyncConfig::load(config_path)?;
    let tz = config.tz()?;
    let window = SyncWindow::from_arg(from, tz).map_err(|e| anyhow::anyhow!(e))?;

    let feeds = HttpFeeds::new(config.feeds.clone(), tz)?;
    let store = NotionStore::new(&config)?;

    let spinner = create_spinner("Fetching feeds and Notion records");
    let plan = SyncPlan::prepare(&feeds, &store, &config.accepted_subjects(), window).await;
    spinner.finish_and_clear();

    let plan = plan?;
    println!("{}", render_plan_header(&plan, tz));

    Ok((plan, store, tz))
}
