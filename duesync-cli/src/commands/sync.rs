use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::render::{Render, render_result, render_skipped};

pub async fn run(config_path: Option<&Path>, from: Option<&str>, dry_run: bool) -> Result<()> {
    let (plan, store, tz) = super::prepare(config_path, from).await?;

    println!("{}", render_result(&plan.result, true, tz));
    println!("{}", render_skipped(&plan.result));

    if dry_run {
        println!("{}", "\nDry run: nothing written".dimmed());
        return Ok(());
    }

    if plan.result.is_empty() {
        return Ok(());
    }

    let report = plan.apply(&store).await;
    println!("\n{}", report.render());

    if report.has_failures() {
        anyhow::bail!(
            "{} of {} changes failed; they will be retried on the next run",
            report.failed.len(),
            report.failed.len() + report.applied.len()
        );
    }

    Ok(())
}
