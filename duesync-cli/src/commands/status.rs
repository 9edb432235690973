use std::path::Path;

use anyhow::Result;

use crate::render::{render_result, render_skipped};

pub async fn run(config_path: Option<&Path>, from: Option<&str>, verbose: bool) -> Result<()> {
    let (plan, _store, tz) = super::prepare(config_path, from).await?;

    println!("{}", render_result(&plan.result, verbose, tz));
    println!("{}", render_skipped(&plan.result));

    Ok(())
}
