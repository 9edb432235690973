use std::path::Path;

use anyhow::Result;
use duesync_core::config::SyncConfig;
use owo_colors::OwoColorize;

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let default_path = SyncConfig::config_path()?;

    if !default_path.exists() {
        SyncConfig::create_default_config(&default_path)?;
        println!("Created {}", default_path.display());
    }

    println!("{}", "Paths".bold());
    println!("  Config:     {}", default_path.display());
    if let Some(path) = config_path {
        println!("  Override:   {}", path.display());
    }

    println!();
    println!("{}", "Settings".bold());

    let config = match SyncConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("  {}", e.to_string().red());
            return Ok(());
        }
    };

    println!("  Timezone:   {}", config.timezone);
    println!("  Feeds:");
    for feed in &config.feeds {
        println!("    {}", feed);
    }
    println!("  Notion token:     {}", "<redacted>".dimmed());
    println!("  Notion database:  {}", config.notion.database_id);
    println!(
        "  Notion category:  {}",
        config.notion.category_id.as_deref().unwrap_or("(none)")
    );

    let props = &config.notion.properties;
    println!(
        "  Properties:       title={}, due={}, join_key={}, category={}, subcategory={}",
        props.title, props.due, props.join_key, props.category, props.subcategory
    );

    println!("  Subjects:");
    if config.subjects.is_empty() {
        println!("    {}", "(none, every event will be excluded)".dimmed());
    }
    for (code, page) in &config.subjects {
        println!("    {} → {}", code, page);
    }

    Ok(())
}
