use std::path::PathBuf;

use anyhow::Result;
use owo_colors::OwoColorize;

use eventbuddy_core::feed::source::{FeedSource, FileFeed};
use eventbuddy_core::feed::{decode_feed, sync};
use eventbuddy_core::store::FileStore;

use super::create_spinner;
use crate::config::Config;

pub async fn run(config: &Config, feed_override: Option<PathBuf>) -> Result<()> {
    let Some(feed_path) = feed_override.or_else(|| config.feed_path()) else {
        anyhow::bail!(
            "No feed configured.\n\n\
            Point eventbuddy at a feed document with:\n  \
            eventbuddy sync --feed <path>\n\n\
            or set feed_path in your config.toml."
        );
    };

    let mut store = FileStore::open(config.data_path()?)?;

    let spinner = create_spinner("Syncing feed".to_string());
    let fetched = FileFeed::new(&feed_path).fetch().await;
    spinner.finish_and_clear();

    let envelope = decode_feed(&fetched?)?;
    let (report, seeded) = match sync::seed_if_needed(&envelope, &mut store)? {
        Some(report) => (report, true),
        None => (sync::sync(&envelope, &mut store)?, false),
    };

    if seeded {
        println!("{}", "Seeded store from feed".green());
    }
    println!(
        "Synced {} created, {} updated, {} skipped",
        report.created.to_string().green(),
        report.updated.to_string().yellow(),
        report.skipped
    );

    Ok(())
}
