use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;

use eventbuddy_core::backup::import::{import_from, MergeCounts};
use eventbuddy_core::store::FileStore;

use super::create_spinner;
use crate::config::Config;

pub fn run(config: &Config, source: &Path) -> Result<()> {
    let mut store = FileStore::open(config.data_path()?)?;

    let spinner = create_spinner(format!("Importing {}", source.display()));
    let result = import_from(source, &mut store);
    spinner.finish_and_clear();
    let report = result?;

    println!("Friends:       {}", render_counts(&report.friends));
    println!("Events:        {}", render_counts(&report.events));
    println!(
        "Relationships: {} linked",
        report.relationships_created.to_string().green()
    );

    Ok(())
}

fn render_counts(counts: &MergeCounts) -> String {
    format!(
        "{} created, {} updated, {} skipped",
        counts.created.to_string().green(),
        counts.updated.to_string().yellow(),
        counts.skipped
    )
}
