use std::path::PathBuf;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use eventbuddy_core::backup::export::export_all_with_progress;
use eventbuddy_core::store::{EntityStore, FileStore};

use crate::config::Config;

pub fn run(config: &Config, to: Option<PathBuf>) -> Result<()> {
    let store = FileStore::open(config.data_path()?)?;
    let dest = match to {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let event_count = store.events()?.len();
    let friend_count = store.friends()?.len();

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("Exporting [{bar:30}] {percent}%")
            .unwrap(),
    );
    let package = export_all_with_progress(&store, &dest, |fraction| {
        bar.set_position((fraction * 100.0) as u64);
    });
    bar.finish_and_clear();
    let package = package?;

    println!(
        "Exported {} events and {} friends to {}",
        event_count.to_string().green(),
        friend_count.to_string().green(),
        package.dir.display().to_string().bold()
    );

    Ok(())
}
