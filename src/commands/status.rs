use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;

use eventbuddy_core::store::{EntityStore, FileStore};

use crate::config::Config;
use crate::render;

pub fn run(config: &Config) -> Result<()> {
    let store = FileStore::open(config.data_path()?)?;

    let events = store.events()?;
    let friends = store.friends()?;
    println!(
        "{} events, {} friends ({})",
        events.len().to_string().bold(),
        friends.len().to_string().bold(),
        store.path().display().to_string().dimmed()
    );

    match store.seed_record()? {
        Some(seed) => println!(
            "Seeded from feed version {} on {}",
            seed.feed_version,
            seed.seeded_at.format("%Y-%m-%d")
        ),
        None => println!("{}", "Not seeded from a feed yet".yellow()),
    }

    let now = Utc::now();
    let mut upcoming = store.events_matching(&|e| e.start_date >= now)?;
    upcoming.sort_by_key(|e| e.start_date);

    if !upcoming.is_empty() {
        println!("\nUpcoming:");
        for event in upcoming.iter().take(5) {
            println!("  {}", render::event_line(event));
        }
    }

    Ok(())
}
