//! Terminal rendering helpers for eventbuddy types.

use chrono_tz::Tz;
use owo_colors::OwoColorize;

use eventbuddy_core::Event;

/// One-line event summary. Times are shown in the event's own timezone when
/// the identifier names an IANA zone; derived offsets like `UTC+02:00` fall
/// back to UTC.
pub fn event_line(event: &Event) -> String {
    let start = match event.original_timezone.parse::<Tz>() {
        Ok(tz) => event
            .start_date
            .with_timezone(&tz)
            .format("%Y-%m-%d %H:%M %Z")
            .to_string(),
        Err(_) => event.start_date.format("%Y-%m-%d %H:%M UTC").to_string(),
    };

    let marker = if event.is_attending {
        "*".green().to_string()
    } else {
        " ".to_string()
    };

    format!("{} {}  {}", marker, start.dimmed(), event.title)
}
