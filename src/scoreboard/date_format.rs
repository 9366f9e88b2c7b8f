//! Static event-window display strings.

use chrono::{DateTime, Datelike, FixedOffset, Utc};

/// English ordinal suffix for `n`
pub fn ordinal_suffix(n: u32) -> &'static str {
    if (11..=13).contains(&(n % 100)) {
        return "th";
    }
    match n % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// e.g. `December 7th`
pub fn format_event_date(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    let local = instant.with_timezone(&offset);
    let day = local.day();
    format!("{} {}{}", local.format("%B"), day, ordinal_suffix(day))
}

/// e.g. `8:00 PM`
pub fn format_event_time(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant.with_timezone(&offset).format("%-I:%M %p").to_string()
}
