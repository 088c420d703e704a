//! Wall-clock formatting used when labelling events on the grid.

use chrono::{DateTime, Datelike, Local, TimeDelta, TimeZone, Timelike};

/// 12-hour clock label, e.g. `3:30 PM`, or `3 PM` without minutes.
pub fn time_string<Tz: TimeZone>(time: &DateTime<Tz>, include_minutes: bool) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if include_minutes {
        time.format("%-I:%M %p").to_string()
    } else {
        time.format("%-I %p").to_string()
    }
}

/// `start - end` for an event lasting `duration` minutes. Only the start is
/// shown when the end is not a representable instant.
pub fn time_range<Tz: TimeZone>(start: &DateTime<Tz>, duration: i64) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let end = TimeDelta::try_minutes(duration).and_then(|d| start.clone().checked_add_signed(d));
    match end {
        Some(end) => format!("{} - {}", time_string(start, true), time_string(&end, true)),
        None => time_string(start, true),
    }
}

/// Same calendar date in the zone of each argument.
pub fn same_day<A: TimeZone, B: TimeZone>(a: &DateTime<A>, b: &DateTime<B>) -> bool {
    a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
}

/// Position within the hour as a fraction in `[0, 1)`.
pub fn minute_fraction<Tz: TimeZone>(time: &DateTime<Tz>) -> f64 {
    f64::from(time.minute()) / 60.0
}

pub fn current_hour() -> u32 {
    Local::now().hour()
}
