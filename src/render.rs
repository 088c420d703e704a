//! Terminal rendering for calgrid types.
//!
//! Extension traits that add colored output to calgrid-core types using
//! owo_colors.

use calgrid_core::model::{Calendar, Event, EventPosition};
use calgrid_core::time::time_range;
use chrono_tz::Tz;
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Calendar {
    fn render(&self) -> String {
        let marker = if self.is_default {
            format!(" {}", "(default)".dimmed())
        } else {
            String::new()
        };
        format!("{} {}{}", "■".bold(), self.name, marker)
    }
}

impl Render for EventPosition {
    fn render(&self) -> String {
        format!(
            "top {:>7.1}  left {:>7.1}  width {:>6.1}  height {:>6.1}",
            self.top, self.left, self.width, self.height
        )
    }
}

/// An event line in `tz`, e.g. `3:30 PM - 4:30 PM  Standup [Work]`.
pub fn render_event(event: &Event, tz: &Tz, calendar_name: &str) -> String {
    let start = event.date.with_timezone(tz);
    let range = format!("{:>19}", time_range(&start, event.duration));
    let title = if event.accepted {
        event.title.to_string()
    } else {
        event.title.dimmed().to_string()
    };
    let recurring = if event.is_recurring() { " ↻" } else { "" };

    format!(
        "  {}  {}{} {}",
        range.cyan(),
        title,
        recurring,
        format!("[{calendar_name}]").dimmed()
    )
}
