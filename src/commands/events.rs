use anyhow::{Context, Result};
use calgrid_core::config::AppConfig;
use calgrid_core::model::Event;
use chrono::{Local, NaiveDate};
use chrono_tz::Tz;
use owo_colors::OwoColorize;

use crate::render::render_event;

pub async fn run(config: &AppConfig, tz: Tz, day: Option<NaiveDate>) -> Result<()> {
    let sync = super::connect(config);
    let host = config.api_host();

    sync.fetch_calendars()
        .await
        .with_context(|| format!("Failed to fetch calendars from {host}"))?;
    sync.fetch_events()
        .await
        .with_context(|| format!("Failed to fetch events from {host}"))?;

    let state = sync.state();
    let calendars = state.calendars.get();
    let events: Vec<Event> = state
        .visible_events()
        .into_iter()
        .filter(|e| day.is_none_or(|d| e.date.with_timezone(&tz).date_naive() == d))
        .collect();

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    let mut current_date: Option<NaiveDate> = None;
    for event in &events {
        let date = event.date.with_timezone(&tz).date_naive();
        if current_date != Some(date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", format_date_label(date).bold());
            current_date = Some(date);
        }

        let calendar_name = calendars
            .get(&event.calendar_id)
            .map(|c| c.name.as_str())
            .unwrap_or("unknown calendar");
        println!("{}", render_event(event, &tz, calendar_name));
    }

    Ok(())
}

/// "Today", "Tomorrow", or e.g. "Wed Feb 25".
fn format_date_label(date: NaiveDate) -> String {
    let today = Local::now().date_naive();

    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}
