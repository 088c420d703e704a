use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use calgrid_core::layout::{LayoutEngine, TimeWindow};
use calgrid_core::model::Event;
use calgrid_core::store::AppState;
use chrono::{Local, NaiveDate, Weekday};
use chrono_tz::Tz;
use owo_colors::OwoColorize;

use crate::render::Render;

pub struct LayoutArgs {
    pub file: PathBuf,
    pub day: Option<NaiveDate>,
    pub week: bool,
    pub height: f64,
    pub width: f64,
    pub tz: Tz,
    pub json: bool,
}

pub fn run(args: LayoutArgs) -> Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let events = Event::decode_all(&bytes)
        .with_context(|| format!("Failed to decode events in {}", args.file.display()))?;

    let day = args.day.unwrap_or_else(|| Local::now().date_naive());
    let window = if args.week {
        TimeWindow::local_week(day, &args.tz, Weekday::Sun)
    } else {
        TimeWindow::local_day(day, &args.tz)
    };

    let state = AppState::new(window);
    let _engine = LayoutEngine::install(&state);

    let calendars: BTreeSet<String> = events.iter().map(|e| e.calendar_id.clone()).collect();
    state.selected_calendars.set(calendars);
    state.set_grid_size(args.height, args.width);
    state.events.set(events);

    let positions = state.event_positions.get();
    if args.json {
        let out = serde_json::to_string_pretty(&*positions)
            .context("Failed to serialize event positions")?;
        println!("{out}");
        return Ok(());
    }

    let total = state.events.get().len();
    println!(
        "{} {} ({} of {} events in window)",
        "Layout for".bold(),
        window.start.with_timezone(&args.tz).format("%a %b %-d %Y"),
        positions.len(),
        total
    );

    for event in state.visible_events() {
        let Some(position) = positions.get(&event.id) else {
            continue;
        };
        println!("  {:<24} {}", event.title, position.render().dimmed());
    }

    Ok(())
}
