use anyhow::{Context, Result};
use calgrid_core::config::AppConfig;
use calgrid_core::sync::get_calendars_array;
use owo_colors::OwoColorize;

use crate::render::Render;

pub async fn run(config: &AppConfig) -> Result<()> {
    let sync = super::connect(config);
    sync.fetch_calendars()
        .await
        .with_context(|| format!("Failed to fetch calendars from {}", config.api_host()))?;

    let calendars = get_calendars_array(&sync.state().calendars.get());
    if calendars.is_empty() {
        println!("{}", "No calendars found".dimmed());
        return Ok(());
    }

    for calendar in &calendars {
        println!("{}", calendar.render());
    }

    Ok(())
}
