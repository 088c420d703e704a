pub mod calendars;
pub mod events;
pub mod layout;

use calgrid_core::config::AppConfig;
use calgrid_core::layout::TimeWindow;
use calgrid_core::store::AppState;
use calgrid_core::sync::{ApiClient, Synchronizer};
use chrono::Utc;

/// A fresh session against the configured API host.
pub fn connect(config: &AppConfig) -> Synchronizer<ApiClient> {
    let client = ApiClient::from_config(config);
    let state = AppState::new(TimeWindow::utc_day(Utc::now().date_naive()));
    Synchronizer::new(client, state)
}
