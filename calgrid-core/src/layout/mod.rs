//! Time-grid layout: turns possibly-overlapping events into non-colliding
//! rectangles.
//!
//! Events are bucketed by day column, sorted by `(date, id)`, grouped into
//! overlap clusters and given the lowest free column in their cluster. A
//! cluster with `n` columns splits the day width into `n` equal slots.
//!
//! Heights are floored to `min_event_minutes` so very short events stay
//! visible. The floor does not take part in clustering, so a short event may be
//! drawn over the top of the next event in its column.

mod cluster;
mod geometry;
mod window;

pub use cluster::{Placement, assign_columns};
pub use geometry::GridGeometry;
pub use window::TimeWindow;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::model::{Event, EventPosition};
use crate::store::{AppState, PositionMap, Subscription};

/// Lay out every event whose calendar is selected and whose start falls inside
/// `window`. Returns an empty map when `geometry` is not usable.
pub fn compute_positions(
    events: &[Event],
    selected_calendars: &BTreeSet<String>,
    window: &TimeWindow,
    geometry: &GridGeometry,
) -> PositionMap {
    let mut positions = PositionMap::new();
    if !geometry.is_valid() {
        return positions;
    }

    let mut days: BTreeMap<u32, Vec<&Event>> = BTreeMap::new();
    for event in events {
        if !selected_calendars.contains(&event.calendar_id) {
            continue;
        }
        if let Some(day) = window.day_index(event.date) {
            days.entry(day).or_default().push(event);
        }
    }

    for (day, mut day_events) in days {
        day_events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

        // Clustering uses the real duration; the height floor is visual only.
        let intervals: Vec<_> = day_events.iter().map(|e| (e.date, e.end())).collect();
        let placements = assign_columns(&intervals);

        let day_start = window.day_start(day);
        let day_left = day as f64 * geometry.item_width;

        for (event, placement) in day_events.iter().zip(placements) {
            let offset_minutes = (event.date - day_start).num_seconds() as f64 / 60.0;
            let slot_width = geometry.item_width / placement.columns as f64;

            positions.insert(
                event.id.clone(),
                EventPosition {
                    top: offset_minutes * geometry.item_height,
                    left: day_left + placement.column as f64 * slot_width,
                    width: slot_width,
                    height: geometry.effective_minutes(event.duration) as f64
                        * geometry.item_height,
                },
            );
        }
    }

    positions
}

/// Recompute `event_positions` from the current state.
#[tracing::instrument(skip_all)]
pub fn recompute(state: &AppState, min_event_minutes: i64) {
    let geometry = GridGeometry::new(*state.grid_item_height.get(), *state.grid_item_width.get())
        .with_min_event_minutes(min_event_minutes);

    if !geometry.is_valid() {
        if geometry.item_height < 0.0
            || geometry.item_width < 0.0
            || !geometry.item_height.is_finite()
            || !geometry.item_width.is_finite()
        {
            warn!(
                item_height = geometry.item_height,
                item_width = geometry.item_width,
                "invalid grid geometry, clearing event positions"
            );
        } else {
            debug!("grid not measured yet, clearing event positions");
        }
        state.event_positions.set(PositionMap::new());
        return;
    }

    let events = state.events.get();
    let selected = state.selected_calendars.get();
    let window = *state.view_window.get();

    let positions = compute_positions(&events, &selected, &window, &geometry);
    debug!(
        events = events.len(),
        positions = positions.len(),
        "recomputed event layout"
    );
    state.event_positions.set(positions);
}

/// Keeps `event_positions` up to date while alive.
///
/// Recomputes whenever events, selected calendars, grid geometry or the view
/// window change. Dropping the engine detaches it.
pub struct LayoutEngine {
    _subscriptions: Vec<Subscription>,
}

impl LayoutEngine {
    pub fn install(state: &AppState) -> Self {
        Self::install_with_min_minutes(state, crate::constants::MIN_EVENT_MINUTES)
    }

    pub fn install_with_min_minutes(state: &AppState, min_event_minutes: i64) -> Self {
        let trigger = move |state: &AppState| {
            let state = state.clone();
            move || recompute(&state, min_event_minutes)
        };

        let subscriptions = vec![
            {
                let run = trigger(state);
                state.events.subscribe(move |_| run())
            },
            {
                let run = trigger(state);
                state.selected_calendars.subscribe(move |_| run())
            },
            {
                let run = trigger(state);
                state.grid_item_height.subscribe(move |_| run())
            },
            {
                let run = trigger(state);
                state.grid_item_width.subscribe(move |_| run())
            },
            {
                let run = trigger(state);
                state.view_window.subscribe(move |_| run())
            },
        ];

        recompute(state, min_event_minutes);

        LayoutEngine {
            _subscriptions: subscriptions,
        }
    }
}
