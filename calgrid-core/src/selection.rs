//! Keeps selections and UI flags consistent with the entity collections.
//!
//! A selection that refers to an event or calendar is replaced by the
//! canonical copy when that entity changes, and cleared (closing the panel
//! that shows it) when the entity is removed. Hiding a calendar prunes its
//! positions right away instead of waiting for the next layout pass.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::model::{CalendarMap, Event};
use crate::store::{AppState, PositionMap, Subscription};

/// Reconcile event-backed selections with `events`.
pub fn reconcile_event_selections(state: &AppState, events: &[Event]) {
    let by_id: HashMap<&str, &Event> = events.iter().map(|e| (e.id.as_str(), e)).collect();

    let selected = state.selected_event.get();
    if let Some(selected) = &*selected {
        match by_id.get(selected.id.as_str()) {
            None => {
                debug!(event = %selected.id, "selected event removed, closing details");
                state.selected_event.set(None);
                state.selected_position.set(None);
                state.show_event_details.set(false);
            }
            Some(&canonical) if canonical != selected => {
                state.selected_event.set(Some(canonical.clone()));
            }
            Some(_) => {}
        }
    }

    let editing = state.edit_event.get();
    if let Some(editing) = &*editing {
        match by_id.get(editing.id.as_str()) {
            None => {
                debug!(event = %editing.id, "edited event removed, closing editor");
                state.edit_event.set(None);
                state.show_create_task.set(false);
            }
            Some(&canonical) if canonical != editing => {
                state.edit_event.set(Some(canonical.clone()));
            }
            Some(_) => {}
        }
    }

    let dragging = state.dragging.get();
    if let Some(id) = dragging.as_deref() {
        if !by_id.contains_key(id) {
            debug!(event = %id, "dragged event removed, cancelling drag");
            state.dragging.set(None);
        }
    }
}

/// Drop positions of events whose calendar is no longer selected.
pub fn prune_hidden_positions(state: &AppState, selected_calendars: &BTreeSet<String>) {
    let events = state.events.get();
    let calendar_of: HashMap<&str, &str> = events
        .iter()
        .map(|e| (e.id.as_str(), e.calendar_id.as_str()))
        .collect();

    let hidden: Vec<String> = state
        .event_positions
        .get()
        .keys()
        .filter(|id| {
            calendar_of
                .get(id.as_str())
                .is_none_or(|calendar| !selected_calendars.contains(*calendar))
        })
        .cloned()
        .collect();

    if hidden.is_empty() {
        return;
    }

    debug!(pruned = hidden.len(), "pruning positions of hidden calendars");
    state.event_positions.update(|positions| {
        for id in &hidden {
            positions.remove(id);
        }
    });
}

/// Keep the selected calendar set and the selected calendar pointing at
/// calendars that still exist.
pub fn reconcile_calendar_selections(state: &AppState, calendars: &CalendarMap) {
    let stale: Vec<String> = state
        .selected_calendars
        .get()
        .iter()
        .filter(|id| !calendars.contains(id))
        .cloned()
        .collect();

    if !stale.is_empty() {
        debug!(stale = ?stale, "dropping selected ids of removed calendars");
        state.selected_calendars.update(|selected| {
            for id in &stale {
                selected.remove(id);
            }
        });
    }

    let selected = state.selected_calendar.get();
    if let Some(selected) = &*selected {
        match calendars.get(&selected.id) {
            None => {
                state.selected_calendar.set(None);
                state.show_calendar_details.set(false);
            }
            Some(canonical) if canonical != selected => {
                state.selected_calendar.set(Some(canonical.clone()));
            }
            Some(_) => {}
        }
    }
}

/// Follow the selected event's rectangle when the layout moves it, and drop
/// it once the event is no longer laid out.
pub fn follow_selected_position(state: &AppState, positions: &PositionMap) {
    let selected = state.selected_event.get();
    let Some(selected) = &*selected else {
        return;
    };

    let position = positions.get(&selected.id).copied();
    if *state.selected_position.get() != position {
        state.selected_position.set(position);
    }
}

/// Holds the subscriptions that enforce selection consistency.
pub struct SelectionGuard {
    _subscriptions: Vec<Subscription>,
}

impl SelectionGuard {
    pub fn install(state: &AppState) -> Self {
        let subscriptions = vec![
            {
                let state = state.clone();
                state
                    .events
                    .clone()
                    .subscribe(move |events: &Vec<Event>| reconcile_event_selections(&state, events))
            },
            {
                let state = state.clone();
                state
                    .selected_calendars
                    .clone()
                    .subscribe(move |selected: &BTreeSet<String>| {
                        prune_hidden_positions(&state, selected)
                    })
            },
            {
                let state = state.clone();
                state
                    .calendars
                    .clone()
                    .subscribe(move |calendars: &CalendarMap| {
                        reconcile_calendar_selections(&state, calendars)
                    })
            },
            {
                let state = state.clone();
                state
                    .event_positions
                    .clone()
                    .subscribe(move |positions: &PositionMap| {
                        follow_selected_position(&state, positions)
                    })
            },
        ];

        SelectionGuard {
            _subscriptions: subscriptions,
        }
    }
}
