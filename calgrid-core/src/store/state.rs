//! The set of containers that make up the client's view of the world.
//!
//! Each container has one writer:
//! - `sync` writes the entity collections (`user_info`, `all_users`, `calendars`,
//!   `events`, `tasks`).
//! - `layout` writes `event_positions`; `selection` may only prune it.
//! - The UI writes grid geometry, the view window and the transient flags;
//!   `selection` clears flags whose backing entity disappeared.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::layout::TimeWindow;
use crate::model::{Calendar, CalendarMap, Event, EventPosition, Task, User};
use crate::store::Observable;

/// Layout output keyed by event id.
pub type PositionMap = BTreeMap<String, EventPosition>;

#[derive(Clone)]
pub struct AppState {
    pub user_info: Observable<Option<User>>,
    pub all_users: Observable<HashMap<String, User>>,

    pub calendars: Observable<CalendarMap>,
    /// Ids of calendars shown on the grid. Always a subset of `calendars`.
    pub selected_calendars: Observable<BTreeSet<String>>,
    pub selected_calendar: Observable<Option<Calendar>>,

    /// Insertion order carries no meaning; sort by date for display.
    pub events: Observable<Vec<Event>>,
    pub tasks: Observable<Vec<Task>>,
    pub event_positions: Observable<PositionMap>,

    pub view_window: Observable<TimeWindow>,
    /// Pixels per minute
    pub grid_item_height: Observable<f64>,
    /// Pixels per day column
    pub grid_item_width: Observable<f64>,

    pub command_menu_open: Observable<bool>,
    pub show_event_details: Observable<bool>,
    pub show_create_task: Observable<bool>,
    pub show_calendar_details: Observable<bool>,
    pub outside_click: Observable<bool>,

    pub selected_event: Observable<Option<Event>>,
    pub selected_position: Observable<Option<EventPosition>>,
    pub edit_event: Observable<Option<Event>>,
    /// Id of the event being dragged
    pub dragging: Observable<Option<String>>,
}

impl AppState {
    pub fn new(view_window: TimeWindow) -> Self {
        AppState {
            user_info: Observable::default(),
            all_users: Observable::default(),
            calendars: Observable::default(),
            selected_calendars: Observable::default(),
            selected_calendar: Observable::default(),
            events: Observable::default(),
            tasks: Observable::default(),
            event_positions: Observable::default(),
            view_window: Observable::new(view_window),
            grid_item_height: Observable::new(0.0),
            grid_item_width: Observable::new(0.0),
            command_menu_open: Observable::default(),
            show_event_details: Observable::default(),
            show_create_task: Observable::default(),
            show_calendar_details: Observable::default(),
            outside_click: Observable::default(),
            selected_event: Observable::default(),
            selected_position: Observable::default(),
            edit_event: Observable::default(),
            dragging: Observable::default(),
        }
    }

    pub fn event(&self, id: &str) -> Option<Event> {
        self.events.get().iter().find(|e| e.id == id).cloned()
    }

    /// Events of selected calendars, sorted by start for display.
    pub fn visible_events(&self) -> Vec<Event> {
        let selected = self.selected_calendars.get();
        let mut events: Vec<Event> = self
            .events
            .get()
            .iter()
            .filter(|e| selected.contains(&e.calendar_id))
            .cloned()
            .collect();
        events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        events
    }

    /// Open the details panel for an event, remembering where it was drawn.
    pub fn select_event(&self, id: &str) -> bool {
        let Some(event) = self.event(id) else {
            return false;
        };
        let position = self.event_positions.get().get(id).copied();

        self.selected_event.set(Some(event));
        self.selected_position.set(position);
        self.show_event_details.set(true);
        true
    }

    pub fn close_event_details(&self) {
        self.show_event_details.set(false);
        self.selected_event.set(None);
        self.selected_position.set(None);
    }

    /// Show or hide a calendar on the grid. Unknown ids are ignored.
    pub fn toggle_calendar(&self, id: &str) -> bool {
        if !self.calendars.get().contains(id) {
            return false;
        }
        self.selected_calendars.update(|selected| {
            if !selected.remove(id) {
                selected.insert(id.to_string());
            }
        });
        true
    }

    pub fn set_grid_size(&self, item_height: f64, item_width: f64) {
        self.grid_item_height.set(item_height);
        self.grid_item_width.set(item_width);
    }
}
