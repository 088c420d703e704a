//! Client-side state and time-grid layout for the calgrid calendar.
//!
//! - `store`: observable containers holding calendars, events, tasks and UI state
//! - `sync`: fetches collections from the API and reconciles them last-writer-wins
//! - `layout`: places overlapping events side by side on the grid
//! - `selection`: keeps selections consistent as collections change

pub mod config;
pub mod constants;
pub mod error;
pub mod layout;
pub mod model;
pub mod outside_click;
pub mod selection;
pub mod store;
pub mod sync;
pub mod time;

pub use error::{CalgridError, CalgridResult};
pub use layout::{GridGeometry, LayoutEngine, TimeWindow, compute_positions};
pub use model::{Calendar, CalendarMap, Event, EventPosition, Priority, Task, User};
pub use selection::SelectionGuard;
pub use store::{AppState, Observable, PositionMap, Subscription};
pub use sync::{ApiClient, Remote, SyncOutcome, Synchronizer, get_calendars_array};
