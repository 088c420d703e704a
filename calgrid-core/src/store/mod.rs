//! In-memory application state with change notification.

mod observable;
mod state;

pub use observable::{Observable, Subscription};
pub use state::{AppState, PositionMap};
