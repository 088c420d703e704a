//! Domain types shared by the store, the sync layer and the layout engine.
//!
//! Remote payloads are decoded into these types at the sync boundary; nothing
//! past that point handles untyped JSON.

mod calendar;
mod event;
mod position;
mod task;
mod user;
mod wire;

pub use calendar::{Calendar, CalendarMap};
pub use event::{Event, EventPayload};
pub use position::EventPosition;
pub use task::{Priority, Task, TaskPayload};
pub use user::{IdpTraits, IdpUser, Identity, User};
pub use wire::parse_instant;
