//! The remote boundary the sync layer talks to.
//!
//! Implementations return fully decoded domain types; an untyped payload never
//! crosses this trait.

use crate::error::CalgridResult;
use crate::model::{Calendar, Event, Task, User};

#[allow(async_fn_in_trait)]
pub trait Remote {
    /// Every event accessible to the current session.
    async fn list_events(&self) -> CalgridResult<Vec<Event>>;

    async fn list_calendars(&self) -> CalgridResult<Vec<Calendar>>;

    async fn list_tasks(&self) -> CalgridResult<Vec<Task>>;

    async fn list_users(&self) -> CalgridResult<Vec<User>>;

    /// Returns the event as stored remotely (with any server-assigned fields).
    async fn create_event(&self, event: &Event) -> CalgridResult<Event>;

    async fn update_event(&self, event: &Event) -> CalgridResult<Event>;

    async fn delete_event(&self, id: &str) -> CalgridResult<()>;
}
