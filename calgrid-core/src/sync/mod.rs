//! Pulls entity collections from the API and reconciles them into the store.
//!
//! Each container keeps an issuance counter. A request takes a ticket when it
//! is issued; when its response arrives it is applied only if no newer request
//! for the same container was issued in the meantime. A failed request leaves
//! the container untouched.

mod client;
mod remote;

pub use client::ApiClient;
pub use remote::Remote;

use std::cell::Cell;
use std::collections::HashMap;

use tracing::{info, warn};

use crate::constants::PERSONAL_CALENDAR_NAME;
use crate::error::CalgridResult;
use crate::model::{Calendar, CalendarMap, Event, IdpUser, User};
use crate::store::AppState;

/// What happened to a fetched response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Written to the store; carries the number of entities.
    Applied(usize),
    /// A newer request was issued before this one resolved.
    Stale,
}

#[derive(Debug, Default)]
struct Tickets {
    issued: Cell<u64>,
}

impl Tickets {
    fn issue(&self) -> u64 {
        let ticket = self.issued.get() + 1;
        self.issued.set(ticket);
        ticket
    }

    fn latest(&self) -> u64 {
        self.issued.get()
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.issued.get() == ticket
    }
}

pub struct Synchronizer<R> {
    remote: R,
    state: AppState,
    events: Tickets,
    calendars: Tickets,
    tasks: Tickets,
    users: Tickets,
}

impl<R: Remote> Synchronizer<R> {
    pub fn new(remote: R, state: AppState) -> Self {
        Synchronizer {
            remote,
            state,
            events: Tickets::default(),
            calendars: Tickets::default(),
            tasks: Tickets::default(),
            users: Tickets::default(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Replace `events` with everything the session can see.
    ///
    /// The request is issued when this is called, not when the future is first
    /// polled.
    pub fn fetch_events(&self) -> impl Future<Output = CalgridResult<SyncOutcome>> {
        let ticket = self.events.issue();
        async move {
            let events = self.remote.list_events().await?;
            if !self.events.is_latest(ticket) {
                warn!(ticket, latest = self.events.latest(), "discarding stale events response");
                return Ok(SyncOutcome::Stale);
            }

            let count = events.len();
            self.state.events.set(events);
            info!(count, "reconciled events");
            Ok(SyncOutcome::Applied(count))
        }
    }

    /// Replace `calendars`. Calendars seen for the first time become visible;
    /// selected ids of calendars that disappeared are dropped.
    pub fn fetch_calendars(&self) -> impl Future<Output = CalgridResult<SyncOutcome>> {
        let ticket = self.calendars.issue();
        async move {
            let calendars = self.remote.list_calendars().await?;
            if !self.calendars.is_latest(ticket) {
                warn!(
                    ticket,
                    latest = self.calendars.latest(),
                    "discarding stale calendars response"
                );
                return Ok(SyncOutcome::Stale);
            }

            let previous = self.state.calendars.get();
            let map: CalendarMap = calendars.into_iter().collect();
            let count = map.len();
            let new_ids: Vec<String> = map
                .ids()
                .filter(|id| !previous.contains(id))
                .map(String::from)
                .collect();

            self.state.calendars.set(map);

            let current = self.state.calendars.get();
            self.state.selected_calendars.update(|selected| {
                selected.retain(|id| current.contains(id));
                selected.extend(new_ids);
            });

            info!(count, "reconciled calendars");
            Ok(SyncOutcome::Applied(count))
        }
    }

    pub fn fetch_tasks(&self) -> impl Future<Output = CalgridResult<SyncOutcome>> {
        let ticket = self.tasks.issue();
        async move {
            let tasks = self.remote.list_tasks().await?;
            if !self.tasks.is_latest(ticket) {
                warn!(ticket, latest = self.tasks.latest(), "discarding stale tasks response");
                return Ok(SyncOutcome::Stale);
            }

            let count = tasks.len();
            self.state.tasks.set(tasks);
            info!(count, "reconciled tasks");
            Ok(SyncOutcome::Applied(count))
        }
    }

    pub fn fetch_users(&self) -> impl Future<Output = CalgridResult<SyncOutcome>> {
        let ticket = self.users.issue();
        async move {
            let users = self.remote.list_users().await?;
            if !self.users.is_latest(ticket) {
                warn!(ticket, latest = self.users.latest(), "discarding stale users response");
                return Ok(SyncOutcome::Stale);
            }

            let count = users.len();
            let by_id: HashMap<String, User> =
                users.into_iter().map(|u| (u.id.clone(), u)).collect();
            self.state.all_users.set(by_id);
            info!(count, "reconciled users");
            Ok(SyncOutcome::Applied(count))
        }
    }

    /// Store the signed-in user from an identity-provider session.
    pub fn apply_identity(&self, identity: IdpUser) -> User {
        let user = User::from(identity);
        info!(user = %user.id, "signed-in user loaded");
        self.state.user_info.set(Some(user.clone()));
        user
    }

    // An acknowledged mutation takes an events ticket before it is applied, so
    // a full fetch issued earlier cannot overwrite it. A failed mutation takes
    // none and leaves in-flight fetches valid.

    #[tracing::instrument(skip(self, event), fields(event = %event.id))]
    pub async fn create_event(&self, event: &Event) -> CalgridResult<Event> {
        let created = self.remote.create_event(event).await?;
        self.events.issue();
        upsert_event(&self.state, created.clone());
        Ok(created)
    }

    #[tracing::instrument(skip(self, event), fields(event = %event.id))]
    pub async fn update_event(&self, event: &Event) -> CalgridResult<Event> {
        let updated = self.remote.update_event(event).await?;
        self.events.issue();
        upsert_event(&self.state, updated.clone());
        Ok(updated)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_event(&self, id: &str) -> CalgridResult<()> {
        self.remote.delete_event(id).await?;
        self.events.issue();
        self.state.events.update(|events| events.retain(|e| e.id != id));
        info!("event deleted");
        Ok(())
    }
}

/// Insert an acknowledged event, replacing any existing copy with the same id.
pub fn upsert_event(state: &AppState, event: Event) {
    state.events.update(|events| {
        match events.iter_mut().find(|e| e.id == event.id) {
            Some(existing) => *existing = event,
            None => events.push(event),
        }
    });
}

/// Calendars in display order: those named "Personal" first, the rest in the
/// order they were encountered.
pub fn get_calendars_array(calendars: &CalendarMap) -> Vec<Calendar> {
    let (mut personal, rest): (Vec<Calendar>, Vec<Calendar>) = calendars
        .iter()
        .cloned()
        .partition(|c| c.name == PERSONAL_CALENDAR_NAME);
    personal.extend(rest);
    personal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalgridError;
    use crate::layout::TimeWindow;
    use crate::model::Task;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::pin::pin;
    use std::task::{Context, Poll, Waker};
    use tokio::sync::oneshot;

    type Reply<T> = oneshot::Receiver<CalgridResult<T>>;

    /// Remote whose responses are fed through channels, one per request.
    #[derive(Default)]
    struct FakeRemote {
        events: RefCell<VecDeque<Reply<Vec<Event>>>>,
        calendars: RefCell<Vec<Calendar>>,
        deleted: RefCell<Vec<String>>,
        reject_mutations: Cell<bool>,
    }

    impl FakeRemote {
        fn expect_events(&self) -> oneshot::Sender<CalgridResult<Vec<Event>>> {
            let (tx, rx) = oneshot::channel();
            self.events.borrow_mut().push_back(rx);
            tx
        }
    }

    impl Remote for FakeRemote {
        async fn list_events(&self) -> CalgridResult<Vec<Event>> {
            let rx = self
                .events
                .borrow_mut()
                .pop_front()
                .expect("unexpected events request");
            rx.await.expect("response sender dropped")
        }

        async fn list_calendars(&self) -> CalgridResult<Vec<Calendar>> {
            Ok(self.calendars.borrow().clone())
        }

        async fn list_tasks(&self) -> CalgridResult<Vec<Task>> {
            Ok(vec![])
        }

        async fn list_users(&self) -> CalgridResult<Vec<User>> {
            Ok(vec![User {
                id: "u1".to_string(),
                name: "Ada Lovelace".to_string(),
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
                avatar: String::new(),
            }])
        }

        async fn create_event(&self, event: &Event) -> CalgridResult<Event> {
            let mut created = event.clone();
            created.id = format!("srv-{}", event.id);
            Ok(created)
        }

        async fn update_event(&self, event: &Event) -> CalgridResult<Event> {
            if self.reject_mutations.get() {
                return Err(CalgridError::Status {
                    url: format!("/events/{}", event.id),
                    status: 409,
                    body: "conflict".to_string(),
                });
            }
            Ok(event.clone())
        }

        async fn delete_event(&self, id: &str) -> CalgridResult<()> {
            self.deleted.borrow_mut().push(id.to_string());
            Ok(())
        }
    }

    fn poll_once<F: Future>(fut: std::pin::Pin<&mut F>) -> Poll<F::Output> {
        let mut cx = Context::from_waker(Waker::noop());
        fut.poll(&mut cx)
    }

    fn state() -> AppState {
        AppState::new(TimeWindow::utc_day(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()))
    }

    fn event(id: &str) -> Event {
        Event {
            id: id.to_string(),
            calendar_id: "work".to_string(),
            date: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            title: id.to_string(),
            description: String::new(),
            duration: 30,
            accepted: true,
            recurring: None,
            recurrence_id: None,
        }
    }

    fn calendar(id: &str, name: &str) -> Calendar {
        Calendar {
            id: id.to_string(),
            name: name.to_string(),
            color: "#f59e0b".to_string(),
            is_default: false,
        }
    }

    fn event_ids(state: &AppState) -> Vec<String> {
        state.events.get().iter().map(|e| e.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_fetch_events_replaces_container() {
        let sync = Synchronizer::new(FakeRemote::default(), state());
        sync.state().events.set(vec![event("old")]);

        let tx = sync.remote().expect_events();
        tx.send(Ok(vec![event("a"), event("b")])).unwrap();

        assert_eq!(sync.fetch_events().await.unwrap(), SyncOutcome::Applied(2));
        assert_eq!(event_ids(sync.state()), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_events_untouched() {
        let sync = Synchronizer::new(FakeRemote::default(), state());
        sync.state().events.set(vec![event("kept")]);

        let tx = sync.remote().expect_events();
        tx.send(Err(CalgridError::decode("event", "bad date"))).unwrap();

        assert!(sync.fetch_events().await.is_err());
        assert_eq!(event_ids(sync.state()), vec!["kept"]);
    }

    #[tokio::test]
    async fn test_older_response_arriving_last_is_ignored() {
        let sync = Synchronizer::new(FakeRemote::default(), state());
        let first_tx = sync.remote().expect_events();
        let second_tx = sync.remote().expect_events();

        let mut first = pin!(sync.fetch_events());
        assert!(poll_once(first.as_mut()).is_pending());
        let mut second = pin!(sync.fetch_events());
        assert!(poll_once(second.as_mut()).is_pending());

        second_tx.send(Ok(vec![event("newer")])).unwrap();
        assert_eq!(second.await.unwrap(), SyncOutcome::Applied(1));

        first_tx.send(Ok(vec![event("older")])).unwrap();
        assert_eq!(first.await.unwrap(), SyncOutcome::Stale);

        assert_eq!(event_ids(sync.state()), vec!["newer"]);
    }

    #[tokio::test]
    async fn test_older_response_arriving_first_is_ignored() {
        let sync = Synchronizer::new(FakeRemote::default(), state());
        let first_tx = sync.remote().expect_events();
        let second_tx = sync.remote().expect_events();

        let mut first = pin!(sync.fetch_events());
        assert!(poll_once(first.as_mut()).is_pending());
        let second = sync.fetch_events();

        first_tx.send(Ok(vec![event("older")])).unwrap();
        assert_eq!(first.await.unwrap(), SyncOutcome::Stale);
        assert!(sync.state().events.get().is_empty());

        second_tx.send(Ok(vec![event("newer")])).unwrap();
        assert_eq!(second.await.unwrap(), SyncOutcome::Applied(1));
        assert_eq!(event_ids(sync.state()), vec!["newer"]);
    }

    #[tokio::test]
    async fn test_fetch_calendars_selects_new_and_drops_removed() {
        let sync = Synchronizer::new(FakeRemote::default(), state());
        *sync.remote().calendars.borrow_mut() =
            vec![calendar("w", "Work"), calendar("p", "Personal")];
        sync.fetch_calendars().await.unwrap();

        // user hides Work
        sync.state().toggle_calendar("w");

        *sync.remote().calendars.borrow_mut() =
            vec![calendar("w", "Work"), calendar("s", "School")];
        assert_eq!(sync.fetch_calendars().await.unwrap(), SyncOutcome::Applied(2));

        let selected: Vec<String> = sync.state().selected_calendars.get().iter().cloned().collect();
        assert_eq!(selected, vec!["s"]);
    }

    #[tokio::test]
    async fn test_fetch_users_keys_by_id() {
        let sync = Synchronizer::new(FakeRemote::default(), state());
        sync.fetch_users().await.unwrap();
        assert_eq!(sync.state().all_users.get()["u1"].username, "ada");
    }

    #[tokio::test]
    async fn test_mutations_patch_events() {
        let sync = Synchronizer::new(FakeRemote::default(), state());
        sync.state().events.set(vec![event("a")]);

        let created = sync.create_event(&event("b")).await.unwrap();
        assert_eq!(created.id, "srv-b");

        let mut changed = event("a");
        changed.title = "Renamed".to_string();
        sync.update_event(&changed).await.unwrap();

        sync.delete_event("srv-b").await.unwrap();

        assert_eq!(event_ids(sync.state()), vec!["a"]);
        assert_eq!(sync.state().event("a").unwrap().title, "Renamed");
        assert_eq!(*sync.remote().deleted.borrow(), vec!["srv-b"]);
    }

    #[tokio::test]
    async fn test_mutation_makes_earlier_fetch_stale() {
        let sync = Synchronizer::new(FakeRemote::default(), state());
        let tx = sync.remote().expect_events();

        let fetch = sync.fetch_events();
        sync.create_event(&event("fresh")).await.unwrap();

        tx.send(Ok(vec![])).unwrap();
        assert_eq!(fetch.await.unwrap(), SyncOutcome::Stale);
        assert_eq!(event_ids(sync.state()), vec!["srv-fresh"]);
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_earlier_fetch_valid() {
        let sync = Synchronizer::new(FakeRemote::default(), state());
        sync.remote().reject_mutations.set(true);
        let tx = sync.remote().expect_events();

        let fetch = sync.fetch_events();
        assert!(sync.update_event(&event("a")).await.is_err());

        tx.send(Ok(vec![event("a"), event("b")])).unwrap();
        assert_eq!(fetch.await.unwrap(), SyncOutcome::Applied(2));
        assert_eq!(event_ids(sync.state()), vec!["a", "b"]);
    }

    #[test]
    fn test_personal_calendar_sorts_first() {
        let calendars: CalendarMap = [
            calendar("w", "Work"),
            calendar("p", "Personal"),
            calendar("s", "School"),
        ]
        .into_iter()
        .collect();

        let names: Vec<String> = get_calendars_array(&calendars)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Personal", "Work", "School"]);
    }

    #[test]
    fn test_calendars_array_without_personal_keeps_order() {
        let calendars: CalendarMap = [calendar("b", "B"), calendar("a", "A")].into_iter().collect();
        let ids: Vec<String> = get_calendars_array(&calendars)
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
