//! Single-threaded observable containers.
//!
//! Every `set`/`update` notifies each live subscriber exactly once, even when
//! the new value equals the old one. A mutation made from inside a subscriber
//! is queued and delivered after the current round, so subscribers see
//! notifications in the order mutations were applied.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

struct Subscriber<T> {
    id: u64,
    active: Cell<bool>,
    callback: Box<dyn Fn(&T)>,
}

struct Inner<T> {
    value: RefCell<Rc<T>>,
    subscribers: RefCell<Vec<Rc<Subscriber<T>>>>,
    next_id: Cell<u64>,
    pending: RefCell<VecDeque<Rc<T>>>,
    notifying: Cell<bool>,
}

impl<T> Inner<T> {
    fn remove(&self, id: u64) {
        let mut subscribers = self.subscribers.borrow_mut();
        if let Some(subscriber) = subscribers.iter().find(|s| s.id == id) {
            subscriber.active.set(false);
        }
        subscribers.retain(|s| s.id != id);
    }
}

/// Resets the notifying flag even if a subscriber panics.
struct NotifyGuard<'a>(&'a Cell<bool>);

impl Drop for NotifyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// A value with change notification. Clones share the same container.
pub struct Observable<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Observable {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.inner.value.borrow())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl<T: 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Observable {
            inner: Rc::new(Inner {
                value: RefCell::new(Rc::new(value)),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                pending: RefCell::new(VecDeque::new()),
                notifying: Cell::new(false),
            }),
        }
    }

    /// Current value. Cheap: only bumps a reference count.
    pub fn get(&self) -> Rc<T> {
        Rc::clone(&self.inner.value.borrow())
    }

    /// Replace the value and notify.
    pub fn set(&self, value: T) {
        self.publish(Rc::new(value));
    }

    /// Read-modify-write on a copy of the current value, then notify.
    pub fn update(&self, f: impl FnOnce(&mut T))
    where
        T: Clone,
    {
        let mut next = T::clone(&self.get());
        f(&mut next);
        self.set(next);
    }

    /// Register a callback for future mutations. The callback is not invoked
    /// with the current value. Dropping the returned handle unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        self.inner.subscribers.borrow_mut().push(Rc::new(Subscriber {
            id,
            active: Cell::new(true),
            callback: Box::new(callback),
        }));

        let weak: Weak<Inner<T>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.remove(id);
                }
            })),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    fn publish(&self, value: Rc<T>) {
        *self.inner.value.borrow_mut() = Rc::clone(&value);
        self.inner.pending.borrow_mut().push_back(value);

        if self.inner.notifying.get() {
            return;
        }
        self.inner.notifying.set(true);
        let _guard = NotifyGuard(&self.inner.notifying);

        loop {
            let next = self.inner.pending.borrow_mut().pop_front();
            let Some(value) = next else {
                break;
            };

            let subscribers: Vec<_> = self.inner.subscribers.borrow().clone();
            for subscriber in subscribers {
                if subscriber.active.get() {
                    (subscriber.callback)(&value);
                }
            }
        }
    }
}

impl<T: Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Observable::new(T::default())
    }
}

/// Handle for a registered callback. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
