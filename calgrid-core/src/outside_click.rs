//! Click-outside detection for popovers and menus.
//!
//! The rendering side owns the element tree; this module only decides which
//! registered elements a click landed outside of and raises `outside_click`.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::store::AppState;

/// Ancestry queries over whatever element tree the renderer uses.
pub trait ElementTree {
    type Node: Clone + PartialEq;

    /// True when `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;
}

#[derive(Debug, Clone)]
pub struct Click<N> {
    pub target: N,
    /// Already handled by something that stopped propagation.
    pub consumed: bool,
}

struct Registration<N> {
    id: u64,
    element: N,
    on_outside: Rc<dyn Fn()>,
}

struct Registry<N> {
    entries: RefCell<Vec<Registration<N>>>,
    next_id: Cell<u64>,
}

pub struct OutsideClickDetector<T: ElementTree> {
    tree: T,
    state: AppState,
    registry: Rc<Registry<T::Node>>,
}

impl<T: ElementTree> OutsideClickDetector<T>
where
    T::Node: 'static,
{
    pub fn new(tree: T, state: AppState) -> Self {
        OutsideClickDetector {
            tree,
            state,
            registry: Rc::new(Registry {
                entries: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Start watching `element`; `on_outside` runs for every click that lands
    /// outside it. Dropping the guard stops it.
    pub fn register(&self, element: T::Node, on_outside: impl Fn() + 'static) -> ClickOutsideGuard {
        let id = self.registry.next_id.get() + 1;
        self.registry.next_id.set(id);
        self.registry.entries.borrow_mut().push(Registration {
            id,
            element,
            on_outside: Rc::new(on_outside),
        });

        let registry: Weak<Registry<T::Node>> = Rc::downgrade(&self.registry);
        ClickOutsideGuard {
            release: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.entries.borrow_mut().retain(|r| r.id != id);
                }
            })),
        }
    }

    pub fn registered(&self) -> usize {
        self.registry.entries.borrow().len()
    }

    /// Notify every registered element the click fell outside of, and record
    /// in `outside_click` whether there was any. Consumed clicks are ignored.
    /// Returns the number of elements notified.
    pub fn dispatch(&self, click: &Click<T::Node>) -> usize {
        if click.consumed {
            return 0;
        }

        // Callbacks run after the registry borrow ends so they may deregister.
        let missed: Vec<Rc<dyn Fn()>> = self
            .registry
            .entries
            .borrow()
            .iter()
            .filter(|r| !self.tree.contains(&r.element, &click.target))
            .map(|r| Rc::clone(&r.on_outside))
            .collect();

        if !missed.is_empty() {
            debug!(outside = missed.len(), "click landed outside registered elements");
        }
        self.state.outside_click.set(!missed.is_empty());

        for on_outside in &missed {
            on_outside();
        }
        missed.len()
    }
}

#[must_use = "dropping the guard deregisters the element immediately"]
pub struct ClickOutsideGuard {
    release: Option<Box<dyn FnOnce()>>,
}

impl Drop for ClickOutsideGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for ClickOutsideGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickOutsideGuard")
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::TimeWindow;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    /// Parent links keyed by node name.
    struct Tree(HashMap<&'static str, &'static str>);

    impl ElementTree for Tree {
        type Node = &'static str;

        fn contains(&self, ancestor: &&'static str, node: &&'static str) -> bool {
            let mut current = Some(*node);
            while let Some(n) = current {
                if n == *ancestor {
                    return true;
                }
                current = self.0.get(n).copied();
            }
            false
        }
    }

    fn detector() -> OutsideClickDetector<Tree> {
        let tree = Tree(HashMap::from([
            ("menu", "body"),
            ("menu-item", "menu"),
            ("grid", "body"),
        ]));
        let state = AppState::new(TimeWindow::utc_day(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        ));
        OutsideClickDetector::new(tree, state)
    }

    fn click(target: &'static str, consumed: bool) -> Click<&'static str> {
        Click { target, consumed }
    }

    fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
        let count = Rc::new(Cell::new(0));
        let hits = Rc::clone(&count);
        (count, move || hits.set(hits.get() + 1))
    }

    #[test]
    fn test_click_inside_is_ignored() {
        let d = detector();
        let (menu_hits, on_menu) = counter();
        let _menu = d.register("menu", on_menu);

        assert_eq!(d.dispatch(&click("menu-item", false)), 0);
        assert_eq!(menu_hits.get(), 0);
        assert!(!*d.state.outside_click.get());
    }

    #[test]
    fn test_each_element_gets_its_own_notification() {
        let d = detector();
        let (menu_hits, on_menu) = counter();
        let (grid_hits, on_grid) = counter();
        let _menu = d.register("menu", on_menu);
        let _grid = d.register("grid", on_grid);

        // inside the grid, outside the menu
        assert_eq!(d.dispatch(&click("grid", false)), 1);
        assert_eq!((menu_hits.get(), grid_hits.get()), (1, 0));

        // inside the menu, outside the grid
        assert_eq!(d.dispatch(&click("menu-item", false)), 1);
        assert_eq!((menu_hits.get(), grid_hits.get()), (1, 1));

        // outside both
        assert_eq!(d.dispatch(&click("body", false)), 2);
        assert_eq!((menu_hits.get(), grid_hits.get()), (2, 2));
    }

    #[test]
    fn test_outside_flag_tracks_latest_click() {
        let d = detector();
        let _menu = d.register("menu", || {});

        d.dispatch(&click("grid", false));
        assert!(*d.state.outside_click.get());

        d.dispatch(&click("menu-item", false));
        assert!(!*d.state.outside_click.get());
    }

    #[test]
    fn test_consumed_click_is_ignored() {
        let d = detector();
        let (menu_hits, on_menu) = counter();
        let _menu = d.register("menu", on_menu);

        assert_eq!(d.dispatch(&click("grid", true)), 0);
        assert_eq!(menu_hits.get(), 0);
        assert!(!*d.state.outside_click.get());
    }

    #[test]
    fn test_dropping_guard_deregisters() {
        let d = detector();
        let (menu_hits, on_menu) = counter();
        let menu = d.register("menu", on_menu);
        let _grid = d.register("grid", || {});
        assert_eq!(d.registered(), 2);

        drop(menu);
        assert_eq!(d.registered(), 1);
        assert_eq!(d.dispatch(&click("menu-item", false)), 1);
        assert_eq!(menu_hits.get(), 0);
    }

    #[test]
    fn test_callback_may_deregister_itself() {
        let d = detector();
        let guard: Rc<RefCell<Option<ClickOutsideGuard>>> = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&guard);
        *guard.borrow_mut() = Some(d.register("menu", move || {
            slot.borrow_mut().take();
        }));

        assert_eq!(d.dispatch(&click("grid", false)), 1);
        assert_eq!(d.registered(), 0);
    }

    #[test]
    fn test_guard_outliving_detector_is_harmless() {
        let d = detector();
        let guard = d.register("menu", || {});
        drop(d);
        drop(guard);
    }
}
