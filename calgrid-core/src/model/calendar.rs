//! Calendars and the insertion-ordered calendar map.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub is_default: bool,
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Calendars keyed by id, iterated in the order they were first inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarMap {
    order: Vec<String>,
    by_id: HashMap<String, Calendar>,
}

impl CalendarMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a calendar. A replaced calendar keeps its position.
    pub fn insert(&mut self, calendar: Calendar) -> Option<Calendar> {
        let id = calendar.id.clone();
        let previous = self.by_id.insert(id.clone(), calendar);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    pub fn remove(&mut self, id: &str) -> Option<Calendar> {
        let removed = self.by_id.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&Calendar> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Calendar> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn default_calendar(&self) -> Option<&Calendar> {
        self.iter().find(|c| c.is_default)
    }

    /// Make `id` the only default calendar. Returns false if `id` is unknown.
    pub fn set_default(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        for calendar in self.by_id.values_mut() {
            calendar.is_default = calendar.id == id;
        }
        true
    }
}

impl FromIterator<Calendar> for CalendarMap {
    fn from_iter<I: IntoIterator<Item = Calendar>>(iter: I) -> Self {
        let mut map = CalendarMap::new();
        for calendar in iter {
            map.insert(calendar);
        }
        map
    }
}
