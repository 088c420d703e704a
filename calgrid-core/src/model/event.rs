//! Timed calendar events.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CalgridError, CalgridResult};
use crate::model::wire::parse_instant;

/// A timed event on one calendar.
///
/// Recurring instances share `recurrence_id` but each has its own `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub calendar_id: String,
    /// Start instant
    pub date: DateTime<Utc>,
    pub title: String,
    pub description: String,
    /// Length in minutes, never negative
    pub duration: i64,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_id: Option<String>,
}

impl Event {
    /// Start plus duration, clamped to the latest representable instant.
    pub fn end(&self) -> DateTime<Utc> {
        end_of(self.date, self.duration).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_recurring(&self) -> bool {
        self.recurring.unwrap_or(false)
    }

    /// Half-open overlap: an event ending at 10:00 does not overlap one starting at 10:00.
    pub fn overlaps(&self, other: &Event) -> bool {
        self.date < other.end() && other.date < self.end()
    }

    /// Decode a JSON array of event payloads. Fails as a whole if any item is invalid.
    pub fn decode_all(json: &[u8]) -> CalgridResult<Vec<Event>> {
        let payloads: Vec<EventPayload> = serde_json::from_slice(json)?;
        payloads.into_iter().map(Event::try_from).collect()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// `start + minutes`, or `None` if that is not a representable instant.
pub(crate) fn end_of(start: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_minutes(minutes).and_then(|d| start.checked_add_signed(d))
}

/// Event as it arrives over the wire, with `date` still an ISO-8601 string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub id: String,
    pub calendar_id: String,
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration: f64,
    #[serde(default)]
    pub accepted: bool,
    #[serde(default)]
    pub recurring: Option<bool>,
    #[serde(default)]
    pub recurrence_id: Option<String>,
}

impl TryFrom<EventPayload> for Event {
    type Error = CalgridError;

    fn try_from(payload: EventPayload) -> Result<Self, Self::Error> {
        if payload.id.trim().is_empty() {
            return Err(CalgridError::decode("event", "missing id"));
        }

        let date = parse_instant(&payload.date).ok_or_else(|| {
            CalgridError::decode(
                "event",
                format!("event {} has invalid date '{}'", payload.id, payload.date),
            )
        })?;

        if !payload.duration.is_finite()
            || payload.duration < 0.0
            || payload.duration.fract() != 0.0
        {
            return Err(CalgridError::decode(
                "event",
                format!(
                    "event {} has invalid duration {}",
                    payload.id, payload.duration
                ),
            ));
        }

        let duration = payload.duration as i64;
        if end_of(date, duration).is_none() {
            return Err(CalgridError::decode(
                "event",
                format!(
                    "event {} ends out of range ({} minutes after {date})",
                    payload.id, payload.duration
                ),
            ));
        }

        Ok(Event {
            id: payload.id,
            calendar_id: payload.calendar_id,
            date,
            title: payload.title,
            description: payload.description,
            duration,
            accepted: payload.accepted,
            recurring: payload.recurring,
            recurrence_id: payload.recurrence_id,
        })
    }
}
