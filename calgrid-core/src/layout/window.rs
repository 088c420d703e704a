//! The span of time rendered on the grid.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::constants::MINUTES_PER_DAY;

/// A run of consecutive day columns. Columns are 24-hour slices from `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub days: u32,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, days: u32) -> Self {
        TimeWindow {
            start,
            days: days.max(1),
        }
    }

    /// A single day starting at UTC midnight.
    pub fn utc_day(date: NaiveDate) -> Self {
        TimeWindow::new(date.and_time(NaiveTime::MIN).and_utc(), 1)
    }

    /// A single day starting at local midnight in `tz`.
    pub fn local_day(date: NaiveDate, tz: &Tz) -> Self {
        TimeWindow::new(local_midnight(date, tz), 1)
    }

    /// Seven days starting at the most recent `week_start` on or before `date`.
    pub fn local_week(date: NaiveDate, tz: &Tz, week_start: Weekday) -> Self {
        let back = (7 + date.weekday().num_days_from_monday()
            - week_start.num_days_from_monday())
            % 7;
        let first = date - Duration::days(back as i64);
        TimeWindow::new(local_midnight(first, tz), 7)
    }

    /// Clamped to the latest representable instant for absurdly long windows.
    pub fn end(&self) -> DateTime<Utc> {
        self.day_start(self.days)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end()
    }

    /// Column index of the day containing `instant`, if it is inside the window.
    pub fn day_index(&self, instant: DateTime<Utc>) -> Option<u32> {
        if !self.contains(instant) {
            return None;
        }
        let minutes = (instant - self.start).num_minutes();
        Some((minutes / MINUTES_PER_DAY) as u32)
    }

    pub fn day_start(&self, index: u32) -> DateTime<Utc> {
        self.start
            .checked_add_signed(Duration::days(index as i64))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

fn local_midnight(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}
