use crate::constants::MIN_EVENT_MINUTES;

/// Pixel scale of the time grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    /// Pixels per minute
    pub item_height: f64,
    /// Pixels per day column
    pub item_width: f64,
    /// Events shorter than this are drawn as if they lasted this long.
    pub min_event_minutes: i64,
}

impl GridGeometry {
    pub fn new(item_height: f64, item_width: f64) -> Self {
        GridGeometry {
            item_height,
            item_width,
            min_event_minutes: MIN_EVENT_MINUTES,
        }
    }

    pub fn with_min_event_minutes(mut self, minutes: i64) -> Self {
        self.min_event_minutes = minutes.max(0);
        self
    }

    /// Zero, negative or non-finite sizes leave nothing to lay out.
    pub fn is_valid(&self) -> bool {
        self.item_height.is_finite()
            && self.item_width.is_finite()
            && self.item_height > 0.0
            && self.item_width > 0.0
    }

    pub fn effective_minutes(&self, duration: i64) -> i64 {
        duration.max(self.min_event_minutes)
    }
}
