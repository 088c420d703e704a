use serde::Serialize;

/// Pixel rectangle of one laid-out event. Derived only, never sent to the API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventPosition {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl EventPosition {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// True if the two rectangles share any area.
    pub fn intersects(&self, other: &EventPosition) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}
