//! Polling geometry observer
//!
//! Computes visibility from unit and viewport rectangles. The host moves the
//! viewport (scrolling) or rearranges units (layout change) and then calls
//! [`GeometryObserver::poll`] to collect the resulting changes.

use std::collections::HashMap;

use super::{ViewportObserver, VisibilityChange, VisibilityConfig};
use crate::unit::UnitId;

/// Axis-aligned rectangle in layout coordinates (y grows downwards)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a rectangle
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area; degenerate rectangles have zero area
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Area shared with another rectangle
    #[must_use]
    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let left = self.x.max(other.x);
        let right = (self.x + self.width).min(other.x + other.width);
        let top = self.y.max(other.y);
        let bottom = (self.y + self.height).min(other.y + other.height);
        (right - left).max(0.0) * (bottom - top).max(0.0)
    }

    /// Grow the rectangle by `margin` on every side
    #[must_use]
    pub fn expand(&self, margin: f64) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + 2.0 * margin,
            height: self.height + 2.0 * margin,
        }
    }

    /// Fraction of this rectangle's area inside `viewport`
    #[must_use]
    pub fn visible_ratio(&self, viewport: &Rect) -> f64 {
        let area = self.area();
        if area <= 0.0 {
            return 0.0;
        }
        (self.intersection_area(viewport) / area).clamp(0.0, 1.0)
    }
}

/// [`ViewportObserver`] backed by rectangle geometry
#[derive(Debug, Clone)]
pub struct GeometryObserver {
    config: VisibilityConfig,
    viewport: Rect,
    bounds: HashMap<UnitId, Rect>,
    /// Observed units in observation order
    observed: Vec<UnitId>,
    /// Last reported visibility; `None` until the first poll after observe
    reported: HashMap<UnitId, Option<bool>>,
}

impl GeometryObserver {
    /// Create an observer for the given viewport
    #[must_use]
    pub fn new(viewport: Rect, config: VisibilityConfig) -> Self {
        Self {
            config: config.validated(),
            viewport,
            bounds: HashMap::new(),
            observed: Vec::new(),
            reported: HashMap::new(),
        }
    }

    /// Visibility thresholds in effect
    #[must_use]
    pub fn config(&self) -> VisibilityConfig {
        self.config
    }

    /// Current viewport rectangle
    #[must_use]
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Replace the viewport rectangle
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Move the viewport vertically, keeping its size
    pub fn scroll_to(&mut self, y: f64) {
        self.viewport.y = y;
    }

    /// Set or replace the layout rectangle of a unit
    pub fn set_bounds(&mut self, id: UnitId, rect: Rect) {
        self.bounds.insert(id, rect);
    }

    /// Forget a unit's rectangle (the unit is laid out nowhere)
    pub fn remove_bounds(&mut self, id: UnitId) {
        self.bounds.remove(&id);
    }

    /// Layout rectangle of a unit, if it has one
    #[must_use]
    pub fn bounds(&self, id: UnitId) -> Option<Rect> {
        self.bounds.get(&id).copied()
    }

    /// Fraction of the unit inside the (margin-expanded) viewport
    #[must_use]
    pub fn visible_ratio(&self, id: UnitId) -> f64 {
        let root = self.viewport.expand(self.config.root_margin);
        self.bounds
            .get(&id)
            .map_or(0.0, |rect| rect.visible_ratio(&root))
    }

    /// Collect visibility changes since the previous poll
    ///
    /// All `Left` changes come before all `Entered` changes, each in
    /// observation order.
    pub fn poll(&mut self) -> Vec<VisibilityChange> {
        let mut left = Vec::new();
        let mut entered = Vec::new();

        for &id in &self.observed {
            let now = self.visible_ratio(id) >= self.config.threshold;
            let previous = self.reported.get(&id).copied().flatten();
            if previous == Some(now) {
                continue;
            }
            if now {
                entered.push(VisibilityChange::Entered(id));
            } else if previous == Some(true) {
                left.push(VisibilityChange::Left(id));
            }
            self.reported.insert(id, Some(now));
        }

        if !left.is_empty() || !entered.is_empty() {
            tracing::trace!(
                left = left.len(),
                entered = entered.len(),
                "Viewport poll produced changes"
            );
        }

        left.extend(entered);
        left
    }
}

impl ViewportObserver for GeometryObserver {
    fn observe(&mut self, id: UnitId) {
        if self.reported.contains_key(&id) {
            return;
        }
        self.observed.push(id);
        self.reported.insert(id, None);
    }

    fn unobserve(&mut self, id: UnitId) {
        if self.reported.remove(&id).is_some() {
            self.observed.retain(|observed| *observed != id);
        }
    }

    fn is_visible(&self, id: UnitId) -> bool {
        self.visible_ratio(id) >= self.config.threshold
    }

    fn is_observed(&self, id: UnitId) -> bool {
        self.reported.contains_key(&id)
    }
}
