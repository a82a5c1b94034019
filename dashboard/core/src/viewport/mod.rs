//! Viewport Observation
//!
//! The stream manager never inspects layout itself. It is handed a
//! [`ViewportObserver`] that knows which units are currently on screen and
//! that reports entering/leaving as [`VisibilityChange`] events.
//!
//! In a browser this role is played by an intersection observer. For
//! headless and native hosts, [`GeometryObserver`] computes the same answer
//! by polling rectangle geometry.
//!
//! # Visibility rule
//!
//! ```text
//!   viewport (expanded by root_margin)
//!  ┌───────────────────────────────┐
//!  │        ┌──────────┐           │
//!  │        │  unit    │  visible_ratio = overlap / unit area
//!  └────────┼──────────┼───────────┘
//!           │          │  visible  <=> visible_ratio >= threshold
//!           └──────────┘
//! ```

mod geometry;

pub use geometry::{GeometryObserver, Rect};

use serde::{Deserialize, Serialize};

use crate::unit::UnitId;

/// Default fraction of a unit's area that must be on screen
pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 0.3;

/// Thresholds for deciding whether a unit counts as visible
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityConfig {
    /// Fraction of the unit's area (0.0, 1.0] that must intersect the viewport
    pub threshold: f64,
    /// Pixels added on every side of the viewport before intersecting
    pub root_margin: f64,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_VISIBILITY_THRESHOLD,
            root_margin: 0.0,
        }
    }
}

impl VisibilityConfig {
    /// Return a copy with out-of-range values pulled back into range
    #[must_use]
    pub fn validated(self) -> Self {
        let threshold = if self.threshold.is_finite() && self.threshold > 0.0 {
            self.threshold.min(1.0)
        } else {
            DEFAULT_VISIBILITY_THRESHOLD
        };
        let root_margin = if self.root_margin.is_finite() {
            self.root_margin.max(0.0)
        } else {
            0.0
        };
        Self {
            threshold,
            root_margin,
        }
    }
}

/// A unit crossed the visibility threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisibilityChange {
    /// The unit is now visible
    Entered(UnitId),
    /// The unit is no longer visible
    Left(UnitId),
}

impl VisibilityChange {
    /// The unit this change refers to
    #[must_use]
    pub fn unit(&self) -> UnitId {
        match self {
            Self::Entered(id) | Self::Left(id) => *id,
        }
    }
}

/// Source of visibility information for registered units
///
/// Implementations must answer [`is_visible`](Self::is_visible) from live
/// geometry; the manager relies on it when choosing which pending unit to
/// promote.
pub trait ViewportObserver {
    /// Start tracking a unit
    fn observe(&mut self, id: UnitId);

    /// Stop tracking a unit
    fn unobserve(&mut self, id: UnitId);

    /// Whether the unit is currently visible
    fn is_visible(&self, id: UnitId) -> bool;

    /// Whether the unit is currently tracked
    fn is_observed(&self, id: UnitId) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_visibility_config() {
        let config = VisibilityConfig::default();
        assert!((config.threshold - 0.3).abs() < f64::EPSILON);
        assert!(config.root_margin.abs() < f64::EPSILON);
    }

    #[test]
    fn test_validated_clamps_values() {
        let config = VisibilityConfig {
            threshold: 1.7,
            root_margin: -12.0,
        }
        .validated();
        assert!((config.threshold - 1.0).abs() < f64::EPSILON);
        assert!(config.root_margin.abs() < f64::EPSILON);

        let config = VisibilityConfig {
            threshold: 0.0,
            root_margin: f64::NAN,
        }
        .validated();
        assert!((config.threshold - DEFAULT_VISIBILITY_THRESHOLD).abs() < f64::EPSILON);
        assert!(config.root_margin.abs() < f64::EPSILON);
    }

    #[test]
    fn test_visibility_change_unit() {
        let id = UnitId::new(3);
        assert_eq!(VisibilityChange::Entered(id).unit(), id);
        assert_eq!(VisibilityChange::Left(id).unit(), id);
    }
}
