//! Live indicator shown next to the capacity selector

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tri-state fill level of the playback slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorLevel {
    /// No stream is playing
    Empty,
    /// Some slots are in use
    Partial,
    /// Every slot is in use
    Full,
}

impl IndicatorLevel {
    /// CSS class the view layer applies to the indicator element
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Partial => "partial",
            Self::Full => "full",
        }
    }
}

/// Snapshot of slot usage for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveIndicator {
    /// Number of active units
    pub active: usize,
    /// Configured capacity
    pub capacity: usize,
    /// Derived fill level
    pub level: IndicatorLevel,
}

impl LiveIndicator {
    /// Derive the indicator from the active count and capacity
    ///
    /// After a soft capacity decrease `active` may exceed `capacity`; that
    /// still reads as `Full`.
    #[must_use]
    pub fn compute(active: usize, capacity: usize) -> Self {
        let level = if active == 0 {
            IndicatorLevel::Empty
        } else if active >= capacity {
            IndicatorLevel::Full
        } else {
            IndicatorLevel::Partial
        };
        Self {
            active,
            capacity,
            level,
        }
    }
}

impl fmt::Display for LiveIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.active, self.capacity)
    }
}
