//! Playable Units
//!
//! A playable unit is one camera's video slot on the dashboard. The view layer
//! owns the unit itself; this module only provides the identifier, the
//! per-unit admission state and the media reference used at activation time.

use std::fmt;

use serde::{Deserialize, Serialize};

const EMBED_BASE: &str = "https://www.youtube-nocookie.com/embed";
const THUMBNAIL_BASE: &str = "https://img.youtube.com/vi";

/// Stable identifier of a playable unit
///
/// The value is chosen by the view layer (normally the camera id from the
/// catalog) and stays the same for as long as the unit is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(u64);

impl UnitId {
    /// Create a unit ID from its raw value
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw numeric value
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}

impl From<u64> for UnitId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Admission state of a registered unit
///
/// Units cycle `Idle -> Pending -> Active -> Idle`. Deactivation always lands
/// on `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    /// Not visible or not requested; holds no playback resource
    #[default]
    Idle,
    /// Visible and requested, but every slot was taken
    Pending,
    /// A player is instantiated and counts against capacity
    Active,
}

impl UnitState {
    /// Whether the unit is waiting for a slot
    #[must_use]
    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }

    /// Whether the unit holds a playback slot
    #[must_use]
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// External video identifier for a unit's stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(String);

impl MediaRef {
    /// Create a media reference, rejecting blank identifiers
    #[must_use]
    pub fn new(video_id: impl Into<String>) -> Option<Self> {
        let video_id = video_id.into();
        let trimmed = video_id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw video identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Muted, chrome-less autoplay embed used for grid tiles
    #[must_use]
    pub fn embed_url(&self) -> String {
        format!(
            "{EMBED_BASE}/{}?rel=0&autoplay=1&mute=1&modestbranding=1&controls=0&showinfo=0&fs=0",
            self.0
        )
    }

    /// Embed with sound and controls, used by the fullscreen viewer
    #[must_use]
    pub fn fullscreen_url(&self) -> String {
        format!(
            "{EMBED_BASE}/{}?autoplay=1&mute=0&controls=1&rel=0&fs=0",
            self.0
        )
    }

    /// Still image shown while the unit is not playing
    #[must_use]
    pub fn thumbnail_url(&self) -> String {
        format!("{THUMBNAIL_BASE}/{}/hqdefault.jpg", self.0)
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
