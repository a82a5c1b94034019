//! Playback Host Seam
//!
//! The view layer owns every player element. The stream manager only asks it
//! to create or destroy a player for a unit, to toggle the waiting badge and
//! to redraw the live indicator.

use thiserror::Error;

use crate::streaming::LiveIndicator;
use crate::unit::{MediaRef, UnitId};

/// Errors a host may report when instantiating a player
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The unit has no element to attach a player to
    #[error("No player anchor for {0}")]
    MissingAnchor(UnitId),

    /// The host refused to create the player
    #[error("Player for {unit} rejected: {reason}")]
    Rejected {
        /// Unit whose player was rejected
        unit: UnitId,
        /// Host-provided reason
        reason: String,
    },
}

/// View-layer operations the stream manager delegates to
pub trait PlaybackHost {
    /// Media reference for a unit, looked up at activation time
    fn media_ref(&self, id: UnitId) -> Option<MediaRef>;

    /// Instantiate and start a player for the unit
    ///
    /// # Errors
    ///
    /// Returns an error if the player cannot be created. The manager treats
    /// the unit as idle afterwards.
    fn create_player(&mut self, id: UnitId, media: &MediaRef) -> Result<(), PlaybackError>;

    /// Tear down the unit's player; must tolerate units without one
    fn destroy_player(&mut self, id: UnitId);

    /// Show or hide the unit's waiting badge
    fn set_waiting(&mut self, id: UnitId, waiting: bool);

    /// Redraw the live indicator
    fn update_indicator(&mut self, indicator: LiveIndicator);
}
