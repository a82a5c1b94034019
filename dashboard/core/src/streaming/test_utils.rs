//! Stream Manager Test Utilities
//!
//! A scripted viewport observer (visibility is set directly by the test) and
//! a playback host that records every call the manager makes.

use std::collections::{HashMap, HashSet};

use crate::playback::{PlaybackError, PlaybackHost};
use crate::streaming::LiveIndicator;
use crate::unit::{MediaRef, UnitId};
use crate::viewport::ViewportObserver;

/// Observer whose visibility answers are set by the test
#[derive(Debug, Default)]
pub struct ScriptedObserver {
    pub visible: HashSet<UnitId>,
    pub observed: Vec<UnitId>,
    pub observe_calls: usize,
    pub unobserve_calls: usize,
}

impl ScriptedObserver {
    pub fn show(&mut self, id: UnitId) {
        self.visible.insert(id);
    }

    pub fn hide(&mut self, id: UnitId) {
        self.visible.remove(&id);
    }
}

impl ViewportObserver for ScriptedObserver {
    fn observe(&mut self, id: UnitId) {
        self.observe_calls += 1;
        if !self.observed.contains(&id) {
            self.observed.push(id);
        }
    }

    fn unobserve(&mut self, id: UnitId) {
        self.unobserve_calls += 1;
        self.observed.retain(|observed| *observed != id);
    }

    fn is_visible(&self, id: UnitId) -> bool {
        self.visible.contains(&id)
    }

    fn is_observed(&self, id: UnitId) -> bool {
        self.observed.contains(&id)
    }
}

/// Host that records players, badges and indicator updates
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub media: HashMap<UnitId, MediaRef>,
    pub players: HashSet<UnitId>,
    pub waiting: HashSet<UnitId>,
    pub created: Vec<UnitId>,
    pub destroyed: Vec<UnitId>,
    pub failing: HashSet<UnitId>,
    pub indicator: Option<LiveIndicator>,
}

impl RecordingHost {
    /// Host that has a media reference for every given unit
    pub fn with_units(ids: &[UnitId]) -> Self {
        let mut host = Self::default();
        for id in ids {
            host.media.insert(
                *id,
                MediaRef::new(format!("video-{}", id.as_u64())).expect("non-empty"),
            );
        }
        host
    }
}

impl PlaybackHost for RecordingHost {
    fn media_ref(&self, id: UnitId) -> Option<MediaRef> {
        self.media.get(&id).cloned()
    }

    fn create_player(&mut self, id: UnitId, _media: &MediaRef) -> Result<(), PlaybackError> {
        if self.failing.contains(&id) {
            return Err(PlaybackError::MissingAnchor(id));
        }
        self.players.insert(id);
        self.created.push(id);
        Ok(())
    }

    fn destroy_player(&mut self, id: UnitId) {
        if self.players.remove(&id) {
            self.destroyed.push(id);
        }
    }

    fn set_waiting(&mut self, id: UnitId, waiting: bool) {
        if waiting {
            self.waiting.insert(id);
        } else {
            self.waiting.remove(&id);
        }
    }

    fn update_indicator(&mut self, indicator: LiveIndicator) {
        self.indicator = Some(indicator);
    }
}
