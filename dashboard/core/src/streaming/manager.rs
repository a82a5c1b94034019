//! Stream Concurrency Manager Implementation
//!
//! Limits how many embedded players run at once. Units ask for a slot when
//! they become visible; denied units wait as pending and are promoted in
//! registration order when a slot frees up.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::indicator::LiveIndicator;
use crate::config::DashboardConfig;
use crate::playback::PlaybackHost;
use crate::unit::{UnitId, UnitState};
use crate::viewport::{ViewportObserver, VisibilityChange};

/// Default number of concurrently playing streams
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

// ============================================================================
// Errors
// ============================================================================

/// Errors from stream manager operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Capacity must allow at least one stream
    #[error("Invalid capacity {0}: at least one stream slot is required")]
    InvalidCapacity(usize),
}

// ============================================================================
// Statistics
// ============================================================================

/// Counters describing manager activity since construction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ManagerStats {
    /// Players created
    pub activations: u64,
    /// Players destroyed
    pub deactivations: u64,
    /// Admissions denied for lack of capacity
    pub denials: u64,
    /// Pending units admitted after a slot freed up
    pub promotions: u64,
    /// Highest simultaneous active count observed
    pub peak_active: usize,
}

// ============================================================================
// Stream Concurrency Manager
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
struct UnitRecord {
    state: UnitState,
}

/// Admission control for embedded players
///
/// Owns the active slot set and per-unit state. The viewport observer and
/// playback host are injected; the manager never reaches for layout or
/// player elements directly.
pub struct StreamConcurrencyManager<O, H> {
    observer: O,
    host: H,
    capacity: usize,
    units: HashMap<UnitId, UnitRecord>,
    /// Registered units in registration order (promotion tie-break)
    order: Vec<UnitId>,
    active: HashSet<UnitId>,
    stats: ManagerStats,
}

impl<O, H> StreamConcurrencyManager<O, H>
where
    O: ViewportObserver,
    H: PlaybackHost,
{
    /// Create a manager with the given capacity
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(observer: O, host: H, capacity: usize) -> Result<Self, StreamError> {
        if capacity == 0 {
            return Err(StreamError::InvalidCapacity(capacity));
        }
        let mut manager = Self {
            observer,
            host,
            capacity,
            units: HashMap::new(),
            order: Vec::new(),
            active: HashSet::new(),
            stats: ManagerStats::default(),
        };
        manager.refresh_indicator();
        Ok(manager)
    }

    /// Create a manager using the configured default capacity
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidCapacity`] if the configuration holds a
    /// zero capacity.
    pub fn from_config(
        observer: O,
        host: H,
        config: &DashboardConfig,
    ) -> Result<Self, StreamError> {
        Self::new(observer, host, config.max_concurrent)
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Start tracking a unit's visibility
    ///
    /// Returns `false` if the unit was already registered.
    pub fn register(&mut self, id: UnitId) -> bool {
        if self.units.contains_key(&id) {
            tracing::debug!(unit = %id, "Unit already registered");
            return false;
        }
        self.units.insert(id, UnitRecord::default());
        self.order.push(id);
        self.observer.observe(id);
        tracing::debug!(unit = %id, "Unit registered");
        true
    }

    /// Stop tracking a unit, releasing its slot or pending mark
    ///
    /// Returns `false` if the unit was not registered.
    pub fn deregister(&mut self, id: UnitId) -> bool {
        if !self.units.contains_key(&id) {
            return false;
        }
        self.observer.unobserve(id);
        let freed = self.deactivate(id);
        self.units.remove(&id);
        self.order.retain(|registered| *registered != id);
        tracing::debug!(unit = %id, "Unit deregistered");

        if freed {
            self.promote_pending();
        }
        true
    }

    // ------------------------------------------------------------------------
    // Visibility events
    // ------------------------------------------------------------------------

    /// The unit crossed into the visible region; request a slot for it
    ///
    /// Returns the unit's resulting state, or `None` if it is not registered.
    pub fn on_visible(&mut self, id: UnitId) -> Option<UnitState> {
        if !self.units.contains_key(&id) {
            tracing::debug!(unit = %id, "Visibility event for unregistered unit");
            return None;
        }
        self.try_admit(id);
        self.state(id)
    }

    /// The unit left the visible region; release it and promote a waiter
    ///
    /// Returns the unit's resulting state, or `None` if it is not registered.
    pub fn on_hidden(&mut self, id: UnitId) -> Option<UnitState> {
        if !self.units.contains_key(&id) {
            tracing::debug!(unit = %id, "Visibility event for unregistered unit");
            return None;
        }
        self.deactivate(id);
        self.promote_pending();
        self.state(id)
    }

    /// Dispatch a visibility change to [`on_visible`](Self::on_visible) or
    /// [`on_hidden`](Self::on_hidden)
    pub fn apply(&mut self, change: VisibilityChange) -> Option<UnitState> {
        match change {
            VisibilityChange::Entered(id) => self.on_visible(id),
            VisibilityChange::Left(id) => self.on_hidden(id),
        }
    }

    // ------------------------------------------------------------------------
    // Capacity and bulk operations
    // ------------------------------------------------------------------------

    /// Change the number of concurrent streams
    ///
    /// Growing the capacity promotes visible pending units until the slots
    /// are filled. Shrinking never stops a running player; it only blocks
    /// new admissions until the active set drops below the new limit.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidCapacity`] for zero; the capacity is
    /// left unchanged.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), StreamError> {
        if capacity == 0 {
            tracing::warn!(capacity, "Rejected stream capacity");
            return Err(StreamError::InvalidCapacity(capacity));
        }
        let previous = self.capacity;
        self.capacity = capacity;
        tracing::info!(previous, capacity, "Stream capacity changed");

        if capacity > previous {
            while self.promote_pending().is_some() {}
        }
        self.refresh_indicator();
        Ok(())
    }

    /// Stop every player, e.g. when the grid is no longer on screen
    ///
    /// Units stay registered. Pending units are returned to idle as well so
    /// no waiting badge lingers. No promotion happens.
    pub fn unload_all(&mut self) {
        let mut unloaded = 0usize;
        for id in self.order.clone() {
            if self.deactivate(id) {
                unloaded += 1;
            }
        }
        tracing::info!(unloaded, "Unloaded all streams");
    }

    /// Re-attach visibility tracking for every registered unit
    ///
    /// Used after a layout change that may have altered visibility without
    /// the observer noticing.
    pub fn reobserve_all(&mut self) {
        for &id in &self.order {
            self.observer.unobserve(id);
            self.observer.observe(id);
        }
        tracing::debug!(units = self.order.len(), "Re-observed all units");
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// State of a registered unit
    #[must_use]
    pub fn state(&self, id: UnitId) -> Option<UnitState> {
        self.units.get(&id).map(|record| record.state)
    }

    /// Whether the unit is registered
    #[must_use]
    pub fn is_registered(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    /// Current capacity
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of active units
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Registered units in registration order
    #[must_use]
    pub fn registered_units(&self) -> &[UnitId] {
        &self.order
    }

    /// Active units in registration order
    #[must_use]
    pub fn active_units(&self) -> Vec<UnitId> {
        self.units_in(UnitState::Active)
    }

    /// Pending units in registration order
    #[must_use]
    pub fn pending_units(&self) -> Vec<UnitId> {
        self.units_in(UnitState::Pending)
    }

    /// Current indicator snapshot
    #[must_use]
    pub fn indicator(&self) -> LiveIndicator {
        LiveIndicator::compute(self.active.len(), self.capacity)
    }

    /// Activity counters
    #[must_use]
    pub fn stats(&self) -> ManagerStats {
        self.stats
    }

    /// The injected viewport observer
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the viewport observer (scrolling, layout updates)
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// The injected playback host
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the playback host
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn units_in(&self, state: UnitState) -> Vec<UnitId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.state(*id) == Some(state))
            .collect()
    }

    fn set_state(&mut self, id: UnitId, state: UnitState) {
        if let Some(record) = self.units.get_mut(&id) {
            record.state = state;
        }
    }

    /// Admission: activate if a slot is free, otherwise mark pending
    fn try_admit(&mut self, id: UnitId) {
        match self.state(id) {
            None | Some(UnitState::Active) => {}
            Some(_) if self.active.len() < self.capacity => {
                self.activate(id);
            }
            Some(state) => {
                if !state.is_pending() {
                    self.stats.denials += 1;
                    self.set_state(id, UnitState::Pending);
                    self.host.set_waiting(id, true);
                    tracing::debug!(
                        unit = %id,
                        active = self.active.len(),
                        capacity = self.capacity,
                        "No free stream slot, unit pending"
                    );
                }
            }
        }
    }

    /// Create the unit's player; returns whether it is now active
    fn activate(&mut self, id: UnitId) -> bool {
        if self.active.len() >= self.capacity {
            return false;
        }
        let was_pending = self.state(id).is_some_and(UnitState::is_pending);

        let Some(media) = self.host.media_ref(id) else {
            tracing::warn!(unit = %id, "Unit has no media reference, not activating");
            self.reset_to_idle(id, was_pending);
            return false;
        };

        if let Err(e) = self.host.create_player(id, &media) {
            tracing::warn!(unit = %id, error = %e, "Failed to create player");
            self.host.destroy_player(id);
            self.reset_to_idle(id, was_pending);
            return false;
        }

        self.active.insert(id);
        self.set_state(id, UnitState::Active);
        if was_pending {
            self.host.set_waiting(id, false);
        }
        self.stats.activations += 1;
        self.stats.peak_active = self.stats.peak_active.max(self.active.len());
        tracing::debug!(unit = %id, media = %media, "Stream activated");
        self.refresh_indicator();
        true
    }

    fn reset_to_idle(&mut self, id: UnitId, was_pending: bool) {
        self.set_state(id, UnitState::Idle);
        if was_pending {
            self.host.set_waiting(id, false);
        }
    }

    /// Return the unit to idle; returns whether a slot was freed
    fn deactivate(&mut self, id: UnitId) -> bool {
        match self.state(id) {
            Some(UnitState::Active) => {
                self.host.destroy_player(id);
                self.active.remove(&id);
                self.set_state(id, UnitState::Idle);
                self.stats.deactivations += 1;
                tracing::debug!(unit = %id, "Stream deactivated");
                self.refresh_indicator();
                true
            }
            Some(UnitState::Pending) => {
                self.reset_to_idle(id, true);
                tracing::debug!(unit = %id, "Pending mark cleared");
                false
            }
            Some(UnitState::Idle) | None => false,
        }
    }

    /// Admit the first visible pending unit in registration order
    ///
    /// At most one unit is promoted per call.
    fn promote_pending(&mut self) -> Option<UnitId> {
        if self.active.len() >= self.capacity {
            return None;
        }
        let candidates: Vec<UnitId> = self
            .order
            .iter()
            .copied()
            .filter(|id| self.state(*id).is_some_and(UnitState::is_pending))
            .filter(|id| self.observer.is_visible(*id))
            .collect();

        for id in candidates {
            if self.activate(id) {
                self.stats.promotions += 1;
                tracing::debug!(unit = %id, "Pending unit promoted");
                return Some(id);
            }
        }
        None
    }

    fn refresh_indicator(&mut self) {
        let indicator = self.indicator();
        self.host.update_indicator(indicator);
    }
}

impl<O, H> std::fmt::Debug for StreamConcurrencyManager<O, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamConcurrencyManager")
            .field("capacity", &self.capacity)
            .field("registered", &self.order.len())
            .field("active", &self.active.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
