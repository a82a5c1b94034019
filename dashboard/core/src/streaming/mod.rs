//! Stream Admission Control
//!
//! Limits the number of simultaneously playing camera streams. Playback is
//! driven by viewport visibility: a unit that scrolls into view asks for a
//! slot, a unit that scrolls out releases it, and waiting units are promoted
//! as slots free up.
//!
//! # Architecture
//!
//! ```text
//!  ViewportObserver ──VisibilityChange──┐        capacity control
//!   (geometry / browser)                │              │
//!                                       ▼              ▼
//!                      ┌────────────────────────────────────────┐
//!                      │        StreamConcurrencyManager         │
//!                      │  units: UnitId -> Idle|Pending|Active   │
//!                      │  active slot set  (<= capacity)         │
//!                      │  registration order (promotion order)   │
//!                      └───────────────────┬────────────────────┘
//!                                          │ create/destroy player,
//!                                          │ waiting badge, indicator
//!                                          ▼
//!                                   PlaybackHost (view layer)
//! ```
//!
//! # Unit lifecycle
//!
//! ```text
//!            visible, slot free
//!   Idle ───────────────────────────────▶ Active
//!    │  ▲                                  │  ▲
//!    │  │ hidden / unload                  │  │ slot freed
//!    │  └──────────────────────────────────┘  │ (promotion)
//!    │ visible, no slot                       │
//!    └──────────────▶ Pending ────────────────┘
//!                        │ hidden / unload
//!                        └──────────▶ Idle
//! ```

mod indicator;
mod manager;
mod shared;

#[cfg(test)]
pub(crate) mod test_utils;

pub use indicator::{IndicatorLevel, LiveIndicator};
pub use manager::{ManagerStats, StreamConcurrencyManager, StreamError, DEFAULT_MAX_CONCURRENT};
pub use shared::SharedStreamManager;
