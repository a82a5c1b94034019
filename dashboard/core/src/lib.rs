//! Dashboard Core - Headless Stream Admission Control for the Traffic Camera Dashboard
//!
//! The dashboard shows a wall of embedded camera streams. Running every
//! player at once is too expensive, so this crate decides which streams may
//! play: only units that are on screen, and never more than the configured
//! capacity. Everything visual lives in the host; this crate is pure logic
//! and can drive a browser client, a native viewer or a headless test.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       View Layer (host)                          │
//! │   grid layout · players · waiting badges · live indicator        │
//! └───────┬─────────────────────────────────────────────▲────────────┘
//!         │ register / deregister / set_capacity         │ PlaybackHost
//!         │ unload_all / reobserve_all                   │
//! ┌───────▼──────────────────────────────────────────────┴────────────┐
//! │                    StreamConcurrencyManager                        │
//! │      Idle | Pending | Active per unit · capacity · promotion       │
//! └───────▲────────────────────────────────────────────────────────────┘
//!         │ VisibilityChange (Entered / Left)
//! ┌───────┴────────────────────────────────────────────────────────────┐
//! │                ViewportObserver (GeometryObserver)                 │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use dashboard_core::{
//!     GeometryObserver, Rect, StreamConcurrencyManager, UnitId, VisibilityConfig,
//! };
//!
//! let observer = GeometryObserver::new(Rect::new(0.0, 0.0, 1280.0, 720.0), VisibilityConfig::default());
//! let mut manager = StreamConcurrencyManager::new(observer, my_host, 4)?;
//!
//! manager.observer_mut().set_bounds(UnitId::new(1), Rect::new(0.0, 0.0, 400.0, 240.0));
//! manager.register(UnitId::new(1));
//!
//! // After every scroll or layout change:
//! for change in manager.observer_mut().poll() {
//!     manager.apply(change);
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`unit`]: Unit identifiers, admission states and media references
//! - [`viewport`]: Visibility observation (trait plus geometry polling)
//! - [`streaming`]: The stream concurrency manager and live indicator
//! - [`playback`]: The host seam for creating and destroying players
//! - [`catalog`]: Camera list parsing and district filtering
//! - [`config`]: TOML/env/CLI configuration

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod playback;
pub mod streaming;
pub mod unit;
pub mod viewport;

// Re-exports for convenience
pub use catalog::{
    markers, parse_catalog, CameraFeed, CatalogError, DistrictFilter, MarkerPosition,
};
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, DashboardConfig, DashboardToml,
};
pub use playback::{PlaybackError, PlaybackHost};
pub use streaming::{
    IndicatorLevel, LiveIndicator, ManagerStats, SharedStreamManager, StreamConcurrencyManager,
    StreamError,
};
pub use unit::{MediaRef, UnitId, UnitState};
pub use viewport::{GeometryObserver, Rect, ViewportObserver, VisibilityChange, VisibilityConfig};
