//! Dashboard state
//!
//! Ties the catalog, the grid layout and the stream manager together. Every
//! command that moves or rearranges cards ends with a poll of the geometry
//! observer so the manager sees the same enter/leave events a browser would
//! deliver.

use std::collections::HashSet;

use dashboard_core::{
    markers, CameraFeed, DashboardConfig, DistrictFilter, GeometryObserver, MarkerPosition,
    PlaybackHost, Rect, StreamConcurrencyManager, StreamError, UnitId,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::commands::{Command, ViewMode, HELP};
use crate::host::TerminalHost;
use crate::layout::GridLayout;

/// Stream manager as wired by the daemon
pub type DashboardManager = StreamConcurrencyManager<GeometryObserver, TerminalHost>;

/// Errors from executing a command
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The manager refused the request
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Capacity is not one of the offered choices
    #[error("Capacity {requested} is not offered (choices: {choices:?})")]
    CapacityNotOffered {
        /// Requested capacity
        requested: usize,
        /// Configured choices
        choices: Vec<usize>,
    },

    /// No camera with this id in the catalog
    #[error("Unknown camera {0}")]
    UnknownCamera(u64),

    /// The camera has no video to show
    #[error("Camera {0} has no video")]
    NoVideo(u64),
}

/// What the command loop should do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading commands, optionally printing a reply
    Continue(Option<String>),
    /// Stop the loop
    Quit,
}

/// Headless dashboard
#[derive(Debug)]
pub struct Dashboard {
    manager: DashboardManager,
    feeds: Vec<CameraFeed>,
    layout: GridLayout,
    config: DashboardConfig,
    view: ViewMode,
    filter: DistrictFilter,
    scroll_y: f64,
    /// Camera open in the fullscreen viewer
    fullscreen: Option<UnitId>,
}

impl Dashboard {
    /// Build the dashboard and start the streams visible at the top of the grid
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Stream`] if the configured capacity is zero.
    pub fn new(
        config: DashboardConfig,
        mut feeds: Vec<CameraFeed>,
    ) -> Result<Self, DashboardError> {
        // One card per camera id; later duplicates are dropped
        let mut seen = HashSet::new();
        feeds.retain(|feed| {
            let first = seen.insert(feed.id);
            if !first {
                warn!(
                    camera = feed.id,
                    title = %feed.location_name,
                    "Duplicate camera id in catalog, skipped"
                );
            }
            first
        });

        let viewport = Rect::new(0.0, 0.0, config.viewport_width, config.viewport_height);
        let observer = GeometryObserver::new(viewport, config.visibility);
        let host = TerminalHost::new(&feeds);
        let manager = StreamConcurrencyManager::from_config(observer, host, &config)?;

        let mut dashboard = Self {
            manager,
            layout: GridLayout::from_config(&config),
            feeds,
            config,
            view: ViewMode::Grid,
            filter: DistrictFilter::All,
            scroll_y: 0.0,
            fullscreen: None,
        };

        for feed in &dashboard.feeds {
            dashboard.manager.register(feed.unit_id());
        }
        dashboard.apply_layout();
        dashboard.refresh();

        info!(
            cameras = dashboard.feeds.len(),
            capacity = dashboard.manager.capacity(),
            active = dashboard.manager.active_count(),
            "Dashboard ready"
        );
        Ok(dashboard)
    }

    /// Execute one command
    ///
    /// # Errors
    ///
    /// Returns an error if a capacity change is rejected or the camera asked
    /// for in fullscreen cannot be shown.
    pub fn execute(&mut self, command: Command) -> Result<Outcome, DashboardError> {
        match command {
            Command::Scroll(y) => {
                self.scroll(y);
                Ok(Outcome::Continue(Some(self.summary())))
            }
            Command::Capacity(capacity) => {
                self.set_capacity(capacity)?;
                Ok(Outcome::Continue(Some(self.summary())))
            }
            Command::View(view) => {
                self.set_view(view);
                Ok(Outcome::Continue(Some(self.summary())))
            }
            Command::Filter(filter) => {
                self.set_filter(filter);
                Ok(Outcome::Continue(Some(self.summary())))
            }
            Command::Columns(columns) => {
                self.set_columns(columns);
                Ok(Outcome::Continue(Some(self.summary())))
            }
            Command::Fullscreen(camera) => {
                let reply = self.open_fullscreen(camera)?;
                Ok(Outcome::Continue(Some(reply)))
            }
            Command::Close => Ok(Outcome::Continue(Some(self.close_fullscreen()))),
            Command::Status => Ok(Outcome::Continue(Some(self.status()))),
            Command::Help => Ok(Outcome::Continue(Some(HELP.to_string()))),
            Command::Quit => Ok(Outcome::Quit),
        }
    }

    /// Scroll the grid, clamped to the content
    pub fn scroll(&mut self, y: f64) {
        self.scroll_y = y.clamp(0.0, self.max_scroll());
        self.manager.observer_mut().scroll_to(self.scroll_y);
        self.refresh();
    }

    /// Change the stream limit to one of the offered choices
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::CapacityNotOffered`] for values outside the
    /// configured choices.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), DashboardError> {
        if !self.config.allows_capacity(capacity) {
            return Err(DashboardError::CapacityNotOffered {
                requested: capacity,
                choices: self.config.capacity_choices.clone(),
            });
        }
        self.manager.set_capacity(capacity)?;
        info!(capacity, active = self.manager.active_count(), "Stream limit changed");
        Ok(())
    }

    /// Switch between grid and map
    ///
    /// Leaving the grid stops every stream. Coming back lays the grid out
    /// again and re-registers every card with the observer so visible cards
    /// report in afresh.
    pub fn set_view(&mut self, view: ViewMode) {
        if view == self.view {
            return;
        }
        self.view = view;
        match view {
            ViewMode::Map => {
                self.manager.unload_all();
                self.apply_layout();
                self.refresh();
                info!(markers = self.markers().len(), "Map view");
            }
            ViewMode::Grid => {
                self.apply_layout();
                self.manager.reobserve_all();
                self.refresh();
                info!(active = self.manager.active_count(), "Grid view");
            }
        }
    }

    /// Show one district or all of them
    pub fn set_filter(&mut self, filter: DistrictFilter) {
        self.filter = filter;
        self.relayout();
    }

    /// Change the number of grid columns
    pub fn set_columns(&mut self, columns: usize) {
        self.layout.columns = columns.max(1);
        self.relayout();
    }

    /// Stop every stream
    pub fn shutdown(&mut self) {
        self.manager.unload_all();
        let stats = self.manager.stats();
        info!(
            activations = stats.activations,
            denials = stats.denials,
            promotions = stats.promotions,
            peak_active = stats.peak_active,
            "Dashboard stopped"
        );
    }

    /// Map markers for the current filter
    pub fn markers(&self) -> Vec<(UnitId, MarkerPosition)> {
        markers(&self.feeds, self.filter)
    }

    /// Open a camera in the fullscreen viewer
    ///
    /// The viewer plays with sound and controls on its own player; grid
    /// streams are left alone. Opening another camera replaces the current
    /// one.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::UnknownCamera`] or [`DashboardError::NoVideo`].
    pub fn open_fullscreen(&mut self, camera: u64) -> Result<String, DashboardError> {
        let feed = self
            .feeds
            .iter()
            .find(|feed| feed.id == camera)
            .ok_or(DashboardError::UnknownCamera(camera))?;
        let media = feed.media_ref().ok_or(DashboardError::NoVideo(camera))?;

        let mut out = format!(
            "fullscreen {} {} ({}) {}",
            feed.unit_id(),
            feed.location_name,
            feed.district,
            media.fullscreen_url()
        );
        if !feed.description.is_empty() {
            out.push_str("\n  ");
            out.push_str(&feed.description);
        }
        self.fullscreen = Some(feed.unit_id());
        info!(camera, url = %media.fullscreen_url(), "Fullscreen opened");
        Ok(out)
    }

    /// Close the fullscreen viewer
    pub fn close_fullscreen(&mut self) -> String {
        match self.fullscreen.take() {
            Some(id) => {
                info!(unit = %id, "Fullscreen closed");
                format!("closed {id}")
            }
            None => "fullscreen viewer is not open".to_string(),
        }
    }

    /// One-line state summary
    pub fn summary(&self) -> String {
        let indicator = self
            .manager
            .host()
            .indicator()
            .unwrap_or_else(|| self.manager.indicator());
        format!(
            "view={} filter={} scroll={:.0} live={} [{}]",
            self.view,
            self.filter,
            self.scroll_y,
            indicator,
            indicator.level.css_class(),
        )
    }

    /// Multi-line state report
    ///
    /// The grid lists live players and waiting cards (with their poster
    /// image); the map lists markers with the camera's online status.
    pub fn status(&self) -> String {
        let host = self.manager.host();
        let mut lines = vec![self.summary()];
        if let Some(id) = self.fullscreen {
            lines.push(format!("  fullscreen {id} {}", host.title(id).unwrap_or_default()));
        }
        match self.view {
            ViewMode::Grid => {
                lines.extend(self.manager.active_units().into_iter().map(|id| {
                    format!(
                        "  live    {id} {} {}",
                        host.title(id).unwrap_or_default(),
                        host.player_url(id).unwrap_or_default()
                    )
                }));
                lines.extend(self.manager.pending_units().into_iter().map(|id| {
                    let poster = host
                        .media_ref(id)
                        .map(|media| media.thumbnail_url())
                        .unwrap_or_default();
                    format!(
                        "  waiting {id} {} {poster}",
                        host.title(id).unwrap_or_default()
                    )
                }));
            }
            ViewMode::Map => {
                lines.extend(self.feeds.iter().filter_map(|feed| {
                    if !feed.in_district(self.filter) {
                        return None;
                    }
                    let position = feed.marker_position()?;
                    let status = if feed.is_active { "online" } else { "offline" };
                    Some(format!(
                        "  marker  {} {} {:.5},{:.5} {status}",
                        feed.unit_id(),
                        feed.location_name,
                        position.latitude,
                        position.longitude
                    ))
                }));
            }
        }
        lines.join("\n")
    }

    /// Cards that moved off screen release their slots on the first poll;
    /// re-observing then reports every card still on screen.
    fn relayout(&mut self) {
        self.apply_layout();
        self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll());
        self.manager.observer_mut().scroll_to(self.scroll_y);
        self.refresh();
        self.manager.reobserve_all();
        self.refresh();
    }

    fn max_scroll(&self) -> f64 {
        let cards = self
            .feeds
            .iter()
            .filter(|feed| feed.in_district(self.filter))
            .count();
        (self.layout.content_height(cards) - self.config.viewport_height).max(0.0)
    }

    /// Push card rectangles into the observer. Cards outside the filter, and
    /// every card while the map is shown, take no space.
    fn apply_layout(&mut self) {
        let placed = match self.view {
            ViewMode::Grid => self.layout.arrange(&self.feeds, self.filter),
            ViewMode::Map => Vec::new(),
        };
        let observer = self.manager.observer_mut();
        for feed in &self.feeds {
            observer.remove_bounds(feed.unit_id());
        }
        for (id, rect) in placed {
            observer.set_bounds(id, rect);
        }
    }

    /// Deliver pending visibility changes to the manager
    fn refresh(&mut self) {
        let changes = self.manager.observer_mut().poll();
        if changes.is_empty() {
            return;
        }
        let count = changes.len();
        for change in changes {
            self.manager.apply(change);
        }
        debug!(changes = count, active = self.manager.active_count(), "Visibility refreshed");
    }
}
