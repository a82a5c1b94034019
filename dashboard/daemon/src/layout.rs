//! Grid layout
//!
//! Places camera cards in a fixed-column grid so the geometry observer can
//! decide which cards are on screen.

use dashboard_core::{CameraFeed, DashboardConfig, DistrictFilter, Rect, UnitId};

/// Column grid of equally sized cards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Number of columns
    pub columns: usize,
    /// Width available to the grid
    pub width: f64,
    /// Height of every card
    pub card_height: f64,
    /// Space between neighbouring cards
    pub gap: f64,
}

impl GridLayout {
    /// Layout described by the configuration
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            columns: config.grid_columns.max(1),
            width: config.viewport_width,
            card_height: config.card_height,
            gap: config.gap,
        }
    }

    /// Width of one card
    #[allow(clippy::cast_precision_loss)]
    pub fn card_width(&self) -> f64 {
        let columns = self.columns.max(1) as f64;
        ((self.width - self.gap * (columns - 1.0)) / columns).max(0.0)
    }

    /// Rectangle of the card at `index` (row-major)
    #[allow(clippy::cast_precision_loss)]
    pub fn place(&self, index: usize) -> Rect {
        let columns = self.columns.max(1);
        let row = (index / columns) as f64;
        let column = (index % columns) as f64;
        let card_width = self.card_width();
        Rect::new(
            column * (card_width + self.gap),
            row * (self.card_height + self.gap),
            card_width,
            self.card_height,
        )
    }

    /// Total height of a grid holding `cards` cards
    #[allow(clippy::cast_precision_loss)]
    pub fn content_height(&self, cards: usize) -> f64 {
        if cards == 0 {
            return 0.0;
        }
        let rows = cards.div_ceil(self.columns.max(1)) as f64;
        rows * self.card_height + (rows - 1.0) * self.gap
    }

    /// Rectangles for the feeds shown under `filter`, in catalog order
    ///
    /// Filtered-out feeds take no space, like hidden cards in the page.
    pub fn arrange(&self, feeds: &[CameraFeed], filter: DistrictFilter) -> Vec<(UnitId, Rect)> {
        feeds
            .iter()
            .filter(|feed| feed.in_district(filter))
            .enumerate()
            .map(|(index, feed)| (feed.unit_id(), self.place(index)))
            .collect()
    }
}
