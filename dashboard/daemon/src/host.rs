//! Terminal playback host
//!
//! Stands in for the page: it knows every camera card, "plays" a stream by
//! recording its embed URL, and reports badge and indicator changes through
//! `tracing`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use dashboard_core::{CameraFeed, LiveIndicator, MediaRef, PlaybackError, PlaybackHost, UnitId};
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct Card {
    title: String,
    media: Option<MediaRef>,
}

/// Playback host that renders nothing and logs everything
#[derive(Debug, Default)]
pub struct TerminalHost {
    cards: HashMap<UnitId, Card>,
    /// Running players and their embed URL
    players: BTreeMap<UnitId, String>,
    waiting: BTreeSet<UnitId>,
    indicator: Option<LiveIndicator>,
}

impl TerminalHost {
    /// Host with one card per feed
    pub fn new(feeds: &[CameraFeed]) -> Self {
        let cards = feeds
            .iter()
            .map(|feed| {
                (
                    feed.unit_id(),
                    Card {
                        title: feed.location_name.clone(),
                        media: feed.media_ref(),
                    },
                )
            })
            .collect();
        Self {
            cards,
            ..Self::default()
        }
    }

    /// Units with a running player
    #[cfg(test)]
    pub fn playing(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.players.keys().copied()
    }

    /// Embed URL of a running player
    pub fn player_url(&self, id: UnitId) -> Option<&str> {
        self.players.get(&id).map(String::as_str)
    }

    /// Whether the unit shows its waiting badge
    #[cfg(test)]
    pub fn is_waiting(&self, id: UnitId) -> bool {
        self.waiting.contains(&id)
    }

    /// Last indicator drawn
    pub fn indicator(&self) -> Option<LiveIndicator> {
        self.indicator
    }

    /// Card title for a unit
    pub fn title(&self, id: UnitId) -> Option<&str> {
        self.cards.get(&id).map(|card| card.title.as_str())
    }
}

impl PlaybackHost for TerminalHost {
    fn media_ref(&self, id: UnitId) -> Option<MediaRef> {
        self.cards.get(&id).and_then(|card| card.media.clone())
    }

    fn create_player(&mut self, id: UnitId, media: &MediaRef) -> Result<(), PlaybackError> {
        let Some(card) = self.cards.get(&id) else {
            return Err(PlaybackError::MissingAnchor(id));
        };
        let url = media.embed_url();
        info!(unit = %id, title = %card.title, url = %url, "Player started");
        self.players.insert(id, url);
        Ok(())
    }

    fn destroy_player(&mut self, id: UnitId) {
        if self.players.remove(&id).is_some() {
            info!(unit = %id, "Player stopped");
        }
    }

    fn set_waiting(&mut self, id: UnitId, waiting: bool) {
        let changed = if waiting {
            self.waiting.insert(id)
        } else {
            self.waiting.remove(&id)
        };
        if changed {
            debug!(unit = %id, waiting, "Waiting badge toggled");
        }
    }

    fn update_indicator(&mut self, indicator: LiveIndicator) {
        if self.indicator != Some(indicator) {
            debug!(
                live = %indicator,
                level = indicator.level.css_class(),
                "Live indicator updated"
            );
        }
        self.indicator = Some(indicator);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::parse_catalog;

    fn host() -> TerminalHost {
        let feeds = parse_catalog(
            r#"{"success": true, "data": [
                {"id": 7, "nama_lokasi": "Tugu", "kecamatan": "K", "kecamatan_id": 1, "youtube_video_id": "vid7"},
                {"id": 8, "nama_lokasi": "Pasar", "kecamatan": "K", "kecamatan_id": 1, "youtube_video_id": " "}
            ]}"#,
        )
        .unwrap();
        TerminalHost::new(&feeds)
    }

    #[test]
    fn test_media_lookup() {
        let host = host();
        assert_eq!(host.media_ref(UnitId::new(7)).unwrap().as_str(), "vid7");
        assert!(host.media_ref(UnitId::new(8)).is_none());
        assert!(host.media_ref(UnitId::new(99)).is_none());
        assert_eq!(host.title(UnitId::new(8)), Some("Pasar"));
    }

    #[test]
    fn test_player_lifecycle() {
        let mut host = host();
        let id = UnitId::new(7);
        let media = host.media_ref(id).unwrap();
        host.create_player(id, &media).unwrap();
        assert!(host.player_url(id).unwrap().contains("/embed/vid7?"));

        host.destroy_player(id);
        assert_eq!(host.playing().count(), 0);
        // Destroying again is harmless
        host.destroy_player(id);
    }

    #[test]
    fn test_unknown_card_has_no_anchor() {
        let mut host = host();
        let media = MediaRef::new("x").unwrap();
        assert_eq!(
            host.create_player(UnitId::new(99), &media),
            Err(PlaybackError::MissingAnchor(UnitId::new(99)))
        );
    }

    #[test]
    fn test_waiting_badge() {
        let mut host = host();
        host.set_waiting(UnitId::new(7), true);
        assert!(host.is_waiting(UnitId::new(7)));
        host.set_waiting(UnitId::new(7), false);
        assert!(!host.is_waiting(UnitId::new(7)));
    }
}
