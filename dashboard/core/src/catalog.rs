//! Camera Catalog
//!
//! The list of camera feeds the dashboard displays, in the JSON format served
//! by the camera list endpoint:
//!
//! ```json
//! {
//!   "success": true,
//!   "count": 1,
//!   "data": [{
//!     "id": 1,
//!     "nama_lokasi": "Simpang Jl. Tanjungpura - Jl. Diponegoro",
//!     "kecamatan": "Pontianak Kota",
//!     "kecamatan_id": 5,
//!     "youtube_video_id": "LDU_Txk06tM",
//!     "latitude": -0.0226,
//!     "longitude": 109.3425,
//!     "is_active": true,
//!     "deskripsi": ""
//!   }]
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::unit::{MediaRef, UnitId};

/// Errors from reading the camera catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Payload is not valid catalog JSON
    #[error("Malformed camera catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// The endpoint reported failure
    #[error("Camera catalog request failed: {0}")]
    Rejected(String),

    /// District filter is neither `all` nor a numeric id
    #[error("Invalid district filter: {0:?}")]
    InvalidFilter(String),
}

/// One camera feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraFeed {
    /// Camera id, also used as the unit id
    pub id: u64,
    /// Human-readable location
    #[serde(rename = "nama_lokasi")]
    pub location_name: String,
    /// District name
    #[serde(rename = "kecamatan")]
    pub district: String,
    /// District id, used by the district filter
    #[serde(rename = "kecamatan_id")]
    pub district_id: u64,
    /// External video identifier
    #[serde(rename = "youtube_video_id", default)]
    pub video_id: String,
    /// Latitude; numbers and numeric strings are accepted
    #[serde(default, deserialize_with = "deserialize_coordinate")]
    pub latitude: Option<f64>,
    /// Longitude; numbers and numeric strings are accepted
    #[serde(default, deserialize_with = "deserialize_coordinate")]
    pub longitude: Option<f64>,
    /// Whether the stream was last seen live
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Free-form description
    #[serde(rename = "deskripsi", default)]
    pub description: String,
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoordinate {
    Number(f64),
    Text(String),
}

/// Unparseable strings become NaN so the marker check can report them
fn deserialize_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawCoordinate>::deserialize(deserializer)?;
    Ok(raw.map(|coordinate| match coordinate {
        RawCoordinate::Number(value) => value,
        RawCoordinate::Text(text) => text.trim().parse().unwrap_or(f64::NAN),
    }))
}

/// Map position of a camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerPosition {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl CameraFeed {
    /// Unit id of this feed's video slot
    #[must_use]
    pub fn unit_id(&self) -> UnitId {
        UnitId::new(self.id)
    }

    /// Media reference, if the feed has a video id
    #[must_use]
    pub fn media_ref(&self) -> Option<MediaRef> {
        MediaRef::new(self.video_id.as_str())
    }

    /// Map position, if both coordinates are present and finite
    #[must_use]
    pub fn marker_position(&self) -> Option<MarkerPosition> {
        let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) else {
            tracing::warn!(camera = self.id, "Skipping marker: missing coordinates");
            return None;
        };
        if !latitude.is_finite() || !longitude.is_finite() {
            tracing::warn!(
                camera = self.id,
                latitude,
                longitude,
                "Skipping marker: invalid coordinates"
            );
            return None;
        }
        Some(MarkerPosition {
            latitude,
            longitude,
        })
    }

    /// Whether the feed passes a district filter
    #[must_use]
    pub fn in_district(&self, filter: DistrictFilter) -> bool {
        match filter {
            DistrictFilter::All => true,
            DistrictFilter::Only(id) => self.district_id == id,
        }
    }
}

/// District selection for the grid and the map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DistrictFilter {
    /// Every district
    #[default]
    All,
    /// One district by id
    Only(u64),
}

impl FromStr for DistrictFilter {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<u64>()
            .map(Self::Only)
            .map_err(|_| CatalogError::InvalidFilter(s.to_string()))
    }
}

impl fmt::Display for DistrictFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Only(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    success: bool,
    #[serde(default)]
    data: Vec<CameraFeed>,
    #[serde(default)]
    message: Option<String>,
}

/// Parse a camera list response
///
/// # Errors
///
/// Returns [`CatalogError::Json`] for malformed payloads and
/// [`CatalogError::Rejected`] when the response reports failure.
pub fn parse_catalog(json: &str) -> Result<Vec<CameraFeed>, CatalogError> {
    let response: CatalogResponse = serde_json::from_str(json)?;
    if !response.success {
        return Err(CatalogError::Rejected(
            response
                .message
                .unwrap_or_else(|| "no message".to_string()),
        ));
    }
    tracing::debug!(cameras = response.data.len(), "Camera catalog parsed");
    Ok(response.data)
}

/// Map markers for the feeds passing `filter`, in catalog order
#[must_use]
pub fn markers(feeds: &[CameraFeed], filter: DistrictFilter) -> Vec<(UnitId, MarkerPosition)> {
    feeds
        .iter()
        .filter(|feed| feed.in_district(filter))
        .filter_map(|feed| feed.marker_position().map(|pos| (feed.unit_id(), pos)))
        .collect()
}
