//! Landmark records and the form draft they are created from

use serde::{Deserialize, Serialize};

/// Number of description characters shown in the list preview
pub const PREVIEW_CHARS: usize = 50;

/// Unique landmark identifier (creation time in milliseconds since the Unix epoch)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkId(pub i64);

impl std::fmt::Display for LandmarkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A WGS84 coordinate pair in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A user-created point of interest.
///
/// Field names match the persisted JSON layout: `{id, title, description, lat, lng, image}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: LandmarkId,
    pub title: String,
    pub description: String,
    pub lat: f64,
    pub lng: f64,
    /// Image embedded as a data URI
    pub image: String,
}

impl Landmark {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }

    /// Description shortened for the list view. The record itself is never modified.
    pub fn preview(&self) -> String {
        preview_text(&self.description, PREVIEW_CHARS)
    }
}

/// Truncate `text` to `max_chars` characters, appending `...` when something was cut
pub fn preview_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Format a coordinate the way map clicks write it into the form
pub fn format_coordinate(value: f64) -> String {
    format!("{value:.6}")
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DraftError {
    #[error("Invalid latitude: {0:?}")]
    InvalidLatitude(String),

    #[error("Invalid longitude: {0:?}")]
    InvalidLongitude(String),
}

/// Text fields of a submitted form, with the coordinates parsed
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkDraft {
    pub title: String,
    pub description: String,
    pub coordinates: Coordinates,
}

impl LandmarkDraft {
    /// Parse the raw form fields. Only the numbers are checked; empty titles and
    /// out-of-range coordinates are accepted as typed.
    pub fn parse(
        title: &str,
        description: &str,
        lat: &str,
        lng: &str,
    ) -> Result<Self, DraftError> {
        let lat_value = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| DraftError::InvalidLatitude(lat.to_string()))?;
        let lng_value = lng
            .trim()
            .parse::<f64>()
            .map_err(|_| DraftError::InvalidLongitude(lng.to_string()))?;

        // NaN and infinities would serialize as JSON null and break the next load
        if !lat_value.is_finite() {
            return Err(DraftError::InvalidLatitude(lat.to_string()));
        }
        if !lng_value.is_finite() {
            return Err(DraftError::InvalidLongitude(lng.to_string()));
        }

        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
            coordinates: Coordinates::new(lat_value, lng_value),
        })
    }

    /// Combine the draft with an id and an encoded image
    pub fn into_landmark(self, id: LandmarkId, image: String) -> Landmark {
        Landmark {
            id,
            title: self.title,
            description: self.description,
            lat: self.coordinates.lat,
            lng: self.coordinates.lng,
            image,
        }
    }
}
