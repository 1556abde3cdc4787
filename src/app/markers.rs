//! The walkers-backed map surface: camera state plus the id -> marker lookup.

use crate::data::{Coordinates, Landmark, LandmarkId, MapSurface, data_uri};
use std::collections::BTreeMap;
use walkers::{MapMemory, Position};

/// Everything a marker and its popup need to render
#[derive(Clone)]
pub struct Marker {
    pub id: LandmarkId,
    pub position: Position,
    pub title: String,
    pub description: String,
    /// `bytes://` URI and decoded image, `None` when the stored data URI is unreadable
    pub image: Option<(String, egui::load::Bytes)>,
}

impl Marker {
    fn from_landmark(landmark: &Landmark) -> Self {
        let image = match data_uri::decode(&landmark.image) {
            Ok(decoded) if decoded.bytes.is_empty() => None,
            Ok(decoded) => Some((
                format!("bytes://landmark-{}", landmark.id),
                egui::load::Bytes::from(decoded.bytes),
            )),
            Err(e) => {
                tracing::warn!("Landmark {} has an unreadable image: {}", landmark.id, e);
                None
            }
        };

        Self {
            id: landmark.id,
            position: walkers::lat_lon(landmark.lat, landmark.lng),
            title: landmark.title.clone(),
            description: landmark.description.clone(),
            image,
        }
    }
}

/// Map camera and markers, driven by the landmark controller
pub struct MarkerLayer {
    /// Map state (camera position, zoom, etc.)
    pub memory: MapMemory,
    markers: BTreeMap<LandmarkId, Marker>,
    open_popup: Option<LandmarkId>,
    /// Image URIs of removed markers, to be dropped from egui's loaders
    released_images: Vec<String>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self {
            memory: MapMemory::default(),
            markers: BTreeMap::new(),
            open_popup: None,
            released_images: Vec::new(),
        }
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    pub fn open_popup_id(&self) -> Option<LandmarkId> {
        self.open_popup
    }

    /// Toggle a popup after a click on its marker
    pub fn toggle_popup(&mut self, id: LandmarkId) {
        if self.open_popup == Some(id) {
            self.open_popup = None;
        } else if self.markers.contains_key(&id) {
            self.open_popup = Some(id);
        }
    }

    pub fn close_popup(&mut self) {
        self.open_popup = None;
    }

    /// Image URIs no marker uses any more, since the last call
    pub fn take_released_images(&mut self) -> Vec<String> {
        std::mem::take(&mut self.released_images)
    }
}

impl MapSurface for MarkerLayer {
    fn set_view(&mut self, center: Coordinates, zoom: f64) {
        self.memory.center_at(walkers::lat_lon(center.lat, center.lng));
        if let Err(e) = self.memory.set_zoom(zoom) {
            tracing::warn!("Cannot zoom to {}: {:?}", zoom, e);
        }
    }

    fn add_marker(&mut self, landmark: &Landmark) {
        self.markers.insert(landmark.id, Marker::from_landmark(landmark));
    }

    fn remove_marker(&mut self, id: LandmarkId) {
        if let Some((uri, _)) = self.markers.remove(&id).and_then(|marker| marker.image) {
            self.released_images.push(uri);
        }
        if self.open_popup == Some(id) {
            self.open_popup = None;
        }
    }

    fn open_popup(&mut self, id: LandmarkId) {
        if self.markers.contains_key(&id) {
            self.open_popup = Some(id);
        }
    }

    fn marker_ids(&self) -> Vec<LandmarkId> {
        self.markers.keys().copied().collect()
    }
}
