//! Landmark Data Module
//!
//! Platform-independent core of the application: the landmark records, the
//! ordered store mirrored to durable storage, and the controller that keeps
//! the store and the map markers in agreement.
//!
//! # Architecture
//!
//! - **[`Landmark`]**: Immutable point-of-interest record with an embedded image
//! - **[`LandmarkStore`]**: Ordered list with a write-through [`StorageBackend`](crate::storage::StorageBackend) mirror
//! - **[`LandmarkController`]**: Owner of the store, the [`MapSurface`] and the id generator
//! - **[`ImageSource`]**: Asynchronous file capability turned into a data URI by [`read_data_uri`]
//!
//! # Usage Example
//!
//! ```rust
//! use landmark_map::data::{
//!     Coordinates, IdGenerator, Landmark, LandmarkController, LandmarkDraft, LandmarkId,
//!     LandmarkStore, MapSurface, SystemClock, DEFAULT_CENTER, DEFAULT_ZOOM,
//! };
//! use landmark_map::storage::MemoryStorage;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! #[derive(Default)]
//! struct NoMap(Vec<LandmarkId>);
//!
//! impl MapSurface for NoMap {
//!     fn set_view(&mut self, _center: Coordinates, _zoom: f64) {}
//!     fn add_marker(&mut self, landmark: &Landmark) { self.0.push(landmark.id) }
//!     fn remove_marker(&mut self, id: LandmarkId) { self.0.retain(|m| *m != id) }
//!     fn open_popup(&mut self, _id: LandmarkId) {}
//!     fn marker_ids(&self) -> Vec<LandmarkId> { self.0.clone() }
//! }
//!
//! let store = LandmarkStore::load(Box::new(MemoryStorage::new()))?;
//! let ids = IdGenerator::new(Box::new(SystemClock));
//! let mut controller =
//!     LandmarkController::start(store, NoMap::default(), ids, (DEFAULT_CENTER, DEFAULT_ZOOM));
//!
//! let draft = LandmarkDraft::parse("Tower", "A tall tower", "43.65", "-79.38")?;
//! let id = controller.create(draft, "data:image/png;base64,AAAA".to_string())?;
//! assert_eq!(controller.map().marker_ids(), vec![id]);
//! # Ok(())
//! # }
//! ```

mod controller;
pub mod data_uri;
mod ids;
mod image_source;
mod landmark;
mod store;

// Public API exports
pub use controller::{
    DEFAULT_CENTER, DEFAULT_ZOOM, FOCUS_ZOOM, LandmarkController, ListEntry, MapSurface,
    SubmitError,
};
pub use ids::{Clock, IdGenerator, SystemClock};
pub use image_source::{ImageError, ImageSource, read_data_uri};
pub use landmark::{
    Coordinates, DraftError, Landmark, LandmarkDraft, LandmarkId, PREVIEW_CHARS, format_coordinate,
    preview_text,
};
pub use store::{LandmarkStore, STORAGE_KEY};

/// Error types for the landmark store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    #[error("Stored landmark list is malformed: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Failed to serialize landmarks: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_image_decodes_to_original_bytes() {
        let storage = crate::storage::MemoryStorage::new();
        let mut store = LandmarkStore::load(Box::new(storage.clone())).unwrap();

        let draft = LandmarkDraft::parse("Tower", "", "43.65", "-79.38").unwrap();
        let image = data_uri::encode("tower.jpg", &[0xff, 0xd8, 0xff]);
        store.add(draft.into_landmark(LandmarkId(1), image)).unwrap();

        let reloaded = LandmarkStore::load(Box::new(storage)).unwrap();
        let decoded = data_uri::decode(&reloaded.landmarks()[0].image).unwrap();
        assert_eq!(decoded.mime, "image/jpeg");
        assert_eq!(decoded.bytes, vec![0xff, 0xd8, 0xff]);
    }
}
