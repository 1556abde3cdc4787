//! The landmark controller: the single owner of the landmark list and the
//! marker lookup, driven by UI events.
//!
//! Every public operation leaves the store and the map surface in agreement:
//! each stored id has exactly one marker and no marker exists without a record.

use crate::data::image_source::{ImageError, ImageSource, read_data_uri};
use crate::data::{
    Coordinates, DraftError, IdGenerator, Landmark, LandmarkDraft, LandmarkId, LandmarkStore,
    StoreError,
};
use std::collections::HashSet;

/// Initial map center when geolocation is unavailable (Toronto)
pub const DEFAULT_CENTER: Coordinates = Coordinates {
    lat: 43.6532,
    lng: -79.3832,
};

/// Zoom level of the initial view
pub const DEFAULT_ZOOM: f64 = 13.0;

/// Zoom level used when centering on the user or on a landmark
pub const FOCUS_ZOOM: f64 = 15.0;

/// Map widget capability used by the controller
pub trait MapSurface {
    /// Center the view
    fn set_view(&mut self, center: Coordinates, zoom: f64);

    /// Show a marker whose popup carries the landmark's title, description and image
    fn add_marker(&mut self, landmark: &Landmark);

    /// Remove the marker for `id` (no-op when absent)
    fn remove_marker(&mut self, id: LandmarkId);

    /// Open the popup of the marker for `id`
    fn open_popup(&mut self, id: LandmarkId);

    /// Ids of all markers currently shown
    fn marker_ids(&self) -> Vec<LandmarkId>;
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("Failed to save landmark: {0}")]
    Store(#[from] StoreError),
}

/// One row of the landmark list view
#[derive(Clone, Debug, PartialEq)]
pub struct ListEntry {
    pub id: LandmarkId,
    pub title: String,
    pub preview: String,
}

pub struct LandmarkController<M: MapSurface> {
    store: LandmarkStore,
    map: M,
    ids: IdGenerator,
}

impl<M: MapSurface> LandmarkController<M> {
    /// Center the map on `initial_view`, then show a marker for every stored landmark
    pub fn start(
        store: LandmarkStore,
        mut map: M,
        mut ids: IdGenerator,
        initial_view: (Coordinates, f64),
    ) -> Self {
        map.set_view(initial_view.0, initial_view.1);

        ids.observe(store.landmarks().iter().map(|landmark| &landmark.id));
        // Duplicate ids keep the marker of the record `get` resolves to
        let mut shown = HashSet::new();
        for landmark in store.landmarks() {
            if shown.insert(landmark.id) {
                map.add_marker(landmark);
            } else {
                tracing::warn!("Skipping duplicate landmark id {}", landmark.id);
            }
        }

        Self { store, map, ids }
    }

    pub fn landmarks(&self) -> &[Landmark] {
        self.store.landmarks()
    }

    pub fn get(&self, id: LandmarkId) -> Option<&Landmark> {
        self.store.get(id)
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    /// Rows for the list view, rebuilt from the store on every call
    pub fn list_entries(&self) -> Vec<ListEntry> {
        self.store
            .landmarks()
            .iter()
            .map(|landmark| ListEntry {
                id: landmark.id,
                title: landmark.title.clone(),
                preview: landmark.preview(),
            })
            .collect()
    }

    /// Recenter on a detected position
    pub fn center_on(&mut self, position: Coordinates) {
        self.map.set_view(position, FOCUS_ZOOM);
    }

    /// Store a new landmark built from `draft` and an already encoded image
    pub fn create(&mut self, draft: LandmarkDraft, image: String) -> Result<LandmarkId, StoreError> {
        let id = self.ids.next_id();
        let landmark = draft.into_landmark(id, image);

        self.store.add(landmark)?;
        if let Some(landmark) = self.store.landmarks().last() {
            self.map.add_marker(landmark);
        }

        tracing::info!("Created landmark {}", id);
        Ok(id)
    }

    /// Full form submission: read the image, then create the landmark
    pub async fn submit<S: ImageSource>(
        &mut self,
        draft: LandmarkDraft,
        image: &S,
    ) -> Result<LandmarkId, SubmitError> {
        let uri = read_data_uri(image).await?;
        Ok(self.create(draft, uri)?)
    }

    /// Delete a landmark and its marker. Unknown ids are ignored.
    pub fn delete(&mut self, id: LandmarkId) -> Result<bool, StoreError> {
        let removed = self.store.remove(id)?;
        if removed {
            self.map.remove_marker(id);
            tracing::info!("Deleted landmark {}", id);
        } else {
            tracing::debug!("Ignoring delete of unknown landmark {}", id);
        }
        Ok(removed)
    }

    /// Recenter on a landmark and open its popup
    pub fn focus(&mut self, id: LandmarkId) -> bool {
        let Some(position) = self.store.get(id).map(Landmark::coordinates) else {
            return false;
        };

        self.map.set_view(position, FOCUS_ZOOM);
        self.map.open_popup(id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ids::tests::FrozenClock;
    use crate::data::image_source::tests::InMemoryImage;
    use crate::data::store::STORAGE_KEY;
    use crate::storage::{MemoryStorage, StorageBackend};
    use std::collections::BTreeMap;

    /// Map surface that records what it was asked to show
    #[derive(Default)]
    struct FakeMap {
        markers: BTreeMap<LandmarkId, usize>,
        shown_lat: BTreeMap<LandmarkId, f64>,
        view: Option<(Coordinates, f64)>,
        open_popup: Option<LandmarkId>,
    }

    impl MapSurface for FakeMap {
        fn set_view(&mut self, center: Coordinates, zoom: f64) {
            self.view = Some((center, zoom));
        }

        fn add_marker(&mut self, landmark: &Landmark) {
            *self.markers.entry(landmark.id).or_default() += 1;
            self.shown_lat.insert(landmark.id, landmark.lat);
        }

        fn remove_marker(&mut self, id: LandmarkId) {
            self.markers.remove(&id);
            self.shown_lat.remove(&id);
            if self.open_popup == Some(id) {
                self.open_popup = None;
            }
        }

        fn open_popup(&mut self, id: LandmarkId) {
            self.open_popup = Some(id);
        }

        fn marker_ids(&self) -> Vec<LandmarkId> {
            self.markers.keys().copied().collect()
        }
    }

    fn start(storage: &MemoryStorage, clock: &FrozenClock) -> LandmarkController<FakeMap> {
        let store = LandmarkStore::load(Box::new(storage.clone())).unwrap();
        LandmarkController::start(
            store,
            FakeMap::default(),
            IdGenerator::new(Box::new(clock.clone())),
            (DEFAULT_CENTER, DEFAULT_ZOOM),
        )
    }

    fn tower() -> LandmarkDraft {
        LandmarkDraft::parse("Tower", "A tall tower", "43.65", "-79.38").unwrap()
    }

    fn assert_markers_match(controller: &LandmarkController<FakeMap>) {
        let mut ids: Vec<LandmarkId> = controller.landmarks().iter().map(|l| l.id).collect();
        ids.sort();
        assert_eq!(controller.map().marker_ids(), ids);
        assert!(controller.map().markers.values().all(|count| *count == 1));
    }

    #[test]
    fn test_start_with_empty_storage() {
        let controller = start(&MemoryStorage::new(), &FrozenClock::at(1_000));

        assert!(controller.landmarks().is_empty());
        assert!(controller.map().marker_ids().is_empty());
        assert_eq!(controller.map().view, Some((DEFAULT_CENTER, DEFAULT_ZOOM)));
    }

    #[test]
    fn test_start_adds_markers_for_stored_landmarks() {
        let storage = MemoryStorage::new();
        let clock = FrozenClock::at(1_000);
        {
            let mut controller = start(&storage, &clock);
            controller.create(tower(), "data:image/png;base64,AA==".into()).unwrap();
            clock.0.set(2_000);
            controller.create(tower(), "data:image/png;base64,AA==".into()).unwrap();
        }

        let controller = start(&storage, &clock);
        assert_eq!(controller.landmarks().len(), 2);
        assert_markers_match(&controller);
    }

    #[test]
    fn test_duplicate_stored_ids_show_the_first_record() {
        let storage = MemoryStorage::new();
        storage
            .set_string(
                STORAGE_KEY,
                r#"[{"id":7,"title":"first","description":"","lat":10.0,"lng":0.0,"image":""},
                    {"id":7,"title":"second","description":"","lat":-30.0,"lng":0.0,"image":""}]"#,
            )
            .unwrap();
        let mut controller = start(&storage, &FrozenClock::at(1_000));

        assert_eq!(controller.landmarks().len(), 2);
        assert_eq!(controller.map().marker_ids(), vec![LandmarkId(7)]);
        assert_eq!(controller.map().markers[&LandmarkId(7)], 1);
        assert_eq!(controller.map().shown_lat[&LandmarkId(7)], 10.0);

        assert!(controller.focus(LandmarkId(7)));
        assert_eq!(
            controller.map().view,
            Some((Coordinates::new(10.0, 0.0), FOCUS_ZOOM))
        );
    }

    #[tokio::test]
    async fn test_submit_tower_round_trips() {
        let storage = MemoryStorage::new();
        let clock = FrozenClock::at(1_700_000_000_000);
        let mut controller = start(&storage, &clock);

        let id = controller
            .submit(tower(), &InMemoryImage::png(b"tower-bytes"))
            .await
            .unwrap();

        assert_eq!(controller.landmarks().len(), 1);
        assert_eq!(controller.landmarks()[0].id, id);
        assert_markers_match(&controller);

        let reloaded = LandmarkStore::load(Box::new(storage.clone())).unwrap();
        let stored = &reloaded.landmarks()[0];
        assert_eq!(stored, &controller.landmarks()[0]);
        assert_eq!(stored.title, "Tower");
        assert_eq!(stored.description, "A tall tower");
        assert_eq!(stored.coordinates(), Coordinates::new(43.65, -79.38));
        assert!(stored.image.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_failed_image_read_creates_nothing() {
        let storage = MemoryStorage::new();
        let mut controller = start(&storage, &FrozenClock::at(1_000));

        let result = controller
            .submit(tower(), &InMemoryImage::unreadable())
            .await;

        assert!(matches!(result, Err(SubmitError::Image(_))));
        assert!(controller.landmarks().is_empty());
        assert!(controller.map().marker_ids().is_empty());
        assert_eq!(storage.get_string(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_same_timestamp_submissions_stay_retrievable() {
        let mut controller = start(&MemoryStorage::new(), &FrozenClock::at(1_000));

        let first = controller.create(tower(), "data:,".into()).unwrap();
        let second = controller.create(tower(), "data:,".into()).unwrap();

        assert_ne!(first, second);
        assert!(controller.get(first).is_some());
        assert!(controller.get(second).is_some());
        assert_markers_match(&controller);
    }

    #[test]
    fn test_delete_removes_record_and_marker() {
        let storage = MemoryStorage::new();
        let clock = FrozenClock::at(1_000);
        let mut controller = start(&storage, &clock);
        let keep = controller.create(tower(), "data:,".into()).unwrap();
        let gone = controller.create(tower(), "data:,".into()).unwrap();

        controller.focus(gone);
        assert!(controller.delete(gone).unwrap());

        assert_eq!(controller.landmarks().len(), 1);
        assert!(controller.get(gone).is_none());
        assert_eq!(controller.map().open_popup, None);
        assert_markers_match(&controller);

        let reloaded = start(&storage, &clock);
        assert!(reloaded.get(gone).is_none());
        assert!(reloaded.get(keep).is_some());
    }

    #[test]
    fn test_delete_unknown_id_is_ignored() {
        let mut controller = start(&MemoryStorage::new(), &FrozenClock::at(1_000));
        controller.create(tower(), "data:,".into()).unwrap();

        assert!(!controller.delete(LandmarkId(42)).unwrap());
        assert_eq!(controller.landmarks().len(), 1);
        assert_markers_match(&controller);
    }

    #[test]
    fn test_focus_recenters_and_opens_popup() {
        let mut controller = start(&MemoryStorage::new(), &FrozenClock::at(1_000));
        let id = controller.create(tower(), "data:,".into()).unwrap();

        assert!(controller.focus(id));
        assert_eq!(
            controller.map().view,
            Some((Coordinates::new(43.65, -79.38), FOCUS_ZOOM))
        );
        assert_eq!(controller.map().open_popup, Some(id));

        assert!(!controller.focus(LandmarkId(7)));
    }

    #[test]
    fn test_list_entries_truncate_preview_only() {
        let mut controller = start(&MemoryStorage::new(), &FrozenClock::at(1_000));
        let description = "A very tall tower overlooking the lake, built in 1976 for broadcasting";
        let draft = LandmarkDraft::parse("CN Tower", description, "43.6426", "-79.3871").unwrap();
        let id = controller.create(draft, "data:,".into()).unwrap();

        let entries = controller.list_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].title, "CN Tower");
        assert_eq!(entries[0].preview.chars().count(), 53);
        assert!(entries[0].preview.ends_with("..."));
        assert_eq!(controller.get(id).unwrap().description, description);
    }

    #[test]
    fn test_markers_track_every_mutation() {
        let clock = FrozenClock::at(1_000);
        let mut controller = start(&MemoryStorage::new(), &clock);

        let mut created = Vec::new();
        for step in 0..10 {
            clock.0.set(1_000 + step / 2);
            created.push(controller.create(tower(), "data:,".into()).unwrap());
            if step % 3 == 2 {
                controller.delete(created[step as usize - 1]).unwrap();
            }
            assert_markers_match(&controller);
        }
    }

    #[test]
    fn test_center_on_uses_focus_zoom() {
        let mut controller = start(&MemoryStorage::new(), &FrozenClock::at(1_000));
        controller.center_on(Coordinates::new(51.5, -0.12));
        assert_eq!(
            controller.map().view,
            Some((Coordinates::new(51.5, -0.12), FOCUS_ZOOM))
        );
    }
}
