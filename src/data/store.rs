//! Ordered landmark list mirrored to durable storage

use crate::data::{Landmark, LandmarkId, Result, StoreError};
use crate::storage::StorageBackend;

/// Storage key holding the JSON array of all landmarks
pub const STORAGE_KEY: &str = "landmarks";

/// In-memory landmark list with a write-through mirror.
///
/// Every mutation serializes the complete candidate list and overwrites the
/// stored value before the in-memory list changes, so a failed write leaves
/// both sides as they were.
pub struct LandmarkStore {
    landmarks: Vec<Landmark>,
    backend: Box<dyn StorageBackend>,
}

impl LandmarkStore {
    /// Rehydrate the list from `backend`. A missing key yields an empty list;
    /// malformed content fails the whole load.
    pub fn load(backend: Box<dyn StorageBackend>) -> Result<Self> {
        profiling::scope!("LandmarkStore::load");

        let landmarks = match backend.get_string(STORAGE_KEY)? {
            Some(json) => serde_json::from_str::<Vec<Landmark>>(&json)
                .map_err(StoreError::Malformed)?,
            None => Vec::new(),
        };

        tracing::info!("Loaded {} landmarks from storage", landmarks.len());
        Ok(Self { landmarks, backend })
    }

    /// All landmarks in insertion order
    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// First landmark with the given id
    pub fn get(&self, id: LandmarkId) -> Option<&Landmark> {
        self.landmarks.iter().find(|landmark| landmark.id == id)
    }

    /// Append a record and persist the whole list
    pub fn add(&mut self, landmark: Landmark) -> Result<()> {
        self.write(self.landmarks.iter().chain(std::iter::once(&landmark)))?;
        tracing::debug!("Added landmark {} ({:?})", landmark.id, landmark.title);
        self.landmarks.push(landmark);
        Ok(())
    }

    /// Remove every record with the given id and persist.
    ///
    /// Returns `false` without touching storage when no record matched.
    pub fn remove(&mut self, id: LandmarkId) -> Result<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }

        self.write(self.landmarks.iter().filter(|landmark| landmark.id != id))?;
        self.landmarks.retain(|landmark| landmark.id != id);
        tracing::debug!("Removed landmark {}", id);
        Ok(true)
    }

    /// Overwrite the stored value with the current list
    pub fn persist(&self) -> Result<()> {
        self.write(self.landmarks.iter())
    }

    fn write<'a>(&self, landmarks: impl Iterator<Item = &'a Landmark>) -> Result<()> {
        profiling::scope!("LandmarkStore::write");

        let landmarks: Vec<&Landmark> = landmarks.collect();
        let json = serde_json::to_string(&landmarks).map_err(StoreError::Serialize)?;
        self.backend.set_string(STORAGE_KEY, &json)?;
        tracing::trace!("Persisted {} landmarks ({} bytes)", landmarks.len(), json.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageError, StorageResult};

    fn landmark(id: i64, title: &str) -> Landmark {
        Landmark {
            id: LandmarkId(id),
            title: title.to_string(),
            description: format!("About {title}"),
            lat: 43.65 + id as f64 * 0.01,
            lng: -79.38,
            image: format!("data:image/png;base64,{id}AAA"),
        }
    }

    fn empty_store() -> (LandmarkStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        let store = LandmarkStore::load(Box::new(storage.clone())).unwrap();
        (store, storage)
    }

    fn reload(storage: &MemoryStorage) -> LandmarkStore {
        LandmarkStore::load(Box::new(storage.clone())).unwrap()
    }

    /// Backend whose writes always fail
    struct ReadOnlyStorage(MemoryStorage);

    impl StorageBackend for ReadOnlyStorage {
        fn set_string(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Platform("quota exceeded".to_string()))
        }

        fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
            self.0.get_string(key)
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            self.0.remove(key)
        }
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let (store, storage) = empty_store();
        assert!(store.is_empty());
        assert_eq!(storage.get_string(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_load_malformed_fails() {
        let storage = MemoryStorage::new();
        storage.set_string(STORAGE_KEY, "[{\"id\": \"oops\"}").unwrap();

        let result = LandmarkStore::load(Box::new(storage));
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[test]
    fn test_load_missing_field_fails_whole_list() {
        let storage = MemoryStorage::new();
        storage
            .set_string(
                STORAGE_KEY,
                r#"[{"id":1,"title":"a","description":"","lat":1.0,"lng":2.0,"image":""},{"id":2}]"#,
            )
            .unwrap();

        assert!(LandmarkStore::load(Box::new(storage)).is_err());
    }

    #[test]
    fn test_add_appends_and_persists() {
        let (mut store, storage) = empty_store();

        store.add(landmark(1, "first")).unwrap();
        store.add(landmark(2, "second")).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.landmarks().last().unwrap().title, "second");
        assert_eq!(reload(&storage).landmarks(), store.landmarks());
    }

    #[test]
    fn test_remove_present_and_absent() {
        let (mut store, storage) = empty_store();
        store.add(landmark(1, "first")).unwrap();
        store.add(landmark(2, "second")).unwrap();

        assert!(store.remove(LandmarkId(1)).unwrap());
        assert_eq!(store.len(), 1);
        assert!(store.get(LandmarkId(1)).is_none());

        let before = store.landmarks().to_vec();
        assert!(!store.remove(LandmarkId(42)).unwrap());
        assert_eq!(store.landmarks(), before.as_slice());

        let reloaded = reload(&storage);
        assert!(reloaded.get(LandmarkId(1)).is_none());
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_round_trip_over_mixed_sequence() {
        let (mut store, storage) = empty_store();

        for id in 1..=6 {
            store.add(landmark(id, &format!("landmark {id}"))).unwrap();
            if id % 3 == 0 {
                store.remove(LandmarkId(id - 1)).unwrap();
            }
            assert_eq!(reload(&storage).landmarks(), store.landmarks());
        }

        let ids: Vec<i64> = store.landmarks().iter().map(|l| l.id.0).collect();
        assert_eq!(ids, vec![1, 3, 4, 6]);
    }

    #[test]
    fn test_coordinates_reload_bit_exact() {
        let (mut store, storage) = empty_store();
        let mut tower = landmark(1, "tower");
        tower.lat = 43.65 + 0.05;
        tower.lng = -79.38 - 0.000_001;
        store.add(tower.clone()).unwrap();

        let reloaded = reload(&storage);
        assert_eq!(reloaded.landmarks()[0].lat.to_bits(), tower.lat.to_bits());
        assert_eq!(reloaded.landmarks()[0].lng.to_bits(), tower.lng.to_bits());
    }

    #[test]
    fn test_duplicate_ids_resolve_to_first_and_remove_all() {
        let (mut store, storage) = empty_store();
        store.add(landmark(7, "original")).unwrap();
        store.add(landmark(7, "collision")).unwrap();

        assert_eq!(store.get(LandmarkId(7)).unwrap().title, "original");

        assert!(store.remove(LandmarkId(7)).unwrap());
        assert!(store.is_empty());
        assert!(reload(&storage).is_empty());
    }

    #[test]
    fn test_failed_write_leaves_list_unchanged() {
        let inner = MemoryStorage::new();
        let mut seeded = LandmarkStore::load(Box::new(inner.clone())).unwrap();
        seeded.add(landmark(1, "kept")).unwrap();

        let mut store = LandmarkStore::load(Box::new(ReadOnlyStorage(inner.clone()))).unwrap();
        assert!(matches!(
            store.add(landmark(2, "lost")),
            Err(StoreError::Storage(_))
        ));
        assert!(store.remove(LandmarkId(1)).is_err());

        assert_eq!(store.len(), 1);
        assert_eq!(store.landmarks()[0].title, "kept");
        assert_eq!(reload(&inner).landmarks(), store.landmarks());
    }

    #[test]
    fn test_persist_overwrites_stored_value() {
        let (mut store, storage) = empty_store();
        store.add(landmark(1, "first")).unwrap();
        storage.set_string(STORAGE_KEY, "[]").unwrap();

        store.persist().unwrap();
        assert_eq!(reload(&storage).len(), 1);
    }
}
