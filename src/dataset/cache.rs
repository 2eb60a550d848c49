//! In-memory dataset cache
//!
//! Many readers, one writer. Writers replace whole `Arc<Dataset>` entries;
//! nothing is edited in place, so a snapshot taken by `get` stays valid for
//! as long as the caller holds it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use super::dataset::Dataset;
use super::errors::{DatasetError, DatasetResult};
use super::kind::DatasetKind;

/// Listing entry for a registered dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub id: String,
    pub kind: DatasetKind,
    #[serde(rename = "numRows")]
    pub num_rows: usize,
}

/// Registry of loaded datasets keyed by id
#[derive(Debug, Default)]
pub struct DatasetCache {
    datasets: RwLock<HashMap<String, Arc<Dataset>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a dataset. Fails if the id is already taken.
    pub fn insert(&self, dataset: Dataset) -> DatasetResult<Arc<Dataset>> {
        let mut datasets = self.write();
        if datasets.contains_key(dataset.id()) {
            return Err(DatasetError::AlreadyExists(dataset.id().to_string()));
        }
        let dataset = Arc::new(dataset);
        datasets.insert(dataset.id().to_string(), Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Returns a read-only snapshot of the dataset
    pub fn get(&self, id: &str) -> Option<Arc<Dataset>> {
        self.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    /// Evicts a dataset, returning the evicted snapshot
    pub fn remove(&self, id: &str) -> DatasetResult<Arc<Dataset>> {
        self.write()
            .remove(id)
            .ok_or_else(|| DatasetError::NotFound(id.to_string()))
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Summaries of every registered dataset, sorted by id
    pub fn summaries(&self) -> Vec<DatasetSummary> {
        let mut summaries: Vec<DatasetSummary> = self
            .read()
            .values()
            .map(|ds| DatasetSummary {
                id: ds.id().to_string(),
                kind: ds.kind(),
                num_rows: ds.len(),
            })
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A poisoned lock only means a writer panicked between two whole-entry
    // swaps; the map itself is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Dataset>>> {
        self.datasets.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Dataset>>> {
        self.datasets.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty(id: &str, kind: DatasetKind) -> Dataset {
        Dataset::new(id, kind, Vec::new()).unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let cache = DatasetCache::new();
        cache.insert(empty("courses", DatasetKind::Courses)).unwrap();

        assert!(cache.contains("courses"));
        assert_eq!(cache.get("courses").unwrap().kind(), DatasetKind::Courses);
        assert!(cache.get("rooms").is_none());
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let cache = DatasetCache::new();
        cache.insert(empty("courses", DatasetKind::Courses)).unwrap();
        let err = cache.insert(empty("courses", DatasetKind::Rooms)).unwrap_err();
        assert_eq!(err, DatasetError::AlreadyExists("courses".into()));
        assert_eq!(cache.get("courses").unwrap().kind(), DatasetKind::Courses);
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let cache = DatasetCache::new();
        let err = cache.remove("courses").unwrap_err();
        assert_eq!(err, DatasetError::NotFound("courses".into()));
    }

    #[test]
    fn test_snapshot_survives_removal() {
        let cache = DatasetCache::new();
        cache.insert(empty("rooms", DatasetKind::Rooms)).unwrap();

        let snapshot = cache.get("rooms").unwrap();
        cache.remove("rooms").unwrap();

        assert!(!cache.contains("rooms"));
        assert_eq!(snapshot.id(), "rooms");
    }

    #[test]
    fn test_summaries_sorted() {
        let cache = DatasetCache::new();
        cache.insert(empty("rooms", DatasetKind::Rooms)).unwrap();
        cache.insert(empty("courses", DatasetKind::Courses)).unwrap();

        assert_eq!(cache.ids(), vec!["courses", "rooms"]);
        let summaries = cache.summaries();
        assert_eq!(summaries[0].id, "courses");
        assert_eq!(summaries[1].kind, DatasetKind::Rooms);
        assert_eq!(summaries[1].num_rows, 0);
    }

    #[test]
    fn test_summary_serializes_num_rows() {
        let summary = DatasetSummary {
            id: "courses".into(),
            kind: DatasetKind::Courses,
            num_rows: 3,
        };
        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            serde_json::json!({"id": "courses", "kind": "courses", "numRows": 3})
        );
    }
}
