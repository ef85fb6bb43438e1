//! Mutex-guarded earthquake record store.
//!
//! A background feed thread may mutate the collection while the UI
//! thread drives recomputes. The lock covers only the mutation or the
//! snapshot clone, never a recompute pass, so painting and interaction
//! are not blocked behind network I/O.
//!
//! Record order is insertion order and is part of the engine's
//! determinism contract (spatial-query tie-breaking); upserts replace
//! in place and removals preserve the order of the rest.

use std::collections::HashMap;
use std::sync::Mutex;

use super::record::EarthquakeRecord;

#[derive(Default)]
struct Store {
    records: Vec<EarthquakeRecord>,
    index: HashMap<String, usize>,
}

/// The shared earthquake record collection.
#[derive(Default)]
pub struct EventCatalog {
    inner: Mutex<Store>,
}

impl EventCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, or replaces the existing record with the same
    /// identifier. Returns `false` when the record is dropped because
    /// its coordinates cannot be sanitized.
    pub fn upsert(&self, record: EarthquakeRecord) -> bool {
        let Some(record) = record.sanitized() else {
            log::warn!("dropping record with unusable coordinates");
            return false;
        };

        let mut guard = self.lock();
        let store = &mut *guard;
        match store.index.get(&record.id) {
            Some(&i) => store.records[i] = record,
            None => {
                let i = store.records.len();
                store.index.insert(record.id.clone(), i);
                store.records.push(record);
            }
        }
        true
    }

    /// Upserts a batch, returning how many records were stored.
    pub fn upsert_batch(&self, records: impl IntoIterator<Item = EarthquakeRecord>) -> usize {
        let mut stored = 0;
        for record in records {
            if self.upsert(record) {
                stored += 1;
            }
        }
        log::debug!("catalog batch stored {stored} records");
        stored
    }

    /// Removes a record by identifier. Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        let mut store = self.lock();
        let Some(i) = store.index.remove(id) else {
            return false;
        };
        store.records.remove(i);
        // Later records shifted down by one.
        for (_, slot) in store.index.iter_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        true
    }

    pub fn clear(&self) {
        let mut store = self.lock();
        store.records.clear();
        store.index.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<EarthquakeRecord> {
        let store = self.lock();
        store.index.get(id).map(|&i| store.records[i].clone())
    }

    /// Clones the current record set. Recomputes run off this snapshot
    /// so the lock is never held across a derivation pass.
    pub fn snapshot(&self) -> Vec<EarthquakeRecord> {
        self.lock().records.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        // A poisoned lock only means another thread panicked mid-write;
        // the store itself is still structurally sound.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, magnitude: f64) -> EarthquakeRecord {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        EarthquakeRecord::new(id, 10.0, 20.0, magnitude, 5.0, ts, "test")
    }

    #[test]
    fn upsert_replaces_by_id() {
        let catalog = EventCatalog::new();
        assert!(catalog.upsert(record("a", 4.0)));
        assert!(catalog.upsert(record("b", 5.0)));
        assert!(catalog.upsert(record("a", 6.1)));

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("a").unwrap().magnitude, 6.1);
        // Replacement keeps the original position.
        assert_eq!(catalog.snapshot()[0].id, "a");
    }

    #[test]
    fn remove_keeps_order_and_index() {
        let catalog = EventCatalog::new();
        for id in ["a", "b", "c"] {
            catalog.upsert(record(id, 3.0));
        }
        assert!(catalog.remove("b"));
        assert!(!catalog.remove("b"));

        let ids: Vec<_> = catalog.snapshot().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(catalog.get("c").unwrap().id, "c");
    }

    #[test]
    fn bad_records_are_dropped_not_fatal() {
        let catalog = EventCatalog::new();
        let mut bad = record("bad", 5.0);
        bad.latitude = f64::NAN;

        let stored = catalog.upsert_batch([bad, record("good", 4.2)]);
        assert_eq!(stored, 1);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("good").is_some());
    }

    #[test]
    fn clear_empties_everything() {
        let catalog = EventCatalog::new();
        catalog.upsert(record("a", 3.0));
        catalog.clear();
        assert!(catalog.is_empty());
        assert!(catalog.get("a").is_none());
    }
}
