//! In-memory geocode store.
//!
//! Thread-safe storage with the same uniqueness and hit semantics as
//! [`CacheDb`](super::CacheDb), suitable for tests and single-process embedding.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{FixedOffset, Offset, Utc};
use parking_lot::Mutex;

use super::store::GeocodeStore;
use crate::Error;
use crate::clock::{Clock, SystemClock};
use crate::record::{GeocodeRecord, NewRecord, round_coordinate};

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    rows: HashMap<i64, GeocodeRecord>,
    by_address: HashMap<String, i64>,
}

/// In-memory geocode store.
///
/// A single mutex guards rows and the address index, so the
/// check-then-insert in `upsert` and the `hits` update are atomic.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    clock: Arc<dyn Clock>,
    local_offset: FixedOffset,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { state: Mutex::new(MemoryState::default()), clock: Arc::new(SystemClock), local_offset: Utc.fix() }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_local_offset(mut self, offset: FixedOffset) -> Self {
        self.local_offset = offset;
        self
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.state.lock().rows.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.state.lock().rows.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeocodeStore for MemoryStore {
    async fn find_by_address(&self, address: &str) -> Result<Option<GeocodeRecord>, Error> {
        let state = self.state.lock();
        Ok(state.by_address.get(address).and_then(|id| state.rows.get(id)).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<GeocodeRecord>, Error> {
        Ok(self.state.lock().rows.get(&id).cloned())
    }

    async fn upsert(&self, record: NewRecord) -> Result<GeocodeRecord, Error> {
        let now = self.clock.now();
        let mut state = self.state.lock();

        if state.by_address.contains_key(&record.address) {
            return Err(Error::DuplicateAddress(record.address));
        }

        state.next_id += 1;
        let stored = GeocodeRecord {
            id: state.next_id,
            address: record.address,
            status: record.status,
            lat: round_coordinate(record.lat),
            lng: round_coordinate(record.lng),
            formatted_address: record.formatted_address,
            place_id: record.place_id,
            hits: 1,
            created_at: now.with_timezone(&self.local_offset),
            created_at_gmt: now,
        };

        state.by_address.insert(stored.address.clone(), stored.id);
        state.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn increment_hits(&self, id: i64) -> Result<u64, Error> {
        match self.state.lock().rows.get_mut(&id) {
            Some(record) => {
                record.hits += 1;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64, Error> {
        let mut state = self.state.lock();
        match state.rows.remove(&id) {
            Some(record) => {
                state.by_address.remove(&record.address);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_by_address(&self, address: &str) -> Result<u64, Error> {
        let mut state = self.state.lock();
        match state.by_address.remove(address) {
            Some(id) => {
                state.rows.remove(&id);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
