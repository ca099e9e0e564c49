//! Storage interface for geocode records.

use async_trait::async_trait;

use crate::Error;
use crate::record::{GeocodeRecord, NewRecord};

/// Durable record of past geocode attempts, one row per normalized address.
///
/// Addresses are matched exactly; callers normalize before calling.
#[async_trait]
pub trait GeocodeStore: Send + Sync {
    /// Exact-match lookup. Does not touch the hit counter.
    async fn find_by_address(&self, address: &str) -> Result<Option<GeocodeRecord>, Error>;

    async fn find_by_id(&self, id: i64) -> Result<Option<GeocodeRecord>, Error>;

    /// Insert a new row with `hits = 1` and the current timestamps.
    ///
    /// Never updates in place. Fails with [`Error::DuplicateAddress`] when the
    /// address already has a row; callers delete the old row first.
    async fn upsert(&self, record: NewRecord) -> Result<GeocodeRecord, Error>;

    /// Atomically add one to the hit counter. Returns the affected row count.
    async fn increment_hits(&self, id: i64) -> Result<u64, Error>;

    async fn delete_by_id(&self, id: i64) -> Result<u64, Error>;

    async fn delete_by_address(&self, address: &str) -> Result<u64, Error>;
}
