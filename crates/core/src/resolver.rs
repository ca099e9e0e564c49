//! Cache-aware geocoding.
//!
//! [`Resolver::geocode`] decides whether a stored record can answer a request,
//! calls the provider when it cannot, and writes the outcome back.
//!
//! Per address the cache moves through three states:
//!
//! - no record: the provider is called and a success or failure row is written
//! - success: served from cache until the row is deleted externally
//! - failure: served as unavailable until it is older than the retry window,
//!   then deleted and retried on the next request
//!
//! Two concurrent first-time requests for one address may both reach the
//! provider. The store's unique address constraint lets only one insert win;
//! the loser re-reads the winning row.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Error;
use crate::cache::GeocodeStore;
use crate::clock::{Clock, SystemClock};
use crate::credentials::{CredentialSource, usable_key};
use crate::provider::{GeocodeProvider, ProviderError, ProviderResponse};
use crate::record::{FailureCode, GeocodeRecord, Location, NewRecord, SUCCESS_STATUS};

/// Hours a failed lookup is trusted before the provider is asked again.
pub const DEFAULT_RETRY_WINDOW_HOURS: i64 = 24;

/// Trim and collapse every whitespace run to a single space.
pub fn normalize_address(address: &str) -> String {
    address.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Where a returned result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// Served from an existing record.
    Cached,
    /// Fetched from the provider and written to the cache.
    Added,
    /// Fetched from the provider, but the cache write failed.
    Error,
}

impl CacheState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheState::Cached => "cached",
            CacheState::Added => "added",
            CacheState::Error => "error",
        }
    }
}

/// A successful geocode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
    pub place_id: String,
    pub cached: CacheState,
    /// Creation time of the backing record; `None` when nothing was cached.
    pub cache_time: Option<DateTime<FixedOffset>>,
}

impl GeocodeResult {
    fn from_location(location: Location, cached: CacheState, cache_time: Option<DateTime<FixedOffset>>) -> Self {
        Self {
            lat: location.lat,
            lng: location.lng,
            formatted_address: location.formatted_address,
            place_id: location.place_id,
            cached,
            cache_time,
        }
    }

    fn from_record(record: GeocodeRecord, cached: CacheState) -> Self {
        Self {
            lat: record.lat,
            lng: record.lng,
            formatted_address: record.formatted_address,
            place_id: record.place_id,
            cached,
            cache_time: Some(record.created_at),
        }
    }
}

/// Why no coordinates are available.
#[derive(Debug, Clone, PartialEq)]
pub enum Unavailable {
    /// A recent failure is cached; the provider is not asked again before `retry_at`.
    RetryWindowActive { code: FailureCode, retry_at: DateTime<Utc> },
    /// The provider call just failed. `cached` is false if recording the failure failed too.
    Failed { code: FailureCode, message: String, cached: bool },
}

impl Unavailable {
    pub fn code(&self) -> &FailureCode {
        match self {
            Unavailable::RetryWindowActive { code, .. } | Unavailable::Failed { code, .. } => code,
        }
    }
}

/// Result of [`Resolver::geocode`].
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Found(GeocodeResult),
    Unavailable(Unavailable),
}

impl GeocodeOutcome {
    pub fn result(&self) -> Option<&GeocodeResult> {
        match self {
            GeocodeOutcome::Found(result) => Some(result),
            GeocodeOutcome::Unavailable(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, GeocodeOutcome::Found(_))
    }
}

/// Geocoder backed by a persistent cache.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn GeocodeStore>,
    provider: Arc<dyn GeocodeProvider>,
    credentials: Arc<dyn CredentialSource>,
    clock: Arc<dyn Clock>,
    retry_window: Duration,
}

impl Resolver {
    pub fn new(
        store: Arc<dyn GeocodeStore>, provider: Arc<dyn GeocodeProvider>, credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            store,
            provider,
            credentials,
            clock: Arc::new(SystemClock),
            retry_window: Duration::hours(DEFAULT_RETRY_WINDOW_HOURS),
        }
    }

    /// Time source used for retry-window decisions.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_retry_window(mut self, window: Duration) -> Self {
        self.retry_window = window;
        self
    }

    /// Geocode a free-form address, consulting the cache first.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyAddress`] if the address is blank; the store is not touched.
    /// - [`Error::MissingCredential`] if the provider must be called and no key
    ///   is configured; nothing is written.
    ///
    /// Provider and store failures are reported through the returned outcome.
    pub async fn geocode(&self, address: &str) -> Result<GeocodeOutcome, Error> {
        let address = normalize_address(address);
        if address.is_empty() {
            return Err(Error::EmptyAddress);
        }

        if let Some(record) = self.cached(&address).await {
            if record.is_success() {
                return Ok(GeocodeOutcome::Found(self.serve_hit(record).await));
            }

            let age = record.age(self.clock.now());
            if age < self.retry_window {
                debug!(address = %address, status = %record.status, age_minutes = age.num_minutes(), "failure cached, retry window active");
                return Ok(GeocodeOutcome::Unavailable(Unavailable::RetryWindowActive {
                    code: FailureCode::parse(&record.status),
                    retry_at: record.created_at_gmt + self.retry_window,
                }));
            }

            debug!(address = %address, id = record.id, "retry window elapsed, evicting failure");
            if let Err(e) = self.store.delete_by_id(record.id).await {
                warn!(address = %address, id = record.id, error = %e, "failed to evict stale failure");
            }
        }

        let api_key = usable_key(self.credentials.as_ref()).ok_or(Error::MissingCredential)?;

        debug!(address = %address, "cache miss, calling provider");
        match self.provider.geocode(&address, &api_key).await {
            Ok(response) => match classify(response) {
                Ok(location) => Ok(self.store_success(address, location).await),
                Err((code, message)) => Ok(self.store_failure(address, code, message).await),
            },
            Err(e) => {
                let code = match &e {
                    ProviderError::Transport(_) => FailureCode::Transport,
                    ProviderError::Decode(_) => FailureCode::Decode,
                };
                let message = e.message().replace(api_key.as_str(), "[redacted]");
                Ok(self.store_failure(address, code, message).await)
            }
        }
    }

    /// Read the cached record for an address without calling the provider.
    ///
    /// When `record_hit` is set, a found record's hit counter is incremented.
    pub async fn lookup(&self, address: &str, record_hit: bool) -> Result<Option<GeocodeRecord>, Error> {
        let address = normalize_address(address);
        if address.is_empty() {
            return Err(Error::EmptyAddress);
        }

        let record = self.store.find_by_address(&address).await?;
        if record_hit && let Some(record) = &record {
            self.store.increment_hits(record.id).await?;
        }
        Ok(record)
    }

    /// Remove the cached record for an address. Returns the number of rows removed.
    pub async fn forget(&self, address: &str) -> Result<u64, Error> {
        let address = normalize_address(address);
        if address.is_empty() {
            return Err(Error::EmptyAddress);
        }
        self.store.delete_by_address(&address).await
    }

    /// Store lookup that degrades a read failure to a miss.
    async fn cached(&self, address: &str) -> Option<GeocodeRecord> {
        match self.store.find_by_address(address).await {
            Ok(record) => record,
            Err(e) => {
                warn!(address = %address, error = %e, "cache lookup failed, treating as miss");
                None
            }
        }
    }

    async fn serve_hit(&self, record: GeocodeRecord) -> GeocodeResult {
        if let Err(e) = self.store.increment_hits(record.id).await {
            warn!(id = record.id, error = %e, "failed to record cache hit");
        }
        debug!(address = %record.address, id = record.id, "cache hit");
        GeocodeResult::from_record(record, CacheState::Cached)
    }

    async fn store_success(&self, address: String, location: Location) -> GeocodeOutcome {
        let result = match self.store.upsert(NewRecord::success(address.as_str(), &location)).await {
            Ok(record) => GeocodeResult::from_record(record, CacheState::Added),
            Err(Error::DuplicateAddress(_)) => match self.store.find_by_address(&address).await {
                Ok(Some(winner)) if winner.is_success() => {
                    debug!(address = %address, id = winner.id, "lost insert race, serving existing record");
                    self.serve_hit(winner).await
                }
                _ => GeocodeResult::from_location(location, CacheState::Error, None),
            },
            Err(e) => {
                warn!(address = %address, error = %e, "failed to cache geocode result");
                GeocodeResult::from_location(location, CacheState::Error, None)
            }
        };
        GeocodeOutcome::Found(result)
    }

    async fn store_failure(&self, address: String, code: FailureCode, message: String) -> GeocodeOutcome {
        debug!(address = %address, code = %code, message = %message, "provider lookup failed");
        let cached = match self.store.upsert(NewRecord::failure(address.as_str(), &code, message.as_str())).await {
            Ok(_) => true,
            Err(e) => {
                warn!(address = %address, error = %e, "failed to cache geocode failure");
                false
            }
        };
        GeocodeOutcome::Unavailable(Unavailable::Failed { code, message, cached })
    }
}

/// Turn a decoded provider body into a location or a failure code and message.
fn classify(response: ProviderResponse) -> Result<Location, (FailureCode, String)> {
    let status = response.status.as_deref().filter(|s| !s.is_empty());
    if status != Some(SUCCESS_STATUS) {
        let mut message = format!("API Status Invalid: {}", status.unwrap_or("NULL"));
        if let Some(detail) = response.error_message.as_deref() {
            message.push_str(" (");
            message.push_str(detail);
            message.push(')');
        }
        return Err((FailureCode::api(status), message));
    }

    let first = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| (FailureCode::Decode, "API returned no results".to_string()))?;

    Ok(Location {
        lat: first.geometry.location.lat,
        lng: first.geometry.location.lng,
        formatted_address: first.formatted_address,
        place_id: first.place_id,
    })
}
