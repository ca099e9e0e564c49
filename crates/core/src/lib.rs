//! Core types and shared functionality for geocache.
//!
//! This crate provides:
//! - Geocode record store with SQLite and in-memory backends
//! - Cache-aware resolver with a retry window for failed lookups
//! - Provider, credential and clock interfaces
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod error;
pub mod provider;
pub mod record;
pub mod resolver;

pub use cache::{CacheDb, GeocodeStore, MemoryStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use credentials::{CredentialSource, StaticCredential};
pub use error::Error;
pub use provider::{GeocodeProvider, ProviderError, ProviderResponse};
pub use record::{FailureCode, GeocodeRecord, Location, NewRecord, Outcome};
pub use resolver::{CacheState, GeocodeOutcome, GeocodeResult, Resolver, Unavailable, normalize_address};
