//! Persistent store for geocode attempts.
//!
//! This module provides the [`GeocodeStore`] interface and two implementations:
//!
//! - [`CacheDb`], SQLite with async access via tokio-rusqlite, WAL mode and
//!   automatic schema migrations
//! - [`MemoryStore`], an in-process map for tests and embedding
//!
//! Both enforce one row per address and update hit counts atomically.

pub mod connection;
pub mod geocode;
pub mod memory;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use memory::MemoryStore;
pub use store::GeocodeStore;
