//! Client code for geocache.
//!
//! This crate provides the HTTP geocoding provider used by the server.

pub mod google;

pub use google::{ClientError, GoogleConfig, GoogleGeocoder};
