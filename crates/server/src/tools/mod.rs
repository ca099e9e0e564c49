//! MCP tool implementations.
//!
//! This module contains all tools exposed by the geocache server.
#![allow(unused_imports)]

pub mod cache;
pub mod geocode;

pub use geocode::{GeocodeOutput, GeocodeParams};
