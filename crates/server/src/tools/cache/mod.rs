//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and evicting geocode records.

pub mod forget;
pub mod lookup;

pub use forget::{CacheForgetParams, forget_impl};
pub use lookup::{CacheLookupParams, lookup_impl};
