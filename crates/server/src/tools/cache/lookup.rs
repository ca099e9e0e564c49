//! cache_lookup tool implementation.
//!
//! Reads the stored record for an address without calling the provider.

use geocache_core::{Error, GeocodeRecord, Resolver};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the cache_lookup tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheLookupParams {
    /// The address to look up. Whitespace is normalized first.
    pub address: String,

    /// Count this read as a cache hit.
    #[serde(default)]
    pub record_hit: bool,
}

/// Output from the cache_lookup tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheLookupOutput {
    /// The stored record, if any.
    pub record: Option<GeocodeRecord>,
}

/// Implementation of the cache_lookup tool.
pub async fn lookup_impl(resolver: &Resolver, params: CacheLookupParams) -> Result<CallToolResult, McpError> {
    let record = resolver.lookup(&params.address, params.record_hit).await?;

    let output = CacheLookupOutput { record };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize record: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
