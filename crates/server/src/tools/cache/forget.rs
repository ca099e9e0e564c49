//! cache_forget tool implementation.
//!
//! Deletes the stored record for an address.

use geocache_core::{Error, Resolver};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the cache_forget tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheForgetParams {
    /// The address whose record should be removed.
    pub address: String,
}

/// Output from the cache_forget tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheForgetOutput {
    /// Number of records deleted.
    pub deleted: u64,
}

/// Implementation of the cache_forget tool.
pub async fn forget_impl(resolver: &Resolver, params: CacheForgetParams) -> Result<CallToolResult, McpError> {
    let deleted = resolver.forget(&params.address).await?;

    let output = CacheForgetOutput { deleted };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{ok_response, parse_output, resolver_with};

    #[tokio::test]
    async fn test_forget_then_refetch() {
        let (resolver, provider) = resolver_with(Ok(ok_response()));
        resolver.geocode("1600 Amphitheatre Pkwy").await.unwrap();

        let params = CacheForgetParams { address: "1600 Amphitheatre Pkwy ".to_string() };
        let result = forget_impl(&resolver, params.clone()).await.unwrap();
        let output: CacheForgetOutput = parse_output(&result);
        assert_eq!(output.deleted, 1);

        let result = forget_impl(&resolver, params).await.unwrap();
        let output: CacheForgetOutput = parse_output(&result);
        assert_eq!(output.deleted, 0);

        resolver.geocode("1600 Amphitheatre Pkwy").await.unwrap();
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_forget_empty_address() {
        let (resolver, _) = resolver_with(Ok(ok_response()));
        let params = CacheForgetParams { address: " ".to_string() };

        let err = forget_impl(&resolver, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
