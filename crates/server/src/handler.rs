//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{CacheForgetParams, CacheLookupParams, forget_impl, lookup_impl};
use crate::tools::geocode::{GeocodeParams, geocode_impl};

use geocache_core::Resolver;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for geocache.
#[derive(Clone)]
pub struct GeocacheServer {
    resolver: Arc<Resolver>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl GeocacheServer {
    /// Create a new server handler.
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver: Arc::new(resolver), tool_router: Self::tool_router() }
    }

    /// Geocode a free-form address.
    ///
    /// Served from the cache when possible. Failed lookups are remembered and
    /// not retried until the retry window has passed.
    #[tool(
        description = "Geocode an address to latitude/longitude. Returns status \"found\" with coordinates or \"unavailable\" with the failure code."
    )]
    async fn geocode(&self, params: Parameters<GeocodeParams>) -> Result<CallToolResult, McpError> {
        geocode_impl(&self.resolver, params.0).await
    }

    #[tool(description = "Read the cached geocode record for an address without calling the provider.")]
    async fn cache_lookup(&self, params: Parameters<CacheLookupParams>) -> Result<CallToolResult, McpError> {
        lookup_impl(&self.resolver, params.0).await
    }

    #[tool(description = "Delete the cached geocode record for an address so the next lookup asks the provider.")]
    async fn cache_forget(&self, params: Parameters<CacheForgetParams>) -> Result<CallToolResult, McpError> {
        forget_impl(&self.resolver, params.0).await
    }
}

impl ServerHandler for GeocacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "geocache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::resolver_with;
    use geocache_core::ProviderResponse;

    #[test]
    fn test_tools_registered() {
        let (resolver, _) = resolver_with(Ok(ProviderResponse::default()));
        let server = GeocacheServer::new(resolver);

        let names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        assert!(names.contains(&"geocode".to_string()));
        assert!(names.contains(&"cache_lookup".to_string()));
        assert!(names.contains(&"cache_forget".to_string()));
    }

    #[test]
    fn test_server_info() {
        let (resolver, _) = resolver_with(Ok(ProviderResponse::default()));
        let info = GeocacheServer::new(resolver).get_info();
        assert_eq!(info.server_info.name, "geocache");
    }
}
