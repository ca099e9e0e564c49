//! geocode tool implementation.
//!
//! Resolves an address through the cache-aware resolver.

use geocache_core::{Error, GeocodeOutcome, Resolver, Unavailable};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the geocode tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeocodeParams {
    /// Free-form postal address. Whitespace is normalized before lookup.
    pub address: String,
}

/// Output from the geocode tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GeocodeOutput {
    Found {
        lat: f64,
        lng: f64,
        formatted_address: String,
        place_id: String,
        /// `cached`, `added` or `error`.
        cached: String,
        /// RFC 3339 creation time of the backing record.
        cache_time: Option<String>,
    },
    Unavailable {
        /// `retry_window` for a remembered failure, `failed` for a fresh one.
        reason: String,
        /// Stored status code, e.g. `api:ZERO_RESULTS` or `transport_failed`.
        code: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        /// Earliest time the provider will be asked again.
        #[serde(skip_serializing_if = "Option::is_none")]
        retry_at: Option<String>,
    },
}

impl From<GeocodeOutcome> for GeocodeOutput {
    fn from(outcome: GeocodeOutcome) -> Self {
        match outcome {
            GeocodeOutcome::Found(result) => GeocodeOutput::Found {
                lat: result.lat,
                lng: result.lng,
                formatted_address: result.formatted_address,
                place_id: result.place_id,
                cached: result.cached.as_str().to_string(),
                cache_time: result.cache_time.map(|t| t.to_rfc3339()),
            },
            GeocodeOutcome::Unavailable(Unavailable::RetryWindowActive { code, retry_at }) => {
                GeocodeOutput::Unavailable {
                    reason: "retry_window".to_string(),
                    code: code.to_string(),
                    message: None,
                    retry_at: Some(retry_at.to_rfc3339()),
                }
            }
            GeocodeOutcome::Unavailable(Unavailable::Failed { code, message, .. }) => GeocodeOutput::Unavailable {
                reason: "failed".to_string(),
                code: code.to_string(),
                message: Some(message),
                retry_at: None,
            },
        }
    }
}

/// Implementation of the geocode tool.
pub async fn geocode_impl(resolver: &Resolver, params: GeocodeParams) -> Result<CallToolResult, McpError> {
    let outcome = resolver.geocode(&params.address).await?;

    let output = GeocodeOutput::from(outcome);
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
