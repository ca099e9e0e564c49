//! Geocoding provider interface and response wire types.
//!
//! The response types follow the Google Geocoding API JSON body:
//! a top-level `status` string and a `results` array whose entries carry
//! `geometry.location.{lat,lng}`, `formatted_address` and `place_id`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors raised before a provider status could be read.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// The request did not complete (connection, timeout, HTTP failure).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("decode failure: {0}")]
    Decode(String),
}

impl ProviderError {
    /// The underlying message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            ProviderError::Transport(msg) | ProviderError::Decode(msg) => msg,
        }
    }
}

/// Decoded provider response body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub results: Vec<ProviderResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// One candidate match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub geometry: Geometry,
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default)]
    pub place_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// External geocoding service.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Geocode an already normalized address.
    async fn geocode(&self, address: &str, api_key: &str) -> Result<ProviderResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_ok_response() {
        let json = r#"{
            "results": [{
                "formatted_address": "1600 Amphitheatre Pkwy",
                "geometry": {"location": {"lat": 37.42, "lng": -122.08}, "location_type": "ROOFTOP"},
                "place_id": "ChIJ2eUgeAK6j4ARbn5u_wAGqWA",
                "types": ["street_address"]
            }],
            "status": "OK"
        }"#;
        let response: ProviderResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status.as_deref(), Some("OK"));
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].geometry.location, LatLng { lat: 37.42, lng: -122.08 });
        assert_eq!(response.results[0].place_id, "ChIJ2eUgeAK6j4ARbn5u_wAGqWA");
    }

    #[test]
    fn test_deserialize_error_response() {
        let json = r#"{"error_message": "The provided API key is invalid.", "results": [], "status": "REQUEST_DENIED"}"#;
        let response: ProviderResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status.as_deref(), Some("REQUEST_DENIED"));
        assert!(response.results.is_empty());
        assert_eq!(response.error_message.as_deref(), Some("The provided API key is invalid."));
    }

    #[test]
    fn test_deserialize_missing_status() {
        let response: ProviderResponse = serde_json::from_str("{}").unwrap();
        assert!(response.status.is_none());
    }

    #[test]
    fn test_provider_error_message() {
        let err = ProviderError::Transport("connection refused".into());
        assert_eq!(err.message(), "connection refused");
        assert!(err.to_string().starts_with("transport failure"));
    }
}
