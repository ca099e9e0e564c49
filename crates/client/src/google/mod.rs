//! Google Geocoding API client.
//!
//! ### API contract
//!
//! - **Endpoint**: `https://maps.googleapis.com/maps/api/geocode/json`
//! - **Request**: `GET` with `address` and `key` query parameters.
//! - **Response**: JSON body with a top-level `status` and a `results` array.
//!   API-level failures (`ZERO_RESULTS`, `REQUEST_DENIED`, ...) arrive with
//!   HTTP 200 and are passed through for the resolver to classify.
//! - **Errors**: connection failures, timeouts and non-JSON error pages map to
//!   [`ProviderError::Transport`]; a 2xx body that is not the expected JSON maps
//!   to [`ProviderError::Decode`].

pub mod error;

pub use error::ClientError;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use geocache_core::AppConfig;
use geocache_core::config::DEFAULT_PROVIDER_BASE_URL;
use geocache_core::provider::{GeocodeProvider, ProviderError, ProviderResponse};
use reqwest::header;
use url::Url;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "geocache/0.1";

/// Google geocoder configuration.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Endpoint URL (default: https://maps.googleapis.com/maps/api/geocode/json).
    pub base_url: String,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
    /// User-agent string (default: geocache/0.x).
    pub user_agent: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl GoogleConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.provider_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Google Geocoding API client.
///
/// The API key is passed per call so credential changes take effect
/// without rebuilding the client.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    http: reqwest::Client,
    base_url: Url,
    config: GoogleConfig,
}

impl GoogleGeocoder {
    /// Create a new geocoder with the given configuration.
    pub fn new(config: GoogleConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ClientError::InvalidBaseUrl(e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl(format!("unsupported scheme: {}", base_url.scheme())));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { http, base_url, config })
    }

    /// Request URLs carry the API key, so the URL is stripped from the message.
    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            return ProviderError::Transport(format!("request timed out after {:?}", self.config.timeout));
        }

        let err = err.without_url();
        match std::error::Error::source(&err) {
            Some(source) => ProviderError::Transport(format!("{err}: {source}")),
            None => ProviderError::Transport(err.to_string()),
        }
    }
}

#[async_trait]
impl GeocodeProvider for GoogleGeocoder {
    async fn geocode(&self, address: &str, api_key: &str) -> Result<ProviderResponse, ProviderError> {
        let start = Instant::now();

        tracing::debug!("geocoding address={}", address);

        let http_response = self
            .http
            .get(self.base_url.clone())
            .header(header::ACCEPT, "application/json")
            .query(&[("address", address), ("key", api_key)])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = http_response.status();
        tracing::debug!("geocoding response status: {}", status);

        let bytes = http_response.bytes().await.map_err(|e| self.transport_error(e))?;
        let http_failed = status.is_client_error() || status.is_server_error();

        let response = match serde_json::from_slice::<ProviderResponse>(&bytes) {
            Ok(response) if http_failed && response.status.is_none() => {
                return Err(ProviderError::Transport(format!("HTTP {}", status.as_u16())));
            }
            Ok(response) => response,
            Err(_) if http_failed => return Err(ProviderError::Transport(format!("HTTP {}", status.as_u16()))),
            Err(e) => return Err(ProviderError::Decode(e.to_string())),
        };

        tracing::debug!(
            "geocoding completed in {:?}, status={}, {} results",
            start.elapsed(),
            response.status.as_deref().unwrap_or("NULL"),
            response.results.len()
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder_for(server: &MockServer, timeout: Duration) -> GoogleGeocoder {
        GoogleGeocoder::new(GoogleConfig {
            base_url: format!("{}/maps/api/geocode/json", server.uri()),
            timeout,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = GoogleGeocoder::new(GoogleConfig { base_url: "not a url".into(), ..Default::default() });
        assert!(matches!(result, Err(ClientError::InvalidBaseUrl(_))));

        let result = GoogleGeocoder::new(GoogleConfig { base_url: "ftp://example.com/json".into(), ..Default::default() });
        assert!(matches!(result, Err(ClientError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_config_from_app_config() {
        let app = AppConfig { timeout_ms: 2500, user_agent: "test-agent".into(), ..Default::default() };
        let config = GoogleConfig::from_app_config(&app);
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.base_url, DEFAULT_PROVIDER_BASE_URL);
    }

    #[tokio::test]
    async fn test_ok_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .and(query_param("address", "1600 Amphitheatre Pkwy"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "results": [{
                    "geometry": { "location": { "lat": 37.4224764, "lng": -122.0842499 } },
                    "formatted_address": "1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA",
                    "place_id": "ChIJ2eUgeAK6j4ARbn5u_wAGqWA"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let geocoder = geocoder_for(&server, DEFAULT_TIMEOUT);
        let response = geocoder.geocode("1600 Amphitheatre Pkwy", "test-key").await.unwrap();

        assert_eq!(response.status.as_deref(), Some("OK"));
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].geometry.location.lat, 37.4224764);
        assert_eq!(response.results[0].place_id, "ChIJ2eUgeAK6j4ARbn5u_wAGqWA");
    }

    #[tokio::test]
    async fn test_api_status_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid.",
                "results": []
            })))
            .mount(&server)
            .await;

        let geocoder = geocoder_for(&server, DEFAULT_TIMEOUT);
        let response = geocoder.geocode("nowhere", "bad-key").await.unwrap();

        assert_eq!(response.status.as_deref(), Some("REQUEST_DENIED"));
        assert_eq!(response.error_message.as_deref(), Some("The provided API key is invalid."));
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let geocoder = geocoder_for(&server, DEFAULT_TIMEOUT);
        let err = geocoder.geocode("somewhere", "test-key").await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[tokio::test]
    async fn test_http_error_page_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&server)
            .await;

        let geocoder = geocoder_for(&server, DEFAULT_TIMEOUT);
        let err = geocoder.geocode("somewhere", "test-key").await.unwrap_err();
        assert_eq!(err, ProviderError::Transport("HTTP 503".into()));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": "OK", "results": [] }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let geocoder = geocoder_for(&server, Duration::from_millis(50));
        let err = geocoder.geocode("somewhere", "test-key").await.unwrap_err();
        assert!(matches!(&err, ProviderError::Transport(msg) if msg.contains("timed out")));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let geocoder = GoogleGeocoder::new(GoogleConfig {
            base_url: "http://127.0.0.1:1/maps/api/geocode/json".into(),
            timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap();

        let err = geocoder.geocode("somewhere", "SECRET-KEY-123").await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
        assert!(!err.message().contains("SECRET-KEY-123"), "key leaked: {}", err.message());
        assert!(!err.message().contains("127.0.0.1:1/maps"));
    }

    #[tokio::test]
    async fn test_dropped_body_hides_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-length", "4096")
                    .set_body_string("{\"status\":"),
            )
            .mount(&server)
            .await;

        let geocoder = geocoder_for(&server, Duration::from_secs(2));
        let err = geocoder.geocode("somewhere", "SECRET-KEY-123").await.unwrap_err();
        assert!(!err.message().contains("SECRET-KEY-123"), "key leaked: {}", err.message());
    }
}
