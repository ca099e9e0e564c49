//! Google geocoder construction errors.

/// Errors raised while building a [`GoogleGeocoder`](super::GoogleGeocoder).
///
/// Request-time failures are reported as
/// [`ProviderError`](geocache_core::ProviderError) instead.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Base URL is not an absolute http(s) URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::InvalidBaseUrl("relative URL without a base".to_string());
        assert!(err.to_string().contains("invalid base URL"));
    }
}
