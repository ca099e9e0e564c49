//! API credential lookup for the geocoding provider.

use crate::config::AppConfig;

/// Configuration identifier under which the provider API key is stored.
pub const API_KEY_SETTING: &str = "google_geocoding_api_key";

/// Supplies the provider API key.
///
/// `None` or a blank key means no credential is configured.
pub trait CredentialSource: Send + Sync {
    fn api_key(&self) -> Option<String>;
}

impl CredentialSource for AppConfig {
    fn api_key(&self) -> Option<String> {
        self.google_geocoding_api_key.clone()
    }
}

/// A fixed key, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential(Option<String>);

impl StaticCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Some(key.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl CredentialSource for StaticCredential {
    fn api_key(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Resolve a usable key from a source, dropping blank values.
pub(crate) fn usable_key(source: &dyn CredentialSource) -> Option<String> {
    source.api_key().filter(|key| !key.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_credential() {
        assert_eq!(StaticCredential::new("abc").api_key().as_deref(), Some("abc"));
        assert!(StaticCredential::none().api_key().is_none());
    }

    #[test]
    fn test_usable_key_rejects_blank() {
        assert!(usable_key(&StaticCredential::new("   ")).is_none());
        assert!(usable_key(&StaticCredential::none()).is_none());
        assert_eq!(usable_key(&StaticCredential::new("k")).as_deref(), Some("k"));
    }

    #[test]
    fn test_blank_config_key_is_missing_everywhere() {
        for key in ["", "  ", "\t\n"] {
            let config = AppConfig { google_geocoding_api_key: Some(key.into()), ..Default::default() };
            assert!(config.validate().is_ok());
            assert!(config.require_api_key().is_err());
            assert!(usable_key(&config).is_none());
        }
    }

    #[test]
    fn test_app_config_credential() {
        let config = AppConfig { google_geocoding_api_key: Some("from-config".into()), ..Default::default() };
        assert_eq!(config.api_key().as_deref(), Some("from-config"));
        assert!(AppConfig::default().api_key().is_none());
    }
}
