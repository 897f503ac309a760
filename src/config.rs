//! Client configuration.

use std::env;

use reqwest::Url;

use crate::error::{GalleryError, Result};

/// Default service endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default read increment for streamed downloads.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Environment variable holding the service URL.
pub const ENV_URL: &str = "ZEROGALLERY_URL";

/// Environment variable holding the access token.
pub const ENV_TOKEN: &str = "ZEROGALLERY_TOKEN";

/// Environment variable holding the download chunk size.
pub const ENV_CHUNK_SIZE: &str = "ZEROGALLERY_CHUNK_SIZE";

/// Configuration for [`GalleryClient`](crate::GalleryClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base URL, e.g. `http://localhost:5000`.
    pub base_url: String,
    /// Access token sent as `X-Access-Token`.
    pub access_token: Option<String>,
    /// User agent for every request.
    pub user_agent: String,
    /// Read increment for [`download_data`](crate::GalleryClient::download_data).
    pub chunk_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            user_agent: format!("zerogallery/{}", env!("CARGO_PKG_VERSION")),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ClientConfig {
    /// Create a config for the given base URL.
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the access token. An empty token clears it.
    pub fn with_token<S: Into<String>>(mut self, token: S) -> Self {
        let token = token.into();
        self.access_token = if token.is_empty() { None } else { Some(token) };
        self
    }

    /// Set the user agent.
    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the download chunk size (minimum 1).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Build a config from `ZEROGALLERY_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_URL).filter(|u| !u.trim().is_empty()) {
            config.base_url = url;
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            config = config.with_token(token);
        }
        if let Some(chunk_size) = lookup(ENV_CHUNK_SIZE).and_then(|s| s.trim().parse().ok()) {
            config = config.with_chunk_size(chunk_size);
        }

        config
    }

    /// Validate the base URL and return it without trailing slashes.
    pub(crate) fn normalized_base_url(&self) -> Result<String> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(GalleryError::InvalidUrl("URL cannot be empty".into()));
        }

        let url = Url::parse(trimmed).map_err(|e| GalleryError::InvalidUrl(format!("{}: {}", trimmed, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(trimmed.to_string()),
            scheme => Err(GalleryError::InvalidUrl(format!(
                "unsupported scheme '{}', URL must start with http:// or https://",
                scheme
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.access_token.is_none());
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(config.user_agent.starts_with("zerogallery/"));
    }

    #[test]
    fn test_from_lookup() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_URL, "https://gallery.example.com"),
            (ENV_TOKEN, "abc"),
            (ENV_CHUNK_SIZE, "65536"),
        ]));
        assert_eq!(config.base_url, "https://gallery.example.com");
        assert_eq!(config.access_token.as_deref(), Some("abc"));
        assert_eq!(config.chunk_size, 65536);
    }

    #[test]
    fn test_from_lookup_ignores_bad_values() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_URL, "  "),
            (ENV_TOKEN, ""),
            (ENV_CHUNK_SIZE, "lots"),
        ]));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.access_token.is_none());
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_zero_chunk_size_clamped() {
        assert_eq!(ClientConfig::default().with_chunk_size(0).chunk_size, 1);
    }

    #[test]
    fn test_normalized_base_url() {
        let config = ClientConfig::new("http://localhost:5000///");
        assert_eq!(config.normalized_base_url().unwrap(), "http://localhost:5000");
    }

    #[test]
    fn test_invalid_base_urls() {
        for url in ["", "localhost:5000/", "ftp://example.com", "not a url"] {
            let result = ClientConfig::new(url).normalized_base_url();
            assert!(
                matches!(result, Err(GalleryError::InvalidUrl(_))),
                "{} should be rejected",
                url
            );
        }
    }
}
