//! Environment-driven configuration.

use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const API_ORIGIN_VAR: &str = "STOREFRONT_API_ORIGIN";
pub const CDN_URL_VAR: &str = "STOREFRONT_CDN_URL";
pub const TIMEOUT_VAR: &str = "STOREFRONT_HTTP_TIMEOUT_SECS";

const DEFAULT_API_ORIGIN: &str = "http://localhost:3000/api/weblarek";
const DEFAULT_CDN_URL: &str = "http://localhost:3000/content/weblarek";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be an absolute http(s) URL with a host, got {value:?}")]
    InvalidUrl { key: &'static str, value: String },
    #[error("{key} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Backend base URL; `product` and `order` are joined onto it.
    pub api_origin: Url,
    /// Base that relative product image paths are joined onto.
    pub cdn_url: Url,
    pub request_timeout: Duration,
}

impl StorefrontConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source (the environment in production, a map in tests).
    ///
    /// Unset keys fall back to local development defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_origin = base_url(API_ORIGIN_VAR, lookup(API_ORIGIN_VAR), DEFAULT_API_ORIGIN)?;
        let cdn_url = base_url(CDN_URL_VAR, lookup(CDN_URL_VAR), DEFAULT_CDN_URL)?;

        let request_timeout = match lookup(TIMEOUT_VAR) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        key: TIMEOUT_VAR,
                        value,
                    });
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_origin,
            cdn_url,
            request_timeout,
        })
    }
}

/// Parse a base URL and give it a trailing slash so `Url::join` appends to it
/// instead of replacing its last segment.
fn base_url(key: &'static str, value: Option<String>, default: &str) -> Result<Url, ConfigError> {
    let raw = value.unwrap_or_else(|| {
        tracing::warn!("{key} not set; using {default}");
        default.to_string()
    });
    let invalid = || ConfigError::InvalidUrl {
        key,
        value: raw.clone(),
    };

    let mut url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none_or(str::is_empty) {
        return Err(invalid());
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = StorefrontConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_origin.as_str(), "http://localhost:3000/api/weblarek/");
        assert_eq!(config.cdn_url.as_str(), "http://localhost:3000/content/weblarek/");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn values_are_read_and_trimmed() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            (API_ORIGIN_VAR, " https://larek-api.nomoreparties.co/api/weblarek "),
            (CDN_URL_VAR, "https://larek-api.nomoreparties.co/content/weblarek/"),
            (TIMEOUT_VAR, "3"),
        ]))
        .unwrap();

        assert_eq!(
            config.api_origin.join("product").unwrap().as_str(),
            "https://larek-api.nomoreparties.co/api/weblarek/product"
        );
        assert_eq!(
            config.cdn_url.as_str(),
            "https://larek-api.nomoreparties.co/content/weblarek/"
        );
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn rejects_non_http_urls() {
        let err = StorefrontConfig::from_lookup(lookup(&[(CDN_URL_VAR, "ftp://cdn")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidUrl {
                key: CDN_URL_VAR,
                value: "ftp://cdn".to_string()
            }
        );
    }

    #[test]
    fn rejects_origin_without_a_host() {
        for bad in ["http://", "localhost:3000", "not a url"] {
            let err = StorefrontConfig::from_lookup(lookup(&[(API_ORIGIN_VAR, bad)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidUrl { key: API_ORIGIN_VAR, .. }),
                "{bad:?} was accepted"
            );
        }
    }

    #[test]
    fn rejects_zero_or_garbage_timeout() {
        for bad in ["0", "soon", "-1"] {
            let err = StorefrontConfig::from_lookup(lookup(&[(TIMEOUT_VAR, bad)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTimeout { .. }));
        }
    }
}
