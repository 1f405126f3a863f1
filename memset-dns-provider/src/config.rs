//! Client configuration

use std::fmt;
use std::time::Duration;

use crate::error::{ProviderError, Result};
use crate::types::ApiMethod;
use crate::utils::log_sanitizer::mask_secret;

/// 默认 API 地址
pub const DEFAULT_BASE_URL: &str = "https://api.memset.com/v1/json";
/// 默认连接超时（秒）
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "MEMSET_API_KEY";
/// Environment variable overriding the API base URL.
pub const ENV_API_URL: &str = "MEMSET_API_URL";

/// Connection settings for [`MemsetClient`](crate::MemsetClient).
///
/// `Debug` output redacts the API key.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL; method names are appended as path segments.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Configuration with default endpoint and timeouts.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Override the base URL (trailing slashes are ignored).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Read `MEMSET_API_KEY` and the optional `MEMSET_API_URL` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY).unwrap_or_default();
        let mut config = Self::new(api_key);
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(url);
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a working client.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::InvalidConfig {
                field: "api_key".to_string(),
                detail: format!("must not be empty (set {ENV_API_KEY})"),
            });
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ProviderError::InvalidConfig {
                field: "base_url".to_string(),
                detail: format!("'{}' is not an http(s) URL", self.base_url),
            });
        }
        Ok(())
    }

    /// Full request URL for a method, e.g. `.../v1/json/dns.zone_list/`.
    pub fn method_url(&self, method: ApiMethod) -> String {
        format!("{}/{}/", self.base_url.trim_end_matches('/'), method.as_str())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &mask_secret(&self.api_key))
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
