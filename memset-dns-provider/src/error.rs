use serde::{Deserialize, Serialize};

/// Unified error type for all Memset API calls.
///
/// Each variant carries the API method that produced it (e.g. `dns.zone_list`)
/// plus variant-specific context. All variants are serializable for structured
/// error reporting.
///
/// # Classification
///
/// - [`NetworkError`](Self::NetworkError) and [`Timeout`](Self::Timeout) are
///   transport failures: the request may never have reached the API.
/// - [`ClientError`](Self::ClientError) covers 4xx answers (400/403/404/412):
///   the caller sent something the API refused.
/// - [`ServerError`](Self::ServerError) covers 5xx answers (500/503): the API
///   itself is unhappy and the body may be absent.
///
/// The client never retries; callers decide what to do with each class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// API method being invoked.
        method: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// API method being invoked.
        method: String,
        /// Error details.
        detail: String,
    },

    /// The API rejected the request (HTTP 4xx).
    ClientError {
        /// API method being invoked.
        method: String,
        /// HTTP status code returned by the API.
        status: u16,
        /// Error message extracted from the response body, if any.
        raw_message: Option<String>,
    },

    /// The API failed to process the request (HTTP 5xx).
    ServerError {
        /// API method being invoked.
        method: String,
        /// HTTP status code returned by the API.
        status: u16,
        /// Error message extracted from the response body, if any.
        raw_message: Option<String>,
    },

    /// Failed to parse the API response.
    ParseError {
        /// API method being invoked.
        method: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// The client configuration is unusable (missing API key, bad base URL, ...).
    InvalidConfig {
        /// Name of the offending setting.
        field: String,
        /// Description of what's wrong.
        detail: String,
    },
}

impl ProviderError {
    /// 是否为预期行为（用户输入、配置错误等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::ClientError { .. } | Self::InvalidConfig { .. }
        )
    }

    /// Whether the request failed below HTTP (connection failure or timeout).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::NetworkError { .. } | Self::Timeout { .. })
    }

    /// HTTP status code returned by the API, when one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ClientError { status, .. } | Self::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { method, detail } => {
                write!(f, "[{method}] Network error: {detail}")
            }
            Self::Timeout { method, detail } => {
                write!(f, "[{method}] Request timeout: {detail}")
            }
            Self::ClientError {
                method,
                status,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{method}] Request rejected (HTTP {status}): {msg}")
                } else {
                    write!(f, "[{method}] Request rejected (HTTP {status})")
                }
            }
            Self::ServerError {
                method,
                status,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{method}] Internal server error (HTTP {status}): {msg}")
                } else {
                    write!(f, "[{method}] Internal server error (HTTP {status})")
                }
            }
            Self::ParseError { method, detail } => {
                write!(f, "[{method}] Parse error: {detail}")
            }
            Self::InvalidConfig { field, detail } => {
                write!(f, "Invalid configuration '{field}': {detail}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;
