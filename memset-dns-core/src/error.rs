//! Unified error type definition

use memset_dns_provider::Payload;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

// Re-export library error type
pub use memset_dns_provider::ProviderError;

/// Failure classes reported in a [`ReconcileResult`](crate::types::ReconcileResult).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Desired state rejected before any remote call.
    Validation,
    /// A parent resource is missing or not unique.
    DependencyUnresolved,
    /// The target name matches more than one resource.
    Ambiguous,
    /// Zone deletion refused because it still owns domains or records.
    NonEmptyResource,
    /// Connection failure or timeout.
    Transport,
    /// The API refused the request (4xx).
    ClientError,
    /// The API failed to process the request (5xx).
    ServerError,
    /// An accepted asynchronous job finished with an error.
    RemoteJobError,
    /// The API answered with a body that could not be decoded.
    Parse,
}

impl ErrorKind {
    /// Classify a transport-level error.
    #[must_use]
    pub fn of_provider(err: &ProviderError) -> Self {
        match err {
            ProviderError::NetworkError { .. } | ProviderError::Timeout { .. } => Self::Transport,
            ProviderError::ClientError { .. } => Self::ClientError,
            ProviderError::ServerError { .. } => Self::ServerError,
            ProviderError::ParseError { .. } => Self::Parse,
            ProviderError::InvalidConfig { .. } => Self::Validation,
        }
    }
}

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Validation error
    #[error("Validation error: {field}: {detail}")]
    Validation { field: String, detail: String },

    /// 父资源不存在或不唯一
    #[error("Cannot resolve {resource} '{name}': {reason}")]
    DependencyUnresolved {
        resource: String,
        name: String,
        reason: String,
    },

    /// 名称匹配到多个资源
    #[error("{resource} '{name}' matches {count} resources")]
    Ambiguous {
        resource: String,
        name: String,
        count: usize,
    },

    /// Zone 仍包含 domain 或 record
    #[error(
        "Zone '{nickname}' contains {domains} domain(s) and {records} record(s) and force was not used"
    )]
    NonEmptyResource {
        nickname: String,
        domains: usize,
        records: usize,
    },

    /// A mutating call failed after the calls in `completed` already succeeded.
    #[error(
        "{source} (target '{target}'{}, {} earlier change(s) already applied)",
        candidate_note(.candidate.as_deref()),
        .completed.len()
    )]
    MutationFailed {
        method: String,
        target: String,
        /// Remote id of the resource the failed call addressed, if it has one.
        candidate: Option<String>,
        /// Payload of the failed call.
        payload: Payload,
        /// Payloads of the calls of this run that succeeded before it.
        completed: Vec<Payload>,
        source: ProviderError,
    },

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource state, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::Validation { .. }
            | Self::DependencyUnresolved { .. }
            | Self::Ambiguous { .. }
            | Self::NonEmptyResource { .. } => true,
            Self::MutationFailed { source, .. } | Self::Provider(source) => source.is_expected(),
        }
    }

    /// Taxonomy class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::DependencyUnresolved { .. } => ErrorKind::DependencyUnresolved,
            Self::Ambiguous { .. } => ErrorKind::Ambiguous,
            Self::NonEmptyResource { .. } => ErrorKind::NonEmptyResource,
            Self::MutationFailed { source, .. } | Self::Provider(source) => {
                ErrorKind::of_provider(source)
            }
        }
    }

    /// Number of mutations that had already succeeded when this error occurred.
    #[must_use]
    pub fn applied(&self) -> usize {
        match self {
            Self::MutationFailed { completed, .. } => completed.len(),
            _ => 0,
        }
    }

    /// Which call failed and which ones were applied before it.
    #[must_use]
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::MutationFailed {
                candidate,
                payload,
                completed,
                ..
            } => Some(json!({
                "candidate": candidate,
                "failed": payload,
                "applied": completed,
            })),
            _ => None,
        }
    }

    pub(crate) fn validation(field: &str, detail: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            detail: detail.into(),
        }
    }
}

fn candidate_note(candidate: Option<&str>) -> String {
    candidate.map(|id| format!(", id '{id}'")).unwrap_or_default()
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
