//! 调和结果定义

use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, ErrorKind};

/// Outcome of one reconciliation step.
///
/// `changed` and `failed` are independent: a run that applied some mutations
/// before failing reports both as `true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileResult {
    /// Remote state was (or, in check mode, would be) modified.
    pub changed: bool,
    /// The step did not reach the desired state.
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Resource data after the step, or the planned payload in check mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Non-fatal problems.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Class of the failure, or of the non-fatal problem when `failed` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ReconcileResult {
    /// 无需变更
    #[must_use]
    pub fn unchanged(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// 已变更
    #[must_use]
    pub fn changed(message: impl Into<String>) -> Self {
        Self {
            changed: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Failure result; `changed` reflects mutations applied before the error,
    /// `details` names the failed call and the ones applied before it.
    #[must_use]
    pub fn failure(err: &CoreError) -> Self {
        Self {
            changed: err.applied() > 0,
            failed: true,
            message: Some(err.to_string()),
            details: err.details(),
            error_kind: Some(err.kind()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach a serializable resource as `details`.
    #[must_use]
    pub fn with_resource<T: Serialize + ?Sized>(mut self, resource: &T) -> Self {
        self.details = serde_json::to_value(resource).ok();
        self
    }

    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>, kind: Option<ErrorKind>) -> Self {
        self.warnings.push(warning.into());
        if self.error_kind.is_none() {
            self.error_kind = kind;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memset_dns_provider::{Payload, ProviderError};

    #[test]
    fn failure_before_any_mutation_is_unchanged() {
        let err = CoreError::Ambiguous {
            resource: "Zone".to_string(),
            name: "test".to_string(),
            count: 2,
        };
        let result = ReconcileResult::failure(&err);
        assert!(result.failed);
        assert!(!result.changed);
        assert_eq!(result.error_kind, Some(ErrorKind::Ambiguous));
    }

    #[test]
    fn partial_failure_is_changed_and_failed() {
        let mut applied = Payload::new();
        applied.insert("id".to_string(), "r1".to_string());
        let err = CoreError::MutationFailed {
            method: "dns.zone_record_update".to_string(),
            target: "www A".to_string(),
            candidate: Some("r2".to_string()),
            payload: Payload::new(),
            completed: vec![applied],
            source: ProviderError::ClientError {
                method: "dns.zone_record_update".to_string(),
                status: 412,
                raw_message: None,
            },
        };
        let result = ReconcileResult::failure(&err);
        assert!(result.failed);
        assert!(result.changed);
        assert_eq!(result.error_kind, Some(ErrorKind::ClientError));
        let details = result.details.unwrap();
        assert_eq!(details["candidate"], "r2");
        assert_eq!(details["applied"][0]["id"], "r1");
    }

    #[test]
    fn serialization_skips_empty_fields() {
        let json = serde_json::to_value(ReconcileResult::unchanged("ok")).unwrap();
        assert_eq!(json["changed"], false);
        assert_eq!(json["message"], "ok");
        assert!(json.get("warnings").is_none());
        assert!(json.get("error_kind").is_none());
    }
}
