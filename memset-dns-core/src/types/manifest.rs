//! Manifest (whole desired state) and its report

use serde::{Deserialize, Serialize};

use super::desired::{DesiredState, ZoneDomainSpec, ZoneRecordSpec, ZoneSpec};
use super::result::ReconcileResult;

/// Desired state for a set of zones, domains and records.
///
/// ```json
/// {
///   "zones": [{"nickname": "example", "ttl": 300}],
///   "domains": [{"domain": "example.com", "zone": "example"}],
///   "records": [{"zone": "example", "type": "A", "record": "www", "address": "1.2.3.4"}],
///   "reload": {"poll": true}
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub zones: Vec<ZoneSpec>,
    #[serde(default)]
    pub domains: Vec<ZoneDomainSpec>,
    #[serde(default)]
    pub records: Vec<ZoneRecordSpec>,
    /// Request a reload once everything has been applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reload: Option<ReloadSpec>,
}

impl Manifest {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadSpec {
    /// Wait for the reload job to finish.
    #[serde(default)]
    pub poll: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Zone,
    ZoneDomain,
    ZoneRecord,
}

/// Result of one manifest entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub kind: ResourceKind,
    /// Nickname, domain name, or `zone/label type` for records.
    pub name: String,
    pub state: DesiredState,
    #[serde(flatten)]
    pub result: ReconcileResult,
}

/// 应用 manifest 的汇总结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ManifestReport {
    pub changed: bool,
    pub failed: bool,
    pub steps: Vec<StepReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reload: Option<ReconcileResult>,
}

impl ManifestReport {
    pub(crate) fn push(&mut self, step: StepReport) {
        self.changed |= step.result.changed;
        self.failed |= step.result.failed;
        self.steps.push(step);
    }

    pub(crate) fn set_reload(&mut self, result: ReconcileResult) {
        self.changed |= result.changed;
        self.failed |= result.failed;
        self.reload = Some(result);
    }

    /// Steps that did not reach their desired state.
    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| s.result.failed)
    }
}
