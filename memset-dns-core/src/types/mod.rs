//! 类型定义模块

mod desired;
mod manifest;
mod result;

pub use desired::{DesiredState, ZoneDomainSpec, ZoneRecordSpec, ZoneSpec};
pub use manifest::{Manifest, ManifestReport, ReloadSpec, ResourceKind, StepReport};
pub use result::ReconcileResult;

// Re-export provider 库的公共类型
pub use memset_dns_provider::{Job, RecordType, Zone, ZoneDomain, ZoneRecord};
