//! 调和入口
//!
//! One object exposing every reconciliation operation over a shared
//! [`ServiceContext`].

use std::sync::Arc;

use crate::services::{
    ManifestService, ReloadService, ServiceContext, ZoneDomainService, ZoneRecordService,
    ZoneService,
};
use crate::types::{
    Manifest, ManifestReport, ReconcileResult, ZoneDomainSpec, ZoneRecordSpec, ZoneSpec,
};

pub struct Reconciler {
    zones: ZoneService,
    domains: ZoneDomainService,
    records: ZoneRecordService,
    reload: ReloadService,
    manifest: ManifestService,
}

impl Reconciler {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            zones: ZoneService::new(Arc::clone(&ctx)),
            domains: ZoneDomainService::new(Arc::clone(&ctx)),
            records: ZoneRecordService::new(Arc::clone(&ctx)),
            reload: ReloadService::new(Arc::clone(&ctx)),
            manifest: ManifestService::new(ctx),
        }
    }

    pub async fn reconcile_zone(&self, desired: &ZoneSpec) -> ReconcileResult {
        self.zones.reconcile(desired).await
    }

    pub async fn reconcile_zone_domain(&self, desired: &ZoneDomainSpec) -> ReconcileResult {
        self.domains.reconcile(desired).await
    }

    pub async fn reconcile_zone_record(&self, desired: &ZoneRecordSpec) -> ReconcileResult {
        self.records.reconcile(desired).await
    }

    /// 请求 DNS 重新加载；`poll` 为真时等待任务完成
    pub async fn request_reload(&self, poll: bool) -> ReconcileResult {
        self.reload.request_reload(poll).await
    }

    pub async fn apply_manifest(&self, manifest: &Manifest) -> ManifestReport {
        self.manifest.apply(manifest).await
    }
}
