//! Manifest 应用服务
//!
//! Order: present zones, present domains, present records, then absent
//! records, absent domains, absent zones, and finally the reload. Domain and
//! record steps whose zone failed to reconcile are skipped. In check mode,
//! children of a zone that would be created are planned against it instead of
//! being looked up remotely.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::CoreError;
use crate::services::{
    ReloadService, ServiceContext, ZoneDomainService, ZoneRecordService, ZoneService,
};
use crate::types::{
    DesiredState, Manifest, ManifestReport, ReconcileResult, ResourceKind, StepReport,
};

pub struct ManifestService {
    zones: ZoneService,
    domains: ZoneDomainService,
    records: ZoneRecordService,
    reload: ReloadService,
}

impl ManifestService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            zones: ZoneService::new(Arc::clone(&ctx)),
            domains: ZoneDomainService::new(Arc::clone(&ctx)),
            records: ZoneRecordService::new(Arc::clone(&ctx)),
            reload: ReloadService::new(ctx),
        }
    }

    pub async fn apply(&self, manifest: &Manifest) -> ManifestReport {
        let mut report = ManifestReport::default();
        let mut zones = ZoneOutcomes::default();

        for spec in Self::with_state(&manifest.zones, DesiredState::Present, |z| z.state) {
            let (result, planned) = self.zones.reconcile_step(spec).await;
            if result.failed {
                zones.failed.insert(spec.nickname.as_str());
            } else if planned {
                zones.planned.insert(spec.nickname.as_str());
            }
            report.push(StepReport {
                kind: ResourceKind::Zone,
                name: spec.nickname.clone(),
                state: spec.state,
                result,
            });
        }

        self.apply_domains(manifest, DesiredState::Present, &zones, &mut report)
            .await;
        self.apply_records(manifest, DesiredState::Present, &zones, &mut report)
            .await;
        self.apply_records(manifest, DesiredState::Absent, &zones, &mut report)
            .await;
        self.apply_domains(manifest, DesiredState::Absent, &zones, &mut report)
            .await;

        for spec in Self::with_state(&manifest.zones, DesiredState::Absent, |z| z.state) {
            let result = self.zones.reconcile(spec).await;
            report.push(StepReport {
                kind: ResourceKind::Zone,
                name: spec.nickname.clone(),
                state: spec.state,
                result,
            });
        }

        if let Some(reload) = manifest.reload {
            if report.changed {
                let result = self.reload.request_reload(reload.poll).await;
                report.set_reload(result);
            } else {
                log::info!("Nothing changed, reload skipped");
            }
        }

        log::info!(
            "Manifest applied: {} step(s), changed={}, failed={}",
            report.steps.len(),
            report.changed,
            report.failed
        );
        report
    }

    async fn apply_domains(
        &self,
        manifest: &Manifest,
        state: DesiredState,
        zones: &ZoneOutcomes<'_>,
        report: &mut ManifestReport,
    ) {
        for spec in Self::with_state(&manifest.domains, state, |d| d.state) {
            let result = if let Some(skipped) = zones.skip(&spec.zone) {
                skipped
            } else if state == DesiredState::Present && zones.is_planned(&spec.zone) {
                self.domains.plan_in_new_zone(spec).await
            } else {
                self.domains.reconcile(spec).await
            };
            report.push(StepReport {
                kind: ResourceKind::ZoneDomain,
                name: spec.domain.clone(),
                state,
                result,
            });
        }
    }

    async fn apply_records(
        &self,
        manifest: &Manifest,
        state: DesiredState,
        zones: &ZoneOutcomes<'_>,
        report: &mut ManifestReport,
    ) {
        for spec in Self::with_state(&manifest.records, state, |r| r.state) {
            let result = if let Some(skipped) = zones.skip(&spec.zone) {
                skipped
            } else if state == DesiredState::Present && zones.is_planned(&spec.zone) {
                self.records.plan_in_new_zone(spec)
            } else {
                self.records.reconcile(spec).await
            };
            report.push(StepReport {
                kind: ResourceKind::ZoneRecord,
                name: format!("{}/{}", spec.zone, spec.label()),
                state,
                result,
            });
        }
    }

    fn with_state<T>(
        specs: &[T],
        state: DesiredState,
        state_of: impl Fn(&T) -> DesiredState,
    ) -> Vec<&T> {
        specs.iter().filter(|s| state_of(*s) == state).collect()
    }
}

/// What the present-zone steps left behind for their children.
#[derive(Default)]
struct ZoneOutcomes<'a> {
    /// Zones whose step failed.
    failed: HashSet<&'a str>,
    /// Zones check mode would create.
    planned: HashSet<&'a str>,
}

impl ZoneOutcomes<'_> {
    fn is_planned(&self, zone: &str) -> bool {
        self.planned.contains(zone)
    }

    /// 父 Zone 调和失败时跳过
    fn skip(&self, zone: &str) -> Option<ReconcileResult> {
        if !self.failed.contains(zone) {
            return None;
        }
        let err = CoreError::DependencyUnresolved {
            resource: "zone".to_string(),
            name: zone.to_string(),
            reason: "zone step failed, skipped".to_string(),
        };
        log::warn!("{err}");
        Some(ReconcileResult::failure(&err))
    }
}
