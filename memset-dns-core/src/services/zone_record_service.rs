//! Zone Record 调和服务
//!
//! Records are matched by `(zone, record, type)`. Several remote records can
//! share that identity; each one is reconciled (fan-out).

use std::sync::Arc;

use memset_dns_provider::{ApiMethod, Payload, ZoneRecord};
use serde_json::Value;

use crate::diff::{self, Decision};
use crate::error::CoreResult;
use crate::resolver::{self, LookupError};
use crate::services::{payload_json, ServiceContext, PENDING_ZONE_ID};
use crate::types::{DesiredState, ReconcileResult, ZoneRecordSpec};

/// Zone Record 调和服务
pub struct ZoneRecordService {
    ctx: Arc<ServiceContext>,
}

impl ZoneRecordService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub async fn reconcile(&self, desired: &ZoneRecordSpec) -> ReconcileResult {
        let result = match desired.state {
            DesiredState::Present => self.ensure_present(desired).await,
            DesiredState::Absent => self.ensure_absent(desired).await,
        };
        self.ctx
            .finish(&format!("Record '{}'", Self::target(desired)), result)
    }

    async fn ensure_present(&self, desired: &ZoneRecordSpec) -> CoreResult<ReconcileResult> {
        desired.validate()?;
        let zones = self.ctx.client().list_zones().await?;
        let zone = resolver::resolve_zone(&desired.zone, &zones)
            .map_err(|e| e.into_dependency_error("zone", &desired.zone))?;

        // 记录列表无法按 zone 过滤，只能全量获取
        let records = self.ctx.client().list_zone_records().await?;
        let wanted = desired.to_record(&zone.id);
        let decisions = diff::decide(&wanted, &records);
        let target = Self::target(desired);

        if diff::all_noop(&decisions) {
            let current: Vec<&ZoneRecord> = records
                .iter()
                .filter(|r| r.same_identity(&wanted))
                .collect();
            return Ok(
                ReconcileResult::unchanged(format!("Record '{target}' is up to date"))
                    .with_resource(&current),
            );
        }

        let check_mode = self.ctx.check_mode();
        let mut applied: Vec<Payload> = Vec::new();
        for decision in decisions {
            let (method, candidate, record) = match decision {
                Decision::NoOp { .. } => continue,
                Decision::Create(record) => (ApiMethod::ZoneRecordCreate, None, record),
                Decision::Update { id, merged } => (ApiMethod::ZoneRecordUpdate, Some(id), merged),
            };
            let payload = record.to_payload();
            if !check_mode {
                self.ctx
                    .mutate(method, &target, candidate.as_deref(), &payload, &applied)
                    .await?;
            }
            applied.push(payload);
        }

        let message = if check_mode {
            format!("Record '{target}' would change ({} call(s))", applied.len())
        } else {
            format!("Record '{target}' reconciled ({} change(s))", applied.len())
        };
        Ok(ReconcileResult::changed(message).with_details(Self::payloads_json(&applied)))
    }

    /// Check mode only: plan a record whose zone this run would create.
    ///
    /// A new zone holds no records, so the plan is a single create.
    pub(crate) fn plan_in_new_zone(&self, desired: &ZoneRecordSpec) -> ReconcileResult {
        let target = Self::target(desired);
        let result = desired.validate().map(|()| {
            let payload = desired.to_record(PENDING_ZONE_ID).to_payload();
            ReconcileResult::changed(format!(
                "Record '{target}' would be created with zone '{}'",
                desired.zone
            ))
            .with_details(Self::payloads_json(std::slice::from_ref(&payload)))
        });
        self.ctx.finish(&format!("Record '{target}'"), result)
    }

    async fn ensure_absent(&self, desired: &ZoneRecordSpec) -> CoreResult<ReconcileResult> {
        desired.validate()?;
        let zones = self.ctx.client().list_zones().await?;
        let target = Self::target(desired);
        let zone = match resolver::resolve_zone(&desired.zone, &zones) {
            Ok(zone) => zone,
            Err(LookupError::NotFound) => {
                return Ok(ReconcileResult::unchanged(format!(
                    "Zone '{}' does not exist, record '{target}' is already absent",
                    desired.zone
                )));
            }
            Err(e) => return Err(e.into_dependency_error("zone", &desired.zone)),
        };

        let records = self.ctx.client().list_zone_records().await?;
        let wanted = desired.to_record(&zone.id);
        let doomed: Vec<&ZoneRecord> = records
            .iter()
            .filter(|r| r.same_identity(&wanted))
            .collect();

        if doomed.is_empty() {
            return Ok(ReconcileResult::unchanged(format!(
                "Record '{target}' does not exist"
            )));
        }

        if !self.ctx.check_mode() {
            let mut applied: Vec<Payload> = Vec::new();
            for record in &doomed {
                let mut payload = Payload::new();
                payload.insert("id".to_string(), record.id.clone());
                self.ctx
                    .mutate(
                        ApiMethod::ZoneRecordDelete,
                        &target,
                        Some(&record.id),
                        &payload,
                        &applied,
                    )
                    .await?;
                applied.push(payload);
            }
        }

        let verb = if self.ctx.check_mode() {
            "would be deleted"
        } else {
            "deleted"
        };
        Ok(ReconcileResult::changed(format!(
            "Record '{target}' {verb} ({} match(es))",
            doomed.len()
        ))
        .with_resource(&doomed))
    }

    fn payloads_json(payloads: &[Payload]) -> Value {
        Value::Array(payloads.iter().map(payload_json).collect())
    }

    fn target(desired: &ZoneRecordSpec) -> String {
        format!("{}/{}", desired.zone, desired.label())
    }
}
