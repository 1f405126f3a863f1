//! Zone 调和服务

use std::sync::Arc;

use memset_dns_provider::{ApiMethod, Payload, Zone};

use crate::diff::{self, Decision};
use crate::error::{CoreError, CoreResult};
use crate::resolver::{self, LookupError};
use crate::services::{body_or, payload_json, ServiceContext};
use crate::types::{DesiredState, ReconcileResult, ZoneSpec};

/// Zone 调和服务
pub struct ZoneService {
    ctx: Arc<ServiceContext>,
}

impl ZoneService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Bring one zone to its desired state.
    pub async fn reconcile(&self, desired: &ZoneSpec) -> ReconcileResult {
        self.reconcile_step(desired).await.0
    }

    /// Same as [`reconcile`](Self::reconcile); the flag is set when check
    /// mode planned to create the zone, so it does not exist remotely yet.
    pub(crate) async fn reconcile_step(&self, desired: &ZoneSpec) -> (ReconcileResult, bool) {
        let result = match desired.state {
            DesiredState::Present => self.ensure_present(desired).await,
            DesiredState::Absent => self.ensure_absent(desired).await.map(|r| (r, false)),
        };
        let planned = matches!(result, Ok((_, true)));
        let result = self.ctx.finish(
            &format!("Zone '{}'", desired.nickname),
            result.map(|(r, _)| r),
        );
        (result, planned)
    }

    async fn ensure_present(&self, desired: &ZoneSpec) -> CoreResult<(ReconcileResult, bool)> {
        desired.validate()?;
        let zones = self.ctx.client().list_zones().await?;
        let observed = Self::lookup(&desired.nickname, &zones)?;

        let desired_zone = desired.to_zone();
        let candidates: &[Zone] = observed.map_or(&[][..], std::slice::from_ref);
        let decision = diff::decide(&desired_zone, candidates)
            .into_iter()
            .next()
            .unwrap_or_else(|| Decision::Create(desired_zone.clone()));

        let nickname = &desired.nickname;
        let (method, candidate, payload, verb) = match decision {
            Decision::NoOp { .. } => {
                let result = ReconcileResult::unchanged(format!("Zone '{nickname}' is up to date"));
                let result = match observed {
                    Some(zone) => result.with_resource(zone),
                    None => result,
                };
                return Ok((result, false));
            }
            Decision::Create(zone) => (ApiMethod::ZoneCreate, None, zone.to_payload(), "created"),
            Decision::Update { id, merged } => (
                ApiMethod::ZoneUpdate,
                Some(id),
                merged.to_payload(),
                "updated",
            ),
        };

        if self.ctx.check_mode() {
            let result = ReconcileResult::changed(format!("Zone '{nickname}' would be {verb}"))
                .with_details(payload_json(&payload));
            return Ok((result, method == ApiMethod::ZoneCreate));
        }

        let body = self
            .ctx
            .mutate(method, nickname, candidate.as_deref(), &payload, &[])
            .await?;
        let result = ReconcileResult::changed(format!("Zone '{nickname}' {verb}"))
            .with_details(body_or(body, payload_json(&payload)));
        Ok((result, false))
    }

    async fn ensure_absent(&self, desired: &ZoneSpec) -> CoreResult<ReconcileResult> {
        desired.validate()?;
        let zones = self.ctx.client().list_zones().await?;
        let nickname = &desired.nickname;
        let Some(zone) = Self::lookup(nickname, &zones)? else {
            return Ok(ReconcileResult::unchanged(format!(
                "Zone '{nickname}' does not exist"
            )));
        };

        if !zone.is_empty() {
            if !desired.force {
                return Err(CoreError::NonEmptyResource {
                    nickname: nickname.clone(),
                    domains: zone.domains.len(),
                    records: zone.records.len(),
                });
            }
            log::warn!(
                "Deleting zone '{nickname}' with {} domain(s) and {} record(s) (force)",
                zone.domains.len(),
                zone.records.len()
            );
        }

        if self.ctx.check_mode() {
            return Ok(
                ReconcileResult::changed(format!("Zone '{nickname}' would be deleted"))
                    .with_resource(zone),
            );
        }

        let mut payload = Payload::new();
        payload.insert("id".to_string(), zone.id.clone());
        self.ctx
            .mutate(ApiMethod::ZoneDelete, nickname, Some(&zone.id), &payload, &[])
            .await?;
        Ok(ReconcileResult::changed(format!("Zone '{nickname}' deleted")).with_resource(zone))
    }

    /// 唯一匹配的 Zone；不存在返回 `None`，重名则报错
    fn lookup<'a>(nickname: &str, zones: &'a [Zone]) -> CoreResult<Option<&'a Zone>> {
        match resolver::resolve_zone(nickname, zones) {
            Ok(zone) => Ok(Some(zone)),
            Err(LookupError::NotFound) => Ok(None),
            Err(LookupError::Ambiguous { count }) => Err(CoreError::Ambiguous {
                resource: "Zone".to_string(),
                name: nickname.to_string(),
                count,
            }),
        }
    }
}
