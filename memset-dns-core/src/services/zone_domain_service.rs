//! Zone Domain 调和服务

use std::sync::Arc;

use memset_dns_provider::{ApiMethod, Payload, ZoneDomain};

use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::resolver::{self, LookupError};
use crate::services::{body_or, payload_json, ServiceContext, PENDING_ZONE_ID};
use crate::types::{DesiredState, ReconcileResult, ZoneDomainSpec};

/// Zone Domain 调和服务
pub struct ZoneDomainService {
    ctx: Arc<ServiceContext>,
}

impl ZoneDomainService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub async fn reconcile(&self, desired: &ZoneDomainSpec) -> ReconcileResult {
        let result = match desired.state {
            DesiredState::Present => self.ensure_present(desired).await,
            DesiredState::Absent => self.ensure_absent(desired).await,
        };
        self.ctx
            .finish(&format!("Zone domain '{}'", desired.domain), result)
    }

    async fn ensure_present(&self, desired: &ZoneDomainSpec) -> CoreResult<ReconcileResult> {
        desired.validate()?;
        let zones = self.ctx.client().list_zones().await?;
        let zone = resolver::resolve_zone(&desired.zone, &zones)
            .map_err(|e| e.into_dependency_error("zone", &desired.zone))?;

        let domains = self.ctx.client().list_zone_domains().await?;
        let domain = &desired.domain;
        match Self::lookup(domain, &domains)? {
            Some(existing) if existing.zone_id == zone.id => Ok(ReconcileResult::unchanged(
                format!("Domain '{domain}' already belongs to zone '{}'", desired.zone),
            )
            .with_resource(existing)),
            // 没有可用的更新方法，保持原样并给出警告
            Some(existing) => Ok(Self::bound_elsewhere(desired, existing)),
            None => self.create(desired, &zone.id).await,
        }
    }

    /// Check mode only: plan a domain whose zone this run would create.
    ///
    /// An existing domain necessarily belongs to another zone and is left
    /// alone, as in a real run.
    pub(crate) async fn plan_in_new_zone(&self, desired: &ZoneDomainSpec) -> ReconcileResult {
        let result = self.plan(desired).await;
        self.ctx
            .finish(&format!("Zone domain '{}'", desired.domain), result)
    }

    async fn plan(&self, desired: &ZoneDomainSpec) -> CoreResult<ReconcileResult> {
        desired.validate()?;
        let domains = self.ctx.client().list_zone_domains().await?;
        match Self::lookup(&desired.domain, &domains)? {
            Some(existing) => Ok(Self::bound_elsewhere(desired, existing)),
            None => self.create(desired, PENDING_ZONE_ID).await,
        }
    }

    fn bound_elsewhere(desired: &ZoneDomainSpec, existing: &ZoneDomain) -> ReconcileResult {
        let domain = &desired.domain;
        let warning = format!(
            "Domain '{domain}' is bound to zone id '{}', not to zone '{}'; left unchanged",
            existing.zone_id, desired.zone
        );
        log::warn!("{warning}");
        ReconcileResult::unchanged(format!("Domain '{domain}' already exists"))
            .with_resource(existing)
            .with_warning(warning, None)
    }

    async fn create(&self, desired: &ZoneDomainSpec, zone_id: &str) -> CoreResult<ReconcileResult> {
        let domain = &desired.domain;
        let payload = desired.to_domain(zone_id).to_payload();

        if self.ctx.check_mode() {
            return Ok(ReconcileResult::changed(format!(
                "Domain '{domain}' would be added to zone '{}'",
                desired.zone
            ))
            .with_details(payload_json(&payload)));
        }

        self.ctx
            .mutate(ApiMethod::ZoneDomainCreate, domain, None, &payload, &[])
            .await?;
        let result = ReconcileResult::changed(format!(
            "Domain '{domain}' added to zone '{}'",
            desired.zone
        ));

        match self.ctx.client().zone_domain_info(domain).await {
            Ok(info) => Ok(result.with_details(body_or(info, payload_json(&payload)))),
            Err(e) => {
                log::warn!("Domain '{domain}' created, fetching its details failed: {e}");
                Ok(result.with_details(payload_json(&payload)).with_warning(
                    format!("Domain created but its details could not be fetched: {e}"),
                    Some(ErrorKind::of_provider(&e)),
                ))
            }
        }
    }

    // 删除时不要求父 Zone 存在：Domain 名称本身全局唯一
    async fn ensure_absent(&self, desired: &ZoneDomainSpec) -> CoreResult<ReconcileResult> {
        desired.validate()?;
        let domains = self.ctx.client().list_zone_domains().await?;
        let domain = &desired.domain;
        let Some(existing) = Self::lookup(domain, &domains)? else {
            return Ok(ReconcileResult::unchanged(format!(
                "Domain '{domain}' does not exist"
            )));
        };

        if self.ctx.check_mode() {
            return Ok(
                ReconcileResult::changed(format!("Domain '{domain}' would be removed"))
                    .with_resource(existing),
            );
        }

        let mut payload = Payload::new();
        payload.insert("domain".to_string(), domain.clone());
        let body = self
            .ctx
            .mutate(ApiMethod::ZoneDomainDelete, domain, None, &payload, &[])
            .await?;
        let removed = serde_json::to_value(existing).unwrap_or_default();
        Ok(ReconcileResult::changed(format!("Domain '{domain}' removed"))
            .with_details(body_or(body, removed)))
    }

    fn lookup<'a>(domain: &str, domains: &'a [ZoneDomain]) -> CoreResult<Option<&'a ZoneDomain>> {
        match resolver::resolve(domain, domains) {
            Ok(existing) => Ok(Some(existing)),
            Err(LookupError::NotFound) => Ok(None),
            Err(LookupError::Ambiguous { count }) => Err(CoreError::Ambiguous {
                resource: "Zone domain".to_string(),
                name: domain.to_string(),
                count,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::services::ReconcileOptions;
    use crate::test_utils::{create_test_reconciler, server_error};
    use crate::types::ZoneDomainSpec;
    use memset_dns_provider::ApiMethod;

    #[tokio::test]
    async fn adds_domain_and_returns_info() {
        let (reconciler, fake) = create_test_reconciler(ReconcileOptions::default());
        let id = fake.add_zone("test", 0).await;

        let result = reconciler
            .reconcile_zone_domain(&ZoneDomainSpec::present("example.com", "test"))
            .await;

        assert!(result.changed);
        assert!(!result.failed);
        assert_eq!(
            fake.mutations().await,
            vec![ApiMethod::ZoneDomainCreate]
        );
        assert_eq!(fake.count(ApiMethod::ZoneDomainInfo).await, 1);
        let details = result.details.unwrap();
        assert_eq!(details["domain"], "example.com");
        assert_eq!(details["zone_id"], id.as_str());
    }

    #[tokio::test]
    async fn second_run_is_idempotent() {
        let (reconciler, fake) = create_test_reconciler(ReconcileOptions::default());
        fake.add_zone("test", 0).await;
        let spec = ZoneDomainSpec::present("example.com", "test");

        assert!(reconciler.reconcile_zone_domain(&spec).await.changed);
        let second = reconciler.reconcile_zone_domain(&spec).await;

        assert!(!second.changed);
        assert!(second.warnings.is_empty());
        assert_eq!(fake.mutations().await.len(), 1);
    }

    #[tokio::test]
    async fn missing_parent_zone_fails_without_create() {
        let (reconciler, fake) = create_test_reconciler(ReconcileOptions::default());

        let result = reconciler
            .reconcile_zone_domain(&ZoneDomainSpec::present("example.com", "test"))
            .await;

        assert!(result.failed);
        assert!(!result.changed);
        assert_eq!(result.error_kind, Some(ErrorKind::DependencyUnresolved));
        assert!(fake.mutations().await.is_empty());
    }

    #[tokio::test]
    async fn ambiguous_parent_zone_fails() {
        let (reconciler, fake) = create_test_reconciler(ReconcileOptions::default());
        fake.add_zone("test", 0).await;
        fake.add_zone("test", 0).await;

        let result = reconciler
            .reconcile_zone_domain(&ZoneDomainSpec::present("example.com", "test"))
            .await;

        assert_eq!(result.error_kind, Some(ErrorKind::DependencyUnresolved));
        assert!(fake.mutations().await.is_empty());
    }

    #[tokio::test]
    async fn domain_in_other_zone_is_left_alone() {
        let (reconciler, fake) = create_test_reconciler(ReconcileOptions::default());
        fake.add_zone("test", 0).await;
        let other = fake.add_zone("other", 0).await;
        fake.add_domain("example.com", &other).await;

        let result = reconciler
            .reconcile_zone_domain(&ZoneDomainSpec::present("example.com", "test"))
            .await;

        assert!(!result.changed);
        assert!(!result.failed);
        assert_eq!(result.warnings.len(), 1);
        assert!(fake.mutations().await.is_empty());
    }

    #[tokio::test]
    async fn info_failure_is_a_warning() {
        let (reconciler, fake) = create_test_reconciler(ReconcileOptions::default());
        fake.add_zone("test", 0).await;
        fake.fail_on(
            ApiMethod::ZoneDomainInfo,
            server_error(ApiMethod::ZoneDomainInfo),
        )
        .await;

        let result = reconciler
            .reconcile_zone_domain(&ZoneDomainSpec::present("example.com", "test"))
            .await;

        assert!(result.changed);
        assert!(!result.failed);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.error_kind, Some(ErrorKind::ServerError));
        assert_eq!(result.details.unwrap()["domain"], "example.com");
    }

    #[tokio::test]
    async fn removes_domain_without_parent_zone() {
        let (reconciler, fake) = create_test_reconciler(ReconcileOptions::default());
        fake.add_domain("example.com", "zone-gone").await;

        let result = reconciler
            .reconcile_zone_domain(&ZoneDomainSpec::absent("example.com", "test"))
            .await;

        assert!(result.changed);
        assert_eq!(fake.mutations().await, vec![ApiMethod::ZoneDomainDelete]);
        assert_eq!(fake.count(ApiMethod::ZoneList).await, 0);
        assert!(fake.domains().await.is_empty());

        let again = reconciler
            .reconcile_zone_domain(&ZoneDomainSpec::absent("example.com", "test"))
            .await;
        assert!(!again.changed);
        assert!(!again.failed);
    }

    #[tokio::test]
    async fn long_domain_rejected_before_any_call() {
        let (reconciler, fake) = create_test_reconciler(ReconcileOptions::default());
        let domain = format!("{}.com", "a".repeat(250));

        let result = reconciler
            .reconcile_zone_domain(&ZoneDomainSpec::present(domain, "test"))
            .await;

        assert_eq!(result.error_kind, Some(ErrorKind::Validation));
        assert!(fake.calls().await.is_empty());
    }

    #[tokio::test]
    async fn check_mode_reports_planned_domain() {
        let (reconciler, fake) = create_test_reconciler(ReconcileOptions {
            check_mode: true,
            ..ReconcileOptions::default()
        });
        fake.add_zone("test", 0).await;

        let result = reconciler
            .reconcile_zone_domain(&ZoneDomainSpec::present("example.com", "test"))
            .await;

        assert!(result.changed);
        assert!(fake.mutations().await.is_empty());
        assert!(fake.domains().await.is_empty());
    }
}
