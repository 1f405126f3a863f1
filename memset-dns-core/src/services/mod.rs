//! 业务逻辑服务层

mod manifest_service;
mod reconciler;
mod reload_service;
mod zone_domain_service;
mod zone_record_service;
mod zone_service;

pub use manifest_service::ManifestService;
pub use reconciler::Reconciler;
pub use reload_service::ReloadService;
pub use zone_domain_service::ZoneDomainService;
pub use zone_record_service::ZoneRecordService;
pub use zone_service::ZoneService;

use std::sync::Arc;

use memset_dns_provider::{ApiClient, ApiMethod, Payload};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::poller::PollConfig;
use crate::types::ReconcileResult;

/// Zone id used in check-mode plans for zones the same run would create.
pub const PENDING_ZONE_ID: &str = "(pending)";

/// Per-run behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Read everything, mutate nothing, report what would change.
    pub check_mode: bool,
    /// Cadence and bounds for reload polling.
    pub poll: PollConfig,
}

/// 服务上下文 - 持有所有依赖
///
/// 平台层需要创建此上下文，并注入 API 客户端实现。
pub struct ServiceContext {
    /// Memset API 客户端
    pub client: Arc<dyn ApiClient>,
    pub options: ReconcileOptions,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(client: Arc<dyn ApiClient>, options: ReconcileOptions) -> Self {
        Self { client, options }
    }

    pub fn client(&self) -> &dyn ApiClient {
        self.client.as_ref()
    }

    pub fn check_mode(&self) -> bool {
        self.options.check_mode
    }

    /// 执行一次变更调用
    ///
    /// `candidate` is the remote id the call addresses (if any) and
    /// `completed` the payloads this run already applied; both are carried
    /// into the error so callers can tell partial progress apart.
    pub(crate) async fn mutate(
        &self,
        method: ApiMethod,
        target: &str,
        candidate: Option<&str>,
        payload: &Payload,
        completed: &[Payload],
    ) -> CoreResult<Value> {
        match candidate {
            Some(id) => log::info!("[{method}] {target} ({id})"),
            None => log::info!("[{method}] {target}"),
        }
        self.client
            .invoke(method, payload)
            .await
            .map_err(|source| CoreError::MutationFailed {
                method: method.to_string(),
                target: target.to_string(),
                candidate: candidate.map(str::to_string),
                payload: payload.clone(),
                completed: completed.to_vec(),
                source,
            })
    }

    /// 将错误转换为失败结果，并按预期/非预期分级记录日志
    pub(crate) fn finish(&self, what: &str, result: CoreResult<ReconcileResult>) -> ReconcileResult {
        match result {
            Ok(result) => {
                if result.changed {
                    log::info!("{what}: {}", result.message.as_deref().unwrap_or("changed"));
                } else {
                    log::debug!("{what}: {}", result.message.as_deref().unwrap_or("no change"));
                }
                result
            }
            Err(e) => {
                if e.is_expected() {
                    log::warn!("{what}: {e}");
                } else {
                    log::error!("{what}: {e}");
                }
                ReconcileResult::failure(&e)
            }
        }
    }
}

/// Payload as a JSON object, for `details`.
pub(crate) fn payload_json(payload: &Payload) -> Value {
    Value::Object(
        payload
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

/// Remote body, or `fallback` when the API answered with an empty body.
pub(crate) fn body_or(body: Value, fallback: Value) -> Value {
    if body.is_null() {
        fallback
    } else {
        body
    }
}
