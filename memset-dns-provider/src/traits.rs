use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::types::{ApiMethod, Job, Payload, Zone, ZoneDomain, ZoneRecord};

/// Memset API 客户端 Trait
///
/// Implementors provide [`invoke`](Self::invoke); the typed helpers are built
/// on top of it and decode the documented response shapes.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Perform one remote call and return the decoded JSON body.
    ///
    /// Non-2xx answers and transport failures come back as classified
    /// [`ProviderError`](crate::ProviderError)s.
    async fn invoke(&self, method: ApiMethod, payload: &Payload) -> Result<Value>;

    /// 获取所有 Zone
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let body = self.invoke(ApiMethod::ZoneList, &Payload::new()).await?;
        HttpUtils::decode(body, ApiMethod::ZoneList)
    }

    /// 获取所有 Zone Domain
    async fn list_zone_domains(&self) -> Result<Vec<ZoneDomain>> {
        let body = self
            .invoke(ApiMethod::ZoneDomainList, &Payload::new())
            .await?;
        HttpUtils::decode(body, ApiMethod::ZoneDomainList)
    }

    /// 获取所有 Zone Record
    async fn list_zone_records(&self) -> Result<Vec<ZoneRecord>> {
        let body = self
            .invoke(ApiMethod::ZoneRecordList, &Payload::new())
            .await?;
        HttpUtils::decode(body, ApiMethod::ZoneRecordList)
    }

    /// 获取 Zone Domain 详情
    async fn zone_domain_info(&self, domain: &str) -> Result<Value> {
        let mut payload = Payload::new();
        payload.insert("domain".to_string(), domain.to_string());
        self.invoke(ApiMethod::ZoneDomainInfo, &payload).await
    }

    /// 请求 DNS 重新加载，返回异步任务
    async fn reload(&self) -> Result<Job> {
        let body = self.invoke(ApiMethod::Reload, &Payload::new()).await?;
        HttpUtils::decode(body, ApiMethod::Reload)
    }

    /// 查询异步任务状态
    async fn job_status(&self, job_id: &str) -> Result<Job> {
        let mut payload = Payload::new();
        payload.insert("id".to_string(), job_id.to_string());
        let body = self.invoke(ApiMethod::JobStatus, &payload).await?;
        HttpUtils::decode(body, ApiMethod::JobStatus)
    }
}
