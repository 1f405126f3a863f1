//! 测试辅助模块
//!
//! 提供内存版 Memset API 和便捷的测试工厂方法。

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use memset_dns_provider::{
    ApiClient, ApiMethod, Job, Payload, ProviderError, RecordType, Result, Zone, ZoneDomain,
    ZoneRecord,
};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::services::{ReconcileOptions, Reconciler, ServiceContext};

// ===== FakeMemset =====

#[derive(Default)]
struct FakeState {
    /// Zones without children; children are attached when listing.
    zones: Vec<Zone>,
    domains: Vec<ZoneDomain>,
    records: Vec<ZoneRecord>,
    /// `job.status` answers; the last one repeats.
    jobs: VecDeque<Job>,
    /// method -> (successful calls before failing, error)
    failures: HashMap<ApiMethod, (usize, ProviderError)>,
    calls: Vec<(ApiMethod, Payload)>,
    /// Delay before every answer.
    latency: Duration,
    next_id: u32,
}

/// In-memory Memset API that records every call.
pub struct FakeMemset {
    state: RwLock<FakeState>,
}

impl FakeMemset {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(FakeState::default()),
        }
    }

    pub async fn add_zone(&self, nickname: &str, ttl: u32) -> String {
        let mut state = self.state.write().await;
        let id = state.next_id("zone");
        state.zones.push(zone(&id, nickname, ttl));
        id
    }

    pub async fn add_domain(&self, domain: &str, zone_id: &str) {
        self.state.write().await.domains.push(ZoneDomain {
            id: None,
            domain: domain.to_string(),
            zone_id: zone_id.to_string(),
        });
    }

    pub async fn add_record(
        &self,
        zone_id: &str,
        record_type: RecordType,
        label: &str,
        address: &str,
    ) -> String {
        let mut state = self.state.write().await;
        let id = state.next_id("record");
        state.records.push(ZoneRecord {
            id: id.clone(),
            zone_id: zone_id.to_string(),
            record_type,
            record: label.to_string(),
            address: address.to_string(),
            ttl: 0,
            priority: 0,
            relative: false,
        });
        id
    }

    /// Every call of `method` fails with `err`.
    pub async fn fail_on(&self, method: ApiMethod, err: ProviderError) {
        self.fail_after(method, 0, err).await;
    }

    /// Calls of `method` succeed `successes` times, then fail with `err`.
    pub async fn fail_after(&self, method: ApiMethod, successes: usize, err: ProviderError) {
        self.state
            .write()
            .await
            .failures
            .insert(method, (successes, err));
    }

    pub async fn set_latency(&self, latency: Duration) {
        self.state.write().await.latency = latency;
    }

    pub async fn script_jobs(&self, jobs: Vec<Job>) {
        self.state.write().await.jobs = jobs.into();
    }

    pub async fn calls(&self) -> Vec<(ApiMethod, Payload)> {
        self.state.read().await.calls.clone()
    }

    pub async fn count(&self, method: ApiMethod) -> usize {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter(|(m, _)| *m == method)
            .count()
    }

    /// Methods of all state-changing calls, in order.
    pub async fn mutations(&self) -> Vec<ApiMethod> {
        self.state
            .read()
            .await
            .calls
            .iter()
            .map(|(m, _)| *m)
            .filter(|m| m.is_mutating())
            .collect()
    }

    pub async fn zones(&self) -> Vec<Zone> {
        self.state.read().await.zone_views()
    }

    pub async fn domains(&self) -> Vec<ZoneDomain> {
        self.state.read().await.domains.clone()
    }

    pub async fn records(&self) -> Vec<ZoneRecord> {
        self.state.read().await.records.clone()
    }
}

impl FakeState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn zone_views(&self) -> Vec<Zone> {
        self.zones
            .iter()
            .map(|z| Zone {
                domains: self
                    .domains
                    .iter()
                    .filter(|d| d.zone_id == z.id)
                    .cloned()
                    .collect(),
                records: self
                    .records
                    .iter()
                    .filter(|r| r.zone_id == z.id)
                    .cloned()
                    .collect(),
                ..z.clone()
            })
            .collect()
    }

    fn handle(&mut self, method: ApiMethod, payload: &Payload) -> Result<Value> {
        match method {
            ApiMethod::ZoneList => Ok(to_json(&self.zone_views())),
            ApiMethod::ZoneCreate => {
                let id = self.next_id("zone");
                let created = zone(&id, &field(payload, "nickname"), number(payload, "ttl"));
                self.zones.push(created.clone());
                Ok(to_json(&created))
            }
            ApiMethod::ZoneUpdate => {
                let id = field(payload, "id");
                let existing = self
                    .zones
                    .iter_mut()
                    .find(|z| z.id == id)
                    .ok_or_else(|| not_found(method))?;
                if let Some(nickname) = payload.get("nickname") {
                    existing.nickname.clone_from(nickname);
                }
                existing.ttl = number(payload, "ttl");
                Ok(to_json(&*existing))
            }
            ApiMethod::ZoneDelete => {
                let id = field(payload, "id");
                let pos = self
                    .zones
                    .iter()
                    .position(|z| z.id == id)
                    .ok_or_else(|| not_found(method))?;
                let removed = self.zones.remove(pos);
                self.domains.retain(|d| d.zone_id != id);
                self.records.retain(|r| r.zone_id != id);
                Ok(to_json(&removed))
            }
            ApiMethod::ZoneDomainList => Ok(to_json(&self.domains)),
            ApiMethod::ZoneDomainCreate => {
                let domain = field(payload, "domain");
                if self.domains.iter().any(|d| d.domain == domain) {
                    return Err(ProviderError::ClientError {
                        method: method.to_string(),
                        status: 400,
                        raw_message: Some("Domain already exists".to_string()),
                    });
                }
                let created = ZoneDomain {
                    id: None,
                    domain,
                    zone_id: field(payload, "zone_id"),
                };
                self.domains.push(created.clone());
                Ok(to_json(&created))
            }
            ApiMethod::ZoneDomainDelete => {
                let domain = field(payload, "domain");
                let pos = self
                    .domains
                    .iter()
                    .position(|d| d.domain == domain)
                    .ok_or_else(|| not_found(method))?;
                Ok(to_json(&self.domains.remove(pos)))
            }
            ApiMethod::ZoneDomainInfo => {
                let domain = field(payload, "domain");
                self.domains
                    .iter()
                    .find(|d| d.domain == domain)
                    .map(to_json)
                    .ok_or_else(|| not_found(method))
            }
            ApiMethod::ZoneRecordList => Ok(to_json(&self.records)),
            ApiMethod::ZoneRecordCreate => {
                let id = self.next_id("record");
                let created = record_from(payload, id);
                self.records.push(created.clone());
                Ok(to_json(&created))
            }
            ApiMethod::ZoneRecordUpdate => {
                let id = field(payload, "id");
                let existing = self
                    .records
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or_else(|| not_found(method))?;
                *existing = record_from(payload, id);
                Ok(to_json(&*existing))
            }
            ApiMethod::ZoneRecordDelete => {
                let id = field(payload, "id");
                let pos = self
                    .records
                    .iter()
                    .position(|r| r.id == id)
                    .ok_or_else(|| not_found(method))?;
                Ok(to_json(&self.records.remove(pos)))
            }
            ApiMethod::Reload => Ok(to_json(&job("job-1", false, false))),
            ApiMethod::JobStatus => {
                let answer = if self.jobs.len() > 1 {
                    self.jobs.pop_front()
                } else {
                    self.jobs.front().cloned()
                };
                let id = field(payload, "id");
                Ok(to_json(&answer.unwrap_or_else(|| job(&id, true, false))))
            }
        }
    }
}

#[async_trait]
impl ApiClient for FakeMemset {
    async fn invoke(&self, method: ApiMethod, payload: &Payload) -> Result<Value> {
        let latency = self.state.read().await.latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.state.write().await;
        let previous = state.calls.iter().filter(|(m, _)| *m == method).count();
        state.calls.push((method, payload.clone()));
        if let Some((successes, err)) = state.failures.get(&method) {
            if previous >= *successes {
                return Err(err.clone());
            }
        }
        state.handle(method, payload)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}

fn field(payload: &Payload, key: &str) -> String {
    payload.get(key).cloned().unwrap_or_default()
}

fn number(payload: &Payload, key: &str) -> u32 {
    payload.get(key).and_then(|v| v.parse().ok()).unwrap_or(0)
}

fn record_from(payload: &Payload, id: String) -> ZoneRecord {
    ZoneRecord {
        id,
        zone_id: field(payload, "zone_id"),
        record_type: field(payload, "type")
            .parse()
            .unwrap_or(RecordType::Unsupported),
        record: field(payload, "record"),
        address: field(payload, "address"),
        ttl: number(payload, "ttl"),
        priority: number(payload, "priority"),
        relative: field(payload, "relative") == "true",
    }
}

fn not_found(method: ApiMethod) -> ProviderError {
    ProviderError::ClientError {
        method: method.to_string(),
        status: 404,
        raw_message: Some("Not found".to_string()),
    }
}

// ===== 工厂方法 =====

pub fn zone(id: &str, nickname: &str, ttl: u32) -> Zone {
    Zone {
        id: id.to_string(),
        nickname: nickname.to_string(),
        ttl,
        domains: Vec::new(),
        records: Vec::new(),
    }
}

pub fn job(id: &str, finished: bool, error: bool) -> Job {
    Job {
        id: id.to_string(),
        finished,
        error,
        status: if finished { "DONE" } else { "RUNNING" }.to_string(),
        job_type: "dns".to_string(),
    }
}

pub fn server_error(method: ApiMethod) -> ProviderError {
    ProviderError::ServerError {
        method: method.to_string(),
        status: 503,
        raw_message: None,
    }
}

/// 创建测试用的 Reconciler（返回 fake API 以便断言调用）
pub fn create_test_reconciler(options: ReconcileOptions) -> (Reconciler, Arc<FakeMemset>) {
    let fake = Arc::new(FakeMemset::new());
    let ctx = Arc::new(ServiceContext::new(fake.clone(), options));
    (Reconciler::new(ctx), fake)
}
