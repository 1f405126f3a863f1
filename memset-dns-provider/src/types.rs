use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============ Request Payload ============

/// Form payload sent with an API call.
///
/// Ordered so that logged payloads are stable. The `api_key` field is added by
/// the client at send time and never lives in a `Payload`.
pub type Payload = BTreeMap<String, String>;

/// Remote API methods consumed by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApiMethod {
    #[serde(rename = "dns.zone_list")]
    ZoneList,
    #[serde(rename = "dns.zone_create")]
    ZoneCreate,
    #[serde(rename = "dns.zone_update")]
    ZoneUpdate,
    #[serde(rename = "dns.zone_delete")]
    ZoneDelete,
    #[serde(rename = "dns.zone_domain_list")]
    ZoneDomainList,
    #[serde(rename = "dns.zone_domain_create")]
    ZoneDomainCreate,
    #[serde(rename = "dns.zone_domain_delete")]
    ZoneDomainDelete,
    #[serde(rename = "dns.zone_domain_info")]
    ZoneDomainInfo,
    #[serde(rename = "dns.zone_record_list")]
    ZoneRecordList,
    #[serde(rename = "dns.zone_record_create")]
    ZoneRecordCreate,
    #[serde(rename = "dns.zone_record_update")]
    ZoneRecordUpdate,
    #[serde(rename = "dns.zone_record_delete")]
    ZoneRecordDelete,
    #[serde(rename = "dns.reload")]
    Reload,
    #[serde(rename = "job.status")]
    JobStatus,
}

impl ApiMethod {
    /// Wire name of the method, as it appears in the request path.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ZoneList => "dns.zone_list",
            Self::ZoneCreate => "dns.zone_create",
            Self::ZoneUpdate => "dns.zone_update",
            Self::ZoneDelete => "dns.zone_delete",
            Self::ZoneDomainList => "dns.zone_domain_list",
            Self::ZoneDomainCreate => "dns.zone_domain_create",
            Self::ZoneDomainDelete => "dns.zone_domain_delete",
            Self::ZoneDomainInfo => "dns.zone_domain_info",
            Self::ZoneRecordList => "dns.zone_record_list",
            Self::ZoneRecordCreate => "dns.zone_record_create",
            Self::ZoneRecordUpdate => "dns.zone_record_update",
            Self::ZoneRecordDelete => "dns.zone_record_delete",
            Self::Reload => "dns.reload",
            Self::JobStatus => "job.status",
        }
    }

    /// Whether the method changes remote state.
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Self::ZoneCreate
                | Self::ZoneUpdate
                | Self::ZoneDelete
                | Self::ZoneDomainCreate
                | Self::ZoneDomainDelete
                | Self::ZoneRecordCreate
                | Self::ZoneRecordUpdate
                | Self::ZoneRecordDelete
                | Self::Reload
        )
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the API answered a request, derived from the HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    /// 2xx (200/201 in practice).
    Accepted,
    /// 4xx (400/403/404/412 in practice): caller-fixable.
    ClientError,
    /// 5xx (500/503 in practice) and anything unexpected: remote-fixable.
    ServerError,
}

impl ResponseStatus {
    /// Classify an HTTP status code.
    pub fn from_status_code(code: u16) -> Self {
        match code {
            200..=299 => Self::Accepted,
            400..=499 => Self::ClientError,
            _ => Self::ServerError,
        }
    }
}

// ============ Resource Types ============

/// Zone TTL values accepted by the API, in seconds. `0` inherits the default.
pub const ALLOWED_TTLS: [u32; 11] = [
    0, 300, 600, 900, 1800, 3600, 7200, 10800, 21600, 43200, 86400,
];

/// DNS record types managed through zone records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    A,
    #[serde(rename = "AAAA")]
    Aaaa,
    #[serde(rename = "CNAME")]
    Cname,
    #[serde(rename = "MX")]
    Mx,
    #[serde(rename = "NS")]
    Ns,
    #[serde(rename = "SRV")]
    Srv,
    #[serde(rename = "TXT")]
    Txt,
    /// Any type the API reports that this crate does not manage.
    #[serde(other)]
    Unsupported,
}

impl RecordType {
    /// Upper-case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Ns => "NS",
            Self::Srv => "SRV",
            Self::Txt => "TXT",
            Self::Unsupported => "UNSUPPORTED",
        }
    }

    /// Whether the `relative` flag may be set for this type.
    pub fn allows_relative(self) -> bool {
        matches!(self, Self::Cname | Self::Mx | Self::Ns | Self::Srv)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A" => Ok(Self::A),
            "AAAA" => Ok(Self::Aaaa),
            "CNAME" => Ok(Self::Cname),
            "MX" => Ok(Self::Mx),
            "NS" => Ok(Self::Ns),
            "SRV" => Ok(Self::Srv),
            "TXT" => Ok(Self::Txt),
            _ => Err(format!("unsupported record type: {s}")),
        }
    }
}

/// A DNS zone as reported by `dns.zone_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Server-assigned identifier.
    pub id: String,
    /// Human-chosen name; expected to be unique but not enforced remotely.
    pub nickname: String,
    /// Default TTL for the zone's records.
    #[serde(default)]
    pub ttl: u32,
    /// Domains bound to this zone.
    #[serde(default)]
    pub domains: Vec<ZoneDomain>,
    /// Records held by this zone.
    #[serde(default)]
    pub records: Vec<ZoneRecord>,
}

impl Zone {
    /// Whether the zone still owns domains or records.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty() && self.records.is_empty()
    }

    /// Payload for `dns.zone_create` / `dns.zone_update`.
    ///
    /// The id is included only when known (updates).
    pub fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        if !self.id.is_empty() {
            payload.insert("id".to_string(), self.id.clone());
        }
        payload.insert("nickname".to_string(), self.nickname.clone());
        payload.insert("ttl".to_string(), self.ttl.to_string());
        payload
    }
}

/// A domain bound to a zone, as reported by `dns.zone_domain_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDomain {
    /// The API keys domains by name; an id is only present on some responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub domain: String,
    pub zone_id: String,
}

impl ZoneDomain {
    /// Payload for `dns.zone_domain_create`.
    pub fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("domain".to_string(), self.domain.clone());
        payload.insert("zone_id".to_string(), self.zone_id.clone());
        payload
    }
}

/// A resource record held by a zone, as reported by `dns.zone_record_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecord {
    /// Server-assigned identifier; empty for records not created yet.
    #[serde(default)]
    pub id: String,
    pub zone_id: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Sub-domain label; empty for the zone apex.
    #[serde(default)]
    pub record: String,
    /// Record value (IP address, target host, text, ...).
    pub address: String,
    #[serde(default)]
    pub ttl: u32,
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub relative: bool,
}

impl ZoneRecord {
    /// Whether this record has the identity `(zone_id, record, type)` of `other`.
    pub fn same_identity(&self, other: &Self) -> bool {
        self.zone_id == other.zone_id
            && self.record == other.record
            && self.record_type == other.record_type
    }

    /// Payload for `dns.zone_record_create` / `dns.zone_record_update`.
    ///
    /// The id is included only when known (updates).
    pub fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        if !self.id.is_empty() {
            payload.insert("id".to_string(), self.id.clone());
        }
        payload.insert("zone_id".to_string(), self.zone_id.clone());
        payload.insert("type".to_string(), self.record_type.as_str().to_string());
        payload.insert("record".to_string(), self.record.clone());
        payload.insert("address".to_string(), self.address.clone());
        payload.insert("ttl".to_string(), self.ttl.to_string());
        payload.insert("priority".to_string(), self.priority.to_string());
        payload.insert("relative".to_string(), self.relative.to_string());
        payload
    }
}

/// An asynchronous server-side job, as reported by `dns.reload` and `job.status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type", default)]
    pub job_type: String,
}
