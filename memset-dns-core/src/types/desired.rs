//! 期望状态定义

use memset_dns_provider::{RecordType, Zone, ZoneDomain, ZoneRecord};
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::validation::{self, MAX_NAME_LEN, MAX_RECORD_LABEL_LEN};

/// Whether a resource should exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    #[default]
    Present,
    Absent,
}

/// 期望的 Zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSpec {
    /// Zone nickname; must identify exactly one remote zone.
    #[serde(alias = "name")]
    pub nickname: String,
    #[serde(default)]
    pub ttl: u32,
    #[serde(default)]
    pub state: DesiredState,
    /// Delete the zone even while it still owns domains or records.
    #[serde(default)]
    pub force: bool,
}

impl ZoneSpec {
    pub fn present(nickname: impl Into<String>, ttl: u32) -> Self {
        Self {
            nickname: nickname.into(),
            ttl,
            state: DesiredState::Present,
            force: false,
        }
    }

    pub fn absent(nickname: impl Into<String>, force: bool) -> Self {
        Self {
            nickname: nickname.into(),
            ttl: 0,
            state: DesiredState::Absent,
            force,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        validation::require_name("nickname", &self.nickname, MAX_NAME_LEN)?;
        validation::ttl("ttl", self.ttl)
    }

    /// Desired fields as an observed-shaped zone (no id, no children).
    pub(crate) fn to_zone(&self) -> Zone {
        Zone {
            id: String::new(),
            nickname: self.nickname.clone(),
            ttl: self.ttl,
            domains: Vec::new(),
            records: Vec::new(),
        }
    }
}

/// 期望的 Zone Domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDomainSpec {
    pub domain: String,
    /// Nickname of the parent zone.
    pub zone: String,
    #[serde(default)]
    pub state: DesiredState,
}

impl ZoneDomainSpec {
    pub fn present(domain: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            zone: zone.into(),
            state: DesiredState::Present,
        }
    }

    pub fn absent(domain: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            state: DesiredState::Absent,
            ..Self::present(domain, zone)
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        validation::require_name("domain", &self.domain, MAX_NAME_LEN)?;
        validation::require_name("zone", &self.zone, MAX_NAME_LEN)
    }

    pub(crate) fn to_domain(&self, zone_id: &str) -> ZoneDomain {
        ZoneDomain {
            id: None,
            domain: self.domain.clone(),
            zone_id: zone_id.to_string(),
        }
    }
}

/// 期望的 Zone Record
///
/// Identity is `(zone, record, type)`; every observed record sharing it is
/// reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecordSpec {
    /// Nickname of the parent zone.
    pub zone: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Label; empty for the zone apex.
    #[serde(default)]
    pub record: String,
    #[serde(default, alias = "ip", alias = "data")]
    pub address: String,
    #[serde(default)]
    pub ttl: u32,
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub relative: bool,
    #[serde(default)]
    pub state: DesiredState,
}

impl ZoneRecordSpec {
    pub fn new(
        zone: impl Into<String>,
        record_type: RecordType,
        record: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            zone: zone.into(),
            record_type,
            record: record.into(),
            address: address.into(),
            ttl: 0,
            priority: 0,
            relative: false,
            state: DesiredState::Present,
        }
    }

    #[must_use]
    pub fn absent(mut self) -> Self {
        self.state = DesiredState::Absent;
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        validation::require_name("zone", &self.zone, MAX_NAME_LEN)?;
        validation::record_type(self.record_type)?;
        validation::max_len("record", &self.record, MAX_RECORD_LABEL_LEN)?;
        if self.state == DesiredState::Present {
            validation::require_name("address", &self.address, MAX_NAME_LEN)?;
        } else {
            validation::max_len("address", &self.address, MAX_NAME_LEN)?;
        }
        validation::ttl("ttl", self.ttl)?;
        validation::priority(self.priority)?;
        validation::relative(self.relative, self.record_type)
    }

    /// Short label used in messages, e.g. `www A` or `@ MX`.
    pub fn label(&self) -> String {
        let record = if self.record.is_empty() {
            "@"
        } else {
            self.record.as_str()
        };
        format!("{record} {}", self.record_type)
    }

    pub(crate) fn to_record(&self, zone_id: &str) -> ZoneRecord {
        ZoneRecord {
            id: String::new(),
            zone_id: zone_id.to_string(),
            record_type: self.record_type,
            record: self.record.clone(),
            address: self.address.clone(),
            ttl: self.ttl,
            priority: self.priority,
            relative: self.relative,
        }
    }
}
