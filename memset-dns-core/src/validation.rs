//! 输入校验
//!
//! Limits enforced by the Memset API, checked locally so that an invalid desired
//! state never reaches the remote side.

use memset_dns_provider::{RecordType, ALLOWED_TTLS};

use crate::error::{CoreError, CoreResult};

/// Maximum length of zone nicknames, domain names and record addresses.
pub const MAX_NAME_LEN: usize = 250;
/// Maximum length of a record label.
pub const MAX_RECORD_LABEL_LEN: usize = 63;
/// Highest accepted record priority.
pub const MAX_PRIORITY: u32 = 999;

/// 非空且不超过 `limit` 个字符
pub fn require_name(field: &str, value: &str, limit: usize) -> CoreResult<()> {
    if value.is_empty() {
        return Err(CoreError::validation(field, "must not be empty"));
    }
    max_len(field, value, limit)
}

/// 不超过 `limit` 个字符（允许为空）
pub fn max_len(field: &str, value: &str, limit: usize) -> CoreResult<()> {
    let len = value.chars().count();
    if len > limit {
        return Err(CoreError::validation(
            field,
            format!("must be at most {limit} characters, got {len}"),
        ));
    }
    Ok(())
}

pub fn ttl(field: &str, value: u32) -> CoreResult<()> {
    if ALLOWED_TTLS.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::validation(
            field,
            format!("{value} is not one of {ALLOWED_TTLS:?}"),
        ))
    }
}

pub fn priority(value: u32) -> CoreResult<()> {
    if value > MAX_PRIORITY {
        return Err(CoreError::validation(
            "priority",
            format!("must be in the range 0..={MAX_PRIORITY}, got {value}"),
        ));
    }
    Ok(())
}

pub fn record_type(value: RecordType) -> CoreResult<()> {
    if value == RecordType::Unsupported {
        return Err(CoreError::validation(
            "type",
            "must be one of A, AAAA, CNAME, MX, NS, SRV, TXT",
        ));
    }
    Ok(())
}

/// `relative` 仅适用于 CNAME / MX / NS / SRV
pub fn relative(value: bool, record_type: RecordType) -> CoreResult<()> {
    if value && !record_type.allows_relative() {
        return Err(CoreError::validation(
            "relative",
            format!("is only valid for CNAME, MX, NS and SRV records, not {record_type}"),
        ));
    }
    Ok(())
}
