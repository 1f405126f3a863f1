//! 按名称查找资源
//!
//! Names are compared exactly (case-sensitive). A name matching several
//! resources is an error; the first match is never picked silently.

use memset_dns_provider::{Zone, ZoneDomain};

use crate::error::CoreError;

/// A resource addressed by a human-chosen name.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Zone {
    fn name(&self) -> &str {
        &self.nickname
    }
}

impl Named for ZoneDomain {
    fn name(&self) -> &str {
        &self.domain
    }
}

/// Why a name did not resolve to exactly one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    NotFound,
    Ambiguous { count: usize },
}

impl LookupError {
    /// Error for a parent resource that must exist and be unique.
    pub fn into_dependency_error(self, resource: &str, name: &str) -> CoreError {
        let reason = match self {
            Self::NotFound => "does not exist".to_string(),
            Self::Ambiguous { count } => format!("matches {count} resources"),
        };
        CoreError::DependencyUnresolved {
            resource: resource.to_string(),
            name: name.to_string(),
            reason,
        }
    }
}

/// All candidates whose name equals `name`.
pub fn matches<'a, T: Named>(name: &str, candidates: &'a [T]) -> Vec<&'a T> {
    candidates.iter().filter(|c| c.name() == name).collect()
}

/// The unique candidate named `name`.
pub fn resolve<'a, T: Named>(name: &str, candidates: &'a [T]) -> Result<&'a T, LookupError> {
    let found = matches(name, candidates);
    match found.as_slice() {
        [] => Err(LookupError::NotFound),
        [only] => Ok(*only),
        _ => Err(LookupError::Ambiguous { count: found.len() }),
    }
}

/// Resolve a zone by nickname, returning it only when unique.
pub fn resolve_zone<'a>(nickname: &str, zones: &'a [Zone]) -> Result<&'a Zone, LookupError> {
    resolve(nickname, zones)
}
