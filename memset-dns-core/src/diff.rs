//! 期望状态与实际状态比对
//!
//! [`decide`] compares one desired resource against every observed candidate
//! sharing its identity and returns one decision per candidate (fan-out), or a
//! single `Create` when nothing matches.

use memset_dns_provider::{Payload, Zone, ZoneRecord};

/// A resource kind the diff engine can reconcile.
pub trait Reconcilable: Clone + PartialEq {
    /// Server-assigned id; empty for desired resources.
    fn id(&self) -> &str;

    /// Whether `other` has the same identity key.
    fn same_key(&self, other: &Self) -> bool;

    /// `observed` overridden field by field with the desired values; the
    /// observed id is kept.
    fn merge_onto(&self, observed: &Self) -> Self;

    /// Remote payload for create/update.
    fn to_payload(&self) -> Payload;
}

impl Reconcilable for ZoneRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn same_key(&self, other: &Self) -> bool {
        self.same_identity(other)
    }

    fn merge_onto(&self, observed: &Self) -> Self {
        Self {
            id: observed.id.clone(),
            zone_id: self.zone_id.clone(),
            record_type: self.record_type,
            record: self.record.clone(),
            address: self.address.clone(),
            ttl: self.ttl,
            priority: self.priority,
            relative: self.relative,
        }
    }

    fn to_payload(&self) -> Payload {
        ZoneRecord::to_payload(self)
    }
}

impl Reconcilable for Zone {
    fn id(&self) -> &str {
        &self.id
    }

    fn same_key(&self, other: &Self) -> bool {
        self.nickname == other.nickname
    }

    // 只有 ttl 可由调用方指定；domains / records 沿用实际值
    fn merge_onto(&self, observed: &Self) -> Self {
        Self {
            ttl: self.ttl,
            ..observed.clone()
        }
    }

    fn to_payload(&self) -> Payload {
        Zone::to_payload(self)
    }
}

/// What to do about one observed candidate (or the lack of one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<T> {
    /// Candidate already matches.
    NoOp { id: String },
    /// Nothing matched; create the desired resource.
    Create(T),
    /// Candidate differs; `merged` is the full updated resource.
    Update { id: String, merged: T },
}

impl<T: Reconcilable> Decision<T> {
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp { .. })
    }

    /// Payload of the remote call, `None` for `NoOp`.
    pub fn payload(&self) -> Option<Payload> {
        match self {
            Self::NoOp { .. } => None,
            Self::Create(desired) => Some(desired.to_payload()),
            Self::Update { merged, .. } => Some(merged.to_payload()),
        }
    }
}

pub fn decide<T: Reconcilable>(desired: &T, candidates: &[T]) -> Vec<Decision<T>> {
    let decisions: Vec<Decision<T>> = candidates
        .iter()
        .filter(|observed| desired.same_key(observed))
        .map(|observed| {
            let merged = desired.merge_onto(observed);
            if merged == *observed {
                Decision::NoOp {
                    id: observed.id().to_string(),
                }
            } else {
                Decision::Update {
                    id: observed.id().to_string(),
                    merged,
                }
            }
        })
        .collect();

    if decisions.is_empty() {
        vec![Decision::Create(desired.clone())]
    } else {
        decisions
    }
}

/// Whether every decision is a `NoOp`.
pub fn all_noop<T: Reconcilable>(decisions: &[Decision<T>]) -> bool {
    decisions.iter().all(Decision::is_noop)
}
