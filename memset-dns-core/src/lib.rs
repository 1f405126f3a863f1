//! Memset DNS Core Library
//!
//! Reconciles a declared desired state of Memset DNS resources against what the
//! API reports, including:
//! - Zone / zone domain / zone record reconciliation (create, update, delete)
//! - Unique name resolution and desired-vs-observed diffing
//! - Reload requests with bounded job polling
//!
//! The library does not talk HTTP itself; it drives any
//! [`ApiClient`](memset_dns_provider::ApiClient) implementation injected through
//! [`ServiceContext`].

pub mod diff;
pub mod error;
pub mod poller;
pub mod resolver;
pub mod services;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult, ErrorKind};
pub use poller::{JobOutcome, JobPoller, PollConfig};
pub use services::{ReconcileOptions, Reconciler, ServiceContext};
pub use types::{Manifest, ManifestReport, ReconcileResult};
