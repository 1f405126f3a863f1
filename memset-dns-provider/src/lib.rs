//! # memset-dns-provider
//!
//! Typed access to the DNS part of the [Memset](https://www.memset.com/) JSON API:
//! zones, zone domains, zone records, and the asynchronous reload job.
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls. Recommended for static builds and cross-compilation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use memset_dns_provider::{ApiClient, ClientConfig, MemsetClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Build a client from MEMSET_API_KEY / MEMSET_API_URL
//!     let client = MemsetClient::new(ClientConfig::from_env()?)?;
//!
//!     // 2. List zones with their domains and records
//!     for zone in client.list_zones().await? {
//!         println!("{} ({} domains, {} records)", zone.nickname, zone.domains.len(), zone.records.len());
//!     }
//!
//!     // 3. Ask for committed changes to be propagated
//!     let job = client.reload().await?;
//!     println!("reload job {} finished={}", job.id, job.finished);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every call returns [`Result<T, ProviderError>`](ProviderError):
//!
//! - [`ProviderError::NetworkError`] / [`ProviderError::Timeout`]: transport failure
//! - [`ProviderError::ClientError`]: HTTP 4xx, the request was refused
//! - [`ProviderError::ServerError`]: HTTP 5xx, the API failed
//! - [`ProviderError::ParseError`]: the body did not have the expected shape
//!
//! The client performs exactly one HTTP request per call and never retries.

mod client;
mod config;
mod error;
mod http_client;
mod traits;
mod types;
mod utils;

pub use client::MemsetClient;
pub use config::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    ENV_API_KEY, ENV_API_URL,
};
pub use error::{ProviderError, Result};
pub use http_client::HttpUtils;
pub use traits::ApiClient;
pub use types::{
    ALLOWED_TTLS, ApiMethod, Job, Payload, RecordType, ResponseStatus, Zone, ZoneDomain,
    ZoneRecord,
};

pub use utils::log_sanitizer;
