//! reqwest-backed [`ApiClient`] talking to the Memset JSON API

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::traits::ApiClient;
use crate::types::{ApiMethod, Payload};
use crate::utils::log_sanitizer::truncate_for_log;

/// Memset API client
///
/// Every call is a form-encoded `POST {base_url}/{method}/` carrying the API key.
/// No retries are attempted.
pub struct MemsetClient {
    client: Client,
    config: ClientConfig,
}

impl MemsetClient {
    /// Build a client; fails if the configuration is unusable.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::InvalidConfig {
                field: "http_client".to_string(),
                detail: e.to_string(),
            })?;
        Ok(Self { client, config })
    }

    /// Configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl std::fmt::Debug for MemsetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemsetClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ApiClient for MemsetClient {
    async fn invoke(&self, method: ApiMethod, payload: &Payload) -> Result<Value> {
        let url = self.config.method_url(method);
        log::debug!(
            "[{method}] {url} payload: {}",
            truncate_for_log(&format!("{payload:?}"))
        );

        // api_key 只加入发送副本，不写入日志
        let mut form = payload.clone();
        form.insert("api_key".to_string(), self.config.api_key.clone());

        let request = self.client.post(&url).form(&form);
        let (status_code, response_text) = HttpUtils::execute_request(request, method).await?;
        HttpUtils::interpret_response(method, status_code, &response_text)
    }
}
