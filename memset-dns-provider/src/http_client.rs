//! Generic HTTP client tools
//!
//! Sending a request, logging it and classifying the answer are shared by every
//! API method. Decoding the body into a concrete type is left to the caller.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ProviderError;
use crate::types::{ApiMethod, ResponseStatus};
use crate::utils::log_sanitizer::truncate_for_log;

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Performs an HTTP request and returns the status code and response text.
    ///
    /// # Returns
    /// * `Ok((status_code, response_text))` - whatever the status code
    /// * `Err(ProviderError::Timeout | ProviderError::NetworkError)` - transport failure
    pub async fn execute_request(
        request_builder: RequestBuilder,
        method: ApiMethod,
    ) -> Result<(u16, String), ProviderError> {
        log::debug!("[{method}] POST");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    method: method.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ProviderError::NetworkError {
                    method: method.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[{method}] Response Status: {status_code}");

        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError {
                method: method.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[{method}] Response Body: {}",
            truncate_for_log(&response_text)
        );

        Ok((status_code, response_text))
    }

    /// Classify a response and decode the body of accepted ones.
    ///
    /// An empty accepted body decodes to `Value::Null`.
    pub fn interpret_response(
        method: ApiMethod,
        status_code: u16,
        response_text: &str,
    ) -> Result<Value, ProviderError> {
        match ResponseStatus::from_status_code(status_code) {
            ResponseStatus::Accepted => {
                if response_text.trim().is_empty() {
                    return Ok(Value::Null);
                }
                Self::parse_json(response_text, method)
            }
            ResponseStatus::ClientError => {
                let raw_message = extract_error_message(response_text);
                log::warn!("[{method}] Request rejected (HTTP {status_code})");
                Err(ProviderError::ClientError {
                    method: method.to_string(),
                    status: status_code,
                    raw_message,
                })
            }
            ResponseStatus::ServerError => {
                let raw_message = extract_error_message(response_text);
                log::error!("[{method}] Server error (HTTP {status_code})");
                Err(ProviderError::ServerError {
                    method: method.to_string(),
                    status: status_code,
                    raw_message,
                })
            }
        }
    }

    /// Parse JSON response
    ///
    /// # Returns
    /// * `Ok(T)` - successfully parsed
    /// * `Err(ProviderError::ParseError)` - parsing failed
    pub fn parse_json<T>(response_text: &str, method: ApiMethod) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!("[{method}] JSON parse failed: {e}");
            log::error!("[{method}] Raw response: {}", truncate_for_log(response_text));
            ProviderError::ParseError {
                method: method.to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// Decode an already-parsed body into a concrete type.
    pub fn decode<T>(body: Value, method: ApiMethod) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(body).map_err(|e| {
            log::error!("[{method}] Unexpected response shape: {e}");
            ProviderError::ParseError {
                method: method.to_string(),
                detail: e.to_string(),
            }
        })
    }
}

/// Pull a human-readable message out of an error body.
///
/// The API answers errors with `{"error_type": ..., "error": "..."}`; anything
/// else is returned truncated, and an empty body yields `None`.
fn extract_error_message(response_text: &str) -> Option<String> {
    if response_text.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(response_text) {
        Ok(Value::Object(map)) => map
            .get("error")
            .or_else(|| map.get("error_type"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(truncate_for_log(response_text))),
        Ok(Value::String(s)) => Some(s),
        _ => Some(truncate_for_log(response_text)),
    }
}
