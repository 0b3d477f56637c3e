//! Generic HTTP client tools
//!
//! Reusable HTTP request processing shared by every operation: sending
//! requests, logging, reading responses, classifying transport failures and
//! retrying the transient ones. Status validation and response decoding stay
//! in the request layer, which knows each operation's contract.

use reqwest::RequestBuilder;
use std::time::Duration;

use crate::error::GraphError;
use crate::utils::log_sanitizer::truncate_for_log;

/// HTTP tool function set
pub(crate) struct HttpUtils;

impl HttpUtils {
    /// Performs an HTTP request and returns the status code and response text.
    ///
    /// Unified processing: sending the request, logging, transport error
    /// classification. The body is fully read on every path.
    ///
    /// # Arguments
    /// * `request_builder` - configured request constructor (including URL, headers, body, etc.)
    /// * `operation` - operation name (for logging and error attribution)
    /// * `method` - HTTP method name (such as "GET", "POST", used for logs)
    /// * `url` - request URL (for logging)
    ///
    /// # Returns
    /// * `Ok((status_code, response_text))` - status code and response text, any status
    /// * `Err(GraphError)` - transport failure, HTTP 429 or HTTP 502-504
    pub async fn execute_request(
        request_builder: RequestBuilder,
        operation: &str,
        method: &str,
        url: &str,
    ) -> Result<(u16, String), GraphError> {
        log::debug!("[{operation}] {method} {url}");

        // Send request
        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GraphError::Timeout {
                    operation: operation.to_string(),
                    detail: e.to_string(),
                }
            } else {
                GraphError::Network {
                    operation: operation.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[{operation}] Response Status: {status_code}");

        // Extract Retry-After header (before consuming response body)
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        // Returns RateLimited error for HTTP 429
        if status_code == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{operation}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(GraphError::RateLimited {
                operation: operation.to_string(),
                retry_after,
                raw_message: Some(body),
            });
        }

        // Return Network for 502/503/504 (can be retried)
        if matches!(status_code, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{operation}] Server error (HTTP {status_code})");
            return Err(GraphError::Network {
                operation: operation.to_string(),
                detail: format!("HTTP {status_code}: {body}"),
            });
        }

        // Read response body
        let response_text = response.text().await.map_err(|e| GraphError::Network {
            operation: operation.to_string(),
            detail: format!("Failed to read response body: {e}"),
        })?;

        log::debug!(
            "[{operation}] Response Body: {}",
            truncate_for_log(&response_text)
        );

        Ok((status_code, response_text))
    }

    /// Performs an HTTP request and returns response text (with retries)
    ///
    /// Automatically retry transport errors, using an exponential backoff strategy.
    ///
    /// # Arguments
    /// * `request_builder` - configured request constructor
    /// * `operation` - operation name
    /// * `method` - HTTP method name
    /// * `url` - request URL
    /// * `max_retries` - Maximum number of retries (0 means no retries)
    ///
    /// # Returns
    /// * `Ok((status_code, response_text))` - status code and response text on success
    /// * `Err(GraphError)` - the last error returned after all retries have failed
    ///
    /// # Retry strategy
    /// - Only retry transient errors (`Network`, `Timeout`, `RateLimited`)
    /// - Exponential backoff: 100ms, 200ms, 400ms, 800ms, ... (maximum 10 seconds)
    /// - `Retry-After` from the service is honored, capped at 30 seconds
    /// - Non-transient statuses are returned to the caller for validation
    pub async fn execute_request_with_retry(
        request_builder: RequestBuilder,
        operation: &str,
        method: &str,
        url: &str,
        max_retries: u32,
    ) -> Result<(u16, String), GraphError> {
        if max_retries == 0 {
            // Do not retry, execute directly
            return Self::execute_request(request_builder, operation, method, url).await;
        }

        let mut last_error = None;

        for attempt in 0..=max_retries {
            // Clone the request (RequestBuilder can only be used once)
            let Some(req) = request_builder.try_clone() else {
                // Unable to clone (usually caused by body stream), fallback to not retrying
                log::warn!("[{operation}] Cannot clone request, disabling retry");
                return Self::execute_request(request_builder, operation, method, url).await;
            };

            match Self::execute_request(req, operation, method, url).await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < max_retries && is_retryable(&e) => {
                    let delay = retry_delay(&e, attempt);
                    log::warn!(
                        "[{}] Request failed (attempt {}/{}), retrying in {:.1}s: {}",
                        operation,
                        attempt + 1,
                        max_retries,
                        delay.as_secs_f32(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| GraphError::Network {
            operation: operation.to_string(),
            detail: "All retries exhausted with no error captured".to_string(),
        }))
    }
}

/// Determine whether the error can be retried
///
/// Network errors, timeouts and rate limits are suitable for retrying.
/// Status-mapped errors (authentication failure, domain not found, conflict)
/// and decode failures should not be retried here.
fn is_retryable(error: &GraphError) -> bool {
    matches!(
        error,
        GraphError::Network { .. } | GraphError::Timeout { .. } | GraphError::RateLimited { .. }
    )
}

/// Calculate retry delay
///
/// Use this value (capped at 30s) when the error is `RateLimited` and contains `retry_after`.
/// Otherwise exponential backoff is used.
fn retry_delay(error: &GraphError, attempt: u32) -> Duration {
    if let GraphError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(30))
    } else {
        backoff_delay(attempt)
    }
}

/// Calculate exponential backoff delay
///
/// Backoff strategy: 100ms, 200ms, 400ms, 800ms, 1.6s, ...
/// Maximum delay limit is 10 seconds
pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20); // Prevent 2^attempt from overflowing
    let delay_ms = 100_u64.saturating_mul(1_u64 << capped_attempt);
    let delay_ms = delay_ms.min(10_000); // Maximum 10 seconds
    Duration::from_millis(delay_ms)
}
