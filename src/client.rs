//! Base request layer shared by every operation.
//!
//! [`BaseClient`] owns the HTTP client and configuration, builds URLs of the
//! shape `{endpoint}/{version}/{tenant_id}{entity}`, executes request
//! descriptors ([`RequestSpec`]) through the transport layer, validates the
//! returned status against the descriptor's accepted set, retries 404s for
//! descriptors that opt in, and maps rejected statuses onto [`GraphError`].

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{GraphError, Result};
use crate::http_client::{HttpUtils, backoff_delay};
use crate::odata::Query;
use crate::types::Collection;
use crate::utils::log_sanitizer::truncate_for_log;

/// 默认服务端点
pub const DEFAULT_ENDPOINT: &str = "https://graph.microsoft.com";

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Transport-level retries per request (network, timeout, rate limit).
const TRANSPORT_MAX_RETRIES: u32 = 3;
/// Replication-lag retries for descriptors with [`ConsistencyRetry::RetryOn404`].
const CONSISTENCY_MAX_RETRIES: u32 = 6;

/// API version segment of the request URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiVersion {
    /// `v1.0`
    #[default]
    V1_0,
    /// `beta`
    Beta,
}

impl ApiVersion {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1_0 => "v1.0",
            Self::Beta => "beta",
        }
    }
}

/// Per-client configuration. No process-wide state; construct one per tenant.
#[derive(Clone)]
pub struct ClientConfig {
    /// Service endpoint, without a trailing slash.
    pub endpoint: String,
    /// API version segment.
    pub api_version: ApiVersion,
    /// Tenant ID interpolated into tenant-scoped request paths.
    pub tenant_id: String,
    /// OAuth2 bearer access token. Acquiring and refreshing it is the
    /// caller's concern.
    pub access_token: String,
}

impl ClientConfig {
    /// Configuration with the default endpoint and `v1.0` API version.
    #[must_use]
    pub fn new(tenant_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_version: ApiVersion::default(),
            tenant_id: tenant_id.into(),
            access_token: access_token.into(),
        }
    }

    /// Override the service endpoint (national clouds, test doubles).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Select the API version.
    #[must_use]
    pub fn with_api_version(mut self, api_version: ApiVersion) -> Self {
        self.api_version = api_version;
        self
    }
}

// 手动实现 Debug，避免 access_token 泄漏到日志
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("tenant_id", &self.tenant_id)
            .field("access_token", &"***")
            .finish()
    }
}

/// Replication-lag compensation policy attached per request.
///
/// Directory writes replicate with a delay; a read issued right after a write
/// can 404 even though the entity exists. Descriptors that address an entity
/// which may have just been created opt in with [`RetryOn404`](Self::RetryOn404).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsistencyRetry {
    /// 404 is surfaced immediately.
    #[default]
    None,
    /// 404 outside the accepted set is retried with backoff before surfacing.
    RetryOn404,
}

/// Request descriptor: everything one operation call needs the base layer to know.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub(crate) operation: &'static str,
    pub(crate) entity: String,
    pub(crate) tenant_scoped: bool,
    pub(crate) query: Query,
    pub(crate) valid_status: Vec<u16>,
    pub(crate) consistency: ConsistencyRetry,
    pub(crate) domain: Option<String>,
}

impl RequestSpec {
    /// Descriptor for `entity` with defaults: tenant-scoped, no query options,
    /// accepts HTTP 200 only, no consistency retry.
    #[must_use]
    pub fn new(operation: &'static str, entity: impl Into<String>) -> Self {
        Self {
            operation,
            entity: entity.into(),
            tenant_scoped: true,
            query: Query::default(),
            valid_status: vec![200],
            consistency: ConsistencyRetry::default(),
            domain: None,
        }
    }

    /// Attach OData query options.
    #[must_use]
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Replace the accepted status set.
    #[must_use]
    pub fn with_valid_status(mut self, valid_status: Vec<u16>) -> Self {
        self.valid_status = valid_status;
        self
    }

    /// Attach a consistency retry policy.
    #[must_use]
    pub fn with_consistency(mut self, consistency: ConsistencyRetry) -> Self {
        self.consistency = consistency;
        self
    }

    /// Record the domain name this request addresses, for error context.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Address the entity without the tenant path segment.
    #[must_use]
    pub fn without_tenant(mut self) -> Self {
        self.tenant_scoped = false;
        self
    }
}

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// OData 错误码（如 `Request_ResourceNotFound`）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 请求所针对的域名（用于 `DomainNotFound` / `DomainExists`）
    pub domain: Option<String>,
}

/// Parse the OData error envelope `{"error": {"code": ..., "message": ...}}`.
///
/// Non-JSON or unexpectedly shaped bodies fall back to the truncated raw body
/// as the message, so something always survives into the error value.
pub(crate) fn parse_api_error(body: &str) -> RawApiError {
    #[derive(serde::Deserialize)]
    struct Envelope {
        error: Option<Body>,
    }
    #[derive(serde::Deserialize)]
    struct Body {
        code: Option<String>,
        message: Option<String>,
    }

    if let Ok(Envelope { error: Some(body) }) = serde_json::from_str::<Envelope>(body) {
        let message = body.message.unwrap_or_else(|| "Unknown error".to_string());
        return match body.code {
            Some(code) => RawApiError::with_code(code, message),
            None => RawApiError::new(message),
        };
    }

    if body.trim().is_empty() {
        RawApiError::new("Unknown error")
    } else {
        RawApiError::new(truncate_for_log(body))
    }
}

/// Map a rejected HTTP status onto the unified error type.
pub(crate) fn map_status_error(
    operation: &'static str,
    status: u16,
    raw: RawApiError,
    context: ErrorContext,
) -> GraphError {
    let raw_message = (!raw.message.is_empty()).then_some(raw.message.clone());
    match status {
        401 => GraphError::InvalidCredentials {
            operation: operation.to_string(),
            status,
            raw_message,
        },
        403 => GraphError::PermissionDenied {
            operation: operation.to_string(),
            status,
            raw_message,
        },
        404 => GraphError::DomainNotFound {
            operation: operation.to_string(),
            status,
            domain: context.domain,
            raw_message,
        },
        409 => GraphError::DomainExists {
            operation: operation.to_string(),
            status,
            domain: context.domain,
            raw_message,
        },
        _ => GraphError::UnexpectedStatus {
            operation: operation.to_string(),
            status,
            raw_code: raw.code,
            raw_message: raw.message,
        },
    }
}

/// Decode a single entity out of a response body.
///
/// The status is the one the service returned; it rides in the error so a
/// decode failure stays distinguishable from a status failure.
pub(crate) fn decode_object<T: DeserializeOwned>(
    operation: &'static str,
    status: u16,
    body: &str,
) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        log::error!("[{operation}] JSON decode failed: {e}");
        log::error!("[{operation}] Raw response: {}", truncate_for_log(body));
        GraphError::Decode {
            operation: operation.to_string(),
            status,
            detail: e.to_string(),
        }
    })
}

/// Decode a `{"value": [...]}` collection envelope out of a response body.
///
/// Dedicated step so the entity decode above stays reusable for single-entity
/// responses.
pub(crate) fn decode_collection<T: DeserializeOwned>(
    operation: &'static str,
    status: u16,
    body: &str,
) -> Result<Collection<T>> {
    decode_object::<Collection<T>>(operation, status, body)
}

/// 创建带超时配置的 HTTP Client
fn create_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
}

/// Shared base client executing request descriptors.
///
/// Cheap to clone (the underlying HTTP client is reference-counted) and
/// `Send + Sync`, so one instance can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct BaseClient {
    http: Client,
    config: ClientConfig,
}

impl BaseClient {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: create_http_client(),
            config,
        }
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute a GET request.
    pub async fn get(&self, spec: &RequestSpec) -> Result<(u16, String)> {
        self.send(Method::GET, spec, None).await
    }

    /// Execute a POST request with an optional JSON body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        spec: &RequestSpec,
        body: Option<&B>,
    ) -> Result<(u16, String)> {
        let body = self.serialize_body(spec, body)?;
        self.send(Method::POST, spec, body).await
    }

    /// Execute a PATCH request with a JSON body.
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        spec: &RequestSpec,
        body: &B,
    ) -> Result<(u16, String)> {
        let body = self.serialize_body(spec, Some(body))?;
        self.send(Method::PATCH, spec, body).await
    }

    /// Execute a DELETE request.
    pub async fn delete(&self, spec: &RequestSpec) -> Result<(u16, String)> {
        self.send(Method::DELETE, spec, None).await
    }

    /// Build the request URL: `{endpoint}/{version}[/{tenant_id}]{entity}[?options]`.
    pub(crate) fn build_url(&self, spec: &RequestSpec) -> String {
        let mut url = format!(
            "{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.api_version.as_str()
        );
        if spec.tenant_scoped {
            url.push('/');
            url.push_str(&self.config.tenant_id);
        }
        url.push_str(&spec.entity);

        let pairs = spec.query.query_pairs();
        if !pairs.is_empty() {
            let query_string: Vec<String> = pairs
                .iter()
                .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
                .collect();
            url.push('?');
            url.push_str(&query_string.join("&"));
        }
        url
    }

    fn serialize_body<B: Serialize + ?Sized>(
        &self,
        spec: &RequestSpec,
        body: Option<&B>,
    ) -> Result<Option<String>> {
        match body {
            Some(b) => serde_json::to_string(b)
                .map(Some)
                .map_err(|e| GraphError::Serialization {
                    operation: spec.operation.to_string(),
                    detail: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn request_builder(
        &self,
        method: Method,
        url: &str,
        spec: &RequestSpec,
        body: Option<&str>,
    ) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.config.access_token))
            .header("Accept", spec.query.accept_header());
        if let Some(level) = spec.query.consistency_level_header() {
            builder = builder.header("ConsistencyLevel", level);
        }
        if let Some(body) = body {
            builder = builder
                .header("Content-Type", "application/json")
                .body(body.to_string());
        }
        builder
    }

    /// Execute the descriptor: transport retries inside each attempt, then
    /// status validation, then the consistency retry loop for opted-in 404s.
    async fn send(
        &self,
        method: Method,
        spec: &RequestSpec,
        body: Option<String>,
    ) -> Result<(u16, String)> {
        let url = self.build_url(spec);

        let mut attempt = 0;
        loop {
            let builder = self.request_builder(method.clone(), &url, spec, body.as_deref());
            let (status, text) = HttpUtils::execute_request_with_retry(
                builder,
                spec.operation,
                method.as_str(),
                &url,
                TRANSPORT_MAX_RETRIES,
            )
            .await?;

            if spec.valid_status.contains(&status) {
                return Ok((status, text));
            }

            if status == 404
                && spec.consistency == ConsistencyRetry::RetryOn404
                && attempt < CONSISTENCY_MAX_RETRIES
            {
                let delay = backoff_delay(attempt);
                log::warn!(
                    "[{}] HTTP 404, retrying in {:.1}s for replication lag (attempt {}/{})",
                    spec.operation,
                    delay.as_secs_f32(),
                    attempt + 1,
                    CONSISTENCY_MAX_RETRIES
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            let raw = parse_api_error(&text);
            let error = map_status_error(
                spec.operation,
                status,
                raw,
                ErrorContext {
                    domain: spec.domain.clone(),
                },
            );
            if error.is_expected() {
                log::warn!("API error: {error}");
            } else {
                log::error!("API error: {error}");
            }
            return Err(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odata::Query;
    use crate::types::Domain;

    fn client() -> BaseClient {
        BaseClient::new(ClientConfig::new("tenant-id", "secret-token"))
    }

    // ---- ApiVersion ----

    #[test]
    fn api_version_segments() {
        assert_eq!(ApiVersion::V1_0.as_str(), "v1.0");
        assert_eq!(ApiVersion::Beta.as_str(), "beta");
    }

    #[test]
    fn api_version_default_is_v1_0() {
        assert_eq!(ApiVersion::default(), ApiVersion::V1_0);
    }

    // ---- ClientConfig ----

    #[test]
    fn config_debug_redacts_token() {
        let config = ClientConfig::new("tenant-id", "secret-token");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("***"));
        assert!(debug.contains("tenant-id"));
    }

    #[test]
    fn config_defaults() {
        let config = ClientConfig::new("t", "tok");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.api_version, ApiVersion::V1_0);
    }

    // ---- RequestSpec ----

    #[test]
    fn spec_defaults() {
        let spec = RequestSpec::new("ListDomains", "/domains");
        assert!(spec.tenant_scoped);
        assert_eq!(spec.valid_status, vec![200]);
        assert_eq!(spec.consistency, ConsistencyRetry::None);
        assert_eq!(spec.domain, None);
    }

    // ---- build_url ----

    #[test]
    fn url_tenant_scoped() {
        let spec = RequestSpec::new("ListDomains", "/domains");
        assert_eq!(
            client().build_url(&spec),
            "https://graph.microsoft.com/v1.0/tenant-id/domains"
        );
    }

    #[test]
    fn url_without_tenant() {
        let spec = RequestSpec::new("ListDomains", "/domains").without_tenant();
        assert_eq!(
            client().build_url(&spec),
            "https://graph.microsoft.com/v1.0/domains"
        );
    }

    #[test]
    fn url_beta_version() {
        let config =
            ClientConfig::new("tenant-id", "tok").with_api_version(ApiVersion::Beta);
        let client = BaseClient::new(config);
        let spec = RequestSpec::new("ListDomains", "/domains");
        assert_eq!(
            client.build_url(&spec),
            "https://graph.microsoft.com/beta/tenant-id/domains"
        );
    }

    #[test]
    fn url_custom_endpoint_trailing_slash_trimmed() {
        let config =
            ClientConfig::new("tenant-id", "tok").with_endpoint("https://graph.example.cn/");
        let client = BaseClient::new(config);
        let spec = RequestSpec::new("ListDomains", "/domains");
        assert_eq!(
            client.build_url(&spec),
            "https://graph.example.cn/v1.0/tenant-id/domains"
        );
    }

    #[test]
    fn url_query_values_percent_encoded() {
        let spec = RequestSpec::new("ListDomains", "/domains")
            .with_query(Query::default().with_filter("isVerified eq true"));
        assert_eq!(
            client().build_url(&spec),
            "https://graph.microsoft.com/v1.0/tenant-id/domains?$filter=isVerified%20eq%20true"
        );
    }

    #[test]
    fn url_entity_path_interpolated_verbatim() {
        let spec = RequestSpec::new("GetDomain", "/domains/example.com");
        assert_eq!(
            client().build_url(&spec),
            "https://graph.microsoft.com/v1.0/tenant-id/domains/example.com"
        );
    }

    // ---- parse_api_error ----

    #[test]
    fn parse_odata_error_envelope() {
        let body = r#"{"error":{"code":"Request_ResourceNotFound","message":"Resource 'example.com' does not exist."}}"#;
        let raw = parse_api_error(body);
        assert_eq!(raw.code.as_deref(), Some("Request_ResourceNotFound"));
        assert_eq!(raw.message, "Resource 'example.com' does not exist.");
    }

    #[test]
    fn parse_error_without_code() {
        let body = r#"{"error":{"message":"boom"}}"#;
        let raw = parse_api_error(body);
        assert_eq!(raw.code, None);
        assert_eq!(raw.message, "boom");
    }

    #[test]
    fn parse_error_non_json_body() {
        let raw = parse_api_error("<html>Bad Gateway</html>");
        assert_eq!(raw.code, None);
        assert_eq!(raw.message, "<html>Bad Gateway</html>");
    }

    #[test]
    fn parse_error_empty_body() {
        let raw = parse_api_error("");
        assert_eq!(raw.message, "Unknown error");
    }

    // ---- map_status_error ----

    #[test]
    fn map_401_invalid_credentials() {
        let e = map_status_error(
            "ListDomains",
            401,
            RawApiError::with_code("InvalidAuthenticationToken", "token expired"),
            ErrorContext::default(),
        );
        assert!(matches!(
            e,
            GraphError::InvalidCredentials { status: 401, .. }
        ));
    }

    #[test]
    fn map_403_permission_denied() {
        let e = map_status_error(
            "DeleteDomain",
            403,
            RawApiError::new("insufficient privileges"),
            ErrorContext::default(),
        );
        assert!(matches!(e, GraphError::PermissionDenied { status: 403, .. }));
    }

    #[test]
    fn map_404_domain_not_found_with_context() {
        let e = map_status_error(
            "GetDomain",
            404,
            RawApiError::with_code("Request_ResourceNotFound", "not found"),
            ErrorContext {
                domain: Some("example.com".to_string()),
            },
        );
        assert!(matches!(
            e,
            GraphError::DomainNotFound { status: 404, domain: Some(d), .. } if d == "example.com"
        ));
    }

    #[test]
    fn map_409_domain_exists() {
        let e = map_status_error(
            "CreateDomain",
            409,
            RawApiError::with_code("ObjectConflict", "already exists"),
            ErrorContext {
                domain: Some("example.com".to_string()),
            },
        );
        assert!(matches!(
            e,
            GraphError::DomainExists { status: 409, domain: Some(d), .. } if d == "example.com"
        ));
    }

    #[test]
    fn map_fallback_preserves_raw_code_and_status() {
        let e = map_status_error(
            "ListDomains",
            500,
            RawApiError::with_code("InternalServerError", "something broke"),
            ErrorContext::default(),
        );
        assert!(matches!(
            e,
            GraphError::UnexpectedStatus { status: 500, raw_code: Some(code), raw_message, .. }
                if code == "InternalServerError" && raw_message == "something broke"
        ));
    }

    #[test]
    fn map_exact_status_propagated() {
        let e = map_status_error(
            "ListDomains",
            418,
            RawApiError::new("teapot"),
            ErrorContext::default(),
        );
        assert_eq!(e.status(), Some(418));
    }

    // ---- decode helpers ----

    #[test]
    fn decode_object_valid() {
        let result: Result<Domain> =
            decode_object("GetDomain", 200, r#"{"id":"example.com","isVerified":true}"#);
        assert!(result.is_ok(), "expected Ok(..), got {result:?}");
        let Ok(domain) = result else {
            return;
        };
        assert_eq!(domain.id.as_deref(), Some("example.com"));
    }

    #[test]
    fn decode_object_invalid_is_decode_kind_with_status() {
        let result: Result<Domain> = decode_object("GetDomain", 200, "not json");
        assert!(matches!(
            result,
            Err(GraphError::Decode { status: 200, .. })
        ));
    }

    #[test]
    fn decode_collection_preserves_order() {
        let body = r#"{"value":[{"id":"a.com"},{"id":"b.com"}]}"#;
        let result: Result<Collection<Domain>> = decode_collection("ListDomains", 200, body);
        assert!(result.is_ok(), "expected Ok(..), got {result:?}");
        let Ok(collection) = result else {
            return;
        };
        let ids: Vec<&str> = collection
            .value
            .iter()
            .filter_map(|d| d.id.as_deref())
            .collect();
        assert_eq!(ids, vec!["a.com", "b.com"]);
    }

    #[test]
    fn decode_collection_missing_envelope_is_decode_kind() {
        // A bare array is not the envelope shape
        let result: Result<Collection<Domain>> =
            decode_collection("ListDomains", 200, r#"[{"id":"a.com"}]"#);
        assert!(matches!(
            result,
            Err(GraphError::Decode { status: 200, .. })
        ));
    }
}
