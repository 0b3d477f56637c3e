use serde::{Deserialize, Serialize};

/// Unified error type for all Graph domain operations.
///
/// Each variant includes an `operation` field identifying which API call
/// produced the error, plus variant-specific context. All variants are
/// serializable for structured error reporting.
///
/// # Retryable Errors
///
/// The following variants represent transient failures that may succeed on retry:
/// - [`Network`](Self::Network) — network connectivity issues
/// - [`Timeout`](Self::Timeout) — request timed out
/// - [`RateLimited`](Self::RateLimited) — API rate limit exceeded
///
/// The built-in HTTP client automatically retries these with exponential backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum GraphError {
    /// A network-level error occurred (DNS resolution failure, connection
    /// refused, HTTP 502-504 from an intermediary, etc.).
    ///
    /// This is a transient error and is automatically retried.
    Network {
        /// Operation that produced the error.
        operation: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    ///
    /// This is a transient error and is automatically retried.
    Timeout {
        /// Operation that produced the error.
        operation: String,
        /// Error details.
        detail: String,
    },

    /// The API rate limit has been exceeded (HTTP 429).
    ///
    /// This is a transient error; the request should succeed after waiting.
    RateLimited {
        /// Operation that produced the error.
        operation: String,
        /// Suggested wait time in seconds before retrying, if provided by the API.
        retry_after: Option<u64>,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The provided access token is invalid or expired (HTTP 401).
    InvalidCredentials {
        /// Operation that produced the error.
        operation: String,
        /// HTTP status code returned by the service.
        status: u16,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The token lacks permission for the requested operation (HTTP 403).
    PermissionDenied {
        /// Operation that produced the error.
        operation: String,
        /// HTTP status code returned by the service.
        status: u16,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The specified domain was not found (HTTP 404).
    ///
    /// Directory writes replicate with a delay, so operations that address a
    /// freshly created domain retry this once per backoff step before it is
    /// surfaced.
    DomainNotFound {
        /// Operation that produced the error.
        operation: String,
        /// HTTP status code returned by the service.
        status: u16,
        /// Domain name that was not found, if known.
        domain: Option<String>,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// A domain with the same name already exists in the tenant (HTTP 409).
    DomainExists {
        /// Operation that produced the error.
        operation: String,
        /// HTTP status code returned by the service.
        status: u16,
        /// Name of the conflicting domain, if known.
        domain: Option<String>,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The service returned a status code outside the operation's accepted set.
    ///
    /// This is a catch-all for statuses not yet mapped to a specific variant.
    UnexpectedStatus {
        /// Operation that produced the error.
        operation: String,
        /// HTTP status code returned by the service.
        status: u16,
        /// Raw OData error code from the response body, if available.
        raw_code: Option<String>,
        /// Raw error message from the response body.
        raw_message: String,
    },

    /// The response body could not be read or did not match the expected shape.
    ///
    /// The status code is the one the service returned; it was in the accepted
    /// set, the body just did not decode.
    Decode {
        /// Operation that produced the error.
        operation: String,
        /// HTTP status code returned by the service.
        status: u16,
        /// Details about the decode failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    Serialization {
        /// Operation that produced the error.
        operation: String,
        /// Details about the serialization failure.
        detail: String,
    },
}

impl GraphError {
    /// HTTP status code associated with this error, if one was obtained.
    ///
    /// `Network`, `Timeout` and `Serialization` fail before a status exists.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { .. } | Self::Timeout { .. } | Self::Serialization { .. } => None,
            Self::RateLimited { .. } => Some(429),
            Self::InvalidCredentials { status, .. }
            | Self::PermissionDenied { status, .. }
            | Self::DomainNotFound { status, .. }
            | Self::DomainExists { status, .. }
            | Self::UnexpectedStatus { status, .. }
            | Self::Decode { status, .. } => Some(*status),
        }
    }

    /// 是否为预期行为（凭证问题、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::PermissionDenied { .. }
                | Self::DomainNotFound { .. }
                | Self::DomainExists { .. }
        )
    }
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network { operation, detail } => {
                write!(f, "[{operation}] Network error: {detail}")
            }
            Self::Timeout { operation, detail } => {
                write!(f, "[{operation}] Request timeout: {detail}")
            }
            Self::RateLimited {
                operation,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{operation}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{operation}] Rate limited")
                }
            }
            Self::InvalidCredentials {
                operation,
                status,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{operation}] Invalid credentials (HTTP {status}): {msg}")
                } else {
                    write!(f, "[{operation}] Invalid credentials (HTTP {status})")
                }
            }
            Self::PermissionDenied {
                operation,
                status,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{operation}] Permission denied (HTTP {status}): {msg}")
                } else {
                    write!(f, "[{operation}] Permission denied (HTTP {status})")
                }
            }
            Self::DomainNotFound {
                operation,
                domain,
                raw_message,
                ..
            } => match (domain, raw_message) {
                (Some(d), Some(msg)) => {
                    write!(f, "[{operation}] Domain '{d}' not found: {msg}")
                }
                (Some(d), None) => write!(f, "[{operation}] Domain '{d}' not found"),
                (None, Some(msg)) => write!(f, "[{operation}] Domain not found: {msg}"),
                (None, None) => write!(f, "[{operation}] Domain not found"),
            },
            Self::DomainExists {
                operation, domain, ..
            } => {
                if let Some(d) = domain {
                    write!(f, "[{operation}] Domain '{d}' already exists")
                } else {
                    write!(f, "[{operation}] Domain already exists")
                }
            }
            Self::UnexpectedStatus {
                operation,
                status,
                raw_message,
                ..
            } => {
                write!(f, "[{operation}] Unexpected status HTTP {status}: {raw_message}")
            }
            Self::Decode {
                operation,
                status,
                detail,
            } => {
                write!(f, "[{operation}] Decode error (HTTP {status}): {detail}")
            }
            Self::Serialization { operation, detail } => {
                write!(f, "[{operation}] Serialization error: {detail}")
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Convenience type alias for `Result<T, GraphError>`.
pub type Result<T> = std::result::Result<T, GraphError>;
