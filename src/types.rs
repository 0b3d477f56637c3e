//! Wire types for the domains API.
//!
//! Entity fields are all optional: the service omits properties freely
//! depending on `$select` and metadata verbosity, and sparse entities are
//! what PATCH requests submit. Serialization skips absent fields, so a
//! creation payload built with [`Domain::new`] renders as exactly
//! `{"id": "..."}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A domain registered in the tenant's directory.
///
/// `id` is the fully qualified domain name; everything else is metadata the
/// service attaches. Metadata values stay plain strings, they are opaque to
/// this client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    /// Fully qualified domain name. Doubles as the entity key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// `Managed` or `Federated`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<String>,

    /// Availability for provisioning, populated only by dedicated endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin_managed: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_initial: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_root: Option<bool>,

    /// Whether ownership has been proven via DNS verification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_notification_window_in_days: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_validity_period_in_days: Option<i32>,

    /// Capabilities provisioned for the domain (`Email`, `OfficeCommunicationsOnline`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_services: Option<Vec<String>>,

    /// Status of a long-running operation on the domain, if one is pending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<DomainState>,
}

impl Domain {
    /// Creation payload for the given domain name.
    ///
    /// Every other field stays `None` so the serialized body is `{"id": "..."}`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }
}

/// Status of an asynchronous operation pending on a [`Domain`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainState {
    /// Current status (`Scheduled`, `InProgress`, `Failed`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Kind of operation (`ForceDelete`, `Verification`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    /// When the last activity occurred.
    #[serde(
        default,
        with = "crate::utils::datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_action_date_time: Option<DateTime<Utc>>,
}

/// DNS record the tenant must publish to prove domain ownership.
///
/// Read-only: fetched, never submitted. `record_type` selects which payload
/// fields are populated (`text` for TXT, `mail_exchange`/`preference` for MX).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainVerificationDnsRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_optional: Option<bool>,

    /// DNS label to publish the record under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// `Txt` or `Mx`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_service: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,

    /// TXT record value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// MX exchange host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_exchange: Option<String>,

    /// MX preference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference: Option<i32>,
}

/// DNS record the tenant should publish to enable a provisioned service.
///
/// Same shape as [`DomainVerificationDnsRecord`] plus CNAME guidance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainServiceConfigurationRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_optional: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// `Txt`, `Mx` or `CName`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_service: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_exchange: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference: Option<i32>,

    /// CNAME target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_name: Option<String>,
}

/// Collection envelope the service wraps list responses in.
///
/// `next_link` is surfaced but never followed by this client; callers that
/// need traversal issue follow-up requests themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    /// Items in response order.
    pub value: Vec<T>,

    /// Link to the next page, when the server truncated the collection.
    #[serde(rename = "@odata.nextLink", skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,

    /// Total count, present when `$count=true` was requested.
    #[serde(rename = "@odata.count", skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

/// Success wrapper: the decoded value plus the raw HTTP status that produced it.
#[derive(Debug, Clone)]
pub struct GraphResponse<T> {
    /// Decoded response value.
    pub value: T,
    /// HTTP status code of the successful response.
    pub status: u16,
}
