//! # msgraph-domains
//!
//! A typed async client for the Domains resource of the Microsoft Graph
//! directory API.
//!
//! ## Operations
//!
//! | Operation | Method | Path |
//! |-----------|--------|------|
//! | [`DomainsClient::list`] | GET | `/domains` |
//! | [`DomainsClient::get`] | GET | `/domains/{id}` |
//! | [`DomainsClient::create`] | POST | `/domains` |
//! | [`DomainsClient::update`] | PATCH | `/domains/{id}` |
//! | [`DomainsClient::delete`] | DELETE | `/domains/{id}` |
//! | [`DomainsClient::list_verification_dns_records`] | GET | `/domains/{id}/verificationDnsRecords` |
//! | [`DomainsClient::list_service_configuration_records`] | GET | `/domains/{id}/serviceConfigurationRecords` |
//! | [`DomainsClient::verify`] | POST | `/domains/{id}/verify` |
//!
//! ## Feature Flags
//!
//! ### TLS Backend
//!
//! - **`native-tls`** *(default)* — Use the platform's native TLS implementation.
//! - **`rustls`** — Use rustls. Recommended for cross-compilation and musl targets.
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! msgraph-domains = "0.1"
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use msgraph_domains::{ClientConfig, DomainsClient, odata::Query};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Configure the client for a tenant
//!     let config = ClientConfig::new("your-tenant-id", "your-access-token");
//!     let client = DomainsClient::new(config);
//!
//!     // 2. List domains
//!     let domains = client.list(Query::default()).await?;
//!     for domain in &domains.value {
//!         println!("{:?} verified={:?}", domain.id, domain.is_verified);
//!     }
//!
//!     // 3. Fetch one domain by name
//!     let domain = client.get("example.com", Query::default()).await?;
//!     println!("{:?}", domain.value.state);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Registering a Domain
//!
//! ```rust,no_run
//! # use msgraph_domains::*;
//! # async fn example(client: DomainsClient) -> Result<()> {
//! let created = client.create("contoso.com").await?;
//!
//! // Publish the returned records in public DNS, then trigger verification.
//! let records = client
//!     .list_verification_dns_records("contoso.com", Default::default())
//!     .await?;
//! for record in &records.value {
//!     println!("{:?} = {:?}", record.record_type, record.text);
//! }
//!
//! let verified = client.verify("contoso.com").await?;
//! println!("verified: {:?}", verified.value.is_verified);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, GraphError>`](GraphError). The error enum
//! provides structured variants for common failure modes:
//!
//! - [`GraphError::InvalidCredentials`] — authentication failed (HTTP 401)
//! - [`GraphError::DomainNotFound`] — domain not found (HTTP 404)
//! - [`GraphError::DomainExists`] — domain already registered (HTTP 409)
//! - [`GraphError::RateLimited`] — API rate limit exceeded (retryable)
//! - [`GraphError::Network`] — network connectivity issue (retryable)
//!
//! Transient errors (`Network`, `Timeout`, `RateLimited`) are automatically
//! retried with exponential backoff. Reads of a freshly written entity that
//! land on a stale replica (HTTP 404) are retried separately. See
//! [`GraphError`] for the full list.

mod client;
mod domains;
mod error;
mod http_client;
pub mod odata;
mod types;
mod utils;

// Re-export error types
pub use error::{GraphError, Result};

// Re-export the base layer for callers that build their own operations
pub use client::{
    ApiVersion, BaseClient, ClientConfig, ConsistencyRetry, DEFAULT_ENDPOINT, RequestSpec,
};

// Re-export the typed client
pub use domains::DomainsClient;

// Re-export types
pub use types::{
    Collection, Domain, DomainServiceConfigurationRecord, DomainState,
    DomainVerificationDnsRecord, GraphResponse,
};

// Re-export utils module
pub use utils::datetime;
