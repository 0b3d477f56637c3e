//! Domains API operations.
//!
//! One method per operation. Each method builds a request descriptor, hands
//! it to the base layer and decodes the accepted response. Domain identifiers
//! are non-empty domain names, interpolated into the entity path verbatim.

use crate::client::{
    BaseClient, ClientConfig, ConsistencyRetry, RequestSpec, decode_collection, decode_object,
};
use crate::error::Result;
use crate::odata::{Metadata, Query};
use crate::types::{
    Domain, DomainServiceConfigurationRecord, DomainVerificationDnsRecord, GraphResponse,
};

/// Typed client for the domains resource collection.
///
/// `Send + Sync` and cheap to clone; one instance can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct DomainsClient {
    base: BaseClient,
}

impl DomainsClient {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            base: BaseClient::new(config),
        }
    }

    /// Build on an existing base client (shares its HTTP connection pool).
    #[must_use]
    pub fn with_base(base: BaseClient) -> Self {
        Self { base }
    }

    /// The underlying base client.
    #[must_use]
    pub fn base(&self) -> &BaseClient {
        &self.base
    }

    /// List all domains in the tenant.
    pub async fn list(&self, query: Query) -> Result<GraphResponse<Vec<Domain>>> {
        let spec = Self::list_spec(query);
        let (status, body) = self.base.get(&spec).await?;
        let collection = decode_collection::<Domain>(spec.operation, status, &body)?;
        Ok(GraphResponse {
            value: collection.value,
            status,
        })
    }

    /// Fetch a single domain by name.
    pub async fn get(&self, domain_id: &str, query: Query) -> Result<GraphResponse<Domain>> {
        let spec = Self::get_spec(domain_id, query);
        let (status, body) = self.base.get(&spec).await?;
        let domain = decode_object::<Domain>(spec.operation, status, &body)?;
        Ok(GraphResponse {
            value: domain,
            status,
        })
    }

    /// Register a new domain in the tenant.
    ///
    /// The request body is exactly `{"id": "..."}`; full OData metadata is
    /// requested because the service returns a fully-populated entity only at
    /// that verbosity.
    pub async fn create(&self, domain_id: &str) -> Result<GraphResponse<Domain>> {
        let spec = Self::create_spec(domain_id);
        let body = Domain::new(domain_id);
        let (status, text) = self.base.post(&spec, Some(&body)).await?;
        let domain = decode_object::<Domain>(spec.operation, status, &text)?;
        Ok(GraphResponse {
            value: domain,
            status,
        })
    }

    /// Apply a sparse update to a domain.
    ///
    /// `domain` is a caller-built sparse entity carrying only the properties
    /// to change; fetched entities are never mutated by this client.
    pub async fn update(&self, domain_id: &str, domain: &Domain) -> Result<u16> {
        let spec = Self::update_spec(domain_id);
        let (status, _) = self.base.patch(&spec, domain).await?;
        Ok(status)
    }

    /// Remove a domain from the tenant.
    pub async fn delete(&self, domain_id: &str) -> Result<u16> {
        let spec = Self::delete_spec(domain_id);
        let (status, _) = self.base.delete(&spec).await?;
        Ok(status)
    }

    /// DNS records the tenant must publish to prove ownership of the domain.
    pub async fn list_verification_dns_records(
        &self,
        domain_id: &str,
        query: Query,
    ) -> Result<GraphResponse<Vec<DomainVerificationDnsRecord>>> {
        let spec = Self::verification_dns_records_spec(domain_id, query);
        let (status, body) = self.base.get(&spec).await?;
        let collection =
            decode_collection::<DomainVerificationDnsRecord>(spec.operation, status, &body)?;
        Ok(GraphResponse {
            value: collection.value,
            status,
        })
    }

    /// DNS records the tenant should publish to enable services on the domain.
    pub async fn list_service_configuration_records(
        &self,
        domain_id: &str,
        query: Query,
    ) -> Result<GraphResponse<Vec<DomainServiceConfigurationRecord>>> {
        let spec = Self::service_configuration_records_spec(domain_id, query);
        let (status, body) = self.base.get(&spec).await?;
        let collection = decode_collection::<DomainServiceConfigurationRecord>(
            spec.operation,
            status,
            &body,
        )?;
        Ok(GraphResponse {
            value: collection.value,
            status,
        })
    }

    /// Trigger ownership verification for the domain.
    ///
    /// A 200 response with `is_verified: Some(false)` means verification was
    /// attempted and did not succeed; that is a business outcome, not an
    /// error.
    pub async fn verify(&self, domain_id: &str) -> Result<GraphResponse<Domain>> {
        let spec = Self::verify_spec(domain_id);
        let (status, body) = self.base.post::<()>(&spec, None).await?;
        let domain = decode_object::<Domain>(spec.operation, status, &body)?;
        Ok(GraphResponse {
            value: domain,
            status,
        })
    }

    // ---- request descriptors ----

    fn list_spec(query: Query) -> RequestSpec {
        RequestSpec::new("ListDomains", "/domains").with_query(query)
    }

    fn get_spec(domain_id: &str, query: Query) -> RequestSpec {
        RequestSpec::new("GetDomain", format!("/domains/{domain_id}"))
            .with_query(query)
            .with_consistency(ConsistencyRetry::RetryOn404)
            .with_domain(domain_id)
    }

    fn create_spec(domain_id: &str) -> RequestSpec {
        RequestSpec::new("CreateDomain", "/domains")
            .with_query(Query::default().with_metadata(Metadata::Full))
            .with_valid_status(vec![201])
            .with_domain(domain_id)
    }

    fn update_spec(domain_id: &str) -> RequestSpec {
        RequestSpec::new("UpdateDomain", format!("/domains/{domain_id}"))
            .with_valid_status(vec![204])
            .with_consistency(ConsistencyRetry::RetryOn404)
            .with_domain(domain_id)
    }

    fn delete_spec(domain_id: &str) -> RequestSpec {
        RequestSpec::new("DeleteDomain", format!("/domains/{domain_id}"))
            .with_valid_status(vec![204])
            .with_consistency(ConsistencyRetry::RetryOn404)
            .with_domain(domain_id)
    }

    fn verification_dns_records_spec(domain_id: &str, query: Query) -> RequestSpec {
        RequestSpec::new(
            "ListDomainVerificationDnsRecords",
            format!("/domains/{domain_id}/verificationDnsRecords"),
        )
        .with_query(query)
        .with_consistency(ConsistencyRetry::RetryOn404)
        .with_domain(domain_id)
    }

    fn service_configuration_records_spec(domain_id: &str, query: Query) -> RequestSpec {
        RequestSpec::new(
            "ListDomainServiceConfigurationRecords",
            format!("/domains/{domain_id}/serviceConfigurationRecords"),
        )
        .with_query(query)
        .with_consistency(ConsistencyRetry::RetryOn404)
        .with_domain(domain_id)
    }

    fn verify_spec(domain_id: &str) -> RequestSpec {
        RequestSpec::new("VerifyDomain", format!("/domains/{domain_id}/verify"))
            .with_consistency(ConsistencyRetry::RetryOn404)
            .with_domain(domain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn client_is_send_sync() {
        assert_send_sync::<DomainsClient>();
    }

    // ---- descriptor table ----

    #[test]
    fn list_descriptor() {
        let spec = DomainsClient::list_spec(Query::default());
        assert_eq!(spec.entity, "/domains");
        assert_eq!(spec.valid_status, &[200]);
        assert_eq!(spec.consistency, ConsistencyRetry::None);
    }

    #[test]
    fn get_descriptor() {
        let spec = DomainsClient::get_spec("example.com", Query::default());
        assert_eq!(spec.entity, "/domains/example.com");
        assert_eq!(spec.valid_status, &[200]);
        assert_eq!(spec.consistency, ConsistencyRetry::RetryOn404);
    }

    #[test]
    fn create_descriptor() {
        let spec = DomainsClient::create_spec("example.com");
        assert_eq!(spec.entity, "/domains");
        assert_eq!(spec.valid_status, &[201]);
        // A freshly created name has nothing to replicate yet
        assert_eq!(spec.consistency, ConsistencyRetry::None);
        assert_eq!(
            spec.query.accept_header(),
            "application/json;odata.metadata=full"
        );
    }

    #[test]
    fn update_descriptor() {
        let spec = DomainsClient::update_spec("example.com");
        assert_eq!(spec.entity, "/domains/example.com");
        assert_eq!(spec.valid_status, &[204]);
        assert_eq!(spec.consistency, ConsistencyRetry::RetryOn404);
    }

    #[test]
    fn delete_descriptor() {
        let spec = DomainsClient::delete_spec("example.com");
        assert_eq!(spec.entity, "/domains/example.com");
        assert_eq!(spec.valid_status, &[204]);
        assert_eq!(spec.consistency, ConsistencyRetry::RetryOn404);
    }

    #[test]
    fn verification_dns_records_descriptor() {
        let spec =
            DomainsClient::verification_dns_records_spec("example.com", Query::default());
        assert_eq!(spec.entity, "/domains/example.com/verificationDnsRecords");
        assert_eq!(spec.valid_status, &[200]);
        assert_eq!(spec.consistency, ConsistencyRetry::RetryOn404);
    }

    #[test]
    fn service_configuration_records_descriptor() {
        let spec =
            DomainsClient::service_configuration_records_spec("example.com", Query::default());
        assert_eq!(
            spec.entity,
            "/domains/example.com/serviceConfigurationRecords"
        );
        assert_eq!(spec.valid_status, &[200]);
        assert_eq!(spec.consistency, ConsistencyRetry::RetryOn404);
    }

    #[test]
    fn verify_descriptor() {
        let spec = DomainsClient::verify_spec("example.com");
        assert_eq!(spec.entity, "/domains/example.com/verify");
        assert_eq!(spec.valid_status, &[200]);
        assert_eq!(spec.consistency, ConsistencyRetry::RetryOn404);
    }

    #[test]
    fn all_descriptors_tenant_scoped() {
        let specs = [
            DomainsClient::list_spec(Query::default()),
            DomainsClient::get_spec("example.com", Query::default()),
            DomainsClient::create_spec("example.com"),
            DomainsClient::update_spec("example.com"),
            DomainsClient::delete_spec("example.com"),
            DomainsClient::verification_dns_records_spec("example.com", Query::default()),
            DomainsClient::service_configuration_records_spec("example.com", Query::default()),
            DomainsClient::verify_spec("example.com"),
        ];
        for spec in &specs {
            assert!(spec.tenant_scoped, "{} not tenant scoped", spec.operation);
        }
    }
}
