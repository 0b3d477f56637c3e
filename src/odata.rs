//! OData query options.
//!
//! Every operation accepts a [`Query`] that is passed through to the service
//! untouched. Options render as `$`-prefixed query parameters; metadata
//! verbosity renders into the `Accept` header instead.

/// OData metadata verbosity, rendered into the `Accept` header.
///
/// The service returns a fully-populated entity on create only when full
/// metadata is requested, so [`DomainsClient::create`](crate::DomainsClient::create)
/// forces [`Metadata::Full`] on its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metadata {
    /// `odata.metadata=none`
    None,
    /// `odata.metadata=minimal`
    Minimal,
    /// `odata.metadata=full`
    Full,
}

impl Metadata {
    fn as_accept_param(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Minimal => "minimal",
            Self::Full => "full",
        }
    }
}

/// Pass-through OData query options.
///
/// `Default` means no options: no query parameters, plain `application/json`
/// accept, no consistency header. All `with_*` methods consume and return
/// `self` for chaining:
///
/// ```rust
/// use msgraph_domains::odata::Query;
///
/// let query = Query::default()
///     .with_select(vec!["id".to_string(), "isVerified".to_string()])
///     .with_top(10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    select: Vec<String>,
    filter: Option<String>,
    search: Option<String>,
    orderby: Vec<String>,
    top: Option<u32>,
    skip: Option<u32>,
    count: bool,
    expand: Vec<String>,
    metadata: Option<Metadata>,
    consistency_level_eventual: bool,
}

impl Query {
    /// `$select`: restrict returned properties.
    #[must_use]
    pub fn with_select(mut self, select: Vec<String>) -> Self {
        self.select = select;
        self
    }

    /// `$filter`: filter expression.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// `$search`: search expression.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// `$orderby`: sort order.
    #[must_use]
    pub fn with_orderby(mut self, orderby: Vec<String>) -> Self {
        self.orderby = orderby;
        self
    }

    /// `$top`: maximum number of items to return.
    #[must_use]
    pub fn with_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// `$skip`: number of items to skip.
    #[must_use]
    pub fn with_skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    /// `$count=true`: include `@odata.count` in collection responses.
    #[must_use]
    pub fn with_count(mut self) -> Self {
        self.count = true;
        self
    }

    /// `$expand`: expand related entities.
    #[must_use]
    pub fn with_expand(mut self, expand: Vec<String>) -> Self {
        self.expand = expand;
        self
    }

    /// Requested OData metadata verbosity.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Send `ConsistencyLevel: eventual`, required by some advanced
    /// `$filter`/`$search`/`$count` combinations.
    #[must_use]
    pub fn with_consistency_level_eventual(mut self) -> Self {
        self.consistency_level_eventual = true;
        self
    }

    /// Render the options as query pairs, in a stable order.
    ///
    /// Values are not yet percent-encoded; the URL builder encodes them.
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.select.is_empty() {
            pairs.push(("$select", self.select.join(",")));
        }
        if let Some(filter) = &self.filter {
            pairs.push(("$filter", filter.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("$search", search.clone()));
        }
        if !self.orderby.is_empty() {
            pairs.push(("$orderby", self.orderby.join(",")));
        }
        if let Some(top) = self.top {
            pairs.push(("$top", top.to_string()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("$skip", skip.to_string()));
        }
        if self.count {
            pairs.push(("$count", "true".to_string()));
        }
        if !self.expand.is_empty() {
            pairs.push(("$expand", self.expand.join(",")));
        }
        pairs
    }

    /// `Accept` header value for this query.
    pub(crate) fn accept_header(&self) -> String {
        match self.metadata {
            Some(m) => format!("application/json;odata.metadata={}", m.as_accept_param()),
            None => "application/json".to_string(),
        }
    }

    /// `ConsistencyLevel` header value, if requested.
    pub(crate) fn consistency_level_header(&self) -> Option<&'static str> {
        self.consistency_level_eventual.then_some("eventual")
    }
}
