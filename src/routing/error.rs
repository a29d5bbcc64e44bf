use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("no MX records for {domain}")]
    NoRecords { domain: String },
    #[error("domain {domain} does not exist")]
    DomainNotFound { domain: String },
    #[error("MX lookup for {domain} timed out after {timeout:?}")]
    Timeout { domain: String, timeout: Duration },
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("MX lookup for {domain} failed: {source}")]
    Lookup {
        domain: String,
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
}

impl RoutingError {
    pub fn no_records(domain: impl Into<String>) -> Self {
        Self::NoRecords {
            domain: domain.into(),
        }
    }

    pub fn domain_not_found(domain: impl Into<String>) -> Self {
        Self::DomainNotFound {
            domain: domain.into(),
        }
    }

    pub fn timeout(domain: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            domain: domain.into(),
            timeout,
        }
    }

    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn lookup(
        domain: impl Into<String>,
        source: trust_dns_resolver::error::ResolveError,
    ) -> Self {
        Self::Lookup {
            domain: domain.into(),
            source,
        }
    }
}
