use std::net::IpAddr;
use std::time::{Duration, Instant};

use tokio::runtime::Runtime;
use tracing::debug;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    proto::{op::ResponseCode, rr::Name},
};

use super::{MailRoute, RoutingError};

/// Source of MX records.
///
/// Implementations issue a single query, return the records in the order the
/// resolver produced them and must give up once `timeout` has elapsed.
pub trait LookupMx {
    fn lookup_mx(&self, domain: &str, timeout: Duration) -> Result<Vec<MailRoute>, RoutingError>;
}

/// Resolve the preferred mail exchanger for `domain`.
///
/// A lookup that answers after `timeout` is reported as
/// [`RoutingError::Timeout`] even if it carried records.
pub fn resolve<R>(lookup: &R, domain: &str, timeout: Duration) -> Result<MailRoute, RoutingError>
where
    R: LookupMx + ?Sized,
{
    if timeout.is_zero() {
        return Err(RoutingError::timeout(domain, timeout));
    }
    let started = Instant::now();
    let records = lookup.lookup_mx(domain, timeout)?;
    if started.elapsed() > timeout {
        return Err(RoutingError::timeout(domain, timeout));
    }
    let route = select_route(domain, records)?;
    debug!(
        domain,
        exchange = %route.exchange,
        priority = route.priority,
        "selected mail route"
    );
    Ok(route)
}

/// Pick the lowest-priority route, skipping null MX entries.
///
/// Ties go to the record returned first by the resolver.
pub fn select_route(domain: &str, records: Vec<MailRoute>) -> Result<MailRoute, RoutingError> {
    records
        .into_iter()
        .filter(|route| !route.is_null())
        .min_by_key(|route| route.priority)
        .ok_or_else(|| RoutingError::no_records(domain))
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

/// [`LookupMx`] backed by `trust-dns-resolver`.
///
/// Every lookup gets a fresh resolver on a single-threaded runtime and is
/// abandoned once its timeout has passed. Names are always queried as
/// absolute names, so the host's `search` list never applies.
#[derive(Debug, Clone)]
pub struct SystemDns {
    config: ResolverConfig,
    opts: ResolverOpts,
}

impl SystemDns {
    /// Use the nameservers from the host configuration (`/etc/resolv.conf`).
    pub fn from_system_conf() -> Result<Self, RoutingError> {
        let (config, opts) = trust_dns_resolver::system_conf::read_system_conf()
            .map_err(RoutingError::resolver_init)?;
        Ok(Self { config, opts })
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        Self {
            config,
            opts: ResolverOpts::default(),
        }
    }

    /// A and AAAA addresses of `host`, or the address itself when `host` is
    /// an IP literal.
    pub fn lookup_host(&self, host: &str, timeout: Duration) -> Result<Vec<IpAddr>, RoutingError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }
        let name = absolute_name(host)?;
        let (config, opts) = (self.config.clone(), self.options_for(timeout));
        let answer = runtime()?.block_on(async move {
            let resolver = TokioAsyncResolver::tokio(config, opts);
            tokio::time::timeout(timeout, resolver.lookup_ip(name)).await
        });
        match answer {
            Ok(Ok(lookup)) => Ok(lookup.iter().collect()),
            Ok(Err(err)) => Err(classify(host, timeout, err)),
            Err(_) => Err(RoutingError::timeout(host, timeout)),
        }
    }

    fn options_for(&self, timeout: Duration) -> ResolverOpts {
        let mut opts = self.opts.clone();
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.num_concurrent_reqs = 1;
        opts
    }
}

impl LookupMx for SystemDns {
    fn lookup_mx(&self, domain: &str, timeout: Duration) -> Result<Vec<MailRoute>, RoutingError> {
        let name = absolute_name(domain)?;
        let (config, opts) = (self.config.clone(), self.options_for(timeout));
        let answer = runtime()?.block_on(async move {
            let resolver = TokioAsyncResolver::tokio(config, opts);
            tokio::time::timeout(timeout, resolver.mx_lookup(name)).await
        });
        let lookup = match answer {
            Ok(result) => result.map_err(|err| classify(domain, timeout, err))?,
            Err(_) => return Err(RoutingError::timeout(domain, timeout)),
        };
        Ok(lookup
            .iter()
            .map(|mx| MailRoute::new(normalize_exchange(&mx.exchange().to_utf8()), mx.preference()))
            .collect())
    }
}

fn runtime() -> Result<Runtime, RoutingError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(RoutingError::resolver_init)
}

fn absolute_name(domain: &str) -> Result<Name, RoutingError> {
    let mut name =
        Name::from_ascii(domain).map_err(|err| RoutingError::lookup(domain, err.into()))?;
    name.set_fqdn(true);
    Ok(name)
}

fn classify(domain: &str, timeout: Duration, err: ResolveError) -> RoutingError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. }
            if *response_code == ResponseCode::NXDomain =>
        {
            RoutingError::domain_not_found(domain)
        }
        ResolveErrorKind::NoRecordsFound { .. } => RoutingError::no_records(domain),
        ResolveErrorKind::Timeout => RoutingError::timeout(domain, timeout),
        _ => RoutingError::lookup(domain, err),
    }
}
