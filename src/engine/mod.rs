//! Verification pipeline: syntax gate, MX resolution, SMTP probe.
//!
//! [`Verifier`] runs the stages in order and stops at the first negative one.
//! [`Verifier::check`] returns the tagged [`Verdict`]; [`Verifier::verify`] is
//! its boolean projection.

mod error;
mod options;
mod types;

pub use error::ConfigError;
pub use options::VerifierConfig;
pub use types::Verdict;

use std::time::Duration;

use tracing::{debug, info};

use crate::routing::{self, LookupMx, SystemDns};
use crate::syntax::EmailAddress;
use crate::transport::{self, Envelope, SmtpConnector, TcpConnector};

/// Deliverability checker. Holds configuration and collaborators only, so a
/// shared reference can serve any number of independent calls.
#[derive(Debug)]
pub struct Verifier<R = SystemDns, C = TcpConnector> {
    config: VerifierConfig,
    lookup: R,
    connector: C,
}

impl Verifier<SystemDns, TcpConnector> {
    /// Verifier using the host's resolver configuration and plain TCP.
    pub fn system(config: VerifierConfig) -> Result<Self, ConfigError> {
        let dns = SystemDns::from_system_conf()?;
        Self::new(config, dns.clone(), TcpConnector::new(dns))
    }
}

impl<R, C> Verifier<R, C>
where
    R: LookupMx,
    C: SmtpConnector,
{
    pub fn new(config: VerifierConfig, lookup: R, connector: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            lookup,
            connector,
        })
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Run the pipeline with the configured per-stage timeouts.
    pub fn check(&self, email: &str) -> Verdict {
        self.run(email, self.config.dns_timeout(), self.config.smtp_timeout())
    }

    /// Run the pipeline giving each network stage its own `timeout`.
    pub fn check_with_timeout(&self, email: &str, timeout: Duration) -> Verdict {
        self.run(email, timeout, timeout)
    }

    pub fn verify(&self, email: &str) -> bool {
        self.check(email).is_deliverable()
    }

    pub fn verify_with_timeout(&self, email: &str, timeout: Duration) -> bool {
        self.check_with_timeout(email, timeout).is_deliverable()
    }

    fn run(&self, email: &str, dns_timeout: Duration, smtp_timeout: Duration) -> Verdict {
        let verdict = self.decide(email, dns_timeout, smtp_timeout);
        info!(email, verdict = verdict.label(), "verification finished");
        debug!(email, detail = %verdict);
        verdict
    }

    fn decide(&self, email: &str, dns_timeout: Duration, smtp_timeout: Duration) -> Verdict {
        let Ok(address) = EmailAddress::parse(email) else {
            return Verdict::SyntaxInvalid;
        };

        let route = match routing::resolve(&self.lookup, address.domain(), dns_timeout) {
            Ok(route) => route,
            Err(err) => return Verdict::RoutingFailed(err),
        };

        let envelope = Envelope {
            helo: &self.config.helo_name,
            from: &self.config.from_address,
            to: address.as_str(),
        };
        match transport::probe(
            &self.connector,
            &route,
            self.config.smtp_port,
            &envelope,
            smtp_timeout,
        ) {
            Ok(outcome) if outcome.accepted => Verdict::Accepted,
            Ok(outcome) => Verdict::Rejected {
                stage: outcome.stage,
                code: outcome.status_code.unwrap_or_default(),
            },
            Err(err) => Verdict::TransportFailed(err),
        }
    }
}
