#![forbid(unsafe_code)]
//! mailprobe: email deliverability probe (syntax gate, MX lookup, SMTP
//! `RCPT TO` check, plus a small store for the verdicts).

pub mod engine;
pub mod routing;
pub mod store;
pub mod syntax;
pub mod transport;

pub use engine::{ConfigError, Verdict, Verifier, VerifierConfig};
pub use routing::{LookupMx, MailRoute, RoutingError, SystemDns, resolve};
pub use store::{
    JsonFileStore, MemoryStore, StoreError, Upserted, VerificationRecord, VerificationStore,
};
pub use syntax::{EmailAddress, SyntaxError, validate};
pub use transport::{
    Envelope, FailureReason, ProbeError, ProbeOutcome, ProbeStage, SmtpChannel, SmtpConnector,
    SmtpReply, TcpConnector, probe,
};
