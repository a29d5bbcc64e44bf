//! SMTP recipient probe (connect, `HELO`, `MAIL FROM`, `RCPT TO`, `QUIT`).
//!
//! The public entry point is [`probe`]. It is generic over [`SmtpConnector`]
//! so the dialogue logic can run against [`TcpConnector`] or a scripted
//! stand-in.

mod deadline;
mod error;
mod probe;
mod session;
mod types;

pub use error::ProbeError;
pub use probe::{Envelope, probe};
pub use session::{SmtpChannel, SmtpConnector, TcpChannel, TcpConnector};
pub use types::{FailureReason, ProbeOutcome, ProbeStage, SmtpReply};

/// Default SMTP port used for MX delivery.
pub const SMTP_PORT: u16 = 25;
