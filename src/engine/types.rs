use std::fmt;

use crate::routing::RoutingError;
use crate::transport::{ProbeError, ProbeStage};

/// Result of one verification, keeping which stage decided it.
///
/// Callers that only need the yes/no answer use [`Verdict::is_deliverable`].
#[derive(Debug)]
pub enum Verdict {
    SyntaxInvalid,
    RoutingFailed(RoutingError),
    TransportFailed(ProbeError),
    /// `RCPT TO` answered `250`.
    Accepted,
    /// The server answered but refused, at `stage`, with `code`.
    Rejected { stage: ProbeStage, code: u16 },
}

impl Verdict {
    pub fn is_deliverable(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Short machine-friendly label, stable across releases.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SyntaxInvalid => "syntax_invalid",
            Self::RoutingFailed(_) => "routing_failed",
            Self::TransportFailed(_) => "transport_failed",
            Self::Accepted => "accepted",
            Self::Rejected { .. } => "rejected",
        }
    }
}

impl From<&Verdict> for bool {
    fn from(verdict: &Verdict) -> Self {
        verdict.is_deliverable()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SyntaxInvalid => f.write_str("invalid address syntax"),
            Self::RoutingFailed(err) => write!(f, "routing failed: {err}"),
            Self::TransportFailed(err) => write!(f, "transport failed: {err}"),
            Self::Accepted => f.write_str("accepted"),
            Self::Rejected { stage, code } => write!(f, "rejected at {stage} ({code})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_accepted_is_deliverable() {
        assert!(Verdict::Accepted.is_deliverable());
        assert!(bool::from(&Verdict::Accepted));
        assert!(!Verdict::SyntaxInvalid.is_deliverable());
        assert!(
            !Verdict::Rejected {
                stage: ProbeStage::RcptTo,
                code: 550
            }
            .is_deliverable()
        );
        assert!(!Verdict::RoutingFailed(RoutingError::no_records("example.com")).is_deliverable());
    }

    #[test]
    fn display_names_the_stage() {
        let verdict = Verdict::Rejected {
            stage: ProbeStage::MailFrom,
            code: 553,
        };
        insta::assert_snapshot!(verdict.to_string(), @"rejected at MAIL FROM (553)");
        insta::assert_snapshot!(
            Verdict::RoutingFailed(RoutingError::no_records("example.com")).to_string(),
            @"routing failed: no MX records for example.com"
        );
    }
}
