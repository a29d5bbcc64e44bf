use std::fmt;

use serde::{Deserialize, Serialize};

/// Steps of the probe dialogue, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeStage {
    Connect,
    Greeting,
    Helo,
    MailFrom,
    RcptTo,
    Quit,
}

impl fmt::Display for ProbeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connect => "connect",
            Self::Greeting => "greeting",
            Self::Helo => "HELO",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
            Self::Quit => "QUIT",
        })
    }
}

/// A raw SMTP reply, preserving the numeric status code and message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// Diagnostic category attached to a negative [`ProbeOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    ConnectFailed,
    Timeout,
    Rejected,
    ProtocolError,
}

/// What the probe observed. `accepted` is true only for a `250` reply to
/// `RCPT TO`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub accepted: bool,
    pub status_code: Option<u16>,
    pub failure_reason: Option<FailureReason>,
    pub stage: ProbeStage,
}

impl ProbeOutcome {
    pub(crate) fn from_recipient_reply(reply: &SmtpReply) -> Self {
        if reply.code == 250 {
            Self {
                accepted: true,
                status_code: Some(reply.code),
                failure_reason: None,
                stage: ProbeStage::RcptTo,
            }
        } else {
            Self::rejected(ProbeStage::RcptTo, reply)
        }
    }

    pub(crate) fn rejected(stage: ProbeStage, reply: &SmtpReply) -> Self {
        Self {
            accepted: false,
            status_code: Some(reply.code),
            failure_reason: Some(FailureReason::Rejected),
            stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_250_is_accepted() {
        let ok = ProbeOutcome::from_recipient_reply(&SmtpReply::new(250, "2.1.5 Ok"));
        assert!(ok.accepted);
        assert_eq!(ok.failure_reason, None);

        for code in [251, 252, 450, 451, 550, 553] {
            let outcome = ProbeOutcome::from_recipient_reply(&SmtpReply::new(code, "x"));
            assert!(!outcome.accepted, "{code} must not be accepted");
            assert_eq!(outcome.status_code, Some(code));
            assert_eq!(outcome.failure_reason, Some(FailureReason::Rejected));
        }
    }

    #[test]
    fn reply_classes() {
        assert!(SmtpReply::new(220, "").is_positive_completion());
        assert!(!SmtpReply::new(421, "").is_positive_completion());
        assert!(!SmtpReply::new(554, "").is_positive_completion());
    }
}
