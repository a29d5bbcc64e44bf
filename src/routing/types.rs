use serde::{Deserialize, Serialize};

/// A mail exchanger for a domain. Lower `priority` is preferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailRoute {
    pub exchange: String,
    pub priority: u16,
}

impl MailRoute {
    pub fn new(exchange: impl Into<String>, priority: u16) -> Self {
        Self {
            exchange: exchange.into(),
            priority,
        }
    }

    /// RFC 7505 null MX: the domain explicitly accepts no mail.
    pub fn is_null(&self) -> bool {
        self.exchange.is_empty()
    }
}
