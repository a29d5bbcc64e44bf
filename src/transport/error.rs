use std::io;
use std::time::Duration;

use thiserror::Error;

use super::types::{FailureReason, ProbeStage};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connection to {host}:{port} failed: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("{stage} timed out (session budget {budget:?})")]
    Timeout { stage: ProbeStage, budget: Duration },
    #[error("protocol error during {stage}: {source}")]
    Protocol {
        stage: ProbeStage,
        #[source]
        source: io::Error,
    },
}

impl ProbeError {
    pub(crate) fn connect(host: impl Into<String>, port: u16, source: io::Error) -> Self {
        Self::Connect {
            host: host.into(),
            port,
            source,
        }
    }

    pub(crate) fn protocol(stage: ProbeStage, source: io::Error) -> Self {
        Self::Protocol { stage, source }
    }

    pub fn stage(&self) -> ProbeStage {
        match self {
            Self::Connect { .. } => ProbeStage::Connect,
            Self::Timeout { stage, .. } | Self::Protocol { stage, .. } => *stage,
        }
    }

    pub fn reason(&self) -> FailureReason {
        match self {
            Self::Connect { .. } => FailureReason::ConnectFailed,
            Self::Timeout { .. } => FailureReason::Timeout,
            Self::Protocol { .. } => FailureReason::ProtocolError,
        }
    }
}

/// Socket read/write timeouts surface as `WouldBlock` on Unix and `TimedOut`
/// on Windows.
pub(crate) fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}
