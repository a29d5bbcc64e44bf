use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::routing::RoutingError;

/// Problems with the verifier setup. These are caller mistakes and are never
/// folded into a negative verdict.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("sender address {0:?} does not match the address grammar")]
    InvalidSender(String),
    #[error("HELO name {0:?} must be a single non-empty token")]
    InvalidHelo(String),
    #[error("SMTP port must not be 0")]
    ZeroPort,
    #[error("{stage} timeout must be greater than zero")]
    ZeroTimeout { stage: &'static str },
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Resolver(#[from] RoutingError),
}

impl ConfigError {
    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(source: toml::de::Error) -> Self {
        Self::Parse { source }
    }
}
