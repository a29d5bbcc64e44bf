use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("address does not match the accepted grammar")]
    InvalidFormat,
}

/// An address that passed [`validate`](super::validate), split at the `@`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailAddress {
    raw: String,
    #[serde(skip)]
    at: usize,
}

impl EmailAddress {
    pub fn parse(address: &str) -> Result<Self, SyntaxError> {
        if !super::validate(address) {
            return Err(SyntaxError::InvalidFormat);
        }
        // the grammar admits exactly one '@'
        let at = address.find('@').ok_or(SyntaxError::InvalidFormat)?;
        Ok(Self {
            raw: address.to_string(),
            at,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn local_part(&self) -> &str {
        &self.raw[..self.at]
    }

    pub fn domain(&self) -> &str {
        &self.raw[self.at + 1..]
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
