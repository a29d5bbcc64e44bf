//! MX resolution: picks the single mail exchanger the probe talks to.
//!
//! The public entry point is [`resolve`], generic over the [`LookupMx`] seam.
//! [`SystemDns`] implements that seam with the system resolver configuration.

mod error;
mod resolver;
mod types;

pub use error::RoutingError;
pub use resolver::{LookupMx, SystemDns, resolve, select_route};
pub use types::MailRoute;
