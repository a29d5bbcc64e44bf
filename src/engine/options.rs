use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::ConfigError;
use crate::syntax;
use crate::transport::SMTP_PORT;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Settings injected into [`Verifier`](super::Verifier) at construction.
///
/// Loadable from TOML; every field but `from_address` has a default:
///
/// ```toml
/// from_address = "verify@example.com"
/// helo_name = "probe.example.com"
/// smtp_port = 25
/// dns_timeout_ms = 10000
/// smtp_timeout_ms = 10000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifierConfig {
    /// Envelope sender claimed in `MAIL FROM`.
    pub from_address: String,
    #[serde(default = "default_helo_name")]
    pub helo_name: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default = "default_timeout_ms")]
    pub dns_timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub smtp_timeout_ms: u64,
}

/// The machine's hostname, or `localhost` when it has none usable in `HELO`.
fn default_helo_name() -> String {
    let host = gethostname::gethostname();
    match host.to_str().map(str::trim) {
        Some(name) if !name.is_empty() && !name.contains(char::is_whitespace) => name.to_string(),
        _ => "localhost".to_string(),
    }
}

fn default_smtp_port() -> u16 {
    SMTP_PORT
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl VerifierConfig {
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
            helo_name: default_helo_name(),
            smtp_port: default_smtp_port(),
            dns_timeout_ms: DEFAULT_TIMEOUT_MS,
            smtp_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Apply the same bound to the DNS and the SMTP stage.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.dns_timeout_ms = ms;
        self.smtp_timeout_ms = ms;
        self
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_millis(self.dns_timeout_ms)
    }

    pub fn smtp_timeout(&self) -> Duration {
        Duration::from_millis(self.smtp_timeout_ms)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(ConfigError::parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::read(path, err))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !syntax::validate(&self.from_address) {
            return Err(ConfigError::InvalidSender(self.from_address.clone()));
        }
        let helo = self.helo_name.trim();
        if helo.is_empty() || helo.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidHelo(self.helo_name.clone()));
        }
        if self.smtp_port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if self.dns_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout { stage: "dns" });
        }
        if self.smtp_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout { stage: "smtp" });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = VerifierConfig::from_toml_str(r#"from_address = "verify@acme-corp.com""#)
            .expect("valid config");
        assert_eq!(config, VerifierConfig::new("verify@acme-corp.com"));
        assert_eq!(config.dns_timeout(), Duration::from_secs(10));
        assert_eq!(config.smtp_timeout(), Duration::from_secs(10));
        assert_eq!(config.smtp_port, 25);
        assert_eq!(config.helo_name, default_helo_name());
    }

    #[test]
    fn default_helo_names_this_host() {
        let helo = default_helo_name();
        let host = gethostname::gethostname();
        match host.to_str().map(str::trim) {
            Some(name) if !name.is_empty() && !name.contains(char::is_whitespace) => {
                assert_eq!(helo, name)
            }
            _ => assert_eq!(helo, "localhost"),
        }
        VerifierConfig::new("verify@acme-corp.com")
            .validate()
            .expect("default HELO is accepted");
    }

    #[test]
    fn full_file_parses() {
        let config = VerifierConfig::from_toml_str(
            r#"
            from_address = "verify@acme-corp.com"
            helo_name = "probe.acme-corp.com"
            smtp_port = 2525
            dns_timeout_ms = 3000
            smtp_timeout_ms = 8000
            "#,
        )
        .expect("valid config");
        assert_eq!(config.helo_name, "probe.acme-corp.com");
        assert_eq!(config.smtp_port, 2525);
        assert_eq!(config.dns_timeout(), Duration::from_secs(3));
        assert_eq!(config.smtp_timeout(), Duration::from_secs(8));
    }

    #[test]
    fn unknown_keys_and_missing_sender_are_rejected() {
        let err = VerifierConfig::from_toml_str("from_address = \"a@b.com\"\nretries = 3")
            .expect_err("unknown key");
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = VerifierConfig::from_toml_str("helo_name = \"x\"").expect_err("no sender");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn validate_catches_bad_values() {
        let bad_sender = VerifierConfig::new("verify@localhost");
        assert!(matches!(
            bad_sender.validate(),
            Err(ConfigError::InvalidSender(_))
        ));

        let mut bad_helo = VerifierConfig::new("verify@acme-corp.com");
        bad_helo.helo_name = "probe\r\nRSET".to_string();
        assert!(matches!(bad_helo.validate(), Err(ConfigError::InvalidHelo(_))));

        let zero = VerifierConfig::new("verify@acme-corp.com").with_timeout(Duration::ZERO);
        assert!(matches!(
            zero.validate(),
            Err(ConfigError::ZeroTimeout { stage: "dns" })
        ));

        let mut no_port = VerifierConfig::new("verify@acme-corp.com");
        no_port.smtp_port = 0;
        assert!(matches!(no_port.validate(), Err(ConfigError::ZeroPort)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = VerifierConfig::from_toml_file("/nonexistent/mailprobe.toml")
            .expect_err("missing file");
        assert!(err.to_string().contains("/nonexistent/mailprobe.toml"));
    }
}
