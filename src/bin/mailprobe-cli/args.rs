use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use mailprobe::VerifierConfig;

#[derive(Parser)]
#[command(name = "mailprobe-cli", version, about = "Email deliverability probe")]
pub struct Cli {
    /// verbosité des logs sur stderr (-v info, -vv debug); RUST_LOG prime
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// syntaxe + MX + sonde SMTP (RCPT TO)
    Verify(VerifyArgs),
    /// contrôle de syntaxe seul, sans réseau
    Syntax {
        emails: Vec<String>,
        /// lit des adresses depuis stdin (une par ligne)
        #[arg(long)]
        stdin: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
    /// derniers résultats enregistrés, du plus récent au plus ancien
    Recent {
        #[arg(long)]
        store: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
    /// résultat enregistré pour une adresse
    Show {
        email: String,
        #[arg(long)]
        store: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
}

#[derive(Args)]
pub struct VerifyArgs {
    pub emails: Vec<String>,

    /// lit des adresses depuis stdin (une par ligne)
    #[arg(long)]
    pub stdin: bool,

    /// enveloppe MAIL FROM
    #[arg(long = "from", env = "MAILPROBE_FROM")]
    pub from: Option<String>,

    /// nom annoncé dans HELO
    #[arg(long)]
    pub helo: Option<String>,

    /// port SMTP (25 par défaut)
    #[arg(long)]
    pub port: Option<u16>,

    /// timeout par étape (DNS, SMTP), en secondes
    #[arg(long)]
    pub timeout: Option<f64>,

    /// fichier de configuration TOML
    #[arg(long, env = "MAILPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// enregistre chaque verdict dans ce fichier JSON (upsert par adresse)
    #[arg(long)]
    pub store: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Ndjson,
    Csv,
}

impl VerifyArgs {
    /// Config file first, then flags on top.
    pub fn build_config(&self) -> Result<VerifierConfig> {
        let mut config = match &self.config {
            Some(path) => VerifierConfig::from_toml_file(path)
                .with_context(|| format!("load config {}", path.display()))?,
            None => {
                let from = self
                    .from
                    .clone()
                    .context("--from (ou MAILPROBE_FROM) requis sans --config")?;
                VerifierConfig::new(from)
            }
        };

        if let Some(from) = &self.from {
            config.from_address = from.clone();
        }
        if let Some(helo) = &self.helo {
            config.helo_name = helo.clone();
        }
        if let Some(port) = self.port {
            config.smtp_port = port;
        }
        if let Some(secs) = self.timeout {
            let timeout = Duration::try_from_secs_f64(secs)
                .with_context(|| format!("invalid --timeout {secs}"))?;
            config = config.with_timeout(timeout);
        }

        config.validate()?;
        Ok(config)
    }
}
