mod args;
mod output;

use std::io::{self, BufRead};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use mailprobe::{JsonFileStore, VerificationStore, Verifier};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Commands, OutputFormat, VerifyArgs};
use crate::output::{SyntaxRow, VerifyRow, write_rows};

/// Some address was undeliverable, invalid or not found in the store.
const EXIT_NEGATIVE: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.cmd) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_NEGATIVE),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// `Ok(false)` when at least one result is negative.
fn run(cmd: Commands) -> Result<bool> {
    match cmd {
        Commands::Verify(args) => run_verify(&args),
        Commands::Syntax {
            emails,
            stdin,
            format,
        } => {
            let rows: Vec<SyntaxRow> = collect_emails(emails, stdin)?
                .into_iter()
                .map(SyntaxRow::new)
                .collect();
            write_rows(&mut io::stdout().lock(), &rows, format)?;
            Ok(rows.iter().all(|row| row.valid))
        }
        Commands::Recent {
            store,
            limit,
            format,
        } => {
            let records = open_store(&store)?.recent(limit)?;
            write_rows(&mut io::stdout().lock(), &records, format)?;
            Ok(true)
        }
        Commands::Show {
            email,
            store,
            format,
        } => match open_store(&store)?.get(&email)? {
            Some(record) => {
                write_rows(&mut io::stdout().lock(), &[record], format)?;
                Ok(true)
            }
            None => {
                if format == OutputFormat::Human {
                    println!("no record for {email}");
                }
                Ok(false)
            }
        },
    }
}

fn run_verify(args: &VerifyArgs) -> Result<bool> {
    let emails = collect_emails(args.emails.clone(), args.stdin)?;
    let config = args.build_config()?;
    let verifier = Verifier::system(config).context("initialize verifier")?;
    let mut store = args.store.as_deref().map(open_store).transpose()?;

    let mut rows = Vec::with_capacity(emails.len());
    for email in emails {
        let verdict = verifier.check(&email);
        let mut row = VerifyRow::new(email, &verdict, Utc::now());

        if let Some(store) = store.as_mut() {
            let upserted = store
                .upsert(&row.email, row.is_valid, row.verified_at)
                .with_context(|| format!("store verdict for {}", row.email))?;
            debug!(email = %row.email, id = %upserted.record.id, created = upserted.created, "verdict stored");
            row.id = Some(upserted.record.id);
            row.updated = Some(!upserted.created);
        }
        rows.push(row);
    }

    let deliverable = rows.iter().filter(|row| row.is_valid).count();
    info!(total = rows.len(), deliverable, "batch finished");

    write_rows(&mut io::stdout().lock(), &rows, args.format)?;
    Ok(deliverable == rows.len())
}

fn collect_emails(mut emails: Vec<String>, stdin: bool) -> Result<Vec<String>> {
    if stdin {
        for line in io::stdin().lock().lines() {
            let line = line.context("read stdin")?;
            let email = line.trim();
            if !email.is_empty() {
                emails.push(email.to_string());
            }
        }
    }
    anyhow::ensure!(!emails.is_empty(), "aucune adresse fournie (arguments ou --stdin)");
    Ok(emails)
}

fn open_store(path: &Path) -> Result<JsonFileStore> {
    JsonFileStore::open(path).with_context(|| format!("open store {}", path.display()))
}
