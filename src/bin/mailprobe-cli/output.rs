use std::io::Write;

use anyhow::Result;
#[cfg(not(feature = "with-csv"))]
use anyhow::bail;
use chrono::{DateTime, SecondsFormat, Utc};
use mailprobe::{Verdict, VerificationRecord};
use serde::Serialize;
use uuid::Uuid;

use crate::args::OutputFormat;

/// One line of output, in every format the CLI knows.
pub trait Row: Serialize {
    const CSV_HEADER: &'static [&'static str];

    fn human(&self) -> String;

    fn csv_fields(&self) -> Vec<String>;
}

#[derive(Debug, Serialize)]
pub struct VerifyRow {
    pub email: String,
    pub is_valid: bool,
    pub verdict: &'static str,
    pub detail: String,
    pub verified_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// `true` when a stored record for the address was replaced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<bool>,
}

impl VerifyRow {
    pub fn new(email: String, verdict: &Verdict, verified_at: DateTime<Utc>) -> Self {
        Self {
            email,
            is_valid: verdict.is_deliverable(),
            verdict: verdict.label(),
            detail: verdict.to_string(),
            verified_at,
            id: None,
            updated: None,
        }
    }
}

impl Row for VerifyRow {
    const CSV_HEADER: &'static [&'static str] =
        &["email", "is_valid", "verdict", "detail", "verified_at", "id"];

    fn human(&self) -> String {
        if self.is_valid {
            format!("[OK]    {}", self.email)
        } else {
            format!("[UNDELIVERABLE] {} :: {}", self.email, self.detail)
        }
    }

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.email.clone(),
            self.is_valid.to_string(),
            self.verdict.to_string(),
            self.detail.clone(),
            rfc3339(&self.verified_at),
            self.id.map(|id| id.to_string()).unwrap_or_default(),
        ]
    }
}

#[derive(Debug, Serialize)]
pub struct SyntaxRow {
    pub email: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_part: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl SyntaxRow {
    pub fn new(email: String) -> Self {
        match mailprobe::EmailAddress::parse(&email) {
            Ok(addr) => Self {
                local_part: Some(addr.local_part().to_string()),
                domain: Some(addr.domain().to_string()),
                valid: true,
                email,
            },
            Err(_) => Self {
                email,
                valid: false,
                local_part: None,
                domain: None,
            },
        }
    }
}

impl Row for SyntaxRow {
    const CSV_HEADER: &'static [&'static str] = &["email", "valid", "local_part", "domain"];

    fn human(&self) -> String {
        if self.valid {
            format!("[OK]    {}", self.email)
        } else {
            format!("[INVALID] {} :: invalid address syntax", self.email)
        }
    }

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.email.clone(),
            self.valid.to_string(),
            self.local_part.clone().unwrap_or_default(),
            self.domain.clone().unwrap_or_default(),
        ]
    }
}

impl Row for VerificationRecord {
    const CSV_HEADER: &'static [&'static str] = &["id", "email", "is_valid", "verified_at"];

    fn human(&self) -> String {
        let status = if self.is_valid { "valid" } else { "invalid" };
        format!(
            "{}  {:<7}  {}  ({})",
            rfc3339(&self.verified_at),
            status,
            self.email,
            self.id
        )
    }

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.email.clone(),
            self.is_valid.to_string(),
            rfc3339(&self.verified_at),
        ]
    }
}

pub fn write_rows<W: Write, T: Row>(out: &mut W, rows: &[T], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            for row in rows {
                writeln!(out, "{}", row.human())?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, rows)?;
            writeln!(out)?;
        }
        OutputFormat::Ndjson => {
            for row in rows {
                serde_json::to_writer(&mut *out, row)?;
                writeln!(out)?;
            }
        }
        OutputFormat::Csv => write_csv(out, rows)?,
    }
    out.flush()?;
    Ok(())
}

#[cfg(feature = "with-csv")]
fn write_csv<W: Write, T: Row>(out: &mut W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(T::CSV_HEADER)?;
    for row in rows {
        wtr.write_record(row.csv_fields())?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv<W: Write, T: Row>(_: &mut W, _: &[T]) -> Result<()> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

fn rfc3339(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
