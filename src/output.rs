//! Output formatting and persistence for locality reports.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::pipeline::LocalityReport;
use crate::tier::CityTier;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// One flat row of score history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub timestamp: DateTime<Utc>,
    pub locality: String,
    pub tier: CityTier,
    pub profile: String,
    pub work: u8,
    pub transport: u8,
    pub public_services: u8,
    pub education: u8,
    pub commerce: u8,
    pub health: u8,
    pub global: u8,
}

impl ScoreRecord {
    pub fn from_report(report: &LocalityReport, timestamp: DateTime<Utc>) -> Self {
        let s = &report.scores;
        Self {
            timestamp,
            locality: report.locality().to_string(),
            tier: report.tier,
            profile: report.profile.clone(),
            work: s.work,
            transport: s.transport,
            public_services: s.public_services,
            education: s.education,
            commerce: s.commerce,
            health: s.health,
            global: s.global,
        }
    }
}

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &LocalityReport) {
    debug!("{:#?}", report);
}

/// Renders a report as pretty-printed JSON.
pub fn print_json(report: &LocalityReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize report")
}

/// Human-readable summary: tier, per-category scores and the global score.
pub fn summary(report: &LocalityReport) -> String {
    let s = &report.scores;
    let mut out = format!(
        "{} ({}, profile {})\n",
        report.locality(),
        report.tier,
        report.profile
    );
    for (label, score) in [
        ("Work", s.work),
        ("Transport", s.transport),
        ("Public Services", s.public_services),
        ("Education", s.education),
        ("Commerce", s.commerce),
        ("Health", s.health),
    ] {
        out.push_str(&format!("  {label:<16}{score:>4}\n"));
    }
    out.push_str(&format!("  {:<16}{:>4}", "Global", s.global));
    if report.excellence_bonus > 0.0 {
        out.push_str(&format!(
            "  (+{} excellence, {} factors)",
            report.excellence_bonus, report.factors_exceeded
        ));
    }
    out
}

/// Appends a [`ScoreRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, record: &ScoreRecord) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("failed to open history '{path}'"))?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    info!(path, locality = %record.locality, global = record.global, "Score recorded");
    Ok(())
}
