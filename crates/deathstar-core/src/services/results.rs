//! Results log: append-only record of draft outcomes
//!
//! Consumed later by manual reply tracking; best-effort bookkeeping. The
//! drafts themselves are the source of truth, so a failed append never
//! rolls anything back.

use crate::error::Result;
use crate::services::csvio;
use crate::types::BatchReport;
use std::io::Write;
use std::path::Path;

/// Column order of the results CSV
pub const RESULTS_HEADERS: [&str; 7] = [
    "Ref",
    "Email",
    "Company",
    "Industry",
    "Template",
    "Timestamp",
    "Status",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct ResultsRecorder;

impl ResultsRecorder {
    /// Create the results file with its header row if it does not exist yet.
    pub fn ensure_file<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            let header = format!("{}\n", RESULTS_HEADERS.join(","));
            std::fs::write(path, header)?;
        }
        Ok(())
    }

    /// Append one row per draft result. Never rewrites prior history.
    pub fn append<P: AsRef<Path>>(path: P, report: &BatchReport) -> Result<()> {
        let path = path.as_ref();

        if report.results.is_empty() {
            log::debug!("No draft results to record for run {}", report.run_id);
            return Ok(());
        }

        let needs_header = !path.exists();

        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)?;

        if needs_header {
            writeln!(file, "{}", RESULTS_HEADERS.join(","))?;
        }

        for result in &report.results {
            let row = [
                result.reference.clone(),
                result.email.clone(),
                result.company.clone(),
                result.industry.clone(),
                result.template_key.clone(),
                result.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                result.status.to_string(),
            ];
            writeln!(file, "{}", csvio::format_row(&row))?;
        }

        log::info!(
            "Recorded {} result(s) to {}",
            report.results.len(),
            path.display()
        );
        Ok(())
    }
}
