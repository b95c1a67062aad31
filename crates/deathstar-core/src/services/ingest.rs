//! Lead ingestion: parse and validate the lead spreadsheet

use crate::error::{DeathStarError, Result};
use crate::services::csvio;
use crate::types::Lead;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"));

/// Headers that must be present for ingestion to proceed
const REQUIRED_HEADERS: [&str; 2] = ["email", "industry"];

/// Non-fatal problem with a single lead row
#[derive(Debug, Clone, PartialEq)]
pub struct IngestWarning {
    /// 1-based data row number (header row excluded)
    pub row: usize,
    pub reason: String,
}

impl std::fmt::Display for IngestWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.row, self.reason)
    }
}

/// Parses the lead spreadsheet into validated, ordered leads
pub struct LeadIngestor;

impl LeadIngestor {
    /// Ingest a lead CSV file.
    ///
    /// Returns the ordered valid leads plus one warning per excluded row.
    /// Missing required headers abort with a `Schema` error.
    pub fn ingest<P: AsRef<Path>>(path: P) -> Result<(Vec<Lead>, Vec<IngestWarning>)> {
        let content = std::fs::read_to_string(&path)?;
        let result = Self::ingest_str(&content)?;
        log::info!(
            "Ingested {} lead(s) from {} ({} excluded)",
            result.0.len(),
            path.as_ref().display(),
            result.1.len()
        );
        Ok(result)
    }

    /// Ingest lead CSV content.
    pub fn ingest_str(content: &str) -> Result<(Vec<Lead>, Vec<IngestWarning>)> {
        let rows = csvio::parse(content);
        let mut rows = rows.into_iter();

        let header_row = rows
            .next()
            .ok_or_else(|| DeathStarError::Schema("Lead file has no header row".to_string()))?;

        let headers: Vec<String> = header_row.iter().map(|h| normalize_header(h)).collect();

        for required in REQUIRED_HEADERS {
            if !headers.iter().any(|h| h == required) {
                return Err(DeathStarError::Schema(format!(
                    "Missing required column: {}",
                    required
                )));
            }
        }

        let mut leads = Vec::new();
        let mut warnings = Vec::new();

        for (index, row) in rows.enumerate() {
            let row_number = index + 1;

            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            let lead = lead_from_row(&headers, &row);
            let email = lead.email.trim();

            if email.is_empty() {
                warnings.push(IngestWarning {
                    row: row_number,
                    reason: "missing email".to_string(),
                });
                continue;
            }

            if !EMAIL_RE.is_match(email) {
                warnings.push(IngestWarning {
                    row: row_number,
                    reason: format!("invalid email: {}", email),
                });
                continue;
            }

            leads.push(lead);
        }

        for warning in &warnings {
            log::warn!("Lead excluded, {}", warning);
        }

        Ok((leads, warnings))
    }
}

/// Normalize a header name: trim, lowercase, spaces to underscores
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

fn lead_from_row(headers: &[String], row: &[String]) -> Lead {
    let mut lead = Lead::default();

    for (column, header) in headers.iter().enumerate() {
        let value = row.get(column).map(|v| v.trim()).unwrap_or("");
        let slot = match header.as_str() {
            "email" => &mut lead.email,
            "first_name" => &mut lead.first_name,
            "last_name" => &mut lead.last_name,
            "company" => &mut lead.company,
            "industry" => &mut lead.industry,
            "phone" => &mut lead.phone,
            "address" => &mut lead.address,
            "city" => &mut lead.city,
            "state" => &mut lead.state,
            "reviews" => &mut lead.reviews,
            "website" => &mut lead.website,
            // Unknown columns are tolerated and ignored
            _ => continue,
        };
        *slot = value.to_string();
    }

    lead
}
