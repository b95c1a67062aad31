//! Common types used throughout the Death Star pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical lead column headers, in spreadsheet order
pub const LEAD_HEADERS: [&str; 11] = [
    "Email",
    "First Name",
    "Last Name",
    "Company",
    "Industry",
    "Phone",
    "Address",
    "City",
    "State",
    "Reviews",
    "Website",
];

/// A single lead row from the lead spreadsheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub industry: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub reviews: String,
    pub website: String,
}

impl Lead {
    /// Look up a field by its normalized name (lowercase, underscores).
    /// Returns `None` for names that are not lead columns.
    pub fn field(&self, normalized_name: &str) -> Option<&str> {
        let value = match normalized_name {
            "email" => &self.email,
            "first_name" => &self.first_name,
            "last_name" => &self.last_name,
            "company" => &self.company,
            "industry" => &self.industry,
            "phone" => &self.phone,
            "address" => &self.address,
            "city" => &self.city,
            "state" => &self.state,
            "reviews" => &self.reviews,
            "website" => &self.website,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Normalized identity key: trimmed, lowercased email
    pub fn identity_key(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// An email template: subject and body with `{Field}` placeholder tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub subject: String,
    pub body: String,
}

/// A fully rendered draft handed to the mail client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Short reference token embedded in the subject for reply tracking
    pub reference: String,
}

/// Outcome of a single draft attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DraftStatus {
    Drafted,
    Failed(String),
}

impl std::fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DraftStatus::Drafted => write!(f, "drafted"),
            DraftStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Append-only record of one draft attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftResult {
    pub reference: String,
    pub email: String,
    pub company: String,
    pub industry: String,
    pub template_key: String,
    pub timestamp: DateTime<Utc>,
    pub status: DraftStatus,
}

/// Summary of one orchestrator run over a lead list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub drafted: usize,
    pub already_processed: usize,
    pub skipped_no_template: usize,
    pub failed: usize,
    pub results: Vec<DraftResult>,
    pub warnings: Vec<String>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            drafted: 0,
            already_processed: 0,
            skipped_no_template: 0,
            failed: 0,
            results: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// One-line summary for logging
    pub fn summary(&self) -> String {
        format!(
            "run {}: {} drafted, {} already processed, {} without template, {} failed, {} warning(s)",
            self.run_id,
            self.drafted,
            self.already_processed,
            self.skipped_no_template,
            self.failed,
            self.warnings.len()
        )
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}
