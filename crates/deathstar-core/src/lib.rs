//! Death Star Core Library
//!
//! Drafting pipeline for the Death Star outreach tool: lead ingestion,
//! industry template resolution, fingerprint-based deduplication, and
//! draft orchestration against an external mail client.

pub mod clients;
pub mod config;
pub mod error;
pub mod paths;
pub mod services;
pub mod types;
pub mod workflow;

// Re-export main types for easy access
pub use config::DeathStarConfig;
pub use error::{DeathStarError, Result};

// Re-export client types
pub use clients::{MailClient, NullMailClient, OutboxMailClient};

// Re-export service types
pub use services::{IngestWarning, LeadIngestor, ResultsRecorder, TemplateCatalog};

// Re-export workflow types
pub use workflow::{DraftOrchestrator, Fingerprint, FingerprintLedger, RunLock};

pub use types::{BatchReport, DraftRequest, DraftResult, DraftStatus, Lead, Template};
