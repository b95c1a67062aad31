//! Batch run management: fingerprint ledger and draft orchestration

pub mod ledger;
pub mod orchestrator;

pub use ledger::{Fingerprint, FingerprintLedger, RunLock};
pub use orchestrator::DraftOrchestrator;
