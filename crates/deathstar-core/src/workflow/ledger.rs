//! Fingerprint ledger: which leads have already been drafted
//!
//! The ledger file holds one opaque token per line. It is append-only from
//! the pipeline's point of view; deleting the file resets processed-state.

use crate::error::{DeathStarError, Result};
use crate::types::Lead;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Stable identity token for a lead
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint for a lead.
    ///
    /// Identity is the normalized email; with `salt_with_company` the
    /// normalized company name is folded in to separate leads that share
    /// an inbox across lists.
    pub fn compute(lead: &Lead, salt_with_company: bool) -> Self {
        let mut key = lead.identity_key();
        if salt_with_company {
            key.push('|');
            key.push_str(&lead.company.trim().to_lowercase());
        }
        Fingerprint(format!("{:x}", md5::compute(key.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short reference token for draft subjects and the results log
    pub fn short_ref(&self) -> &str {
        &self.0[..8]
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// In-memory view of the persisted fingerprint set
#[derive(Debug)]
pub struct FingerprintLedger {
    path: PathBuf,
    entries: HashSet<String>,
}

impl FingerprintLedger {
    /// Load the ledger from disk. A missing file is an empty ledger
    /// (first-run semantics), never an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            content
                .lines()
                .map(|line| line.trim())
                .filter(|line| !line.is_empty())
                .map(|line| line.to_string())
                .collect()
        } else {
            HashSet::new()
        };

        log::info!(
            "Loaded fingerprint ledger from {} ({} entries)",
            path.display(),
            entries.len()
        );

        Ok(Self { path, entries })
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.contains(fingerprint.as_str())
    }

    /// Record a fingerprint in memory. Returns false if it was already known.
    pub fn record(&mut self, fingerprint: &Fingerprint) -> bool {
        self.entries.insert(fingerprint.as_str().to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist the full ledger atomically: write to a temp file in the same
    /// directory, then rename over the target. A crash mid-write leaves the
    /// previous ledger intact.
    pub fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut tokens: Vec<&str> = self.entries.iter().map(|s| s.as_str()).collect();
        tokens.sort_unstable();

        let mut content = tokens.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut tmp = fs::File::create(&tmp_path)?;
            tmp.write_all(content.as_bytes())?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        log::info!(
            "Persisted fingerprint ledger to {} ({} entries)",
            self.path.display(),
            self.entries.len()
        );
        Ok(())
    }
}

/// Exclusive advisory lock for a batch run against one ledger file.
///
/// Implemented as an `O_EXCL` lock file next to the ledger; released on
/// drop. A stale lock left by a crashed process is removed manually.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    pub fn acquire<P: AsRef<Path>>(ledger_path: P) -> Result<Self> {
        let path = ledger_path.as_ref().with_extension("lock");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(mut file) => {
                // Pid makes stale locks identifiable
                let _ = writeln!(file, "{}", std::process::id());
                log::debug!("Acquired run lock at {}", path.display());
                Ok(Self { path })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(DeathStarError::ConcurrentRun(format!(
                    "Another run holds {} (delete it if the previous run crashed)",
                    path.display()
                )))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            log::warn!("Failed to remove run lock {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lead(email: &str, company: &str) -> Lead {
        Lead {
            email: email.to_string(),
            company: company.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = Fingerprint::compute(&lead("a@x.com", "Acme"), false);
        let b = Fingerprint::compute(&lead("a@x.com", "Acme"), false);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_normalizes_email() {
        let a = Fingerprint::compute(&lead("  A@X.com ", "Acme"), false);
        let b = Fingerprint::compute(&lead("a@x.com", "Other Co"), false);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_distinct_emails_differ() {
        let a = Fingerprint::compute(&lead("a@x.com", ""), false);
        let b = Fingerprint::compute(&lead("b@x.com", ""), false);
        assert_ne!(a, b);
    }

    #[test]
    fn test_company_salt_separates_shared_inboxes() {
        let a = Fingerprint::compute(&lead("info@x.com", "Acme"), true);
        let b = Fingerprint::compute(&lead("info@x.com", "Binary"), true);
        assert_ne!(a, b);

        let unsalted_a = Fingerprint::compute(&lead("info@x.com", "Acme"), false);
        let unsalted_b = Fingerprint::compute(&lead("info@x.com", "Binary"), false);
        assert_eq!(unsalted_a, unsalted_b);
    }

    #[test]
    fn test_short_ref_is_hex_prefix() {
        let fp = Fingerprint::compute(&lead("a@x.com", ""), false);
        assert_eq!(fp.short_ref().len(), 8);
        assert!(fp.as_str().starts_with(fp.short_ref()));
        assert!(fp.short_ref().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = FingerprintLedger::load(temp_dir.path().join("none.txt")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_record_and_contains() {
        let temp_dir = TempDir::new().unwrap();
        let mut ledger = FingerprintLedger::load(temp_dir.path().join("ledger.txt")).unwrap();
        let fp = Fingerprint::compute(&lead("a@x.com", ""), false);

        assert!(!ledger.contains(&fp));
        assert!(ledger.record(&fp));
        assert!(ledger.contains(&fp));
        // Second record of the same token is a no-op
        assert!(!ledger.record(&fp));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_persist_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.txt");

        let fp_a = Fingerprint::compute(&lead("a@x.com", ""), false);
        let fp_b = Fingerprint::compute(&lead("b@x.com", ""), false);

        let mut ledger = FingerprintLedger::load(&path).unwrap();
        ledger.record(&fp_a);
        ledger.record(&fp_b);
        ledger.persist().unwrap();

        let reloaded = FingerprintLedger::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains(&fp_a));
        assert!(reloaded.contains(&fp_b));
    }

    #[test]
    fn test_persist_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.txt");

        let mut ledger = FingerprintLedger::load(&path).unwrap();
        ledger.record(&Fingerprint::compute(&lead("a@x.com", ""), false));
        ledger.persist().unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_load_tolerates_blank_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.txt");
        fs::write(&path, "aaaa\n\n  \nbbbb\n").unwrap();

        let ledger = FingerprintLedger::load(&path).unwrap();
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_run_lock_excludes_second_acquirer() {
        let temp_dir = TempDir::new().unwrap();
        let ledger_path = temp_dir.path().join("ledger.txt");

        let lock = RunLock::acquire(&ledger_path).unwrap();
        let second = RunLock::acquire(&ledger_path);
        assert!(matches!(second, Err(DeathStarError::ConcurrentRun(_))));

        drop(lock);
        let third = RunLock::acquire(&ledger_path);
        assert!(third.is_ok());
    }
}
