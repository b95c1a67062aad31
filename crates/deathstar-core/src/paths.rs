/// Path constants and utilities for the Death Star data directory
use once_cell::sync::OnceCell;
use std::path::PathBuf;

// Static storage for configurable data root
static DATA_ROOT: OnceCell<String> = OnceCell::new();

// Default root constant
const DEFAULT_DATA_ROOT: &str = "data";

// File names inside the data root (kept from the original app)
pub const LEADS_FILE_NAME: &str = "kybercrystals.csv";
pub const LEDGER_FILE_NAME: &str = "annihilated_planets.txt";
pub const TEMPLATES_FILE_NAME: &str = "templates.json";
pub const RESULTS_FILE_NAME: &str = "results.csv";
pub const OUTBOX_DIR_NAME: &str = "outbox";

/// Drafts subfolder inside the outbox
pub const DRAFTS_SUBFOLDER: &str = "Order 66";

/// Initialize the data root directory. Can only be called once.
/// If not called, the default `data` will be used.
pub fn init_data_root(path: String) -> Result<(), String> {
    DATA_ROOT
        .set(path)
        .map_err(|_| "Data root already initialized".to_string())
}

/// Get the configured data root or the default
fn get_data_root() -> &'static str {
    DATA_ROOT
        .get()
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_DATA_ROOT)
}

// Path builder functions
pub fn data_root() -> PathBuf {
    PathBuf::from(get_data_root())
}

pub fn leads_path() -> PathBuf {
    data_root().join(LEADS_FILE_NAME)
}

pub fn ledger_path() -> PathBuf {
    data_root().join(LEDGER_FILE_NAME)
}

pub fn templates_path() -> PathBuf {
    data_root().join(TEMPLATES_FILE_NAME)
}

pub fn results_path() -> PathBuf {
    data_root().join(RESULTS_FILE_NAME)
}

pub fn outbox_dir() -> PathBuf {
    data_root().join(OUTBOX_DIR_NAME)
}

pub fn drafts_dir() -> PathBuf {
    outbox_dir().join(DRAFTS_SUBFOLDER)
}

/// All directories that should exist before a run
pub fn all_data_directories() -> Vec<PathBuf> {
    vec![data_root(), outbox_dir(), drafts_dir()]
}
