//! End-to-end pipeline tests: real files in a temp directory, from lead CSV
//! to outbox drafts and the results log.

use deathstar_core::{
    DeathStarConfig, DeathStarError, DraftOrchestrator, FingerprintLedger, LeadIngestor,
    OutboxMailClient, ResultsRecorder, RunLock, TemplateCatalog,
};
use std::path::Path;
use tempfile::TempDir;

const LEADS_CSV: &str = "\
Email,First Name,Last Name,Company,Industry,Phone,Address,City,State,Reviews,Website
a@x.com,Ada,Lovelace,Analytical Farms,Farm,555-0100,1 Farm Rd,Plains,KS,12,farms.example
b@x.com,Bo,Butcher,\"Bo's Meats, LLC\",Butcher,555-0101,2 Meat St,Plains,KS,40,meats.example
,Nobody,Blank,No Email Co,Farm,,,,,,
";

const TEMPLATES_JSON: &str = r#"{
    "templates": {
        "farm": {
            "subject": "Quick intro for {Company}",
            "body": "Hey {First Name},\n\nWe help farms grow."
        },
        "default": {
            "subject": "Quick intro",
            "body": "Hey {First Name},\n\nWe help {Industry} businesses."
        }
    }
}"#;

fn write_inputs(dir: &Path) {
    std::fs::write(dir.join("kybercrystals.csv"), LEADS_CSV).unwrap();
    std::fs::write(dir.join("templates.json"), TEMPLATES_JSON).unwrap();
}

async fn run_once(dir: &Path) -> deathstar_core::BatchReport {
    let (leads, _warnings) = LeadIngestor::ingest(dir.join("kybercrystals.csv")).unwrap();
    let catalog = TemplateCatalog::load(dir.join("templates.json")).unwrap();

    let ledger_path = dir.join("annihilated_planets.txt");
    let _lock = RunLock::acquire(&ledger_path).unwrap();
    let mut ledger = FingerprintLedger::load(&ledger_path).unwrap();

    let mail = OutboxMailClient::new(dir.join("outbox").join("Order 66"));
    let orchestrator = DraftOrchestrator::new(&DeathStarConfig::default());

    let report = orchestrator
        .run(&leads, &catalog, &mut ledger, &mail)
        .await
        .unwrap();

    ResultsRecorder::append(dir.join("results.csv"), &report).unwrap();
    report
}

#[tokio::test]
async fn test_full_run_creates_drafts_ledger_and_results() {
    let temp_dir = TempDir::new().unwrap();
    write_inputs(temp_dir.path());

    let report = run_once(temp_dir.path()).await;

    assert_eq!(report.drafted, 2);
    assert_eq!(report.already_processed, 0);
    assert_eq!(report.failed, 0);

    // Two draft files in the outbox subfolder
    let drafts_dir = temp_dir.path().join("outbox").join("Order 66");
    let drafts: Vec<_> = std::fs::read_dir(&drafts_dir).unwrap().collect();
    assert_eq!(drafts.len(), 2);

    // Ledger has both fingerprints, one token per line
    let ledger_content =
        std::fs::read_to_string(temp_dir.path().join("annihilated_planets.txt")).unwrap();
    assert_eq!(ledger_content.lines().count(), 2);

    // Results log: header plus two drafted rows
    let results = std::fs::read_to_string(temp_dir.path().join("results.csv")).unwrap();
    assert_eq!(results.lines().count(), 3);
    assert!(results.contains("a@x.com"));
    assert!(results.contains("b@x.com"));
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    write_inputs(temp_dir.path());

    let first = run_once(temp_dir.path()).await;
    assert_eq!(first.drafted, 2);

    let second = run_once(temp_dir.path()).await;
    assert_eq!(second.drafted, 0);
    assert_eq!(second.already_processed, 2);

    // Results log unchanged by the no-op run
    let results = std::fs::read_to_string(temp_dir.path().join("results.csv")).unwrap();
    assert_eq!(results.lines().count(), 3);
}

#[tokio::test]
async fn test_deleting_ledger_resets_processed_state() {
    let temp_dir = TempDir::new().unwrap();
    write_inputs(temp_dir.path());

    run_once(temp_dir.path()).await;
    std::fs::remove_file(temp_dir.path().join("annihilated_planets.txt")).unwrap();

    let report = run_once(temp_dir.path()).await;
    assert_eq!(report.drafted, 2);
}

#[tokio::test]
async fn test_concurrent_run_fails_fast() {
    let temp_dir = TempDir::new().unwrap();
    let ledger_path = temp_dir.path().join("annihilated_planets.txt");

    let _held = RunLock::acquire(&ledger_path).unwrap();
    let second = RunLock::acquire(&ledger_path);
    assert!(matches!(second, Err(DeathStarError::ConcurrentRun(_))));
}
