//! Death Star command-line runner
//!
//! Reads the lead list, resolves templates, skips already-processed leads
//! and drafts outreach mail for the rest.

use clap::{Arg, Command};
use deathstar_core::{
    paths,
    services::{LeadIngestor, ResultsRecorder, TemplateCatalog},
    workflow::{DraftOrchestrator, FingerprintLedger, RunLock},
    DeathStarConfig, NullMailClient, OutboxMailClient,
};
use deathstar_core::types::LEAD_HEADERS;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging with INFO as default if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("deathstar")
        .version("1.0.0")
        .about("Death Star outreach draft generator")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file path (optional, defaults apply)"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Data directory for pipeline files")
                .default_value("data"),
        )
        .arg(
            Arg::new("leads")
                .long("leads")
                .value_name("FILE")
                .help("Lead CSV path (defaults to <data-dir>/kybercrystals.csv)"),
        )
        .arg(
            Arg::new("templates")
                .long("templates")
                .value_name("FILE")
                .help("Template catalog path (defaults to <data-dir>/templates.json)"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Log what would be drafted without creating drafts or recording anything")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("init")
                .long("init")
                .help("Create the data directory with starter files and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // Initialize data directory
    let data_dir = matches.get_one::<String>("data-dir").unwrap();
    if let Err(e) = paths::init_data_root(data_dir.clone()) {
        log::warn!("Data root initialization warning: {}", e);
    }
    log::info!("Using data directory: {}", data_dir);

    // Load configuration (optional file, defaults otherwise)
    let config = match matches.get_one::<String>("config") {
        Some(config_path) => {
            let config = DeathStarConfig::from_file(config_path)?;
            log::info!("Loaded configuration from {}", config_path);
            config
        }
        None => DeathStarConfig::default(),
    };

    if matches.get_flag("init") {
        init_data_directory()?;
        return Ok(());
    }

    let leads_path = matches
        .get_one::<String>("leads")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(paths::leads_path);
    let templates_path = matches
        .get_one::<String>("templates")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(paths::templates_path);
    let dry_run = matches.get_flag("dry-run");

    // Ingest leads (per-row exclusions are logged by the ingestor)
    let (leads, warnings) = LeadIngestor::ingest(&leads_path)?;

    // Load the template catalog
    let catalog = if templates_path.exists() {
        TemplateCatalog::load(&templates_path)?
    } else {
        log::warn!(
            "No template catalog at {}, using built-in defaults",
            templates_path.display()
        );
        TemplateCatalog::default_catalog()
    };
    log::info!("Loaded {} template(s)", catalog.len());

    // One run at a time; the lock guards the ledger file
    let ledger_path = paths::ledger_path();
    let _lock = RunLock::acquire(&ledger_path)?;
    let mut ledger = FingerprintLedger::load(&ledger_path)?;
    log::info!("Ledger holds {} processed lead(s)", ledger.len());

    let orchestrator = DraftOrchestrator::new(&config).with_dry_run(dry_run);

    let mut report = if dry_run {
        log::info!("Dry run: no drafts will be created, nothing will be recorded");
        let mail = NullMailClient;
        orchestrator.run(&leads, &catalog, &mut ledger, &mail).await?
    } else {
        let drafts_dir = paths::outbox_dir().join(&config.mail.drafts_subfolder);
        let mail = OutboxMailClient::new(&drafts_dir);
        orchestrator.run(&leads, &catalog, &mut ledger, &mail).await?
    };

    // Ingest warnings belong in the batch report too
    report
        .warnings
        .extend(warnings.iter().map(|w| w.to_string()));

    if !dry_run {
        if let Err(e) = ResultsRecorder::append(paths::results_path(), &report) {
            log::error!("Failed to record results: {}", e);
            std::process::exit(1);
        }
    }

    log::info!("{}", report.summary());
    Ok(())
}

/// Create the data directory with starter files so a first run has
/// something to work with.
fn init_data_directory() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    for dir in paths::all_data_directories() {
        std::fs::create_dir_all(&dir)?;
        log::info!("Created {}", dir.display());
    }

    let leads_path = paths::leads_path();
    if !leads_path.exists() {
        std::fs::write(&leads_path, format!("{}\n", LEAD_HEADERS.join(",")))?;
        log::info!("Created empty lead list at {}", leads_path.display());
    }

    let templates_path = paths::templates_path();
    if !templates_path.exists() {
        let catalog = TemplateCatalog::default_catalog();
        std::fs::write(&templates_path, catalog.to_json_string()?)?;
        log::info!("Created default templates at {}", templates_path.display());
    }

    ResultsRecorder::ensure_file(paths::results_path())?;
    log::info!("Data directory ready");
    Ok(())
}
