//! Draft orchestrator: filters new leads, renders templates, requests drafts

use crate::clients::MailClient;
use crate::config::DeathStarConfig;
use crate::error::{DeathStarError, Result};
use crate::services::templates::TemplateCatalog;
use crate::types::{BatchReport, DraftRequest, DraftResult, DraftStatus, Lead};
use chrono::Utc;

use super::ledger::{Fingerprint, FingerprintLedger};

/// Sequential draft pipeline over one lead list.
///
/// Per-lead failures (no template, mail client down) are isolated and
/// reported; the ledger is persisted exactly once, after the full pass,
/// and only ever gains the fingerprints of confirmed drafts.
pub struct DraftOrchestrator {
    salt_with_company: bool,
    dry_run: bool,
}

impl DraftOrchestrator {
    pub fn new(config: &DeathStarConfig) -> Self {
        Self {
            salt_with_company: config.fingerprint.salt_with_company,
            dry_run: false,
        }
    }

    /// Dry runs render everything but never touch the ledger.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(
        &self,
        leads: &[Lead],
        catalog: &TemplateCatalog,
        ledger: &mut FingerprintLedger,
        mail: &dyn MailClient,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::new();

        log::info!(
            "Starting draft run {} over {} lead(s){}",
            report.run_id,
            leads.len(),
            if self.dry_run { " (dry run)" } else { "" }
        );

        for lead in leads {
            let fingerprint = Fingerprint::compute(lead, self.salt_with_company);

            if ledger.contains(&fingerprint) {
                log::debug!("Skipping {}: already drafted", lead.email);
                report.already_processed += 1;
                continue;
            }

            let (template_key, template) = match catalog.resolve(&lead.industry) {
                Ok(resolved) => resolved,
                Err(DeathStarError::TemplateNotFound(industry)) => {
                    log::warn!(
                        "Skipping {}: no template for industry '{}'",
                        lead.email,
                        industry
                    );
                    report.skipped_no_template += 1;
                    report
                        .warnings
                        .push(format!("{}: no template for industry '{}'", lead.email, industry));
                    continue;
                }
                Err(e) => return Err(e),
            };

            let rendered = TemplateCatalog::render(template, lead);
            for token in &rendered.unknown_tokens {
                report.warnings.push(format!(
                    "{}: unknown token {{{}}} in template '{}'",
                    lead.email, token, template_key
                ));
            }

            let reference = fingerprint.short_ref().to_string();
            let draft = DraftRequest {
                to: lead.email.trim().to_string(),
                subject: format!("{} [ref:{}]", rendered.subject, reference),
                body: rendered.body,
                reference: reference.clone(),
            };

            match mail.create_draft(&draft).await {
                Ok(()) => {
                    if !self.dry_run {
                        ledger.record(&fingerprint);
                    }
                    report.drafted += 1;
                    report.results.push(DraftResult {
                        reference,
                        email: draft.to,
                        company: lead.company.clone(),
                        industry: lead.industry.clone(),
                        template_key: template_key.to_string(),
                        timestamp: Utc::now(),
                        status: DraftStatus::Drafted,
                    });
                }
                Err(e) => {
                    // Fingerprint stays unrecorded so the lead retries next run
                    log::error!("Draft failed for {}: {}", lead.email, e);
                    report.failed += 1;
                    report.results.push(DraftResult {
                        reference,
                        email: draft.to,
                        company: lead.company.clone(),
                        industry: lead.industry.clone(),
                        template_key: template_key.to_string(),
                        timestamp: Utc::now(),
                        status: DraftStatus::Failed(e.to_string()),
                    });
                }
            }
        }

        report.finished_at = Some(Utc::now());

        if self.dry_run {
            log::info!("Dry run, ledger left untouched");
        } else {
            // Exactly one persist per run, after the full pass
            ledger.persist()?;
        }

        log::info!("{}", report.summary());
        Ok(report)
    }
}
