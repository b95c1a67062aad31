//! Mail client boundary
//!
//! The orchestrator only ever talks to this trait. The real mail
//! application is an opaque external collaborator: one draft per call,
//! no transactional guarantees across calls.

use crate::error::Result;
use crate::types::DraftRequest;
use async_trait::async_trait;

#[async_trait]
pub trait MailClient: Send + Sync {
    /// Create a single draft. A failure affects only this draft.
    async fn create_draft(&self, draft: &DraftRequest) -> Result<()>;
}

/// Mail client that logs drafts without creating anything. Used for dry runs.
pub struct NullMailClient;

#[async_trait]
impl MailClient for NullMailClient {
    async fn create_draft(&self, draft: &DraftRequest) -> Result<()> {
        log::info!(
            "[dry run] would draft to {} with subject '{}'",
            draft.to,
            draft.subject
        );
        Ok(())
    }
}
