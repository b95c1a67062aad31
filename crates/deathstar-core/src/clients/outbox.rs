//! File-based mail client: drafts land as .eml files in an outbox folder
//!
//! Stands in for the desktop mail application. Each draft becomes one file
//! in the drafts subfolder, body rendered as simple HTML paragraphs with the
//! reference token embedded as a comment for reply tracking.

use crate::error::{DeathStarError, Result};
use crate::types::DraftRequest;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::mail::MailClient;

pub struct OutboxMailClient {
    drafts_dir: PathBuf,
}

impl OutboxMailClient {
    pub fn new<P: AsRef<Path>>(drafts_dir: P) -> Self {
        Self {
            drafts_dir: drafts_dir.as_ref().to_path_buf(),
        }
    }

    fn draft_path(&self, draft: &DraftRequest) -> PathBuf {
        self.drafts_dir.join(format!("draft_{}.eml", draft.reference))
    }

    fn draft_content(draft: &DraftRequest) -> String {
        format!(
            "To: {}\r\n\
             Subject: {}\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: text/html; charset=utf-8\r\n\
             \r\n\
             <!DOCTYPE html><html><head><meta charset=\"utf-8\"></head>\n\
             <body style=\"margin:0;padding:0;\">\n\
             <div style=\"font-family:Segoe UI, Arial, sans-serif; font-size:14px; line-height:1.5; color:#111;\">\n\
             {}\n\
             <!-- ref:{} -->\n\
             </div></body></html>\n",
            draft.to,
            draft.subject,
            body_to_html(&draft.body),
            draft.reference
        )
    }
}

#[async_trait]
impl MailClient for OutboxMailClient {
    async fn create_draft(&self, draft: &DraftRequest) -> Result<()> {
        std::fs::create_dir_all(&self.drafts_dir).map_err(|e| {
            DeathStarError::MailClient(format!(
                "Outbox {} unavailable: {}",
                self.drafts_dir.display(),
                e
            ))
        })?;

        let path = self.draft_path(draft);
        std::fs::write(&path, Self::draft_content(draft)).map_err(|e| {
            DeathStarError::MailClient(format!("Failed to write draft {}: {}", path.display(), e))
        })?;

        log::info!("Created draft {} for {}", path.display(), draft.to);
        Ok(())
    }
}

/// Render plain text as HTML paragraphs: blank-line-separated blocks become
/// `<p>` elements, single newlines become `<br>`.
fn body_to_html(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    let paragraphs: Vec<String> = normalized
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(|block| {
            format!(
                "<p style=\"margin:0 0 12px 0;\">{}</p>",
                escape_html(block).replace('\n', "<br>")
            )
        })
        .collect();

    if paragraphs.is_empty() {
        "<p></p>".to_string()
    } else {
        paragraphs.join("\n")
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn draft() -> DraftRequest {
        DraftRequest {
            to: "a@x.com".to_string(),
            subject: "Quick intro [ref:deadbeef]".to_string(),
            body: "Hey Ada,\n\nSecond paragraph with <angle> & ampersand.\nSame block.".to_string(),
            reference: "deadbeef".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_draft_writes_eml_file() {
        let temp_dir = TempDir::new().unwrap();
        let client = OutboxMailClient::new(temp_dir.path().join("Order 66"));

        client.create_draft(&draft()).await.unwrap();

        let path = temp_dir.path().join("Order 66").join("draft_deadbeef.eml");
        let content = std::fs::read_to_string(path).unwrap();

        assert!(content.starts_with("To: a@x.com\r\n"));
        assert!(content.contains("Subject: Quick intro [ref:deadbeef]"));
        assert!(content.contains("<!-- ref:deadbeef -->"));
    }

    #[tokio::test]
    async fn test_body_rendered_as_escaped_paragraphs() {
        let temp_dir = TempDir::new().unwrap();
        let client = OutboxMailClient::new(temp_dir.path());

        client.create_draft(&draft()).await.unwrap();

        let content =
            std::fs::read_to_string(temp_dir.path().join("draft_deadbeef.eml")).unwrap();
        assert!(content.contains("<p style=\"margin:0 0 12px 0;\">Hey Ada,</p>"));
        assert!(content.contains("&lt;angle&gt; &amp; ampersand.<br>Same block."));
    }

    #[tokio::test]
    async fn test_unreachable_outbox_is_mail_client_error() {
        let temp_dir = TempDir::new().unwrap();
        // A file where the outbox directory should be
        let blocker = temp_dir.path().join("outbox");
        std::fs::write(&blocker, "not a directory").unwrap();

        let client = OutboxMailClient::new(&blocker);
        let result = client.create_draft(&draft()).await;
        assert!(matches!(result, Err(DeathStarError::MailClient(_))));
    }

    #[test]
    fn test_body_to_html_empty_body() {
        assert_eq!(body_to_html("   \n\n  "), "<p></p>");
    }
}
