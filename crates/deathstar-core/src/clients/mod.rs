//! Client modules for external collaborators

pub mod mail;
pub mod outbox;

// Re-export all client types
pub use mail::{MailClient, NullMailClient};
pub use outbox::OutboxMailClient;
