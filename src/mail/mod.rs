//! Mail service abstraction.
//!
//! The handler only needs four mailbox operations: search, fetch, delete
//! one, delete many. `MailConnector` builds a service once an access token
//! has been obtained.

pub mod gmail;
pub mod types;

pub use gmail::{GmailClient, GmailConnector};
pub use types::{MailMessage, MessageHeader, MessageListPage, MessageRef};

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::MailError;

/// Mailbox operations consumed by the triage handler.
#[async_trait]
pub trait MailService: Send + Sync {
    /// Search messages. `max_results` caps the page size; `page_token`
    /// continues a previous listing.
    async fn list_messages(
        &self,
        query: &str,
        max_results: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<MessageListPage, MailError>;

    /// Fetch a message with its headers.
    async fn get_message(&self, id: &str) -> Result<MailMessage, MailError>;

    /// Permanently delete one message.
    async fn delete_message(&self, id: &str) -> Result<(), MailError>;

    /// Permanently delete a bounded batch of messages.
    async fn batch_delete(&self, ids: &[String]) -> Result<(), MailError>;
}

/// Builds an authenticated mail service.
pub trait MailConnector: Send + Sync {
    fn connect(&self, access_token: SecretString) -> Arc<dyn MailService>;
}
