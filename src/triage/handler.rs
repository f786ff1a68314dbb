//! Two-phase mailbox triage.
//!
//! 1. Every message from the recent window is fetched, classified by subject
//!    marker, its tickers recorded in the alert store, and then deleted.
//! 2. Messages older than the window are purged in bounded batches.
//!
//! A mail error scoped to one recent message is logged and the loop moves
//! on. Listing, batch-delete, and non-conflict store errors abort the run.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::alerts::{AlertRecord, ParsedSubject, parse_subject};
use crate::auth::CredentialProvider;
use crate::config::{MAX_BATCH_DELETE_IDS, TriageConfig};
use crate::error::{Error, Result, StoreError};
use crate::mail::{MailConnector, MailService, MessageRef};
use crate::store::AlertStore;
use crate::triage::report::{
    InvocationResponse, MessageOutcome, PurgeReport, RecentReport, RunSummary,
};

/// Source of the current time in epoch seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

pub struct TriageHandler {
    credentials: Arc<dyn CredentialProvider>,
    connector: Arc<dyn MailConnector>,
    store: Arc<dyn AlertStore>,
    config: TriageConfig,
    clock: Arc<dyn Clock>,
}

impl TriageHandler {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        connector: Arc<dyn MailConnector>,
        store: Arc<dyn AlertStore>,
        config: TriageConfig,
    ) -> Self {
        Self {
            credentials,
            connector,
            store,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run one invocation and fold every outcome into a response.
    ///
    /// Credentials are resolved first; without them no mailbox or store
    /// call is made. Once they resolve, expired alerts are swept from the
    /// store before the mailbox is touched.
    pub async fn handle(&self) -> InvocationResponse {
        let token = match self.credentials.access_token().await {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "Could not find valid credentials or refresh token");
                return InvocationResponse::auth_error();
            }
        };

        if let Err(e) = self.store.evict_expired(self.clock.now()).await {
            warn!(error = %e, "Expired alert sweep failed");
        }

        let mail = self.connector.connect(token);
        match self.run(mail.as_ref()).await {
            Ok(summary) => {
                info!(
                    listed = summary.recent.listed,
                    deleted = summary.recent.deleted,
                    failed = summary.recent.failed.len(),
                    inserted = summary.recent.inserted,
                    skipped = summary.recent.skipped,
                    purged = summary.purge.deleted,
                    "Triage complete"
                );
                InvocationResponse::success()
            }
            Err(e) => {
                error!(error = %e, "Triage aborted");
                InvocationResponse::failure(&e)
            }
        }
    }

    /// Both phases against an already authenticated mailbox.
    pub async fn run(&self, mail: &dyn MailService) -> Result<RunSummary> {
        let recent = self.process_recent(mail).await?;
        let purge = self.purge_stale(mail).await?;
        Ok(RunSummary { recent, purge })
    }

    /// Phase 1: classify, record, and delete every recent message.
    pub async fn process_recent(&self, mail: &dyn MailService) -> Result<RecentReport> {
        info!(query = %self.config.recent_query, "Processing recent emails");
        let refs = self.list_all(mail, &self.config.recent_query).await?;

        let mut report = RecentReport {
            listed: refs.len(),
            ..RecentReport::default()
        };
        if refs.is_empty() {
            info!("No recent messages found to process");
            return Ok(report);
        }

        for message in &refs {
            match self.process_message(mail, &message.id).await {
                Ok(outcome) => report.record(&outcome),
                Err(Error::Mail(e)) => {
                    warn!(id = %message.id, error = %e, "Could not process message");
                    report.failed.push(message.id.clone());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    /// Phase 2: bulk-delete messages older than the recent window.
    ///
    /// Never touches the alert store.
    pub async fn purge_stale(&self, mail: &dyn MailService) -> Result<PurgeReport> {
        info!(query = %self.config.stale_query, "Deleting old emails");
        let page = mail
            .list_messages(
                &self.config.stale_query,
                Some(self.config.stale_max_results),
                None,
            )
            .await?;

        let mut report = PurgeReport {
            found: page.messages.len(),
            ..PurgeReport::default()
        };
        if page.messages.is_empty() {
            info!("No old emails found to delete");
            return Ok(report);
        }

        let ids: Vec<String> = page.messages.into_iter().map(|m| m.id).collect();
        info!(count = ids.len(), "Found old emails, batch deleting");

        let chunk_size = self.config.batch_delete_size.clamp(1, MAX_BATCH_DELETE_IDS);
        for batch in ids.chunks(chunk_size) {
            mail.batch_delete(batch).await?;
            report.batches += 1;
            report.deleted += batch.len();
            info!(count = batch.len(), "Permanently deleted batch of old emails");
        }
        Ok(report)
    }

    /// Every message matching `query`, across all result pages.
    async fn list_all(&self, mail: &dyn MailService, query: &str) -> Result<Vec<MessageRef>> {
        let mut messages = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = mail
                .list_messages(query, None, page_token.as_deref())
                .await?;
            messages.extend(page.messages);
            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }
        Ok(messages)
    }

    async fn process_message(&self, mail: &dyn MailService, id: &str) -> Result<MessageOutcome> {
        let message = mail.get_message(id).await?;
        let subject = message.subject();

        let parsed = parse_subject(subject, &self.config.call_marker, &self.config.put_marker);
        let outcome = match parsed {
            Some(parsed) => {
                info!(
                    id,
                    tickers = ?parsed.tickers,
                    trade_type = %parsed.trade_type,
                    "Found tickers"
                );
                self.record_alerts(parsed).await?
            }
            None => {
                debug!(id, subject, "No trade marker in subject");
                MessageOutcome::Unclassified
            }
        };

        mail.delete_message(id).await?;
        info!(id, "Deleted processed message");
        Ok(outcome)
    }

    /// Conditionally insert one record per ticker, sharing one timestamp.
    async fn record_alerts(&self, parsed: ParsedSubject) -> Result<MessageOutcome> {
        let now = self.clock.now();
        let mut inserted = Vec::new();
        let mut skipped = Vec::new();

        for ticker in parsed.tickers {
            let record = AlertRecord::new(
                ticker,
                parsed.trade_type,
                now,
                self.config.alert_ttl_secs,
            );
            match self.store.put_if_absent(&record).await {
                Ok(()) => {
                    info!(ticker = %record.ticker_symbol, "Added alert to store");
                    inserted.push(record.ticker_symbol);
                }
                Err(StoreError::AlreadyExists { key }) => {
                    info!(ticker = %key, "Ticker already exists, skipping");
                    skipped.push(key);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(MessageOutcome::Alerted {
            trade_type: parsed.trade_type,
            inserted,
            skipped,
        })
    }
}
