//! Process-wide client handles.
//!
//! The HTTP client and the alert store are created on first use and reused by
//! every invocation served by this process. No teardown: the process
//! lifecycle is managed by whatever launches it.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use tokio::sync::OnceCell;

use crate::auth::FileCredentialProvider;
use crate::config::RuntimeConfig;
use crate::error::StoreError;
use crate::mail::GmailConnector;
use crate::store::LibSqlBackend;
use crate::triage::TriageHandler;

static HTTP: OnceLock<reqwest::Client> = OnceLock::new();
static STORE: OnceCell<Arc<LibSqlBackend>> = OnceCell::const_new();

/// Shared HTTP client (connection pool) for the token endpoint and mail API.
pub fn http_client() -> reqwest::Client {
    HTTP.get_or_init(reqwest::Client::new).clone()
}

/// Shared alert store, opened at `path` on first call.
///
/// Later calls return the first store regardless of `path`.
pub async fn alert_store(path: &Path) -> Result<Arc<LibSqlBackend>, StoreError> {
    STORE
        .get_or_try_init(|| async { LibSqlBackend::new_local(path).await.map(Arc::new) })
        .await
        .cloned()
}

/// Wire a handler from configuration and the shared handles.
pub async fn build_handler(config: &RuntimeConfig) -> Result<TriageHandler, StoreError> {
    let http = http_client();
    let store = alert_store(&config.db_path).await?;
    let credentials = Arc::new(FileCredentialProvider::new(
        config.token_path.clone(),
        http.clone(),
    ));
    let connector = Arc::new(GmailConnector::new(
        http,
        config.gmail_api_base.clone(),
        config.gmail_user_id.clone(),
    ));

    Ok(TriageHandler::new(
        credentials,
        connector,
        store,
        config.triage.clone(),
    ))
}
