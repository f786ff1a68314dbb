//! Configuration types.

use std::path::PathBuf;

use crate::alerts::{CALL_MARKER, PUT_MARKER};
use crate::error::ConfigError;

/// Largest id list the mail API accepts in one batch-delete call.
pub const MAX_BATCH_DELETE_IDS: usize = 1000;

/// Longest accepted alert lifetime: one year.
pub const MAX_ALERT_TTL_SECS: i64 = 365 * 24 * 3600;

/// Triage policy: queries, caps, and the alert trade window.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Search query selecting messages to classify and delete.
    pub recent_query: String,
    /// Search query selecting messages to purge in bulk.
    pub stale_query: String,
    /// Result cap for the stale listing call.
    pub stale_max_results: u32,
    /// Ids per batch-delete call.
    pub batch_delete_size: usize,
    /// Seconds an alert stays live after it is added.
    pub alert_ttl_secs: i64,
    /// Subject marker classifying a message as a CALL alert.
    pub call_marker: String,
    /// Subject marker classifying a message as a PUT alert.
    pub put_marker: String,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            recent_query: "newer_than:1d".to_string(),
            stale_query: "older_than:1d".to_string(),
            stale_max_results: 500,
            batch_delete_size: 100,
            alert_ttl_secs: 7200, // 2 hours
            call_marker: CALL_MARKER.to_string(),
            put_marker: PUT_MARKER.to_string(),
        }
    }
}

/// Process configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Authorized-user token file for the mail API.
    pub token_path: PathBuf,
    /// Alert store database file.
    pub db_path: PathBuf,
    /// Mail API base URL.
    pub gmail_api_base: String,
    /// Mailbox owner, `me` for the authenticated user.
    pub gmail_user_id: String,
    pub triage: TriageConfig,
}

impl RuntimeConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token_path = std::env::var("TRIAGE_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("token.json"));

        let db_path = std::env::var("TRIAGE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/ticker-alerts.db"));

        let gmail_api_base = std::env::var("GMAIL_API_BASE")
            .unwrap_or_else(|_| "https://gmail.googleapis.com".to_string());

        let gmail_user_id = std::env::var("GMAIL_USER_ID").unwrap_or_else(|_| "me".to_string());

        let mut triage = TriageConfig::default();
        if let Ok(raw) = std::env::var("TRIAGE_BATCH_DELETE_SIZE") {
            triage.batch_delete_size = parse_batch_size(&raw)?;
        }
        if let Ok(raw) = std::env::var("TRIAGE_ALERT_TTL_SECS") {
            triage.alert_ttl_secs = parse_ttl(&raw)?;
        }

        Ok(Self {
            token_path,
            db_path,
            gmail_api_base: gmail_api_base.trim_end_matches('/').to_string(),
            gmail_user_id,
            triage,
        })
    }
}

fn parse_batch_size(raw: &str) -> Result<usize, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: "TRIAGE_BATCH_DELETE_SIZE".into(),
        message,
    };
    let size: usize = raw
        .trim()
        .parse()
        .map_err(|e| invalid(format!("not a number: {e}")))?;
    if size == 0 || size > MAX_BATCH_DELETE_IDS {
        return Err(invalid(format!(
            "must be between 1 and {MAX_BATCH_DELETE_IDS}, got {size}"
        )));
    }
    Ok(size)
}

fn parse_ttl(raw: &str) -> Result<i64, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: "TRIAGE_ALERT_TTL_SECS".into(),
        message,
    };
    let secs: i64 = raw
        .trim()
        .parse()
        .map_err(|e| invalid(format!("not a number: {e}")))?;
    if secs <= 0 || secs > MAX_ALERT_TTL_SECS {
        return Err(invalid(format!(
            "must be between 1 and {MAX_ALERT_TTL_SECS}, got {secs}"
        )));
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_trade_window() {
        let cfg = TriageConfig::default();
        assert_eq!(cfg.recent_query, "newer_than:1d");
        assert_eq!(cfg.stale_query, "older_than:1d");
        assert_eq!(cfg.stale_max_results, 500);
        assert_eq!(cfg.batch_delete_size, 100);
        assert_eq!(cfg.alert_ttl_secs, 7200);
    }

    #[test]
    fn batch_size_bounds() {
        assert_eq!(parse_batch_size("250").unwrap(), 250);
        assert_eq!(parse_batch_size(" 1000 ").unwrap(), 1000);
        assert!(parse_batch_size("0").is_err());
        assert!(parse_batch_size("1001").is_err());
        assert!(parse_batch_size("lots").is_err());
    }

    #[test]
    fn ttl_bounds() {
        assert_eq!(parse_ttl("3600").unwrap(), 3600);
        assert_eq!(parse_ttl("31536000").unwrap(), MAX_ALERT_TTL_SECS);
        assert!(parse_ttl("0").is_err());
        assert!(parse_ttl("-5").is_err());
        assert!(parse_ttl("31536001").is_err());
        assert!(parse_ttl(&i64::MAX.to_string()).is_err());
    }
}
