//! Per-message outcomes, phase reports, and the invocation response.

use serde_json::json;

use crate::alerts::TradeType;
use crate::error::Error;

/// What happened to one recent message that was fetched and deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Subject carried a trade-type marker.
    Alerted {
        trade_type: TradeType,
        /// Tickers newly recorded.
        inserted: Vec<String>,
        /// Tickers that already had a live alert.
        skipped: Vec<String>,
    },
    /// Subject carried no marker.
    Unclassified,
}

/// Phase 1 totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentReport {
    pub listed: usize,
    pub deleted: usize,
    pub unclassified: usize,
    pub inserted: usize,
    pub skipped: usize,
    /// Ids of messages whose fetch or delete failed.
    pub failed: Vec<String>,
}

impl RecentReport {
    pub(crate) fn record(&mut self, outcome: &MessageOutcome) {
        self.deleted += 1;
        match outcome {
            MessageOutcome::Alerted {
                inserted, skipped, ..
            } => {
                self.inserted += inserted.len();
                self.skipped += skipped.len();
            }
            MessageOutcome::Unclassified => self.unclassified += 1,
        }
    }
}

/// Phase 2 totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub found: usize,
    pub batches: usize,
    pub deleted: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub recent: RecentReport,
    pub purge: PurgeReport,
}

/// Status code plus a short message, as returned to the invoker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResponse {
    pub status_code: u16,
    pub message: String,
}

impl InvocationResponse {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            message: "Processing complete.".into(),
        }
    }

    pub fn auth_error() -> Self {
        Self {
            status_code: 500,
            message: "Authentication error.".into(),
        }
    }

    pub fn failure(error: &Error) -> Self {
        Self {
            status_code: 500,
            message: format!("An error occurred: {error}"),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Serverless response shape; `body` holds the JSON-encoded message.
    pub fn to_json(&self) -> serde_json::Value {
        let body = serde_json::Value::String(self.message.clone()).to_string();
        json!({
            "statusCode": self.status_code,
            "body": body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MailError;

    #[test]
    fn success_wire_shape() {
        let json = InvocationResponse::success().to_json();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["body"], "\"Processing complete.\"");
    }

    #[test]
    fn auth_error_wire_shape() {
        let resp = InvocationResponse::auth_error();
        assert!(!resp.is_success());
        assert_eq!(resp.to_json()["body"], "\"Authentication error.\"");
    }

    #[test]
    fn failure_carries_error_detail() {
        let err = Error::Mail(MailError::Api {
            status: 403,
            message: "Insufficient Permission".into(),
        });
        let resp = InvocationResponse::failure(&err);
        assert_eq!(resp.status_code, 500);
        assert!(resp.message.starts_with("An error occurred: "));
        assert!(resp.message.contains("Insufficient Permission"));
    }

    #[test]
    fn report_tallies_outcomes() {
        let mut report = RecentReport::default();
        report.record(&MessageOutcome::Unclassified);
        report.record(&MessageOutcome::Alerted {
            trade_type: TradeType::Call,
            inserted: vec!["AAPL".into(), "MSFT".into()],
            skipped: vec!["SPY".into()],
        });
        assert_eq!(report.deleted, 2);
        assert_eq!(report.unclassified, 1);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.skipped, 1);
    }
}
