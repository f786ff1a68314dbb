//! Invocation handler: recent-message processing and stale-message purge.

pub mod handler;
pub mod report;

pub use handler::{Clock, SystemClock, TriageHandler};
pub use report::{InvocationResponse, MessageOutcome, PurgeReport, RecentReport, RunSummary};
